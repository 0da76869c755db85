use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::{TagOperation, filter_tracks_by_tag_blocks, filter_tracks_by_tags, non_empty_blocks};
use crate::library::{Track, TrackStore, dedup_tags};

use super::model::{Membership, Playlist};

/// Persisted shape of the playlist store (`playlist-store` key).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistStoreState {
    pub playlists: BTreeMap<String, Playlist>,
    pub active_playlist_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistStore {
    playlists: BTreeMap<String, Playlist>,
    active_playlist_id: Option<String>,
}

fn new_playlist_id(taken: &BTreeMap<String, Playlist>) -> String {
    loop {
        let id: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(12)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        if !taken.contains_key(&id) {
            return id;
        }
    }
}

fn rename_each(tags: &mut [String], old_tag: &str, new_tag: &str) -> bool {
    let mut changed = false;
    for t in tags.iter_mut() {
        if *t == old_tag {
            *t = new_tag.to_string();
            changed = true;
        }
    }
    changed
}

impl PlaylistStore {
    pub fn from_state(state: PlaylistStoreState) -> Self {
        let active_playlist_id = state
            .active_playlist_id
            .filter(|id| state.playlists.contains_key(id));
        Self {
            playlists: state.playlists,
            active_playlist_id,
        }
    }

    pub fn state(&self) -> PlaylistStoreState {
        PlaylistStoreState {
            playlists: self.playlists.clone(),
            active_playlist_id: self.active_playlist_id.clone(),
        }
    }

    /// Insert or replace a playlist by id.
    pub fn upsert_playlist(&mut self, playlist: Playlist) {
        self.playlists.insert(playlist.id.clone(), playlist);
    }

    /// Remove a playlist. Clears the active pointer only if it pointed here.
    pub fn delete_playlist(&mut self, id: &str) -> bool {
        if self.playlists.remove(id).is_none() {
            return false;
        }
        if self.active_playlist_id.as_deref() == Some(id) {
            self.active_playlist_id = None;
        }
        true
    }

    /// Select a playlist, or clear the selection with `None`. Unknown ids are ignored.
    pub fn set_active_playlist(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.active_playlist_id = None;
                true
            }
            Some(id) if self.playlists.contains_key(id) => {
                self.active_playlist_id = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    pub fn active_playlist_id(&self) -> Option<&str> {
        self.active_playlist_id.as_deref()
    }

    pub fn get_playlist_by_id(&self, id: &str) -> Option<&Playlist> {
        self.playlists.get(id)
    }

    /// Favorites, oldest first.
    pub fn playlists(&self) -> Vec<&Playlist> {
        let mut out: Vec<&Playlist> = self.playlists.values().filter(|p| p.is_favorite).collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        out
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Save the current filter as a frozen playlist and make it active.
    ///
    /// Empty blocks are dropped; if none remain, `selected_tags` is used as a
    /// single block. Returns `None` when there is nothing to filter by.
    pub fn create_favorite_from_filter(
        &mut self,
        name: &str,
        tag_blocks: &[Vec<String>],
        selected_tags: &[String],
        library: &TrackStore,
    ) -> Option<String> {
        let mut blocks: Vec<Vec<String>> = non_empty_blocks::<_, String>(tag_blocks)
            .into_iter()
            .map(dedup_tags)
            .collect();
        if blocks.is_empty() && !selected_tags.is_empty() {
            blocks.push(dedup_tags(selected_tags));
        }
        if blocks.is_empty() {
            return None;
        }

        let track_ids: Vec<String> = filter_tracks_by_tag_blocks(library.get_library_tracks(), &blocks)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();

        let id = new_playlist_id(&self.playlists);
        let playlist = Playlist {
            id: id.clone(),
            name: name.to_string(),
            is_favorite: true,
            created_at: chrono::Utc::now().timestamp_millis(),
            operation: TagOperation::for_blocks(&blocks),
            tags: blocks.concat(),
            tag_blocks: Some(blocks),
            track_ids: Some(track_ids),
        };

        debug!(
            id = %id,
            tracks = playlist.track_ids.as_ref().map_or(0, Vec::len),
            "created playlist from filter"
        );
        self.playlists.insert(id.clone(), playlist);
        self.active_playlist_id = Some(id.clone());
        Some(id)
    }

    /// Resolve a playlist against the current library, preserving library order.
    ///
    /// Snapshot ids no longer in the library are skipped. Unknown playlists
    /// resolve to nothing.
    pub fn get_tracks_for_playlist<'a>(&self, id: &str, library: &'a TrackStore) -> Vec<&'a Track> {
        let Some(playlist) = self.playlists.get(id) else {
            return Vec::new();
        };

        let all = library.get_library_tracks();
        match playlist.membership() {
            Membership::Snapshot(ids) => {
                let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
                all.into_iter()
                    .filter(|t| wanted.contains(t.id.as_str()))
                    .collect()
            }
            Membership::Blocks(blocks) => filter_tracks_by_tag_blocks(all, blocks),
            Membership::Tags(tags, op) => filter_tracks_by_tags(all, tags, op),
            Membership::All => all,
        }
    }

    /// Rewrite `old_tag` to `new_tag` in every playlist's tags and blocks.
    ///
    /// Frozen `track_ids` are left alone.
    pub fn rename_tag_in_playlists(&mut self, old_tag: &str, new_tag: &str) -> bool {
        let mut changed = false;
        for playlist in self.playlists.values_mut() {
            changed |= rename_each(&mut playlist.tags, old_tag, new_tag);
            if let Some(blocks) = playlist.tag_blocks.as_mut() {
                for block in blocks.iter_mut() {
                    changed |= rename_each(block, old_tag, new_tag);
                }
            }
        }
        changed
    }

    /// Strip a deleted tag from every playlist query.
    ///
    /// Blocks left empty are dropped and the operation is re-derived from the
    /// remaining blocks. Frozen `track_ids` are left alone.
    pub fn remove_tag_from_playlists(&mut self, tag: &str) -> bool {
        let mut changed = false;
        for playlist in self.playlists.values_mut() {
            let before = playlist.tags.len();
            playlist.tags.retain(|t| t != tag);
            changed |= playlist.tags.len() != before;

            if let Some(blocks) = playlist.tag_blocks.as_mut() {
                if blocks.iter().any(|b| b.iter().any(|t| t == tag)) {
                    for block in blocks.iter_mut() {
                        block.retain(|t| t != tag);
                    }
                    blocks.retain(|b| !b.is_empty());
                    if !blocks.is_empty() {
                        playlist.operation = TagOperation::for_blocks(blocks.as_slice());
                    }
                    changed = true;
                }
            }
        }
        changed
    }
}
