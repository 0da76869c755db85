//! The track library store.
//!
//! Every known track lives exactly once in `records`, keyed by id. The working
//! set, the library order and the playback cursor only hold ids, so a track's
//! `custom_tags` cannot diverge between the three views.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{Track, dedup_tags};

/// Persisted shape of the track store (`track-store` key).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStoreState {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub library_tracks: Vec<Track>,
    #[serde(default)]
    pub current_track: Option<Track>,
    /// `None` means the vocabulary was never saved and gets the seed tag.
    #[serde(default)]
    pub all_custom_tags: Option<Vec<String>>,
}

/// Ticket handed out by [`TrackStore::begin_fetch`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone)]
pub struct TrackStore {
    records: HashMap<String, Track>,
    library: Vec<String>,
    working: Vec<String>,
    current: Option<String>,
    vocabulary: Vec<String>,
    available: Arc<[String]>,
    fetches_issued: u64,
    last_applied_fetch: u64,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new("Like")
    }
}

impl TrackStore {
    /// Create an empty store whose vocabulary holds only `seed_tag`.
    pub fn new(seed_tag: &str) -> Self {
        let mut store = Self {
            records: HashMap::new(),
            library: Vec::new(),
            working: Vec::new(),
            current: None,
            vocabulary: vec![seed_tag.to_string()],
            available: Arc::from(Vec::new()),
            fetches_issued: 0,
            last_applied_fetch: 0,
        };
        store.refresh_available();
        store
    }

    /// Rebuild a store from its persisted shape.
    ///
    /// The library copy of a track wins over the working-set and current-track
    /// copies when their tags disagree.
    pub fn from_state(state: TrackStoreState, seed_tag: &str) -> Self {
        let mut store = Self::new(seed_tag);
        if let Some(tags) = state.all_custom_tags {
            store.vocabulary = dedup_tags(&tags);
        }

        for track in state.library_tracks {
            store.insert_if_absent(track);
        }
        for track in state.tracks {
            let id = track.id.clone();
            store.insert_if_absent(track);
            store.working.push(id);
        }
        if let Some(track) = state.current_track {
            let id = track.id.clone();
            store.insert_if_absent(track);
            store.current = Some(id);
        }

        let observed: Vec<String> = store
            .library
            .iter()
            .filter_map(|id| store.records.get(id))
            .flat_map(|t| t.custom_tags.iter().cloned())
            .collect();
        store.register_tags(observed);
        store.refresh_available();
        store
    }

    /// Snapshot the store into its persisted shape.
    pub fn state(&self) -> TrackStoreState {
        TrackStoreState {
            tracks: self.tracks().cloned().collect(),
            library_tracks: self.library_tracks().cloned().collect(),
            current_track: self.current_track().cloned(),
            all_custom_tags: Some(self.vocabulary.clone()),
        }
    }

    fn insert_if_absent(&mut self, mut track: Track) {
        if self.records.contains_key(&track.id) {
            return;
        }
        track.custom_tags = dedup_tags(&track.custom_tags);
        self.library.push(track.id.clone());
        self.records.insert(track.id.clone(), track);
    }

    /// Replace the working set with `incoming` and merge it into the library.
    ///
    /// Catalog fields of an already known track are refreshed from `incoming`;
    /// its custom tags are kept from the library.
    pub fn set_tracks(&mut self, incoming: Vec<Track>) {
        let mut working = Vec::with_capacity(incoming.len());
        let mut added = 0usize;

        for mut track in incoming {
            let id = track.id.clone();
            match self.records.get_mut(&id) {
                Some(existing) => {
                    track.custom_tags = std::mem::take(&mut existing.custom_tags);
                    *existing = track;
                }
                None => {
                    track.custom_tags = dedup_tags(&track.custom_tags);
                    self.library.push(id.clone());
                    self.records.insert(id.clone(), track);
                    added += 1;
                }
            }
            working.push(id);
        }

        let observed: Vec<String> = working
            .iter()
            .filter_map(|id| self.records.get(id))
            .flat_map(|t| t.custom_tags.iter().cloned())
            .collect();
        self.working = working;
        if self.register_tags(observed) {
            self.refresh_available();
        }

        debug!(
            working = self.working.len(),
            added,
            library = self.library.len(),
            "merged fetched tracks into library"
        );
    }

    /// Reserve a ticket for a fetch that is about to start.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetches_issued += 1;
        FetchTicket(self.fetches_issued)
    }

    /// Apply the result of a fetch unless a fetch issued later already landed.
    ///
    /// Returns whether the tracks were applied.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, incoming: Vec<Track>) -> bool {
        if ticket.0 < self.last_applied_fetch {
            debug!(ticket = ticket.0, "dropping stale fetch result");
            return false;
        }
        self.last_applied_fetch = ticket.0;
        self.set_tracks(incoming);
        true
    }

    /// The working set, in fetch order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.working.iter().filter_map(|id| self.records.get(id))
    }

    /// Every track ever merged, in first-seen order.
    pub fn library_tracks(&self) -> impl Iterator<Item = &Track> {
        self.library.iter().filter_map(|id| self.records.get(id))
    }

    /// The whole library as a list, for deriving playlists.
    pub fn get_library_tracks(&self) -> Vec<&Track> {
        self.library_tracks().collect()
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.records.get(id)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_deref().and_then(|id| self.records.get(id))
    }

    pub fn library_len(&self) -> usize {
        self.library.len()
    }

    /// Point the playback cursor at a known track, or clear it with `None`.
    ///
    /// Unknown ids leave the cursor untouched and return `false`.
    pub fn set_current_track(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.current = None;
                true
            }
            Some(id) if self.records.contains_key(id) => {
                self.current = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    fn current_position(&self) -> Option<usize> {
        let current = self.current.as_deref()?;
        self.working.iter().position(|id| id == current)
    }

    /// Advance the cursor within the working set, wrapping at the end.
    ///
    /// No-op when nothing is playing, the working set is empty or the current
    /// track is not part of the working set.
    pub fn play_next(&mut self) -> bool {
        let Some(pos) = self.current_position() else {
            return false;
        };
        let next = (pos + 1) % self.working.len();
        self.current = Some(self.working[next].clone());
        true
    }

    /// Step the cursor back within the working set, wrapping at the start.
    pub fn play_previous(&mut self) -> bool {
        let Some(pos) = self.current_position() else {
            return false;
        };
        let prev = if pos == 0 {
            self.working.len() - 1
        } else {
            pos - 1
        };
        self.current = Some(self.working[prev].clone());
        true
    }

    /// Attach `tag` to a track and register it in the vocabulary.
    pub fn add_track_custom_tag(&mut self, track_id: &str, tag: &str) -> bool {
        let Some(track) = self.records.get_mut(track_id) else {
            return false;
        };
        let mut changed = false;
        if !track.has_custom_tag(tag) {
            track.custom_tags.push(tag.to_string());
            changed = true;
        }
        if self.register_tags([tag.to_string()]) {
            self.refresh_available();
            changed = true;
        }
        changed
    }

    pub fn remove_track_custom_tag(&mut self, track_id: &str, tag: &str) -> bool {
        let Some(track) = self.records.get_mut(track_id) else {
            return false;
        };
        let before = track.custom_tags.len();
        track.custom_tags.retain(|t| t != tag);
        track.custom_tags.len() != before
    }

    /// Add `tag` to the vocabulary. Blank and already known tags are rejected.
    pub fn create_custom_tag(&mut self, tag: &str) -> bool {
        if tag.trim().is_empty() || self.vocabulary.iter().any(|t| t == tag) {
            return false;
        }
        self.vocabulary.push(tag.to_string());
        self.refresh_available();
        true
    }

    /// Remove `tag` from the vocabulary and from every track.
    pub fn delete_custom_tag(&mut self, tag: &str) -> bool {
        let mut changed = false;
        for track in self.records.values_mut() {
            let before = track.custom_tags.len();
            track.custom_tags.retain(|t| t != tag);
            changed |= track.custom_tags.len() != before;
        }

        let before = self.vocabulary.len();
        self.vocabulary.retain(|t| t != tag);
        if self.vocabulary.len() != before {
            self.refresh_available();
            changed = true;
        }
        changed
    }

    /// Rename `old_tag` to `new_tag` on every track and in the vocabulary.
    ///
    /// Returns `false` when the rename is rejected: identical names, or a
    /// `new_tag` that already exists (two tags are never merged). An accepted
    /// rename returns `true` even if nothing carried `old_tag`.
    pub fn rename_custom_tag(&mut self, old_tag: &str, new_tag: &str) -> bool {
        if old_tag == new_tag || self.vocabulary.iter().any(|t| t == new_tag) {
            return false;
        }

        for track in self.records.values_mut() {
            if track.has_custom_tag(old_tag) {
                let renamed: Vec<String> = track
                    .custom_tags
                    .iter()
                    .map(|t| if t == old_tag { new_tag.to_string() } else { t.clone() })
                    .collect();
                track.custom_tags = dedup_tags(&renamed);
            }
        }

        for t in self.vocabulary.iter_mut() {
            if *t == old_tag {
                *t = new_tag.to_string();
            }
        }
        self.vocabulary = dedup_tags(&self.vocabulary);
        self.refresh_available();
        true
    }

    /// The raw vocabulary in insertion order.
    pub fn all_custom_tags(&self) -> &[String] {
        &self.vocabulary
    }

    /// The vocabulary, de-duplicated and sorted.
    ///
    /// The returned slice is shared and stays pointer-identical until the
    /// vocabulary content actually changes.
    pub fn get_available_tags(&self) -> Arc<[String]> {
        Arc::clone(&self.available)
    }

    fn register_tags<I: IntoIterator<Item = String>>(&mut self, tags: I) -> bool {
        let mut changed = false;
        for tag in tags {
            if !self.vocabulary.contains(&tag) {
                self.vocabulary.push(tag);
                changed = true;
            }
        }
        changed
    }

    fn refresh_available(&mut self) {
        let mut sorted = self.vocabulary.clone();
        sorted.sort();
        sorted.dedup();
        if *self.available != *sorted {
            self.available = Arc::from(sorted);
        }
    }
}
