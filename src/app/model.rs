//! Application model: `App` and the flows that span more than one store.
//!
//! Every mutating flow writes the stores it touched back through the throttled
//! storage before returning.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{Catalog, fetch_or_empty};
use crate::config::Settings;
use crate::filter::{FilterState, TagOperation};
use crate::library::{Track, TrackStore, TrackStoreState};
use crate::playlist::{PlaylistStore, PlaylistStoreState};
use crate::session::{
    HistoryEntry, HistoryStore, PlayerState, SearchState, TagState, ThemeState, TrackEnd,
};
use crate::storage::ThrottledStorage;

use super::persist::{keys, load_or_default, save};

/// The main application model.
pub struct App {
    pub settings: Settings,
    pub tracks: TrackStore,
    pub playlists: PlaylistStore,
    pub filter: FilterState,
    pub tags: TagState,
    pub player: PlayerState,
    pub history: HistoryStore,
    pub search: SearchState,
    pub theme: ThemeState,
    storage: ThrottledStorage,
}

impl App {
    /// Load every store from `storage`.
    pub fn load(settings: Settings, storage: ThrottledStorage) -> Self {
        let track_state: TrackStoreState = load_or_default(&storage, keys::TRACK);
        let playlist_state: PlaylistStoreState = load_or_default(&storage, keys::PLAYLIST);

        let app = Self {
            tracks: TrackStore::from_state(track_state, &settings.tags.seed_tag),
            playlists: PlaylistStore::from_state(playlist_state),
            filter: load_or_default(&storage, keys::FILTER),
            tags: load_or_default(&storage, keys::TAG),
            player: load_or_default(&storage, keys::PLAYER),
            history: load_or_default(&storage, keys::HISTORY),
            search: load_or_default(&storage, keys::SEARCH),
            theme: load_or_default(&storage, keys::THEME),
            settings,
            storage,
        };

        info!(
            library = app.tracks.library_len(),
            playlists = app.playlists.len(),
            "loaded persisted state"
        );
        app
    }

    fn save_tracks(&self) {
        save(&self.storage, keys::TRACK, &self.tracks.state());
    }

    fn save_playlists(&self) {
        save(&self.storage, keys::PLAYLIST, &self.playlists.state());
    }

    fn save_filter(&self) {
        save(&self.storage, keys::FILTER, &self.filter);
    }

    fn save_pinned_tags(&self) {
        save(&self.storage, keys::TAG, &self.tags);
    }

    fn save_player(&self) {
        save(&self.storage, keys::PLAYER, &self.player);
    }

    fn save_history(&self) {
        save(&self.storage, keys::HISTORY, &self.history);
    }

    fn save_search(&self) {
        save(&self.storage, keys::SEARCH, &self.search);
    }

    fn save_theme(&self) {
        save(&self.storage, keys::THEME, &self.theme);
    }

    /// Replace the working set with a fetch result and leave any playlist view.
    fn apply_fetch(&mut self, tracks: Vec<Track>) {
        let ticket = self.tracks.begin_fetch();
        if self.tracks.complete_fetch(ticket, tracks) {
            self.playlists.set_active_playlist(None);
            self.save_tracks();
            self.save_playlists();
        }
    }

    /// Search the catalog. The query is remembered; failures yield an empty
    /// working set.
    pub fn search(&mut self, catalog: &dyn Catalog, query: &str) {
        let query = query.trim();
        let found = fetch_or_empty(
            "search",
            catalog.search_tracks(query, self.settings.catalog.search_limit),
        );
        debug!(query, results = found.len(), "search finished");

        self.apply_fetch(found);
        self.search.set_search_query(query);
        self.save_search();
    }

    /// Load the catalog's popular tracks and clear the search query.
    pub fn load_popular(&mut self, catalog: &dyn Catalog) {
        let found = fetch_or_empty(
            "popular tracks",
            catalog.popular_tracks(self.settings.catalog.popular_limit),
        );

        self.apply_fetch(found);
        self.search.clear_search();
        self.save_search();
    }

    /// Make a playlist's resolved tracks the working set.
    ///
    /// Returns false for unknown playlist ids.
    pub fn load_playlist(&mut self, id: &str) -> bool {
        if self.playlists.get_playlist_by_id(id).is_none() {
            return false;
        }

        let resolved: Vec<Track> = self
            .playlists
            .get_tracks_for_playlist(id, &self.tracks)
            .into_iter()
            .cloned()
            .collect();
        self.tracks.set_tracks(resolved);
        self.playlists.set_active_playlist(Some(id));
        self.filter.reset();
        self.search.clear_search();

        self.save_tracks();
        self.save_playlists();
        self.save_filter();
        self.save_search();
        true
    }

    /// Add a tag to the vocabulary. Surrounding whitespace is ignored; empty or
    /// already known names are rejected.
    pub fn create_tag(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.tracks.all_custom_tags().iter().any(|t| t == name) {
            return false;
        }
        let created = self.tracks.create_custom_tag(name);
        if created {
            self.save_tracks();
        }
        created
    }

    /// Rename a tag everywhere it is referenced by name.
    ///
    /// Filter state and playlists follow only when the track store accepts the
    /// rename.
    pub fn rename_tag(&mut self, old_tag: &str, new_tag: &str) -> bool {
        let new_tag = new_tag.trim();
        if new_tag.is_empty() || !self.tracks.rename_custom_tag(old_tag, new_tag) {
            return false;
        }

        if self.filter.rename_tag(old_tag, new_tag) {
            self.save_filter();
        }
        if self.tags.rename_tag(old_tag, new_tag) {
            self.save_pinned_tags();
        }
        if self.playlists.rename_tag_in_playlists(old_tag, new_tag) {
            self.save_playlists();
        }
        self.save_tracks();
        true
    }

    /// Delete a tag from the vocabulary, every track, the filter, the pinned
    /// tags and playlists.
    pub fn delete_tag(&mut self, tag: &str) -> bool {
        let deleted = self.tracks.delete_custom_tag(tag);
        let unfiltered = self.filter.remove_tag(tag);
        let unpinned = self.tags.remove_active_tag(tag);
        let unlisted = self.playlists.remove_tag_from_playlists(tag);

        if deleted {
            self.save_tracks();
        }
        if unfiltered {
            self.save_filter();
        }
        if unpinned {
            self.save_pinned_tags();
        }
        if unlisted {
            self.save_playlists();
        }
        deleted || unfiltered || unpinned || unlisted
    }

    /// Pin a known tag for quick access.
    pub fn pin_tag(&mut self, tag: &str) -> bool {
        if !self.tracks.all_custom_tags().iter().any(|t| t == tag) {
            return false;
        }
        let pinned = self.tags.add_active_tag(tag);
        if pinned {
            self.save_pinned_tags();
        }
        pinned
    }

    pub fn unpin_tag(&mut self, tag: &str) -> bool {
        let unpinned = self.tags.remove_active_tag(tag);
        if unpinned {
            self.save_pinned_tags();
        }
        unpinned
    }

    pub fn clear_pinned_tags(&mut self) {
        self.tags.clear_active_tags();
        self.save_pinned_tags();
    }

    pub fn tag_track(&mut self, track_id: &str, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        let changed = self.tracks.add_track_custom_tag(track_id, tag);
        if changed {
            self.save_tracks();
        }
        changed
    }

    pub fn untag_track(&mut self, track_id: &str, tag: &str) -> bool {
        let changed = self.tracks.remove_track_custom_tag(track_id, tag);
        if changed {
            self.save_tracks();
        }
        changed
    }

    /// Filter the working set by a flat tag selection.
    pub fn filter_by_tags(&mut self, tags: Vec<String>, operation: TagOperation) {
        self.filter.reset();
        self.filter.set_selected_tags(tags);
        self.filter.set_tag_operation(operation);
        self.save_filter();
    }

    /// Filter the working set by AND-blocks that are OR-ed together.
    pub fn filter_by_blocks(&mut self, blocks: Vec<Vec<String>>) {
        self.filter.reset();
        let operation = TagOperation::for_blocks(&blocks);
        for block in blocks {
            self.filter.add_tag_block(block);
        }
        self.filter.set_tag_operation(operation);
        self.save_filter();
    }

    /// Freeze the current filter into a new playlist and make it active.
    ///
    /// The name is trimmed. Returns the new playlist id, or `None` for an empty
    /// name or filter.
    pub fn save_filter_as_playlist(&mut self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = self.playlists.create_favorite_from_filter(
            name,
            &self.filter.tag_blocks,
            &self.filter.selected_tags,
            &self.tracks,
        )?;
        self.save_playlists();
        Some(id)
    }

    pub fn rename_playlist(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(mut playlist) = self.playlists.get_playlist_by_id(id).cloned() else {
            return false;
        };
        playlist.name = name.to_string();
        self.playlists.upsert_playlist(playlist);
        self.save_playlists();
        true
    }

    pub fn delete_playlist(&mut self, id: &str) -> bool {
        let deleted = self.playlists.delete_playlist(id);
        if deleted {
            self.save_playlists();
        }
        deleted
    }

    /// The working set narrowed by the active filter.
    pub fn visible_tracks(&self) -> Vec<&Track> {
        self.filter.apply(self.tracks.tracks())
    }

    pub fn available_tags(&self) -> Arc<[String]> {
        self.tracks.get_available_tags()
    }

    /// Start playing a track from the working set or library.
    pub fn play(&mut self, track_id: &str) -> bool {
        if !self.tracks.set_current_track(Some(track_id)) {
            return false;
        }
        self.started_current_track();
        true
    }

    pub fn play_next(&mut self) -> bool {
        if !self.tracks.play_next() {
            return false;
        }
        self.started_current_track();
        true
    }

    pub fn play_previous(&mut self) -> bool {
        if !self.tracks.play_previous() {
            return false;
        }
        self.started_current_track();
        true
    }

    fn started_current_track(&mut self) {
        let Some(track_id) = self.tracks.current_track().map(|t| t.id.clone()) else {
            return;
        };
        self.player.set_is_playing(true);
        self.player.set_playback_position(0.0);
        self.history.add_history_entry(
            HistoryEntry {
                track_id,
                played_at: chrono::Utc::now().timestamp_millis(),
                position: 0.0,
            },
            self.settings.history.max_entries,
        );

        self.save_tracks();
        self.save_player();
        self.save_history();
    }

    /// The transport finished the current track.
    pub fn track_ended(&mut self) -> TrackEnd {
        let end = self.player.on_track_ended(&mut self.tracks);
        match end {
            TrackEnd::Advanced => self.started_current_track(),
            TrackEnd::Restart | TrackEnd::Stopped => self.save_player(),
        }
        end
    }

    pub fn seek(&mut self, seconds: f64) {
        self.player.set_playback_position(seconds);
        self.save_player();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.player.set_volume(volume);
        self.save_player();
    }

    pub fn toggle_mute(&mut self) {
        self.player.toggle_mute();
        self.save_player();
    }

    pub fn toggle_loop(&mut self) {
        self.player.toggle_loop();
        self.save_player();
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
        self.save_history();
    }

    pub fn toggle_theme(&mut self) {
        self.theme.toggle_theme();
        self.save_theme();
    }

    /// Flush every pending write to the backend.
    pub fn shutdown(&self) {
        debug!(pending = self.storage.pending_len(), "flushing persisted state");
        self.storage.force_flush();
        debug!("flushed pending state");
    }
}
