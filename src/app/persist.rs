use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::playlist::{PLAYLIST_STORE_VERSION, migrate_playlist_store};
use crate::storage::{ThrottledStorage, load_state, no_migration, save_state};

/// Storage keys, one per persisted store.
pub(super) mod keys {
    pub const FILTER: &str = "filter-store";
    pub const HISTORY: &str = "history-store";
    pub const PLAYER: &str = "player-store";
    pub const PLAYLIST: &str = "playlist-store";
    pub const SEARCH: &str = "search-store";
    pub const TAG: &str = "tag-store";
    pub const TRACK: &str = "track-store";
    pub const THEME: &str = "theme-store";
}

/// Version written for every store except the playlist store.
const UNVERSIONED: u32 = 0;

fn version_for(key: &str) -> u32 {
    if key == keys::PLAYLIST {
        PLAYLIST_STORE_VERSION
    } else {
        UNVERSIONED
    }
}

/// Load a store, falling back to `T::default()` when the key is missing or
/// unreadable.
pub(super) fn load_or_default<T>(storage: &ThrottledStorage, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let loaded = if key == keys::PLAYLIST {
        load_state(storage, key, PLAYLIST_STORE_VERSION, migrate_playlist_store)
    } else {
        load_state(storage, key, UNVERSIONED, no_migration)
    };

    match loaded {
        Ok(Some(state)) => state,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "discarding unreadable persisted state");
            T::default()
        }
    }
}

pub(super) fn save<T: Serialize>(storage: &ThrottledStorage, key: &str, state: &T) {
    if let Err(e) = save_state(storage, key, version_for(key), state) {
        warn!(key, error = %e, "failed to persist state");
    }
}
