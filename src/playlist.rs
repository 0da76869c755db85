//! Saved filters ("favorites") and how they resolve to tracks.

mod migrate;
mod model;
mod store;

pub use migrate::{PLAYLIST_STORE_VERSION, migrate_playlist_store};
pub use store::{PlaylistStore, PlaylistStoreState};
