//! Schema upgrades for the persisted `playlist-store`.
//!
//! * v0: legacy shape, may lack `tagBlocks` and may carry a bare `trackIds`.
//! * v1: only the known playlist fields are kept; `trackIds` is dropped.
//! * v2: `trackIds` is a frozen snapshot written on creation.

use serde_json::{Map, Value};

pub const PLAYLIST_STORE_VERSION: u32 = 2;

const V1_FIELDS: [&str; 7] = [
    "id",
    "name",
    "isFavorite",
    "tags",
    "operation",
    "createdAt",
    "tagBlocks",
];

fn v0_to_v1(mut state: Value) -> Value {
    let Some(playlists) = state.get_mut("playlists").and_then(Value::as_object_mut) else {
        return state;
    };

    for playlist in playlists.values_mut() {
        if let Value::Object(fields) = playlist {
            let kept: Map<String, Value> = V1_FIELDS
                .iter()
                .filter_map(|k| fields.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect();
            *fields = kept;
        }
    }
    state
}

/// Upgrade a persisted playlist store from `from` to [`PLAYLIST_STORE_VERSION`],
/// one step at a time.
pub fn migrate_playlist_store(mut state: Value, from: u32) -> Value {
    let mut version = from;
    while version < PLAYLIST_STORE_VERSION {
        state = match version {
            0 => v0_to_v1(state),
            // v1 -> v2 only adds an optional field.
            _ => state,
        };
        version += 1;
    }
    state
}
