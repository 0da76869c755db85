//! Versioned `{"state": .., "version": n}` envelopes, one per store key.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::StorageError;
use super::throttled::ThrottledStorage;

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    state: Value,
    #[serde(default)]
    version: u32,
}

/// Serialize `state` under `key`. The write is coalesced by `storage`.
pub fn save_state<T: Serialize>(
    storage: &ThrottledStorage,
    key: &str,
    version: u32,
    state: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(&EnvelopeOut { state, version })?;
    storage.set_item(key, json);
    Ok(())
}

/// Load the state stored under `key`.
///
/// When the stored version is older than `version`, `migrate` receives the raw
/// state and the stored version and returns the upgraded state. A missing key
/// yields `Ok(None)`.
pub fn load_state<T, F>(
    storage: &ThrottledStorage,
    key: &str,
    version: u32,
    migrate: F,
) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    F: FnOnce(Value, u32) -> Value,
{
    let Some(raw) = storage.get_item(key) else {
        return Ok(None);
    };

    let envelope: EnvelopeIn = serde_json::from_str(&raw)?;
    let state = if envelope.version < version {
        debug!(key, from = envelope.version, to = version, "migrating persisted state");
        migrate(envelope.state, envelope.version)
    } else {
        envelope.state
    };

    Ok(Some(serde_json::from_value(state)?))
}

/// Migration for unversioned stores: nothing to upgrade.
pub fn no_migration(state: Value, _from: u32) -> Value {
    state
}
