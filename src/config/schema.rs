use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tagtune/config.toml` or `~/.config/tagtune/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TAGTUNE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub library: LibrarySettings,
    pub catalog: CatalogSettings,
    pub tags: TagSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one JSON file per persisted store.
    /// Defaults to `$XDG_DATA_HOME/tagtune` or `~/.local/share/tagtune`.
    pub dir: Option<PathBuf>,
    /// How long writes are coalesced before they hit the disk (milliseconds).
    pub flush_delay_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: None,
            flush_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Maximum number of tracks returned by a search.
    pub search_limit: usize,
    /// Maximum number of tracks returned when loading popular tracks.
    pub popular_limit: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            search_limit: 20,
            popular_limit: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TagSettings {
    /// The vocabulary entry every fresh library starts with.
    pub seed_tag: String,
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            seed_tag: "Like".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Oldest entries are dropped past this many.
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_entries: 500 }
    }
}
