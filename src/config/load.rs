use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `TAGTUNE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TAGTUNE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.flush_delay_ms == 0 {
            return Err("storage.flush_delay_ms must be >= 1".to_string());
        }
        if self.history.max_entries == 0 {
            return Err("history.max_entries must be >= 1".to_string());
        }
        if self.tags.seed_tag.trim().is_empty() {
            return Err("tags.seed_tag must not be empty".to_string());
        }
        if self.catalog.search_limit == 0 || self.catalog.popular_limit == 0 {
            return Err("catalog limits must be >= 1".to_string());
        }
        Ok(())
    }

    /// Directory the persisted stores live in.
    pub fn state_dir(&self) -> Option<PathBuf> {
        self.storage.dir.clone().or_else(default_state_dir)
    }
}

/// Resolve the config path from `TAGTUNE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TAGTUNE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tagtune/config.toml`
/// or `~/.config/tagtune/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tagtune").join("config.toml"))
}

/// `$XDG_DATA_HOME/tagtune`, or `~/.local/share/tagtune`.
pub fn default_state_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("tagtune"))
}
