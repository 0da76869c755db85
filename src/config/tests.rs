use super::load::{default_config_path, default_state_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_tagtune_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TAGTUNE_CONFIG_PATH", "/tmp/tagtune-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/tagtune-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("tagtune")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("tagtune")
            .join("config.toml")
    );
}

#[test]
fn default_state_dir_falls_back_to_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_DATA_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_state_dir().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/tagtune")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[storage]
dir = "/tmp/tagtune-state"
flush_delay_ms = 250

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false

[catalog]
search_limit = 5
popular_limit = 7

[tags]
seed_tag = "Favourite"

[history]
max_entries = 12
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TAGTUNE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("TAGTUNE__STORAGE__FLUSH_DELAY_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.storage.dir, Some(std::path::PathBuf::from("/tmp/tagtune-state")));
    assert_eq!(s.storage.flush_delay_ms, 250);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.catalog.search_limit, 5);
    assert_eq!(s.catalog.popular_limit, 7);
    assert_eq!(s.tags.seed_tag, "Favourite");
    assert_eq!(s.history.max_entries, 12);
    assert_eq!(s.state_dir(), Some(std::path::PathBuf::from("/tmp/tagtune-state")));
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[storage]
flush_delay_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TAGTUNE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("TAGTUNE__STORAGE__FLUSH_DELAY_MS", "40");

    let s = Settings::load().unwrap();
    assert_eq!(s.storage.flush_delay_ms, 40);
}

#[test]
fn validate_rejects_zero_flush_delay_and_blank_seed_tag() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.storage.flush_delay_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.tags.seed_tag = "   ".into();
    assert!(s.validate().is_err());
}
