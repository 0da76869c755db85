use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::app::App;
use crate::catalog::LocalCatalog;
use crate::config::Settings;
use crate::storage::{FileStore, MemoryStore, ThrottledStorage};

mod commands;
mod settings;

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Open the on-disk store, or keep state in memory for this run only.
fn open_storage(settings: &Settings) -> ThrottledStorage {
    let delay = Duration::from_millis(settings.storage.flush_delay_ms);

    match settings.state_dir() {
        Some(dir) => match FileStore::open(dir.clone()) {
            Ok(store) => {
                info!(dir = %dir.display(), "using state directory");
                return ThrottledStorage::new(store, delay);
            }
            Err(e) => warn!(dir = %dir.display(), error = %e, "cannot open state directory"),
        },
        None => warn!("no state directory available"),
    }

    warn!("state will not outlive this run");
    ThrottledStorage::new(MemoryStore::new(), delay)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    configure_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match commands::parse(&args) {
        Ok(inv) => inv,
        Err(msg) => {
            eprintln!("tagtune: {msg}");
            eprintln!("{}", commands::USAGE);
            std::process::exit(2);
        }
    };

    let settings = settings::load_settings();
    let music_dir = PathBuf::from(&invocation.music_dir);
    let catalog = LocalCatalog::open(&music_dir, &settings.library)?;
    if catalog.is_empty() {
        warn!(root = %catalog.root().display(), "no audio files found");
    } else {
        info!(root = %catalog.root().display(), tracks = catalog.len(), "scanned music folder");
    }

    let storage = open_storage(&settings);
    let mut app = App::load(settings, storage);

    let mut stdout = std::io::stdout().lock();
    let result = commands::execute(&mut app, &catalog, &invocation.command, &mut stdout);

    app.shutdown();
    result?;
    Ok(())
}
