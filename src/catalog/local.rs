use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::LibrarySettings;
use crate::library::{Track, scan};

use super::{Catalog, CatalogError};

/// A catalog backed by a music folder, scanned once on open.
pub struct LocalCatalog {
    root: PathBuf,
    tracks: Vec<Track>,
}

impl LocalCatalog {
    pub fn open(root: &Path, settings: &LibrarySettings) -> Result<Self, CatalogError> {
        let missing = || CatalogError::MissingRoot(root.display().to_string());
        let meta = match fs::metadata(root) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(missing()),
            Err(e) => return Err(e.into()),
        };
        if !meta.is_dir() {
            return Err(missing());
        }
        Ok(Self::from_tracks(root.to_path_buf(), scan(root, settings)))
    }

    pub fn from_tracks(root: PathBuf, tracks: Vec<Track>) -> Self {
        Self { root, tracks }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn matches_query(track: &Track, query_lower: &str) -> bool {
    track.name.to_lowercase().contains(query_lower)
        || track.artist.to_lowercase().contains(query_lower)
        || track
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query_lower))
}

impl Catalog for LocalCatalog {
    fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let query_lower = query.trim().to_lowercase();
        Ok(self
            .tracks
            .iter()
            .filter(|t| matches_query(t, &query_lower))
            .take(limit)
            .cloned()
            .collect())
    }

    fn popular_tracks(&self, limit: usize) -> Result<Vec<Track>, CatalogError> {
        Ok(self.tracks.iter().take(limit).cloned().collect())
    }
}
