//! The track catalog the library is filled from.
//!
//! Catalog failures never reach the stores: [`fetch_or_empty`] logs them and
//! hands back an empty result.

mod local;

use thiserror::Error;
use tracing::warn;

use crate::library::Track;

pub use local::LocalCatalog;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog root not found: {0}")]
    MissingRoot(String),
}

pub trait Catalog {
    fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError>;
    fn popular_tracks(&self, limit: usize) -> Result<Vec<Track>, CatalogError>;
}

/// Unwrap a catalog result, logging failures as an empty list.
pub fn fetch_or_empty(what: &str, result: Result<Vec<Track>, CatalogError>) -> Vec<Track> {
    match result {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!(error = %e, "{what} failed, treating as empty result");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_or_empty_swallows_errors() {
        let failed = Err(CatalogError::MissingRoot("/nowhere".into()));
        assert!(fetch_or_empty("search", failed).is_empty());

        let ok = Ok(vec![Track::default()]);
        assert_eq!(fetch_or_empty("search", ok).len(), 1);
    }
}
