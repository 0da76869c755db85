//! Track model, the library store and local folder scanning.

mod model;
mod scan;
mod store;

pub use model::Track;
pub(crate) use model::dedup_tags;
pub use scan::scan;
pub use store::{TrackStore, TrackStoreState};

#[cfg(test)]
mod tests;
