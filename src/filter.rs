//! Tag filtering: the pure set algebra and the transient filter selection.

mod algebra;
mod state;

pub use algebra::{TagOperation, filter_tracks_by_tag_blocks, filter_tracks_by_tags, non_empty_blocks};
pub use state::FilterState;
