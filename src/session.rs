//! Small per-session stores: player preferences, play history, the search box,
//! pinned tags and the theme.

mod history;
mod player;
mod search;
mod tags;
mod theme;

pub use history::{HistoryEntry, HistoryStore};
pub use player::{PlayerState, TrackEnd};
pub use search::SearchState;
pub use tags::TagState;
pub use theme::{ThemeMode, ThemeState};
