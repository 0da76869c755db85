use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub track_id: String,
    /// Milliseconds since the Unix epoch.
    pub played_at: i64,
    /// Seconds into the track when the entry was recorded.
    pub position: f64,
}

/// Most recent first, capped.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryStore {
    pub history: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn add_history_entry(&mut self, entry: HistoryEntry, max_entries: usize) {
        self.history.insert(0, entry);
        self.history.truncate(max_entries);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
