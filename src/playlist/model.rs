use serde::{Deserialize, Serialize};

use crate::filter::TagOperation;

fn default_true() -> bool {
    true
}

/// A saved filter.
///
/// A playlist carrying `track_ids` is a frozen snapshot: its membership was
/// fixed when it was created and tag edits no longer affect it, even when the
/// snapshot is empty. Without `track_ids` (playlists migrated from older
/// schemas) it is a live query over `tag_blocks` (or `tags` + `operation`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_favorite: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub operation: TagOperation,
    /// Every tag of every block, flattened.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_blocks: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_ids: Option<Vec<String>>,
}

/// How a playlist's tracks are determined, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Membership<'a> {
    Snapshot(&'a [String]),
    Blocks(&'a [Vec<String>]),
    Tags(&'a [String], TagOperation),
    All,
}

impl Playlist {
    pub fn membership(&self) -> Membership<'_> {
        if let Some(ids) = self.track_ids.as_deref() {
            return Membership::Snapshot(ids);
        }
        if let Some(blocks) = self.tag_blocks.as_deref().filter(|b| !b.is_empty()) {
            return Membership::Blocks(blocks);
        }
        if !self.tags.is_empty() {
            return Membership::Tags(&self.tags, self.operation);
        }
        Membership::All
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self.membership(), Membership::Snapshot(_))
    }
}
