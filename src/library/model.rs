use serde::{Deserialize, Serialize};

/// A single catalog entry plus the tags the user attached to it.
///
/// `tags` comes from the catalog and is never edited locally. `custom_tags`
/// belongs to the user and has set semantics even though it is kept as a list
/// to preserve insertion order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    /// Length in seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Track {
    pub fn has_custom_tag(&self, tag: &str) -> bool {
        self.custom_tags.iter().any(|t| t == tag)
    }

    /// `"Artist - Name"`, or just the name when the artist is blank.
    pub fn display(&self) -> String {
        match self.artist.trim() {
            "" => self.name.clone(),
            a => format!("{} - {}", a, self.name),
        }
    }
}

/// Drop repeated tags, keeping the first occurrence.
pub(crate) fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for t in tags {
        if !out.contains(t) {
            out.push(t.clone());
        }
    }
    out
}
