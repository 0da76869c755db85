use serde::{Deserialize, Serialize};

/// Tags pinned for quick access. Persisted as `{"activeTags": [..]}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagState {
    pub active_tags: Vec<String>,
}

impl TagState {
    pub fn add_active_tag(&mut self, tag: &str) -> bool {
        if self.active_tags.iter().any(|t| t == tag) {
            return false;
        }
        self.active_tags.push(tag.to_string());
        true
    }

    pub fn remove_active_tag(&mut self, tag: &str) -> bool {
        let before = self.active_tags.len();
        self.active_tags.retain(|t| t != tag);
        self.active_tags.len() != before
    }

    pub fn clear_active_tags(&mut self) {
        self.active_tags.clear();
    }

    pub fn is_active(&self, tag: &str) -> bool {
        self.active_tags.iter().any(|t| t == tag)
    }

    /// Follow a vocabulary rename. A rename onto an already pinned tag keeps
    /// a single entry.
    pub fn rename_tag(&mut self, old_tag: &str, new_tag: &str) -> bool {
        if !self.is_active(old_tag) {
            return false;
        }
        if self.is_active(new_tag) {
            self.active_tags.retain(|t| t != old_tag);
        } else {
            for t in self.active_tags.iter_mut() {
                if *t == old_tag {
                    *t = new_tag.to_string();
                }
            }
        }
        true
    }
}
