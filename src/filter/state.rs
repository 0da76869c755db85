use serde::{Deserialize, Serialize};

use crate::library::{Track, dedup_tags};

use super::algebra::{TagOperation, filter_tracks_by_tag_blocks, filter_tracks_by_tags};

/// The tags the user currently filters the working set by.
///
/// Either a flat selection combined with `tag_operation`, or a list of
/// AND-blocks that are OR-ed together. Blocks win when any exist.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub selected_tags: Vec<String>,
    pub tag_blocks: Vec<Vec<String>>,
    pub tag_operation: TagOperation,
}

fn rename_in(tags: &mut Vec<String>, old_tag: &str, new_tag: &str) -> bool {
    if !tags.iter().any(|t| t == old_tag) {
        return false;
    }
    let renamed: Vec<String> = tags
        .iter()
        .map(|t| if t == old_tag { new_tag.to_string() } else { t.clone() })
        .collect();
    *tags = dedup_tags(&renamed);
    true
}

impl FilterState {
    pub fn set_selected_tags(&mut self, tags: Vec<String>) {
        self.selected_tags = dedup_tags(&tags);
    }

    /// Select `tag` if it is not selected, deselect it otherwise.
    pub fn toggle_tag(&mut self, tag: &str) {
        if self.selected_tags.iter().any(|t| t == tag) {
            self.selected_tags.retain(|t| t != tag);
        } else {
            self.selected_tags.push(tag.to_string());
        }
    }

    pub fn add_tag_block(&mut self, initial_tags: Vec<String>) {
        self.tag_blocks.push(dedup_tags(&initial_tags));
    }

    pub fn add_tag_to_block(&mut self, block_index: usize, tag: &str) -> bool {
        match self.tag_blocks.get_mut(block_index) {
            Some(block) if !block.iter().any(|t| t == tag) => {
                block.push(tag.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn remove_tag_from_block(&mut self, block_index: usize, tag: &str) -> bool {
        let Some(block) = self.tag_blocks.get_mut(block_index) else {
            return false;
        };
        let before = block.len();
        block.retain(|t| t != tag);
        block.len() != before
    }

    pub fn delete_tag_block(&mut self, block_index: usize) -> bool {
        if block_index >= self.tag_blocks.len() {
            return false;
        }
        self.tag_blocks.remove(block_index);
        true
    }

    pub fn set_tag_operation(&mut self, operation: TagOperation) {
        self.tag_operation = operation;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Follow a vocabulary rename in the selection and in every block.
    pub fn rename_tag(&mut self, old_tag: &str, new_tag: &str) -> bool {
        let mut changed = rename_in(&mut self.selected_tags, old_tag, new_tag);
        for block in self.tag_blocks.iter_mut() {
            changed |= rename_in(block, old_tag, new_tag);
        }
        changed
    }

    /// Forget a deleted tag. Blocks it leaves empty are kept for further editing.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.selected_tags.len() + self.tag_blocks.iter().map(Vec::len).sum::<usize>();
        self.selected_tags.retain(|t| t != tag);
        for block in self.tag_blocks.iter_mut() {
            block.retain(|t| t != tag);
        }
        let after = self.selected_tags.len() + self.tag_blocks.iter().map(Vec::len).sum::<usize>();
        before != after
    }

    /// Whether applying the filter could drop any track.
    pub fn is_active(&self) -> bool {
        !self.selected_tags.is_empty() || self.tag_blocks.iter().any(|b| !b.is_empty())
    }

    /// Run the current selection over `tracks`.
    pub fn apply<'a, I>(&self, tracks: I) -> Vec<&'a Track>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        if !self.tag_blocks.is_empty() {
            return filter_tracks_by_tag_blocks(tracks, &self.tag_blocks);
        }
        filter_tracks_by_tags(tracks, &self.selected_tags, self.tag_operation)
    }
}
