//! Set algebra over a track's custom tags.
//!
//! All filters are stable: they keep the input order and never reorder or
//! de-duplicate tracks. Matching is exact and case-sensitive.

use serde::{Deserialize, Serialize};

use crate::library::Track;

/// How a flat list of tags is combined.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOperation {
    /// At least one tag present.
    #[default]
    Union,
    /// Every tag present.
    Intersection,
    /// OR across AND-blocks. On a flat list this behaves like `Union`.
    UnionOfIntersections,
}

impl TagOperation {
    /// Pick the operation that describes a block list: several blocks are a
    /// union of intersections, one multi-tag block an intersection, one
    /// single-tag block a plain union.
    pub fn for_blocks<B: AsRef<[String]>>(blocks: &[B]) -> Self {
        match blocks {
            [single] if single.as_ref().len() > 1 => Self::Intersection,
            [_] | [] => Self::Union,
            _ => Self::UnionOfIntersections,
        }
    }
}

fn contains_all<S: AsRef<str>>(track: &Track, tags: &[S]) -> bool {
    tags.iter().all(|tag| track.has_custom_tag(tag.as_ref()))
}

fn contains_any<S: AsRef<str>>(track: &Track, tags: &[S]) -> bool {
    tags.iter().any(|tag| track.has_custom_tag(tag.as_ref()))
}

/// Filter `tracks` by a flat tag list. An empty list filters nothing.
pub fn filter_tracks_by_tags<'a, I, S>(tracks: I, tags: &[S], operation: TagOperation) -> Vec<&'a Track>
where
    I: IntoIterator<Item = &'a Track>,
    S: AsRef<str>,
{
    if tags.is_empty() {
        return tracks.into_iter().collect();
    }

    tracks
        .into_iter()
        .filter(|track| match operation {
            TagOperation::Intersection => contains_all(track, tags),
            TagOperation::Union | TagOperation::UnionOfIntersections => contains_any(track, tags),
        })
        .collect()
}

/// The blocks that still constrain something.
pub fn non_empty_blocks<B, S>(blocks: &[B]) -> Vec<&[S]>
where
    B: AsRef<[S]>,
{
    blocks
        .iter()
        .map(AsRef::as_ref)
        .filter(|b| !b.is_empty())
        .collect()
}

/// Keep tracks that carry every tag of at least one block.
///
/// Empty blocks are ignored; if none remain nothing is filtered.
pub fn filter_tracks_by_tag_blocks<'a, I, B, S>(tracks: I, blocks: &[B]) -> Vec<&'a Track>
where
    I: IntoIterator<Item = &'a Track>,
    B: AsRef<[S]>,
    S: AsRef<str>,
{
    let blocks = non_empty_blocks::<B, S>(blocks);
    if blocks.is_empty() {
        return tracks.into_iter().collect();
    }

    tracks
        .into_iter()
        .filter(|track| blocks.iter().any(|block| contains_all(track, block)))
        .collect()
}
