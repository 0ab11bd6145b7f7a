use serde::{Deserialize, Serialize};

use crate::{chapter_by_path, chapter_duration, AccessPath, Chapter, ChapterId, Seconds, Timeline, TimelineError};

/// How far into an ancestor's timeline a nested chapter begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AncestorOffset {
    pub access_path: AccessPath,
    /// `None` for the terminating entry above the root level.
    pub chapter_id: Option<ChapterId>,
    pub offset: Seconds,
}

impl AncestorOffset {
    pub fn root() -> Self {
        Self {
            access_path: AccessPath::default(),
            chapter_id: None,
            offset: 0.0,
        }
    }
}

/// Offsets of the chapter at `path` within each of its ancestors, nearest
/// parent first, always terminated by [`AncestorOffset::root`].
pub fn ancestor_offsets(
    chapters: &[Chapter],
    timelines: &[Timeline],
    path: &AccessPath,
) -> Result<Vec<AncestorOffset>, TimelineError> {
    // only parents are resolved in the loop
    if !path.is_empty() {
        chapter_by_path(chapters, path)?;
    }

    let mut offsets = Vec::with_capacity(path.len());
    let mut current = path.clone();
    let mut carried = 0.0;

    while current.len() > 1 {
        let index = current.last().unwrap_or_default();
        let parent_path = current.parent().unwrap_or_default();
        let parent = chapter_by_path(chapters, &parent_path)?;

        let preceding: Seconds = parent.children[..index]
            .iter()
            .map(|c| chapter_duration(c, timelines))
            .sum();
        carried += preceding;

        offsets.push(AncestorOffset {
            access_path: parent_path.clone(),
            chapter_id: Some(parent.id.clone()),
            offset: carried,
        });
        current = parent_path;
    }

    offsets.push(AncestorOffset::root());
    Ok(offsets)
}
