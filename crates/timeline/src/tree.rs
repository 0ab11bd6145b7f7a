use crate::{AccessPath, Chapter, ChapterId, Identified, TimelineError};

/// First item carrying the given id, with its position.
pub fn find_by_id<'a, T: Identified>(items: &'a [T], id: &T::Id) -> Option<(usize, &'a T)> {
    items.iter().enumerate().find(|(_, item)| item.id() == id)
}

/// Number of levels below (and including) the given level.
pub fn tree_height(chapters: &[Chapter]) -> usize {
    chapters
        .iter()
        .map(|c| 1 + tree_height(&c.children))
        .max()
        .unwrap_or(0)
}

pub fn count_leaf_nodes(chapter: &Chapter) -> usize {
    if chapter.is_leaf() {
        return 1;
    }
    chapter.children.iter().map(count_leaf_nodes).sum()
}

pub fn leaf_nodes(chapter: &Chapter) -> Vec<&Chapter> {
    if chapter.is_leaf() {
        return vec![chapter];
    }
    chapter.children.iter().flat_map(leaf_nodes).collect()
}

/// Flattened pre-order of a level: each chapter followed by its descendants.
pub fn descendant_chapters(chapters: &[Chapter]) -> Vec<&Chapter> {
    let mut out = Vec::new();
    collect_descendants(chapters, &mut out);
    out
}

fn collect_descendants<'a>(chapters: &'a [Chapter], out: &mut Vec<&'a Chapter>) {
    for chapter in chapters {
        out.push(chapter);
        collect_descendants(&chapter.children, out);
    }
}

impl Chapter {
    /// All chapters below this one, in playback order.
    pub fn descendants(&self) -> Vec<&Chapter> {
        descendant_chapters(&self.children)
    }
}

/// Path to the chapter with the given id, or an empty path when absent.
pub fn access_path_of(chapters: &[Chapter], chapter_id: &ChapterId) -> AccessPath {
    fn search(chapters: &[Chapter], chapter_id: &ChapterId, prefix: &mut Vec<usize>) -> bool {
        for (i, chapter) in chapters.iter().enumerate() {
            prefix.push(i);
            if &chapter.id == chapter_id || search(&chapter.children, chapter_id, prefix) {
                return true;
            }
            prefix.pop();
        }
        false
    }

    let mut prefix = Vec::new();
    if search(chapters, chapter_id, &mut prefix) {
        AccessPath(prefix)
    } else {
        AccessPath::default()
    }
}

pub fn chapter_by_path<'a>(
    chapters: &'a [Chapter],
    path: &AccessPath,
) -> Result<&'a Chapter, TimelineError> {
    let invalid = || TimelineError::InvalidPath(path.clone());
    let (first, rest) = path.as_slice().split_first().ok_or_else(invalid)?;
    let mut chapter = chapters.get(*first).ok_or_else(invalid)?;
    for &index in rest {
        chapter = chapter.children.get(index).ok_or_else(invalid)?;
    }
    Ok(chapter)
}

pub(crate) fn chapter_by_path_mut<'a>(
    chapters: &'a mut [Chapter],
    path: &AccessPath,
) -> Result<&'a mut Chapter, TimelineError> {
    let invalid = || TimelineError::InvalidPath(path.clone());
    let (first, rest) = path.as_slice().split_first().ok_or_else(invalid)?;
    let mut chapter = chapters.get_mut(*first).ok_or_else(invalid)?;
    for &index in rest {
        chapter = chapter.children.get_mut(index).ok_or_else(invalid)?;
    }
    Ok(chapter)
}

/// Sibling list holding the addressed position; the root level for paths of length 1.
pub(crate) fn level_mut<'a>(
    chapters: &'a mut Vec<Chapter>,
    path: &AccessPath,
) -> Result<&'a mut Vec<Chapter>, TimelineError> {
    match path.parent() {
        None => Err(TimelineError::InvalidPath(path.clone())),
        Some(parent) if parent.is_empty() => Ok(chapters),
        Some(parent) => Ok(&mut chapter_by_path_mut(chapters, &parent)
            .map_err(|_| TimelineError::InvalidPath(path.clone()))?
            .children),
    }
}
