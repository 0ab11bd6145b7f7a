use crate::{
    chapter_by_path, timeline_for, AccessPath, Chapter, Seconds, Timeline, TimelineError,
    TimelineTrack,
};

/// Sum of offsets and durations of all elements on the track.
pub fn track_length(track: &TimelineTrack) -> Seconds {
    track.elements.iter().map(|e| e.span()).sum()
}

/// Length of the longest track; 0 for a missing timeline or one without tracks.
pub fn timeline_length(timeline: Option<&Timeline>) -> Seconds {
    timeline
        .map(|t| t.tracks.iter().map(track_length).fold(0.0, Seconds::max))
        .unwrap_or(0.0)
}

/// Duration of a chapter: its own timeline's length, or the sequential sum of
/// its children's durations if that is longer.
pub fn chapter_duration(chapter: &Chapter, timelines: &[Timeline]) -> Seconds {
    let own = timeline_length(timeline_for(timelines, &chapter.id));
    let children: Seconds = chapter
        .children
        .iter()
        .map(|c| chapter_duration(c, timelines))
        .sum();
    own.max(children)
}

/// Time the branch ending at `path` must occupy: the addressed chapter's
/// duration, or any ancestor's own authored timeline if that is longer.
pub fn branch_duration(
    chapters: &[Chapter],
    timelines: &[Timeline],
    path: &AccessPath,
) -> Result<Seconds, TimelineError> {
    if path.is_empty() {
        return Ok(0.0);
    }

    let chapter = chapter_by_path(chapters, path)?;
    let mut longest = chapter_duration(chapter, timelines);
    for ancestor_path in path.ancestors() {
        let ancestor = chapter_by_path(chapters, &ancestor_path)?;
        longest = longest.max(timeline_length(timeline_for(timelines, &ancestor.id)));
    }
    Ok(longest)
}
