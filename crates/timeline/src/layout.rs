use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    access_path_of, ancestor_offsets, chapter_by_path, chapter_duration, merge_timelines,
    trim_track, Chapter, ChapterId, RegionId, Seconds, Timeline, TimelineError, TimelineTrack,
};

/// One row of the timeline editor: a layout region and the track shown on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionTrack {
    pub region_id: RegionId,
    pub track: Option<TimelineTrack>,
}

/// Tracks visible while editing one chapter, per region of the layout.
///
/// Ancestors' tracks are cut to the window the chapter occupies within them
/// and locked; only the chapter's own tracks stay editable. Descendant content
/// shows up through the chapter's merged timeline.
pub fn branch_track_layout(
    chapters: &[Chapter],
    timelines: &[Timeline],
    chapter_id: &ChapterId,
    regions: &[RegionId],
) -> Result<Vec<RegionTrack>, TimelineError> {
    let path = access_path_of(chapters, chapter_id);
    if path.is_empty() {
        return Err(TimelineError::ChapterNotFound(chapter_id.clone()));
    }

    let chapter = chapter_by_path(chapters, &path)?;
    let duration = chapter_duration(chapter, timelines);

    let mut branch_ids = Vec::with_capacity(path.len());
    for ancestor_path in path.ancestors() {
        branch_ids.push(chapter_by_path(chapters, &ancestor_path)?.id.clone());
    }
    branch_ids.push(chapter.id.clone());

    let offsets: HashMap<ChapterId, Seconds> = ancestor_offsets(chapters, timelines, &path)?
        .into_iter()
        .filter_map(|entry| entry.chapter_id.map(|id| (id, entry.offset)))
        .collect();

    let mut active: Vec<TimelineTrack> = Vec::new();
    for timeline in timelines
        .iter()
        .filter(|t| branch_ids.contains(&t.chapter_id))
    {
        let editable = &timeline.chapter_id == chapter_id;
        let offset = offsets.get(&timeline.chapter_id).copied().unwrap_or(0.0);
        for track in &timeline.tracks {
            let mut track = if offset != 0.0 {
                trim_track(track, offset, offset + duration)
            } else {
                track.clone()
            };
            track.locked = !editable;
            active.push(track);
        }
    }
    active.extend(merge_timelines(chapter, timelines).tracks);

    Ok(regions
        .iter()
        .map(|region_id| RegionTrack {
            region_id: region_id.clone(),
            track: active.iter().find(|t| &t.region_id == region_id).cloned(),
        })
        .collect())
}
