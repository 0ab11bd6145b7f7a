use tracing::{debug, trace};

use crate::{
    timeline_for, timeline_length, track_length, Chapter, RegionId, Seconds, Timeline,
    TimelineElement, TimelineTrack, TrackId,
};

/// Flattens a chapter and its whole subtree into a single timeline with one
/// track per region, children played one after the other and every track
/// padded so that all of them end together.
///
/// Tracks the chapter authored itself take precedence over whatever its
/// descendants place on the same region. The result keeps the chapter's
/// timeline id, or an empty id if the chapter has no timeline.
pub fn merge_timelines(chapter: &Chapter, timelines: &[Timeline]) -> Timeline {
    let own = timeline_for(timelines, &chapter.id)
        .cloned()
        .unwrap_or_default();

    if chapter.is_leaf() {
        return own;
    }

    debug!(
        chapter = %chapter.id,
        children = chapter.children.len(),
        "merging descendant timelines"
    );

    let mut merged = Timeline {
        id: own.id.clone(),
        chapter_id: own.chapter_id.clone(),
        tracks: own
            .tracks
            .iter()
            .map(|t| TimelineTrack {
                elements: Vec::new(),
                ..t.clone()
            })
            .collect(),
    };

    for region_id in descendant_regions(chapter, timelines) {
        if !merged.has_region(&region_id) {
            merged.tracks.push(TimelineTrack {
                id: TrackId::default(),
                region_id,
                locked: true,
                elements: Vec::new(),
            });
        }
    }

    for child in &chapter.children {
        let child_timeline = merge_timelines(child, timelines);
        let child_length = timeline_length(Some(&child_timeline));
        trace!(child = %child.id, length = child_length, "folding child timeline");

        for track in merged.tracks.iter_mut() {
            let child_track = child_timeline.track_for_region(&track.region_id);
            append_child_track(track, child_track, child_length);
        }
    }

    let folded_length = timeline_length(Some(&merged));

    for track in merged.tracks.iter_mut() {
        if let Some(authored) = own.track_for_region(&track.region_id) {
            *track = authored.clone();
        }
    }

    let total = folded_length.max(timeline_length(Some(&merged)));
    for track in merged.tracks.iter_mut() {
        let shortfall = total - track_length(track);
        push_gap(track, shortfall);
    }

    merged
}

/// Regions used by any descendant's timeline, in order of first appearance.
/// Timeline commands keep at most one timeline per chapter, so the first one found is the only one.
fn descendant_regions(chapter: &Chapter, timelines: &[Timeline]) -> Vec<RegionId> {
    let mut regions: Vec<RegionId> = Vec::new();
    for descendant in chapter.descendants() {
        let Some(timeline) = timeline_for(timelines, &descendant.id) else {
            continue;
        };
        for track in &timeline.tracks {
            if !regions.contains(&track.region_id) {
                regions.push(track.region_id.clone());
            }
        }
    }
    regions
}

fn append_child_track(
    track: &mut TimelineTrack,
    child_track: Option<&TimelineTrack>,
    child_length: Seconds,
) {
    let Some(child_track) = child_track else {
        push_gap(track, child_length);
        return;
    };
    let Some(first) = child_track.elements.first() else {
        push_gap(track, child_length);
        return;
    };

    let length = track_length(child_track);
    if length == 0.0 {
        // open-ended content fills the whole child
        track.elements.push(TimelineElement {
            id: first.id.clone(),
            component_id: first.component_id.clone(),
            offset: 0.0,
            duration: child_length,
            preview_url: first.preview_url.clone(),
        });
        return;
    }

    track.elements.extend(child_track.elements.iter().cloned());
    push_gap(track, child_length - length);
}

fn push_gap(track: &mut TimelineTrack, gap: Seconds) {
    if gap > 0.0 {
        track.elements.push(TimelineElement::padding(gap));
    }
}
