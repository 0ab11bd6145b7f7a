//! Cutting tracks down to a time window, used to show the part of an
//! ancestor's authored track that plays alongside a nested chapter.

use crate::{track_length, Seconds, TimelineTrack};

/// Keeps what plays before `end`, shortening the element that straddles it.
pub fn trim_back(track: &TimelineTrack, end: Seconds) -> TimelineTrack {
    let mut elements = Vec::with_capacity(track.elements.len());
    let mut elapsed = 0.0;

    for element in &track.elements {
        if elapsed + element.span() > end {
            let remaining = end - elapsed;
            if remaining > 0.0 && remaining >= element.offset {
                let mut cut = element.clone();
                cut.duration = remaining - element.offset;
                elements.push(cut);
            }
            break;
        }
        elapsed += element.span();
        elements.push(element.clone());
    }

    TimelineTrack {
        elements,
        ..track.clone()
    }
}

/// Drops what plays before `start`, eating into the first remaining element's
/// offset first and its duration second.
pub fn trim_front(track: &TimelineTrack, start: Seconds) -> TimelineTrack {
    let mut elapsed = 0.0;
    let first_kept = track.elements.iter().position(|e| {
        if elapsed + e.span() > start {
            true
        } else {
            elapsed += e.span();
            false
        }
    });

    let Some(index) = first_kept else {
        return TimelineTrack {
            elements: Vec::new(),
            ..track.clone()
        };
    };

    let mut elements = track.elements[index..].to_vec();
    let remaining = start - elapsed;
    if remaining > 0.0 {
        let first = &mut elements[0];
        first.offset -= remaining;
        if first.offset < 0.0 {
            first.duration += first.offset;
            first.offset = 0.0;
        }
    }

    TimelineTrack {
        elements,
        ..track.clone()
    }
}

/// Window `[start, end]` of the track. Tracks made only of open-ended
/// (zero-length) elements and inverted windows are returned unchanged.
pub fn trim_track(track: &TimelineTrack, start: Seconds, end: Seconds) -> TimelineTrack {
    let window = end - start;
    if window < 0.0 {
        return track.clone();
    }
    if !track.elements.is_empty() && track_length(track) == 0.0 {
        return track.clone();
    }
    trim_back(&trim_front(track, start), window)
}
