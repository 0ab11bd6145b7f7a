use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::{chapter_by_path_mut, level_mut};
use crate::{
    chapter_by_path, find_by_id, AccessPath, Chapter, ChapterId, ElementId, Seconds, Timeline,
    TimelineElement, TimelineError, TimelineId, TimelineTrack, TrackId,
};

/// An edit that can be applied to a working copy and yields its own inverse.
pub trait EditCommand: Sized {
    type Target: ?Sized;

    fn apply(self, target: &mut Self::Target) -> Result<Self, TimelineError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ChapterCommand {
    InsertChapter {
        access_path: AccessPath,
        chapter: Chapter,
    },
    DetachChapter {
        access_path: AccessPath,
    },
    /// Removes a chapter, its children take its place.
    RemoveChapter {
        access_path: AccessPath,
    },
    /// Inserts a childless chapter adopting `count` siblings from its position on.
    WrapChapters {
        access_path: AccessPath,
        count: usize,
        chapter: Chapter,
    },
    RenameChapter {
        access_path: AccessPath,
        #[serde(default)]
        name: Option<String>,
    },
}

impl ChapterCommand {
    /// New chapter at the addressed position, pushing the current one back.
    pub fn add_before(access_path: AccessPath, id: Option<ChapterId>) -> Self {
        Self::InsertChapter {
            access_path,
            chapter: Chapter::new(id.unwrap_or_else(ChapterId::new)),
        }
    }

    /// New chapter right after the addressed one.
    pub fn add_after(
        chapters: &[Chapter],
        access_path: &AccessPath,
        id: Option<ChapterId>,
    ) -> Result<Self, TimelineError> {
        let invalid = || TimelineError::InvalidPath(access_path.clone());
        let index = access_path.last().ok_or_else(invalid)?;
        let level_len = match access_path.parent() {
            Some(parent) if !parent.is_empty() => chapter_by_path(chapters, &parent)
                .map_err(|_| invalid())?
                .children
                .len(),
            _ => chapters.len(),
        };

        let mut target = access_path.clone();
        if let Some(last) = target.0.last_mut() {
            *last = (index + 1).min(level_len);
        }
        Ok(Self::InsertChapter {
            access_path: target,
            chapter: Chapter::new(id.unwrap_or_else(ChapterId::new)),
        })
    }

    /// New chapter as the only child of the addressed one, adopting its children.
    pub fn add_child(
        chapters: &[Chapter],
        access_path: &AccessPath,
        id: Option<ChapterId>,
    ) -> Result<Self, TimelineError> {
        let parent = chapter_by_path(chapters, access_path)?;
        Ok(Self::WrapChapters {
            access_path: access_path.child(0),
            count: parent.children.len(),
            chapter: Chapter::new(id.unwrap_or_else(ChapterId::new)),
        })
    }
}

impl EditCommand for ChapterCommand {
    type Target = Vec<Chapter>;

    fn apply(self, chapters: &mut Vec<Chapter>) -> Result<Self, TimelineError> {
        apply_chapter_command(chapters, self)
    }
}

pub fn apply_chapter_command(
    chapters: &mut Vec<Chapter>,
    command: ChapterCommand,
) -> Result<ChapterCommand, TimelineError> {
    debug!(?command, "applying chapter command");
    match command {
        ChapterCommand::InsertChapter {
            access_path,
            chapter,
        } => insert_chapter(chapters, access_path, chapter),
        ChapterCommand::DetachChapter { access_path } => detach_chapter(chapters, access_path),
        ChapterCommand::RemoveChapter { access_path } => remove_chapter(chapters, access_path),
        ChapterCommand::WrapChapters {
            access_path,
            count,
            chapter,
        } => wrap_chapters(chapters, access_path, count, chapter),
        ChapterCommand::RenameChapter { access_path, name } => {
            rename_chapter(chapters, access_path, name)
        }
    }
}

fn insert_chapter(
    chapters: &mut Vec<Chapter>,
    access_path: AccessPath,
    chapter: Chapter,
) -> Result<ChapterCommand, TimelineError> {
    let level = level_mut(chapters, &access_path)?;
    let index = access_path.last().unwrap_or_default();
    if index > level.len() {
        return Err(TimelineError::InvalidPath(access_path));
    }
    level.insert(index, chapter);
    Ok(ChapterCommand::DetachChapter { access_path })
}

fn detach_chapter(
    chapters: &mut Vec<Chapter>,
    access_path: AccessPath,
) -> Result<ChapterCommand, TimelineError> {
    let level = level_mut(chapters, &access_path)?;
    let index = access_path.last().unwrap_or_default();
    if index >= level.len() {
        return Err(TimelineError::InvalidPath(access_path));
    }
    let chapter = level.remove(index);
    Ok(ChapterCommand::InsertChapter {
        access_path,
        chapter,
    })
}

fn remove_chapter(
    chapters: &mut Vec<Chapter>,
    access_path: AccessPath,
) -> Result<ChapterCommand, TimelineError> {
    let level = level_mut(chapters, &access_path)?;
    let index = access_path.last().unwrap_or_default();
    if index >= level.len() {
        return Err(TimelineError::InvalidPath(access_path));
    }

    let mut chapter = level.remove(index);
    let children = std::mem::take(&mut chapter.children);
    let count = children.len();
    level.splice(index..index, children);

    Ok(ChapterCommand::WrapChapters {
        access_path,
        count,
        chapter,
    })
}

fn wrap_chapters(
    chapters: &mut Vec<Chapter>,
    access_path: AccessPath,
    count: usize,
    mut chapter: Chapter,
) -> Result<ChapterCommand, TimelineError> {
    if !chapter.children.is_empty() {
        return Err(TimelineError::InvalidOp(format!(
            "wrapping chapter {} already has children",
            chapter.id
        )));
    }

    let level = level_mut(chapters, &access_path)?;
    let index = access_path.last().unwrap_or_default();
    let Some(end) = index.checked_add(count).filter(|end| *end <= level.len()) else {
        return Err(TimelineError::InvalidPath(access_path));
    };

    chapter.children = level.drain(index..end).collect();
    level.insert(index, chapter);
    Ok(ChapterCommand::RemoveChapter { access_path })
}

fn rename_chapter(
    chapters: &mut Vec<Chapter>,
    access_path: AccessPath,
    name: Option<String>,
) -> Result<ChapterCommand, TimelineError> {
    let chapter = chapter_by_path_mut(chapters, &access_path)?;
    let previous = std::mem::replace(&mut chapter.name, name);
    Ok(ChapterCommand::RenameChapter {
        access_path,
        name: previous,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TimelineCommand {
    AddTimeline {
        timeline: Timeline,
        #[serde(default)]
        position: Option<usize>,
    },
    RemoveTimeline {
        timeline_id: TimelineId,
    },
    AddTrack {
        timeline_id: TimelineId,
        track: TimelineTrack,
        #[serde(default)]
        position: Option<usize>,
    },
    RemoveTrack {
        timeline_id: TimelineId,
        track_id: TrackId,
    },
    ToggleTrackLock {
        timeline_id: TimelineId,
        track_id: TrackId,
    },
    InsertElement {
        timeline_id: TimelineId,
        track_id: TrackId,
        element: TimelineElement,
        #[serde(default)]
        position: Option<usize>,
    },
    RemoveElement {
        timeline_id: TimelineId,
        track_id: TrackId,
        element_id: ElementId,
    },
    SetElementOffset {
        timeline_id: TimelineId,
        track_id: TrackId,
        element_id: ElementId,
        offset: Seconds,
    },
    SetElementDuration {
        timeline_id: TimelineId,
        track_id: TrackId,
        element_id: ElementId,
        duration: Seconds,
    },
}

impl EditCommand for TimelineCommand {
    type Target = Vec<Timeline>;

    fn apply(self, timelines: &mut Vec<Timeline>) -> Result<Self, TimelineError> {
        apply_timeline_command(timelines, self)
    }
}

pub fn apply_timeline_command(
    timelines: &mut Vec<Timeline>,
    command: TimelineCommand,
) -> Result<TimelineCommand, TimelineError> {
    debug!(?command, "applying timeline command");
    match command {
        TimelineCommand::AddTimeline { timeline, position } => {
            add_timeline(timelines, timeline, position)
        }
        TimelineCommand::RemoveTimeline { timeline_id } => remove_timeline(timelines, timeline_id),
        TimelineCommand::AddTrack {
            timeline_id,
            track,
            position,
        } => add_track(timelines, timeline_id, track, position),
        TimelineCommand::RemoveTrack {
            timeline_id,
            track_id,
        } => remove_track(timelines, timeline_id, track_id),
        TimelineCommand::ToggleTrackLock {
            timeline_id,
            track_id,
        } => {
            let track = track_mut(timelines, &timeline_id, &track_id)?;
            track.locked = !track.locked;
            Ok(TimelineCommand::ToggleTrackLock {
                timeline_id,
                track_id,
            })
        }
        TimelineCommand::InsertElement {
            timeline_id,
            track_id,
            element,
            position,
        } => insert_element(timelines, timeline_id, track_id, element, position),
        TimelineCommand::RemoveElement {
            timeline_id,
            track_id,
            element_id,
        } => remove_element(timelines, timeline_id, track_id, element_id),
        TimelineCommand::SetElementOffset {
            timeline_id,
            track_id,
            element_id,
            offset,
        } => {
            ensure_non_negative("offset", offset)?;
            let element = element_mut(timelines, &timeline_id, &track_id, &element_id)?;
            let previous = std::mem::replace(&mut element.offset, offset);
            Ok(TimelineCommand::SetElementOffset {
                timeline_id,
                track_id,
                element_id,
                offset: previous,
            })
        }
        TimelineCommand::SetElementDuration {
            timeline_id,
            track_id,
            element_id,
            duration,
        } => {
            ensure_non_negative("duration", duration)?;
            let element = element_mut(timelines, &timeline_id, &track_id, &element_id)?;
            let previous = std::mem::replace(&mut element.duration, duration);
            Ok(TimelineCommand::SetElementDuration {
                timeline_id,
                track_id,
                element_id,
                duration: previous,
            })
        }
    }
}

fn add_timeline(
    timelines: &mut Vec<Timeline>,
    timeline: Timeline,
    position: Option<usize>,
) -> Result<TimelineCommand, TimelineError> {
    if timelines.iter().any(|t| t.chapter_id == timeline.chapter_id) {
        return Err(TimelineError::TimelineExists(timeline.chapter_id));
    }
    let index = checked_position(position, timelines.len())?;
    let timeline_id = timeline.id.clone();
    timelines.insert(index, timeline);
    Ok(TimelineCommand::RemoveTimeline { timeline_id })
}

fn remove_timeline(
    timelines: &mut Vec<Timeline>,
    timeline_id: TimelineId,
) -> Result<TimelineCommand, TimelineError> {
    let (index, _) =
        find_by_id(timelines, &timeline_id).ok_or(TimelineError::TimelineNotFound(timeline_id))?;
    let timeline = timelines.remove(index);
    Ok(TimelineCommand::AddTimeline {
        timeline,
        position: Some(index),
    })
}

fn add_track(
    timelines: &mut [Timeline],
    timeline_id: TimelineId,
    track: TimelineTrack,
    position: Option<usize>,
) -> Result<TimelineCommand, TimelineError> {
    let timeline = timeline_mut(timelines, &timeline_id)?;
    if find_by_id(&timeline.tracks, &track.id).is_some() {
        return Err(TimelineError::InvalidOp(format!(
            "track exists: {}",
            track.id
        )));
    }
    let index = checked_position(position, timeline.tracks.len())?;
    let track_id = track.id.clone();
    timeline.tracks.insert(index, track);
    Ok(TimelineCommand::RemoveTrack {
        timeline_id,
        track_id,
    })
}

fn remove_track(
    timelines: &mut [Timeline],
    timeline_id: TimelineId,
    track_id: TrackId,
) -> Result<TimelineCommand, TimelineError> {
    let timeline = timeline_mut(timelines, &timeline_id)?;
    let (index, _) =
        find_by_id(&timeline.tracks, &track_id).ok_or(TimelineError::TrackNotFound(track_id))?;
    let track = timeline.tracks.remove(index);
    Ok(TimelineCommand::AddTrack {
        timeline_id,
        track,
        position: Some(index),
    })
}

fn insert_element(
    timelines: &mut [Timeline],
    timeline_id: TimelineId,
    track_id: TrackId,
    element: TimelineElement,
    position: Option<usize>,
) -> Result<TimelineCommand, TimelineError> {
    ensure_non_negative("offset", element.offset)?;
    ensure_non_negative("duration", element.duration)?;

    let track = track_mut(timelines, &timeline_id, &track_id)?;
    let index = checked_position(position, track.elements.len())?;
    let element_id = element.id.clone();
    track.elements.insert(index, element);
    Ok(TimelineCommand::RemoveElement {
        timeline_id,
        track_id,
        element_id,
    })
}

fn remove_element(
    timelines: &mut [Timeline],
    timeline_id: TimelineId,
    track_id: TrackId,
    element_id: ElementId,
) -> Result<TimelineCommand, TimelineError> {
    let track = track_mut(timelines, &timeline_id, &track_id)?;
    let (index, _) = find_by_id(&track.elements, &element_id)
        .ok_or(TimelineError::ElementNotFound(element_id))?;
    let element = track.elements.remove(index);
    Ok(TimelineCommand::InsertElement {
        timeline_id,
        track_id,
        element,
        position: Some(index),
    })
}

fn timeline_mut<'a>(
    timelines: &'a mut [Timeline],
    timeline_id: &TimelineId,
) -> Result<&'a mut Timeline, TimelineError> {
    timelines
        .iter_mut()
        .find(|t| &t.id == timeline_id)
        .ok_or_else(|| TimelineError::TimelineNotFound(timeline_id.clone()))
}

fn track_mut<'a>(
    timelines: &'a mut [Timeline],
    timeline_id: &TimelineId,
    track_id: &TrackId,
) -> Result<&'a mut TimelineTrack, TimelineError> {
    timeline_mut(timelines, timeline_id)?
        .tracks
        .iter_mut()
        .find(|t| &t.id == track_id)
        .ok_or_else(|| TimelineError::TrackNotFound(track_id.clone()))
}

fn element_mut<'a>(
    timelines: &'a mut [Timeline],
    timeline_id: &TimelineId,
    track_id: &TrackId,
    element_id: &ElementId,
) -> Result<&'a mut TimelineElement, TimelineError> {
    track_mut(timelines, timeline_id, track_id)?
        .elements
        .iter_mut()
        .find(|e| &e.id == element_id)
        .ok_or_else(|| TimelineError::ElementNotFound(element_id.clone()))
}

fn checked_position(position: Option<usize>, len: usize) -> Result<usize, TimelineError> {
    match position {
        None => Ok(len),
        Some(index) if index <= len => Ok(index),
        Some(index) => Err(TimelineError::InvalidOp(format!(
            "position {} out of bounds for {} entries",
            index, len
        ))),
    }
}

fn ensure_non_negative(what: &str, value: Seconds) -> Result<(), TimelineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(TimelineError::InvalidOp(format!(
            "{} must be a finite non-negative number, got {}",
            what, value
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CommandHistory<C> {
    undo_stack: Vec<C>,
    redo_stack: Vec<C>,
}

impl<C> Default for CommandHistory<C> {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }
}

impl<C: EditCommand + Clone> CommandHistory<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, target: &mut C::Target, command: C) -> Result<(), TimelineError> {
        let inverse = command.apply(target)?;
        self.undo_stack.push(inverse);
        self.redo_stack.clear();
        Ok(())
    }

    pub fn undo(&mut self, target: &mut C::Target) -> Result<(), TimelineError> {
        let command = self
            .undo_stack
            .pop()
            .ok_or(TimelineError::HistoryEmpty("undo stack"))?;
        match command.clone().apply(target) {
            Ok(inverse) => self.redo_stack.push(inverse),
            Err(err) => {
                // failed edits leave the target untouched, keep the entry
                self.undo_stack.push(command);
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn redo(&mut self, target: &mut C::Target) -> Result<(), TimelineError> {
        let command = self
            .redo_stack
            .pop()
            .ok_or(TimelineError::HistoryEmpty("redo stack"))?;
        match command.clone().apply(target) {
            Ok(inverse) => self.undo_stack.push(inverse),
            Err(err) => {
                self.redo_stack.push(command);
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(indices: &[usize]) -> AccessPath {
        AccessPath::from(indices)
    }

    fn ids(chapters: &[Chapter]) -> Vec<&str> {
        chapters.iter().map(|c| c.id.as_str()).collect()
    }

    fn tree() -> Vec<Chapter> {
        vec![Chapter::new("chapter1").with_children(vec![
            Chapter::new("chapter1.1"),
            Chapter::new("chapter1.2")
                .with_children(vec![Chapter::new("chapter1.2.1"), Chapter::new("chapter1.2.2")]),
            Chapter::new("chapter1.3"),
        ])]
    }

    #[test]
    fn test_add_before_and_undo() {
        let mut chapters = tree();
        let mut history = CommandHistory::new();
        history
            .apply(&mut chapters, ChapterCommand::add_before(path(&[0, 1]), Some("new".into())))
            .unwrap();
        assert_eq!(
            ids(&chapters[0].children),
            vec!["chapter1.1", "new", "chapter1.2", "chapter1.3"]
        );

        history.undo(&mut chapters).unwrap();
        assert_eq!(chapters, tree());
        history.redo(&mut chapters).unwrap();
        assert_eq!(chapters[0].children[1].id.as_str(), "new");
    }

    #[test]
    fn test_add_after() {
        let mut chapters = tree();
        let command = ChapterCommand::add_after(&chapters, &path(&[0, 2]), Some("last".into())).unwrap();
        apply_chapter_command(&mut chapters, command).unwrap();
        assert_eq!(
            ids(&chapters[0].children),
            vec!["chapter1.1", "chapter1.2", "chapter1.3", "last"]
        );

        let command = ChapterCommand::add_after(&chapters, &path(&[0]), Some("sibling".into())).unwrap();
        apply_chapter_command(&mut chapters, command).unwrap();
        assert_eq!(ids(&chapters), vec!["chapter1", "sibling"]);
    }

    #[test]
    fn test_add_child_adopts_children() {
        let mut chapters = tree();
        let command = ChapterCommand::add_child(&chapters, &path(&[0, 1]), Some("group".into())).unwrap();
        let inverse = apply_chapter_command(&mut chapters, command).unwrap();

        let parent = &chapters[0].children[1];
        assert_eq!(ids(&parent.children), vec!["group"]);
        assert_eq!(
            ids(&parent.children[0].children),
            vec!["chapter1.2.1", "chapter1.2.2"]
        );

        apply_chapter_command(&mut chapters, inverse).unwrap();
        assert_eq!(chapters, tree());
    }

    #[test]
    fn test_add_child_to_leaf() {
        let mut chapters = tree();
        let command = ChapterCommand::add_child(&chapters, &path(&[0, 0]), None).unwrap();
        apply_chapter_command(&mut chapters, command).unwrap();
        let leaf = &chapters[0].children[0];
        assert_eq!(leaf.children.len(), 1);
        assert!(leaf.children[0].is_leaf());
        assert!(!leaf.children[0].id.is_synthetic());
    }

    #[test]
    fn test_remove_splices_children() {
        let mut chapters = tree();
        chapters[0].children[1].name = Some("Act two".to_string());
        let original = chapters.clone();

        let inverse = apply_chapter_command(
            &mut chapters,
            ChapterCommand::RemoveChapter {
                access_path: path(&[0, 1]),
            },
        )
        .unwrap();
        assert_eq!(
            ids(&chapters[0].children),
            vec!["chapter1.1", "chapter1.2.1", "chapter1.2.2", "chapter1.3"]
        );

        apply_chapter_command(&mut chapters, inverse).unwrap();
        assert_eq!(chapters, original);
    }

    #[test]
    fn test_detach_removes_subtree() {
        let mut chapters = tree();
        let inverse = apply_chapter_command(
            &mut chapters,
            ChapterCommand::DetachChapter {
                access_path: path(&[0, 1]),
            },
        )
        .unwrap();
        assert_eq!(ids(&chapters[0].children), vec!["chapter1.1", "chapter1.3"]);
        apply_chapter_command(&mut chapters, inverse).unwrap();
        assert_eq!(chapters, tree());
    }

    #[test]
    fn test_rename_round_trip() {
        let mut chapters = tree();
        let mut history = CommandHistory::new();
        history
            .apply(
                &mut chapters,
                ChapterCommand::RenameChapter {
                    access_path: path(&[0, 2]),
                    name: Some("Finale".to_string()),
                },
            )
            .unwrap();
        assert_eq!(chapters[0].children[2].name.as_deref(), Some("Finale"));
        history.undo(&mut chapters).unwrap();
        assert_eq!(chapters[0].children[2].name, None);
        assert!(history.can_redo());
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let mut chapters = tree();
        let bad = path(&[0, 7]);
        assert_eq!(
            apply_chapter_command(
                &mut chapters,
                ChapterCommand::RemoveChapter {
                    access_path: bad.clone()
                }
            ),
            Err(TimelineError::InvalidPath(bad.clone()))
        );
        assert!(ChapterCommand::add_child(&chapters, &bad, None).is_err());
        assert!(ChapterCommand::add_after(&chapters, &path(&[3, 0]), None).is_err());
        assert!(apply_chapter_command(
            &mut chapters,
            ChapterCommand::add_before(AccessPath::default(), None)
        )
        .is_err());
        assert_eq!(chapters, tree());
    }

    #[test]
    fn test_history_empty() {
        let mut chapters = tree();
        let mut history: CommandHistory<ChapterCommand> = CommandHistory::new();
        assert_eq!(
            history.undo(&mut chapters),
            Err(TimelineError::HistoryEmpty("undo stack"))
        );
        assert_eq!(
            history.redo(&mut chapters),
            Err(TimelineError::HistoryEmpty("redo stack"))
        );
    }

    #[test]
    fn test_failed_undo_keeps_entry() {
        let mut chapters = tree();
        let mut history = CommandHistory::new();
        history
            .apply(
                &mut chapters,
                ChapterCommand::DetachChapter {
                    access_path: path(&[0, 2]),
                },
            )
            .unwrap();

        let mut emptied: Vec<Chapter> = Vec::new();
        assert!(matches!(
            history.undo(&mut emptied),
            Err(TimelineError::InvalidPath(_))
        ));
        assert!(history.can_undo());
        assert!(emptied.is_empty());

        history.undo(&mut chapters).unwrap();
        assert_eq!(chapters, tree());
    }

    #[test]
    fn test_wrap_count_overflow_rejected() {
        let json = serde_json::json!({
            "command": "wrap_chapters",
            "access_path": [0, 1],
            "count": usize::MAX,
            "chapter": {"id": "group"}
        });
        let command: ChapterCommand = serde_json::from_value(json).unwrap();

        let mut chapters = tree();
        assert_eq!(
            apply_chapter_command(&mut chapters, command),
            Err(TimelineError::InvalidPath(path(&[0, 1])))
        );
        assert_eq!(chapters, tree());
    }

    #[test]
    fn test_command_serialization_tag() {
        let command = ChapterCommand::RemoveChapter {
            access_path: path(&[0, 1]),
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["command"], "remove_chapter");
        assert_eq!(json["access_path"], serde_json::json!([0, 1]));
        let back: ChapterCommand = serde_json::from_value(json).unwrap();
        assert_eq!(back, command);
    }

    fn timelines() -> Vec<Timeline> {
        vec![Timeline::new("tl1", "chapter1").with_tracks(vec![TimelineTrack::new(
            "track1", "region1",
        )
        .with_elements(vec![
            TimelineElement::new("e1", "video", 0.0, 10.0),
            TimelineElement::new("e2", "image", 2.0, 5.0),
        ])])]
    }

    #[test]
    fn test_add_timeline_once_per_chapter() {
        let mut timelines = timelines();
        let result = apply_timeline_command(
            &mut timelines,
            TimelineCommand::AddTimeline {
                timeline: Timeline::new("tl2", "chapter1"),
                position: None,
            },
        );
        assert_eq!(result, Err(TimelineError::TimelineExists("chapter1".into())));

        let mut history = CommandHistory::new();
        history
            .apply(
                &mut timelines,
                TimelineCommand::AddTimeline {
                    timeline: Timeline::new("tl2", "chapter2"),
                    position: None,
                },
            )
            .unwrap();
        assert_eq!(timelines.len(), 2);
        history.undo(&mut timelines).unwrap();
        assert_eq!(timelines.len(), 1);
    }

    #[test]
    fn test_element_edits_and_undo() {
        let mut timelines = timelines();
        let mut history = CommandHistory::new();
        let (tl, tr) = (TimelineId::from("tl1"), TrackId::from("track1"));

        history
            .apply(
                &mut timelines,
                TimelineCommand::SetElementDuration {
                    timeline_id: tl.clone(),
                    track_id: tr.clone(),
                    element_id: "e2".into(),
                    duration: 20.0,
                },
            )
            .unwrap();
        history
            .apply(
                &mut timelines,
                TimelineCommand::RemoveElement {
                    timeline_id: tl.clone(),
                    track_id: tr.clone(),
                    element_id: "e1".into(),
                },
            )
            .unwrap();
        assert_eq!(timelines[0].tracks[0].elements.len(), 1);
        assert_eq!(timelines[0].tracks[0].elements[0].duration, 20.0);

        history.undo(&mut timelines).unwrap();
        history.undo(&mut timelines).unwrap();
        assert_eq!(timelines, self::timelines());
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut timelines = timelines();
        let result = apply_timeline_command(
            &mut timelines,
            TimelineCommand::SetElementOffset {
                timeline_id: "tl1".into(),
                track_id: "track1".into(),
                element_id: "e1".into(),
                offset: -1.0,
            },
        );
        assert!(matches!(result, Err(TimelineError::InvalidOp(_))));

        let result = apply_timeline_command(
            &mut timelines,
            TimelineCommand::InsertElement {
                timeline_id: "tl1".into(),
                track_id: "track1".into(),
                element: TimelineElement::new("e3", "x", 0.0, -5.0),
                position: None,
            },
        );
        assert!(matches!(result, Err(TimelineError::InvalidOp(_))));
        assert_eq!(timelines, self::timelines());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut timelines = timelines();
        let result = apply_timeline_command(
            &mut timelines,
            TimelineCommand::InsertElement {
                timeline_id: "tl1".into(),
                track_id: "track1".into(),
                element: TimelineElement::new("e3", "x", 0.0, f64::NAN),
                position: None,
            },
        );
        assert!(matches!(result, Err(TimelineError::InvalidOp(_))));

        for value in [f64::NAN, f64::INFINITY] {
            let result = apply_timeline_command(
                &mut timelines,
                TimelineCommand::SetElementDuration {
                    timeline_id: "tl1".into(),
                    track_id: "track1".into(),
                    element_id: "e1".into(),
                    duration: value,
                },
            );
            assert!(matches!(result, Err(TimelineError::InvalidOp(_))));

            let result = apply_timeline_command(
                &mut timelines,
                TimelineCommand::SetElementOffset {
                    timeline_id: "tl1".into(),
                    track_id: "track1".into(),
                    element_id: "e1".into(),
                    offset: value,
                },
            );
            assert!(matches!(result, Err(TimelineError::InvalidOp(_))));
        }
        assert_eq!(timelines, self::timelines());
    }

    #[test]
    fn test_track_commands() {
        let mut timelines = timelines();
        let (tl, tr) = (TimelineId::from("tl1"), TrackId::from("track1"));

        let inverse = apply_timeline_command(
            &mut timelines,
            TimelineCommand::ToggleTrackLock {
                timeline_id: tl.clone(),
                track_id: tr.clone(),
            },
        )
        .unwrap();
        assert!(timelines[0].tracks[0].locked);
        apply_timeline_command(&mut timelines, inverse).unwrap();
        assert!(!timelines[0].tracks[0].locked);

        let inverse = apply_timeline_command(
            &mut timelines,
            TimelineCommand::AddTrack {
                timeline_id: tl.clone(),
                track: TimelineTrack::new("track0", "region0"),
                position: Some(0),
            },
        )
        .unwrap();
        assert_eq!(timelines[0].tracks[0].id.as_str(), "track0");
        apply_timeline_command(&mut timelines, inverse).unwrap();
        assert_eq!(timelines, self::timelines());

        assert_eq!(
            apply_timeline_command(
                &mut timelines,
                TimelineCommand::RemoveTrack {
                    timeline_id: tl,
                    track_id: "nope".into(),
                },
            ),
            Err(TimelineError::TrackNotFound("nope".into()))
        );
    }
}
