use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Seconds;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Empty ids mark records synthesized by the engine rather than authored.
            pub fn is_synthetic(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(ChapterId);
string_id!(TimelineId);
string_id!(TrackId);
string_id!(ElementId);
string_id!(
    /// Screen region of the layout a track plays on. Tracks of different
    /// chapters bound to the same region form one logical channel.
    RegionId
);

/// Child indices leading from the root level down to a chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AccessPath(pub Vec<usize>);

impl AccessPath {
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Index of the addressed chapter within its parent's children.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<AccessPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, index: usize) -> AccessPath {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Paths of all strict ancestors, from the root level down.
    pub fn ancestors(&self) -> impl Iterator<Item = AccessPath> + '_ {
        (1..self.0.len()).map(move |len| Self(self.0[..len].to_vec()))
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<Vec<usize>> for AccessPath {
    fn from(value: Vec<usize>) -> Self {
        Self(value)
    }
}

impl From<&[usize]> for AccessPath {
    fn from(value: &[usize]) -> Self {
        Self(value.to_vec())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub children: Vec<Chapter>,
}

impl Chapter {
    pub fn new(id: impl Into<ChapterId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Chapter>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimelineElement {
    pub id: ElementId,
    /// Placed content; empty for padding.
    pub component_id: String,
    pub offset: Seconds,
    pub duration: Seconds,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl TimelineElement {
    pub fn new(
        id: impl Into<ElementId>,
        component_id: impl Into<String>,
        offset: Seconds,
        duration: Seconds,
    ) -> Self {
        Self {
            id: id.into(),
            component_id: component_id.into(),
            offset,
            duration,
            preview_url: None,
        }
    }

    /// Invisible gap element reserving `offset` seconds on a track.
    pub fn padding(offset: Seconds) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn is_padding(&self) -> bool {
        self.component_id.is_empty()
    }

    /// Time consumed on the track, gap included.
    pub fn span(&self) -> Seconds {
        self.offset + self.duration
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimelineTrack {
    pub id: TrackId,
    pub region_id: RegionId,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub elements: Vec<TimelineElement>,
}

impl TimelineTrack {
    pub fn new(id: impl Into<TrackId>, region_id: impl Into<RegionId>) -> Self {
        Self {
            id: id.into(),
            region_id: region_id.into(),
            locked: false,
            elements: Vec::new(),
        }
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_elements(mut self, elements: Vec<TimelineElement>) -> Self {
        self.elements = elements;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub id: TimelineId,
    pub chapter_id: ChapterId,
    #[serde(default)]
    pub tracks: Vec<TimelineTrack>,
}

impl Timeline {
    pub fn new(id: impl Into<TimelineId>, chapter_id: impl Into<ChapterId>) -> Self {
        Self {
            id: id.into(),
            chapter_id: chapter_id.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_tracks(mut self, tracks: Vec<TimelineTrack>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn track_for_region(&self, region_id: &RegionId) -> Option<&TimelineTrack> {
        self.tracks.iter().find(|t| &t.region_id == region_id)
    }

    pub fn has_region(&self, region_id: &RegionId) -> bool {
        self.track_for_region(region_id).is_some()
    }
}

/// Records addressable by an id, for lookups over ordered collections.
pub trait Identified {
    type Id: PartialEq;

    fn id(&self) -> &Self::Id;
}

impl Identified for Chapter {
    type Id = ChapterId;

    fn id(&self) -> &ChapterId {
        &self.id
    }
}

impl Identified for Timeline {
    type Id = TimelineId;

    fn id(&self) -> &TimelineId {
        &self.id
    }
}

impl Identified for TimelineTrack {
    type Id = TrackId;

    fn id(&self) -> &TrackId {
        &self.id
    }
}

impl Identified for TimelineElement {
    type Id = ElementId;

    fn id(&self) -> &ElementId {
        &self.id
    }
}

/// Timeline authored for a chapter, if any. Orphaned timelines never match.
pub fn timeline_for<'a>(timelines: &'a [Timeline], chapter_id: &ChapterId) -> Option<&'a Timeline> {
    timelines.iter().find(|t| &t.chapter_id == chapter_id)
}
