use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use timeline::{
    access_path_of, chapter_by_path, timeline_for, AccessPath, Chapter, ChapterId, ElementId,
    RegionId, Timeline, TimelineElement, TimelineError, TimelineId, TimelineTrack, TrackId,
};
use tracing::{debug, info};

mod config;
mod tree;

pub use config::{ImportConfig, OPEN_ENDED_DURATION};
pub use tree::{ChapterTree, TreeElement, TreeTrack};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    #[error("document has {0} root chapters, expected one")]
    MultipleRoots(usize),
    #[error("document has no chapters")]
    EmptyDocument,
}

/// Chapter tree and the flat timeline collection referring into it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub chapters: Vec<Chapter>,
    pub timelines: Vec<Timeline>,
}

impl Document {
    pub fn from_tree(tree: &ChapterTree, config: &ImportConfig) -> Self {
        let mut timelines = Vec::new();
        let root = import_chapter(tree, config, &mut timelines);
        info!(
            chapter = %root.id,
            timelines = timelines.len(),
            "imported chapter tree"
        );
        Self {
            chapters: vec![root],
            timelines,
        }
    }

    pub fn from_json(json: &str, config: &ImportConfig) -> Result<Self, DocumentError> {
        let tree: ChapterTree = serde_json::from_str(json)?;
        Ok(Self::from_tree(&tree, config))
    }

    pub fn to_tree(&self, config: &ImportConfig) -> Result<ChapterTree, DocumentError> {
        match self.chapters.as_slice() {
            [] => Err(DocumentError::EmptyDocument),
            [root] => Ok(self.export_chapter(root, config)),
            roots => Err(DocumentError::MultipleRoots(roots.len())),
        }
    }

    pub fn to_json(&self, config: &ImportConfig) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.to_tree(config)?)?)
    }

    pub fn path_of(&self, chapter_id: &ChapterId) -> Result<AccessPath, DocumentError> {
        let path = access_path_of(&self.chapters, chapter_id);
        if path.is_empty() {
            return Err(TimelineError::ChapterNotFound(chapter_id.clone()).into());
        }
        Ok(path)
    }

    pub fn chapter(&self, chapter_id: &ChapterId) -> Result<&Chapter, DocumentError> {
        let path = self.path_of(chapter_id)?;
        Ok(chapter_by_path(&self.chapters, &path)?)
    }

    /// Regions used by any timeline, in order of first appearance.
    pub fn regions(&self) -> Vec<RegionId> {
        let mut regions: Vec<RegionId> = Vec::new();
        for track in self.timelines.iter().flat_map(|t| &t.tracks) {
            if !regions.contains(&track.region_id) {
                regions.push(track.region_id.clone());
            }
        }
        regions
    }

    fn export_chapter(&self, chapter: &Chapter, config: &ImportConfig) -> ChapterTree {
        let tracks = timeline_for(&self.timelines, &chapter.id)
            .map(|timeline| {
                timeline
                    .tracks
                    .iter()
                    .map(|track| TreeTrack {
                        id: track.id.to_string(),
                        region: track.region_id.to_string(),
                        elements: track
                            .elements
                            .iter()
                            .map(|e| TreeElement {
                                asset: e.component_id.clone(),
                                duration: config.export_duration(e.duration),
                                offset: e.offset,
                            })
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ChapterTree {
            id: chapter.id.to_string(),
            name: chapter.name.clone().unwrap_or_default(),
            tracks,
            chapters: chapter
                .children
                .iter()
                .map(|child| self.export_chapter(child, config))
                .collect(),
        }
    }
}

fn import_chapter(
    tree: &ChapterTree,
    config: &ImportConfig,
    timelines: &mut Vec<Timeline>,
) -> Chapter {
    let chapter_id = ChapterId::from(tree.id.as_str());
    let timeline_id = if config.generate_ids {
        TimelineId::new()
    } else {
        TimelineId::from(format!("{}-timeline", tree.id))
    };

    let tracks = tree
        .tracks
        .iter()
        .map(|track| {
            let elements = track
                .elements
                .iter()
                .enumerate()
                .map(|(index, e)| {
                    let id = if config.generate_ids {
                        ElementId::new()
                    } else {
                        ElementId::from(format!("{}-{}", track.id, index))
                    };
                    TimelineElement::new(
                        id,
                        e.asset.as_str(),
                        e.offset,
                        config.import_duration(e.duration),
                    )
                })
                .collect();
            TimelineTrack::new(TrackId::from(track.id.as_str()), track.region.as_str())
                .with_elements(elements)
        })
        .collect();

    debug!(chapter = %chapter_id, "importing chapter timeline");
    timelines.push(Timeline::new(timeline_id, chapter_id.clone()).with_tracks(tracks));

    let children = tree
        .chapters
        .iter()
        .map(|child| import_chapter(child, config, timelines))
        .collect();

    let chapter = Chapter::new(chapter_id).with_children(children);
    if tree.name.is_empty() {
        chapter
    } else {
        chapter.with_name(tree.name.as_str())
    }
}

pub fn load_document(path: &Path, config: &ImportConfig) -> Result<Document, DocumentError> {
    let json = std::fs::read_to_string(path)?;
    Document::from_json(&json, config)
}

pub fn save_document(
    document: &Document,
    path: &Path,
    config: &ImportConfig,
) -> Result<(), DocumentError> {
    let json = document.to_json(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
