use serde::{Deserialize, Serialize};

/// Programme as served by the authoring backend: every chapter carries its
/// own tracks and its children in playback order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChapterTree {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<TreeTrack>,
    #[serde(default)]
    pub chapters: Vec<ChapterTree>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreeTrack {
    pub id: String,
    pub region: String,
    #[serde(default)]
    pub elements: Vec<TreeElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreeElement {
    pub asset: String,
    pub duration: f64,
    #[serde(default)]
    pub offset: f64,
}
