use thiserror::Error;

mod model;
pub use model::*;
mod tree;
pub use tree::*;
mod duration;
pub use duration::*;
mod merge;
pub use merge::*;
mod offsets;
pub use offsets::*;
mod trim;
pub use trim::*;
mod layout;
pub use layout::*;
mod commands;
pub use commands::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("invalid operation: {0}")]
    InvalidOp(String),
    #[error("invalid access path: {0}")]
    InvalidPath(AccessPath),
    #[error("chapter not found: {0}")]
    ChapterNotFound(ChapterId),
    #[error("timeline not found: {0}")]
    TimelineNotFound(TimelineId),
    #[error("chapter {0} already has a timeline")]
    TimelineExists(ChapterId),
    #[error("track not found: {0}")]
    TrackNotFound(TrackId),
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("history empty: {0}")]
    HistoryEmpty(&'static str),
}

pub type Seconds = f64; // relative time, element offsets are gaps not timestamps
