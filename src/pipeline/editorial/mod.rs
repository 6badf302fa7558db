pub mod matcher;
pub mod service;
pub mod sources;

pub use matcher::*;
pub use service::*;
pub use sources::*;

use thiserror::Error;

use crate::pipeline::segmentation::SegmentationError;

/// One article source could not be read. Non-fatal while other sources succeed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to read article {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Article {url} has no text content")]
    Empty { url: String },

    #[error("Article {url} unavailable: {reason}")]
    Unavailable { url: String, reason: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Io { url, .. } | Self::Empty { url } | Self::Unavailable { url, .. } => url,
        }
    }
}

/// Failures of editorial parsing for one contest.
#[derive(Error, Debug)]
pub enum EditorialError {
    #[error("No editorial found for contest {contest_id}")]
    NotFound { contest_id: String },

    #[error("Failed to fetch editorial content for contest {contest_id} from {} source(s)", failed_urls.len())]
    AllSourcesFailed {
        contest_id: String,
        failed_urls: Vec<String>,
    },

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
}

impl EditorialError {
    pub fn contest_id(&self) -> &str {
        match self {
            Self::NotFound { contest_id } | Self::AllSourcesFailed { contest_id, .. } => contest_id,
            Self::Segmentation(e) => e.contest_id(),
        }
    }
}
