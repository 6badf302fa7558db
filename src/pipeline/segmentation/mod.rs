pub mod types;
pub mod prompt;
pub mod markers;
pub mod sanitize;
pub mod repair;
pub mod locate;
pub mod normalize;
pub mod parser;
pub mod openrouter;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use markers::*;
pub use sanitize::*;
pub use repair::*;
pub use locate::*;
pub use normalize::*;
pub use parser::*;
pub use openrouter::*;
pub use orchestrator::*;

use thiserror::Error;

/// Failures of the chat-completions provider.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider unreachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Provider response had no choices")]
    NoChoices,

    #[error("Provider response had empty content")]
    EmptyContent,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("No API key configured")]
    MissingApiKey,
}

/// Terminal failures of one segmentation request. Every variant names the contest.
///
/// `Unrecoverable` keeps the raw model response for diagnostics; it is not part
/// of the display message.
#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("No language model provider configured for contest {contest_id}")]
    NoProvider { contest_id: String },

    #[error("Editorial content too short for segmentation for contest {contest_id} ({length} < {minimum} characters)")]
    ContentTooShort {
        contest_id: String,
        length: usize,
        minimum: usize,
    },

    #[error("Language model call failed for contest {contest_id}: {source}")]
    Provider {
        contest_id: String,
        #[source]
        source: LlmError,
    },

    #[error("LLM failed to segment editorial into problem solutions for contest {contest_id}")]
    Unrecoverable {
        contest_id: String,
        raw_response: String,
    },

    #[error("No editorial content could be segmented for contest {contest_id}")]
    NothingSegmented { contest_id: String },

    #[error("Segmentation task for contest {contest_id} did not complete: {reason}")]
    Aborted { contest_id: String, reason: String },
}

impl SegmentationError {
    pub fn contest_id(&self) -> &str {
        match self {
            Self::NoProvider { contest_id }
            | Self::ContentTooShort { contest_id, .. }
            | Self::Provider { contest_id, .. }
            | Self::Unrecoverable { contest_id, .. }
            | Self::NothingSegmented { contest_id }
            | Self::Aborted { contest_id, .. } => contest_id,
        }
    }

    /// Raw provider output, when the failure happened after the call.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Unrecoverable { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}
