use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Page view a command or event belongs to.
pub type ArmId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStep {
    Fetching,
    Transcoding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Result of one discovery poll.
    DiscoveryTick {
        arm_id: ArmId,
        audio_url: Option<String>,
    },
    ConversionStep {
        arm_id: ArmId,
        step: ConversionStep,
    },
    /// Emitted after the artifact was handed to the sink, or on the first failure.
    ConversionCompleted {
        arm_id: ArmId,
        result: Result<ConversionReport, EngineError>,
    },
    DownloadRejected {
        arm_id: ArmId,
        error: EngineError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub file_name: String,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub blob_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: FailureKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
    EngineLoad,
    EngineExecution,
    EngineTimeout,
    Sink,
}

impl FailureKind {
    /// Whether the failure happened while acquiring bytes over the network.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FailureKind::InvalidUrl
                | FailureKind::HttpStatus(_)
                | FailureKind::Timeout
                | FailureKind::RedirectLimitExceeded
                | FailureKind::TooLarge { .. }
                | FailureKind::UnsupportedContentType { .. }
                | FailureKind::Network
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::EngineLoad => write!(f, "transcoder load failure"),
            FailureKind::EngineExecution => write!(f, "transcoder execution failure"),
            FailureKind::EngineTimeout => write!(f, "transcoder timeout"),
            FailureKind::Sink => write!(f, "download sink failure"),
        }
    }
}
