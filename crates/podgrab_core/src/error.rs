use thiserror::Error;

/// User-facing failure taxonomy of the acquisition pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("no audio element appeared within {attempts} attempts")]
    DiscoveryTimeout { attempts: u32 },
    #[error("fetching audio failed: {0}")]
    NetworkFailure(String),
    #[error("transcoding engine failed to load: {0}")]
    EngineLoadFailure(String),
    #[error("transcoding failed: {0}")]
    EngineExecutionFailure(String),
    #[error("no audio source captured")]
    MissingSource,
    #[error("download sink rejected the request: {0}")]
    DownloadSinkFailure(String),
}
