//! Podgrab engine: IO side of the acquisition pipeline and effect execution.
mod discovery;
mod engine;
mod fetch;
mod page;
mod persist;
mod sink;
mod transcode;
mod types;

pub use discovery::DiscoveryOutcome;
pub use engine::{EngineConfig, EngineHandle, EngineServices};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use page::{LivePage, PageProbe, PageSnapshot, PageTitles};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use sink::{
    Artifact, ChannelDownloadSink, DirectoryDownloadSink, DownloadRequest, DownloadSink,
    DownloadSource, SinkError, SinkMessage,
};
pub use transcode::{FfmpegTranscoder, TranscodeError, TranscodeSettings, Transcoder, OUTPUT_MIME};
pub use types::{
    ArmId, ConversionReport, ConversionStep, DiscoverySettings, EngineError, EngineEvent,
    FailureKind, FetchMetadata, FetchOutput,
};
