use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use podgrab_logging::{podgrab_debug, podgrab_error, podgrab_info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{AtomicFileWriter, EngineError, FailureKind, Fetcher, PersistError};

/// In-memory download payload, addressed by a content-derived blob reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Bytes,
    mime: &'static str,
}

impl Artifact {
    pub fn new(bytes: Bytes, mime: &'static str) -> Self {
        Self { bytes, mime }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// `blob:podgrab/<first 8 bytes of sha256, hex>`
    pub fn blob_url(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        let mut url = String::from("blob:podgrab/");
        for byte in digest.iter().take(8) {
            use std::fmt::Write;
            let _ = write!(&mut url, "{byte:02x}");
        }
        url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    Remote(String),
    Memory(Artifact),
}

/// The pipeline's only output artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source: DownloadSource,
    pub suggested_file_name: String,
}

impl DownloadRequest {
    pub fn location(&self) -> String {
        match &self.source {
            DownloadSource::Remote(url) => url.clone(),
            DownloadSource::Memory(artifact) => artifact.blob_url(),
        }
    }

    /// Wire form handed to the privileged download dispatcher.
    pub fn message(&self) -> SinkMessage {
        SinkMessage::Download {
            url: self.location(),
            filename: self.suggested_file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkMessage {
    Download { url: String, filename: String },
}

impl SinkMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("download dispatcher is gone")]
    Closed,
    #[error("no async runtime available for the hand-off")]
    NoRuntime,
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Fetch(#[from] EngineError),
}

impl From<SinkError> for EngineError {
    fn from(err: SinkError) -> Self {
        EngineError::new(FailureKind::Sink, err.to_string())
    }
}

/// Accepts a request and returns immediately; persistence happens elsewhere.
pub trait DownloadSink: Send + Sync {
    fn submit(&self, request: DownloadRequest) -> Result<(), SinkError>;
}

/// Forwards requests to a background dispatcher over a channel.
#[derive(Debug, Clone)]
pub struct ChannelDownloadSink {
    tx: mpsc::UnboundedSender<DownloadRequest>,
}

impl ChannelDownloadSink {
    pub fn new(tx: mpsc::UnboundedSender<DownloadRequest>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DownloadRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl DownloadSink for ChannelDownloadSink {
    fn submit(&self, request: DownloadRequest) -> Result<(), SinkError> {
        self.tx.send(request).map_err(|_| SinkError::Closed)
    }
}

/// Saves artifacts into a download directory. Remote sources are fetched first.
#[derive(Clone)]
pub struct DirectoryDownloadSink {
    writer: AtomicFileWriter,
    fetcher: Arc<dyn Fetcher>,
}

impl DirectoryDownloadSink {
    pub fn new(dir: PathBuf, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            fetcher,
        }
    }

    pub async fn persist(&self, request: DownloadRequest) -> Result<PathBuf, SinkError> {
        let bytes = match request.source {
            DownloadSource::Memory(artifact) => artifact.bytes,
            DownloadSource::Remote(url) => Bytes::from(self.fetcher.fetch(&url).await?.bytes),
        };
        let writer = self.writer.clone();
        let file_name = request.suggested_file_name;
        let path = tokio::task::spawn_blocking(move || writer.write(&file_name, &bytes))
            .await
            .map_err(|err| PersistError::Io(std::io::Error::other(err)))??;
        Ok(path)
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn submit(&self, request: DownloadRequest) -> Result<(), SinkError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| SinkError::NoRuntime)?;
        if let Ok(json) = request.message().to_json() {
            podgrab_debug!("download request {}", json);
        }
        let sink = self.clone();
        handle.spawn(async move {
            let name = request.suggested_file_name.clone();
            match sink.persist(request).await {
                Ok(path) => podgrab_info!("saved {:?}", path),
                Err(err) => podgrab_error!("saving {} failed: {}", name, err),
            }
        });
        Ok(())
    }
}
