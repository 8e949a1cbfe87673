use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use bytes::Bytes;
use podgrab_logging::{podgrab_debug, podgrab_info};
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::{EngineError, FailureKind};

/// MIME type of the converted artifact.
pub const OUTPUT_MIME: &str = "audio/mpeg";

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("transcoder failed to load: {0}")]
    Load(String),
    #[error("transcoder used before load")]
    NotLoaded,
    #[error("conversion exited with {status}: {stderr}")]
    Execution { status: String, stderr: String },
    #[error("conversion timed out after {0:?}")]
    Timeout(Duration),
    #[error("virtual file {0:?} not found")]
    MissingFile(String),
    #[error("invalid virtual file name {0:?}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<TranscodeError> for EngineError {
    fn from(err: TranscodeError) -> Self {
        let kind = match &err {
            TranscodeError::Load(_) | TranscodeError::NotLoaded => FailureKind::EngineLoad,
            TranscodeError::Timeout(_) => FailureKind::EngineTimeout,
            _ => FailureKind::EngineExecution,
        };
        EngineError::new(kind, err.to_string())
    }
}

/// Black-box audio transcoder with an in-memory style file surface:
/// load, write input, run a command line, read output.
#[async_trait::async_trait]
pub trait Transcoder: Send + Sync {
    async fn load(&self) -> Result<(), TranscodeError>;
    async fn write_file(&self, name: &str, data: Bytes) -> Result<(), TranscodeError>;
    async fn run(&self, args: &[String]) -> Result<(), TranscodeError>;
    async fn read_file(&self, name: &str) -> Result<Bytes, TranscodeError>;
    async fn remove_file(&self, _name: &str) -> Result<(), TranscodeError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TranscodeSettings {
    pub program: PathBuf,
    pub input_name: String,
    pub output_name: String,
    pub codec: String,
    pub quality: String,
    pub timeout: Duration,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            input_name: "input.m4a".to_string(),
            output_name: "output.mp3".to_string(),
            codec: "libmp3lame".to_string(),
            quality: "2".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

impl TranscodeSettings {
    /// `-y -i input.m4a -acodec libmp3lame -q:a 2 output.mp3`
    pub fn conversion_args(&self) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            self.input_name.clone(),
            "-acodec".to_string(),
            self.codec.clone(),
            "-q:a".to_string(),
            self.quality.clone(),
            self.output_name.clone(),
        ]
    }
}

/// Runs an ffmpeg-compatible binary inside a private scratch directory that
/// plays the role of the engine's virtual filesystem.
#[derive(Debug)]
pub struct FfmpegTranscoder {
    settings: TranscodeSettings,
    scratch: OnceCell<TempDir>,
}

impl FfmpegTranscoder {
    pub fn new(settings: TranscodeSettings) -> Self {
        Self {
            settings,
            scratch: OnceCell::new(),
        }
    }

    fn scratch_dir(&self) -> Result<&Path, TranscodeError> {
        self.scratch
            .get()
            .map(TempDir::path)
            .ok_or(TranscodeError::NotLoaded)
    }

    fn virtual_path(&self, name: &str) -> Result<PathBuf, TranscodeError> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !plain {
            return Err(TranscodeError::InvalidName(name.to_string()));
        }
        Ok(self.scratch_dir()?.join(name))
    }

    async fn probe_binary(&self) -> Result<(), TranscodeError> {
        let probe = Command::new(&self.settings.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();
        match tokio::time::timeout(self.settings.timeout, probe).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(TranscodeError::Load(format!(
                "{} -version exited with {status}",
                self.settings.program.display()
            ))),
            Ok(Err(err)) => Err(TranscodeError::Load(format!(
                "cannot start {}: {err}",
                self.settings.program.display()
            ))),
            Err(_) => Err(TranscodeError::Load("version probe timed out".to_string())),
        }
    }
}

#[async_trait::async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn load(&self) -> Result<(), TranscodeError> {
        self.scratch
            .get_or_try_init(|| async {
                self.probe_binary().await?;
                let dir = tempfile::Builder::new()
                    .prefix("podgrab-transcode")
                    .tempdir()
                    .map_err(|err| TranscodeError::Load(err.to_string()))?;
                podgrab_info!(
                    "transcoder {} loaded, scratch {:?}",
                    self.settings.program.display(),
                    dir.path()
                );
                Ok::<_, TranscodeError>(dir)
            })
            .await?;
        Ok(())
    }

    async fn write_file(&self, name: &str, data: Bytes) -> Result<(), TranscodeError> {
        let path = self.virtual_path(name)?;
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn run(&self, args: &[String]) -> Result<(), TranscodeError> {
        let dir = self.scratch_dir()?;
        podgrab_debug!("running {} {:?}", self.settings.program.display(), args);
        let child = Command::new(&self.settings.program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.settings.timeout, child).await {
            Ok(result) => result?,
            Err(_) => return Err(TranscodeError::Timeout(self.settings.timeout)),
        };
        if output.status.success() {
            return Ok(());
        }
        Err(TranscodeError::Execution {
            status: output.status.to_string(),
            stderr: last_line(&output.stderr),
        })
    }

    async fn read_file(&self, name: &str) -> Result<Bytes, TranscodeError> {
        let path = self.virtual_path(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(TranscodeError::MissingFile(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn remove_file(&self, name: &str) -> Result<(), TranscodeError> {
        let path = self.virtual_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

fn last_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("no diagnostic output")
        .to_string()
}
