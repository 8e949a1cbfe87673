use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use podgrab_logging::{podgrab_debug, podgrab_info, podgrab_warn};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::discovery::{poll_for_audio, DiscoveryOutcome};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::transcode::{FfmpegTranscoder, TranscodeSettings, Transcoder, OUTPUT_MIME};
use crate::{
    Artifact, ArmId, ConversionReport, ConversionStep, DiscoverySettings, DownloadRequest,
    DownloadSink, DownloadSource, EngineError, EngineEvent, PageProbe,
};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub transcode: TranscodeSettings,
}

/// Collaborators the engine drives. All of them are injected so the host can
/// swap the page, the transcoder or the download facility.
#[derive(Clone)]
pub struct EngineServices {
    pub fetcher: Arc<dyn Fetcher>,
    pub transcoder: Arc<dyn Transcoder>,
    pub sink: Arc<dyn DownloadSink>,
    pub page: Arc<dyn PageProbe>,
}

impl EngineServices {
    /// reqwest fetcher plus ffmpeg transcoder, configured from `config`.
    pub fn standard(
        config: &EngineConfig,
        sink: Arc<dyn DownloadSink>,
        page: Arc<dyn PageProbe>,
    ) -> Self {
        Self {
            fetcher: Arc::new(ReqwestFetcher::new(config.fetch.clone())),
            transcoder: Arc::new(FfmpegTranscoder::new(config.transcode.clone())),
            sink,
            page,
        }
    }
}

enum EngineCommand {
    StartDiscovery {
        arm_id: ArmId,
        settings: DiscoverySettings,
    },
    CancelDiscovery {
        arm_id: ArmId,
    },
    Download {
        arm_id: ArmId,
        url: String,
        file_name: String,
    },
    Convert {
        arm_id: ArmId,
        url: String,
        file_name: String,
    },
}

pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    active_discoveries: Arc<AtomicUsize>,
}

impl EngineHandle {
    /// Starts the engine loop on the current tokio runtime.
    pub fn spawn(config: EngineConfig, services: EngineServices) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let active_discoveries = Arc::new(AtomicUsize::new(0));

        let engine = EngineLoop {
            services,
            transcode: Arc::new(config.transcode),
            discovery: None,
            active_discoveries: active_discoveries.clone(),
            conversion_lock: Arc::new(Mutex::new(())),
            event_tx,
        };
        tokio::spawn(engine.run(cmd_rx));

        Self {
            cmd_tx,
            event_rx,
            active_discoveries,
        }
    }

    pub fn start_discovery(&self, arm_id: ArmId, settings: DiscoverySettings) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartDiscovery { arm_id, settings });
    }

    pub fn cancel_discovery(&self, arm_id: ArmId) {
        let _ = self.cmd_tx.send(EngineCommand::CancelDiscovery { arm_id });
    }

    pub fn download(&self, arm_id: ArmId, url: impl Into<String>, file_name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            arm_id,
            url: url.into(),
            file_name: file_name.into(),
        });
    }

    pub fn convert(&self, arm_id: ArmId, url: impl Into<String>, file_name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Convert {
            arm_id,
            url: url.into(),
            file_name: file_name.into(),
        });
    }

    /// Number of discovery loops currently running.
    pub fn active_discoveries(&self) -> usize {
        self.active_discoveries.load(Ordering::SeqCst)
    }

    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }
}

struct RunningDiscovery {
    arm_id: ArmId,
    token: CancellationToken,
    task: JoinHandle<DiscoveryOutcome>,
}

struct EngineLoop {
    services: EngineServices,
    transcode: Arc<TranscodeSettings>,
    discovery: Option<RunningDiscovery>,
    active_discoveries: Arc<AtomicUsize>,
    conversion_lock: Arc<Mutex<()>>,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineLoop {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>) {
        while let Some(command) = cmd_rx.recv().await {
            self.handle_command(command);
        }
        let _ = self.stop_discovery();
    }

    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::StartDiscovery { arm_id, settings } => {
                let previous = self.stop_discovery();
                let token = CancellationToken::new();
                podgrab_info!(
                    "discovery for view {} started: {} attempts every {:?}",
                    arm_id,
                    settings.max_attempts,
                    settings.interval
                );
                let page = self.services.page.clone();
                let active = self.active_discoveries.clone();
                let events = self.event_tx.clone();
                let poll_token = token.clone();
                let task = tokio::spawn(async move {
                    // The superseded loop must be gone before this one polls.
                    if let Some(previous) = previous {
                        let _ = previous.await;
                    }
                    poll_for_audio(arm_id, settings, page, poll_token, active, events).await
                });
                self.discovery = Some(RunningDiscovery {
                    arm_id,
                    token,
                    task,
                });
            }
            EngineCommand::CancelDiscovery { arm_id } => {
                if matches!(&self.discovery, Some(running) if running.arm_id == arm_id) {
                    let _ = self.stop_discovery();
                }
            }
            EngineCommand::Download {
                arm_id,
                url,
                file_name,
            } => {
                let request = DownloadRequest {
                    source: DownloadSource::Remote(url),
                    suggested_file_name: file_name,
                };
                if let Err(err) = self.services.sink.submit(request) {
                    let _ = self.event_tx.send(EngineEvent::DownloadRejected {
                        arm_id,
                        error: err.into(),
                    });
                }
            }
            EngineCommand::Convert {
                arm_id,
                url,
                file_name,
            } => {
                let services = self.services.clone();
                let settings = self.transcode.clone();
                let lock = self.conversion_lock.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    // One job at a time on the shared transcoder.
                    let _permit = lock.lock().await;
                    let result =
                        run_conversion(&services, &settings, arm_id, &url, file_name, &event_tx)
                            .await;
                    if let Err(err) = &result {
                        podgrab_warn!("conversion of {} failed: {}", url, err);
                    }
                    let _ = event_tx.send(EngineEvent::ConversionCompleted { arm_id, result });
                });
            }
        }
    }

    /// Cancels the running poller, if any, and returns its task so a
    /// successor can wait for it.
    fn stop_discovery(&mut self) -> Option<JoinHandle<DiscoveryOutcome>> {
        let running = self.discovery.take()?;
        podgrab_debug!("stopping discovery for view {}", running.arm_id);
        running.token.cancel();
        Some(running.task)
    }
}

/// Fetch, transcode, hand off. Each step starts only after the previous one
/// resolved; the first failure ends the job.
pub(crate) async fn run_conversion(
    services: &EngineServices,
    settings: &TranscodeSettings,
    arm_id: ArmId,
    url: &str,
    file_name: String,
    events: &mpsc::UnboundedSender<EngineEvent>,
) -> Result<ConversionReport, EngineError> {
    let _ = events.send(EngineEvent::ConversionStep {
        arm_id,
        step: ConversionStep::Fetching,
    });
    let input = services.fetcher.fetch(url).await?;
    let input_bytes = input.bytes.len() as u64;

    let _ = events.send(EngineEvent::ConversionStep {
        arm_id,
        step: ConversionStep::Transcoding,
    });
    let transcoder = services.transcoder.as_ref();
    transcoder.load().await?;
    transcoder
        .write_file(&settings.input_name, Bytes::from(input.bytes))
        .await?;
    let output = async {
        transcoder.run(&settings.conversion_args()).await?;
        transcoder.read_file(&settings.output_name).await
    }
    .await;
    for name in [&settings.input_name, &settings.output_name] {
        if let Err(err) = transcoder.remove_file(name).await {
            podgrab_debug!("could not remove scratch file {}: {}", name, err);
        }
    }
    let output = output?;

    let artifact = Artifact::new(output, OUTPUT_MIME);
    let report = ConversionReport {
        file_name: file_name.clone(),
        input_bytes,
        output_bytes: artifact.bytes().len() as u64,
        blob_url: artifact.blob_url(),
    };
    services.sink.submit(DownloadRequest {
        source: DownloadSource::Memory(artifact),
        suggested_file_name: file_name,
    })?;
    podgrab_info!(
        "converted {} ({} -> {} bytes) as {}",
        url,
        report.input_bytes,
        report.output_bytes,
        report.file_name
    );
    Ok(report)
}
