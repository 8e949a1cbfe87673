use std::time::Duration;

use podgrab_core::{ConversionStep, DiscoveryPolicy, Effect, Msg, PipelineError};
use podgrab_engine::{DiscoverySettings, EngineError, EngineEvent, EngineHandle, FailureKind};
use podgrab_logging::{podgrab_error, podgrab_info, podgrab_warn};

use crate::presenter::{Presenter, Toast};

/// Executes core effects against the engine and the presenter.
pub(crate) struct EffectRunner<'a, P: Presenter> {
    pub engine: &'a EngineHandle,
    pub presenter: &'a mut P,
    pub toast_duration: Duration,
}

impl<P: Presenter> EffectRunner<'_, P> {
    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RemoveAffordance => self.presenter.remove_affordance(),
                Effect::StartDiscovery { arm_id, policy } => {
                    self.engine.start_discovery(arm_id, map_policy(policy));
                }
                Effect::CancelDiscovery { arm_id } => self.engine.cancel_discovery(arm_id),
                Effect::Download {
                    arm_id,
                    url,
                    file_name,
                } => {
                    podgrab_info!("Download view={} file={} url={}", arm_id, file_name, url);
                    self.engine.download(arm_id, url, file_name);
                }
                Effect::Convert {
                    arm_id,
                    url,
                    file_name,
                } => {
                    podgrab_info!("Convert view={} file={} url={}", arm_id, file_name, url);
                    self.engine.convert(arm_id, url, file_name);
                }
                Effect::Notify(notice) => self.presenter.notify(Toast {
                    message: notice.text(),
                    duration: self.toast_duration,
                }),
            }
        }
    }
}

/// Translates an engine event into the core message it stands for. Failures
/// get their diagnostic log entry here, at the pipeline boundary.
pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::DiscoveryTick { arm_id, audio_url } => Msg::DiscoveryTick { arm_id, audio_url },
        EngineEvent::ConversionStep { arm_id, step } => Msg::ConversionStep {
            arm_id,
            step: map_step(step),
        },
        EngineEvent::ConversionCompleted { arm_id, result } => Msg::ConversionFinished {
            arm_id,
            result: result.map(|_| ()).map_err(|err| {
                let mapped = map_error(err);
                podgrab_error!("conversion for view {} failed: {}", arm_id, mapped);
                mapped
            }),
        },
        EngineEvent::DownloadRejected { arm_id, error } => {
            let error = map_error(error);
            podgrab_warn!("download for view {} rejected: {}", arm_id, error);
            Msg::DownloadRejected { arm_id, error }
        }
    }
}

fn map_policy(policy: DiscoveryPolicy) -> DiscoverySettings {
    DiscoverySettings {
        max_attempts: policy.max_attempts,
        interval: policy.interval,
    }
}

fn map_step(step: podgrab_engine::ConversionStep) -> ConversionStep {
    match step {
        podgrab_engine::ConversionStep::Fetching => ConversionStep::Fetching,
        podgrab_engine::ConversionStep::Transcoding => ConversionStep::Transcoding,
    }
}

fn map_error(err: EngineError) -> PipelineError {
    let message = err.to_string();
    match err.kind {
        kind if kind.is_network() => PipelineError::NetworkFailure(message),
        FailureKind::EngineLoad => PipelineError::EngineLoadFailure(message),
        FailureKind::EngineExecution | FailureKind::EngineTimeout => {
            PipelineError::EngineExecutionFailure(message)
        }
        FailureKind::Sink => PipelineError::DownloadSinkFailure(message),
        _ => PipelineError::EngineExecutionFailure(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_failures_map_onto_pipeline_taxonomy() {
        let cases = [
            (FailureKind::HttpStatus(404), "NetworkFailure"),
            (FailureKind::Timeout, "NetworkFailure"),
            (FailureKind::EngineLoad, "EngineLoadFailure"),
            (FailureKind::EngineTimeout, "EngineExecutionFailure"),
            (FailureKind::EngineExecution, "EngineExecutionFailure"),
            (FailureKind::Sink, "DownloadSinkFailure"),
        ];
        for (kind, expected) in cases {
            let mapped = map_error(EngineError::new(kind, "boom"));
            assert!(format!("{mapped:?}").starts_with(expected), "{mapped:?}");
        }
    }
}
