use crate::{
    episode_filename, AppState, ArmId, AudioSource, ConversionStep, Effect, FormatHint,
    Navigation, Notice, PipelineState, TitleCandidates, Msg,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded { url } => match state.observer_mut().load(&url) {
            Navigation::Arm => arm(&mut state),
            Navigation::Unchanged | Navigation::Ignored => Vec::new(),
        },
        Msg::PageMutated { url } => match state.observer_mut().observe(&url) {
            Navigation::Arm => arm(&mut state),
            Navigation::Unchanged | Navigation::Ignored => Vec::new(),
        },
        Msg::DiscoveryTick { arm_id, audio_url } => discovery_tick(&mut state, arm_id, audio_url),
        Msg::DownloadClicked { titles } => download_clicked(&mut state, &titles),
        Msg::ConversionStep { arm_id, step } => {
            if is_current_conversion(&state, arm_id) {
                let notice = match step {
                    ConversionStep::Fetching => Notice::FetchingInput,
                    ConversionStep::Transcoding => Notice::Transcoding,
                };
                vec![Effect::Notify(notice)]
            } else {
                Vec::new()
            }
        }
        Msg::ConversionFinished { arm_id, result } => {
            if !is_current_conversion(&state, arm_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(()) => {
                    state.transition(PipelineState::Done);
                    vec![Effect::Notify(Notice::ConversionComplete)]
                }
                Err(_) => {
                    state.transition(PipelineState::Failed);
                    vec![Effect::Notify(Notice::ConversionFailed)]
                }
            }
        }
        Msg::DownloadRejected { arm_id, .. } => {
            if arm_id == state.arm_id() {
                vec![Effect::Notify(Notice::DownloadFailed)]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

/// Starts a fresh page view. The previous poller is cancelled before the new
/// one is requested so two SEARCHING loops never overlap.
fn arm(state: &mut AppState) -> Vec<Effect> {
    let previous = state.arm_id();
    let was_searching = matches!(state.pipeline(), PipelineState::Searching { .. });
    let arm_id = state.arm();

    let mut effects = Vec::with_capacity(3);
    if was_searching {
        effects.push(Effect::CancelDiscovery { arm_id: previous });
    }
    effects.push(Effect::RemoveAffordance);
    let policy = state.settings().discovery;
    // A zero budget has nothing to poll for.
    if policy.max_attempts == 0 {
        state.transition(PipelineState::NotFound);
        return effects;
    }
    effects.push(Effect::StartDiscovery { arm_id, policy });
    effects
}

fn discovery_tick(state: &mut AppState, arm_id: ArmId, audio_url: Option<String>) -> Vec<Effect> {
    if arm_id != state.arm_id() || !matches!(state.pipeline(), PipelineState::Searching { .. }) {
        return Vec::new();
    }

    let attempts = state.record_attempt();
    // An element without a usable src keeps us searching.
    match audio_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            state.capture(AudioSource::new(url));
            vec![Effect::CancelDiscovery { arm_id }]
        }
        None if attempts >= state.settings().discovery.max_attempts => {
            state.transition(PipelineState::NotFound);
            vec![Effect::CancelDiscovery { arm_id }]
        }
        None => Vec::new(),
    }
}

fn download_clicked(state: &mut AppState, titles: &TitleCandidates) -> Vec<Effect> {
    match state.pipeline() {
        PipelineState::Converting => return vec![Effect::Notify(Notice::ConversionInProgress)],
        PipelineState::Ready | PipelineState::Done | PipelineState::Failed => {}
        PipelineState::Idle | PipelineState::Searching { .. } | PipelineState::NotFound => {
            return vec![Effect::Notify(Notice::SourceMissing)];
        }
    }

    let Some(source) = state.source().cloned() else {
        return vec![Effect::Notify(Notice::SourceMissing)];
    };
    let arm_id = state.arm_id();
    let file_name = episode_filename(titles, &state.settings().default_title);

    match source.hint {
        FormatHint::RequiresTranscode => {
            state.transition(PipelineState::Converting);
            vec![
                Effect::Notify(Notice::TranscodeDetected),
                Effect::Convert {
                    arm_id,
                    url: source.url,
                    file_name,
                },
            ]
        }
        FormatHint::RawDownloadable => {
            state.transition(PipelineState::Done);
            vec![
                Effect::Download {
                    arm_id,
                    url: source.url,
                    file_name,
                },
                Effect::Notify(Notice::DownloadStarted),
            ]
        }
    }
}

fn is_current_conversion(state: &AppState, arm_id: ArmId) -> bool {
    arm_id == state.arm_id() && state.pipeline() == PipelineState::Converting
}
