use podgrab_core::{
    update, AppState, ConversionStep, Effect, Msg, Notice, PipelineError, PipelineState,
    TitleCandidates,
};
use pretty_assertions::assert_eq;

const EPISODE: &str = "https://www.xiaoyuzhoufm.com/episode/65a1b2c3";

fn ready_with(audio_url: &str) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::PageLoaded {
            url: EPISODE.to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::DiscoveryTick {
            arm_id: 1,
            audio_url: Some(audio_url.to_string()),
        },
    );
    assert_eq!(state.pipeline(), PipelineState::Ready);
    state
}

fn click(state: AppState, title: Option<&str>) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::DownloadClicked {
            titles: TitleCandidates {
                episode_title: title.map(ToOwned::to_owned),
                document_title: Some("Document Title".to_string()),
            },
        },
    )
}

#[test]
fn raw_source_downloads_original_url() {
    let url = "https://media.example.com/ep.mp3";
    let (state, effects) = click(ready_with(url), Some("A/B:C*D"));

    assert_eq!(state.pipeline(), PipelineState::Done);
    assert_eq!(
        effects,
        vec![
            Effect::Download {
                arm_id: 1,
                url: url.to_string(),
                file_name: "A_B_C_D.mp3".to_string(),
            },
            Effect::Notify(Notice::DownloadStarted),
        ]
    );
    let downloads = effects
        .iter()
        .filter(|e| matches!(e, Effect::Download { .. } | Effect::Convert { .. }))
        .count();
    assert_eq!(downloads, 1);
}

#[test]
fn m4a_source_requests_conversion() {
    let url = "https://media.example.com/ep.m4a";
    let (state, effects) = click(ready_with(url), None);

    assert_eq!(state.pipeline(), PipelineState::Converting);
    assert_eq!(
        effects,
        vec![
            Effect::Notify(Notice::TranscodeDetected),
            Effect::Convert {
                arm_id: 1,
                url: url.to_string(),
                file_name: "Document Title.mp3".to_string(),
            },
        ]
    );
    let affordance = state.view().affordance.unwrap();
    assert!(!affordance.actionable);
}

#[test]
fn second_click_while_converting_is_refused() {
    let (state, _) = click(ready_with("https://media.example.com/ep.m4a"), None);
    let (state, effects) = click(state, None);
    assert_eq!(state.pipeline(), PipelineState::Converting);
    assert_eq!(effects, vec![Effect::Notify(Notice::ConversionInProgress)]);
}

#[test]
fn conversion_steps_and_success_reach_done() {
    let (state, _) = click(ready_with("https://media.example.com/ep.m4a"), None);
    let (state, effects) = update(
        state,
        Msg::ConversionStep {
            arm_id: 1,
            step: ConversionStep::Fetching,
        },
    );
    assert_eq!(effects, vec![Effect::Notify(Notice::FetchingInput)]);
    let (state, effects) = update(
        state,
        Msg::ConversionStep {
            arm_id: 1,
            step: ConversionStep::Transcoding,
        },
    );
    assert_eq!(effects, vec![Effect::Notify(Notice::Transcoding)]);

    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            arm_id: 1,
            result: Ok(()),
        },
    );
    assert_eq!(state.pipeline(), PipelineState::Done);
    assert_eq!(effects, vec![Effect::Notify(Notice::ConversionComplete)]);
}

#[test]
fn conversion_failure_is_terminal_until_user_retriggers() {
    let (state, _) = click(ready_with("https://media.example.com/ep.m4a"), None);
    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            arm_id: 1,
            result: Err(PipelineError::EngineLoadFailure("missing".to_string())),
        },
    );
    assert_eq!(state.pipeline(), PipelineState::Failed);
    assert_eq!(effects, vec![Effect::Notify(Notice::ConversionFailed)]);

    // Engine messages never leave a terminal state.
    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            arm_id: 1,
            result: Ok(()),
        },
    );
    assert_eq!(state.pipeline(), PipelineState::Failed);
    assert!(effects.is_empty());

    // A user click is the explicit retry.
    let (state, effects) = click(state, None);
    assert_eq!(state.pipeline(), PipelineState::Converting);
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::Convert { .. })));
}

#[test]
fn click_without_source_only_notifies() {
    let (state, _) = update(
        AppState::new(),
        Msg::PageLoaded {
            url: EPISODE.to_string(),
        },
    );
    let before = state.pipeline();
    let (state, effects) = click(state, None);
    assert_eq!(state.pipeline(), before);
    assert_eq!(effects, vec![Effect::Notify(Notice::SourceMissing)]);

    let (state, effects) = click(AppState::new(), None);
    assert_eq!(state.pipeline(), PipelineState::Idle);
    assert_eq!(effects, vec![Effect::Notify(Notice::SourceMissing)]);
}

#[test]
fn stale_conversion_result_is_ignored_after_navigation() {
    let (state, _) = click(ready_with("https://media.example.com/ep.m4a"), None);
    let (state, _) = update(
        state,
        Msg::PageMutated {
            url: "https://www.xiaoyuzhoufm.com/episode/next".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            arm_id: 1,
            result: Ok(()),
        },
    );
    assert_eq!(state.pipeline(), PipelineState::Searching { attempts: 0 });
    assert!(effects.is_empty());
}

#[test]
fn rejected_download_notifies_current_view_only() {
    let (state, _) = click(ready_with("https://media.example.com/ep.mp3"), None);
    let (state, effects) = update(
        state,
        Msg::DownloadRejected {
            arm_id: 1,
            error: PipelineError::DownloadSinkFailure("closed".to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::Notify(Notice::DownloadFailed)]);
    assert_eq!(state.pipeline(), PipelineState::Done);

    let (_, effects) = update(
        state,
        Msg::DownloadRejected {
            arm_id: 9,
            error: PipelineError::DownloadSinkFailure("closed".to_string()),
        },
    );
    assert!(effects.is_empty());
}
