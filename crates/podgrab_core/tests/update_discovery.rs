use std::sync::Once;

use podgrab_core::{
    update, AffordanceStatus, AppState, DiscoveryPolicy, Effect, FormatHint, Msg, PipelineState,
    ScriptSettings,
};
use pretty_assertions::assert_eq;

const EPISODE: &str = "https://www.xiaoyuzhoufm.com/episode/65a1b2c3";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(podgrab_logging::initialize_for_tests);
}

fn armed() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::PageLoaded {
            url: EPISODE.to_string(),
        },
    );
    state
}

fn tick(state: AppState, audio_url: Option<&str>) -> (AppState, Vec<Effect>) {
    let arm_id = state.arm_id();
    update(
        state,
        Msg::DiscoveryTick {
            arm_id,
            audio_url: audio_url.map(ToOwned::to_owned),
        },
    )
}

#[test]
fn page_load_arms_searching() {
    init_logging();
    let (mut state, effects) = update(
        AppState::new(),
        Msg::PageLoaded {
            url: EPISODE.to_string(),
        },
    );

    assert_eq!(state.pipeline(), PipelineState::Searching { attempts: 0 });
    assert_eq!(
        effects,
        vec![
            Effect::RemoveAffordance,
            Effect::StartDiscovery {
                arm_id: 1,
                policy: DiscoveryPolicy::default(),
            },
        ]
    );
    let affordance = state.view().affordance.expect("affordance while searching");
    assert_eq!(affordance.status, AffordanceStatus::Searching);
    assert_eq!(affordance.label, "looking for audio");
    assert!(!affordance.actionable);
    assert!(state.consume_dirty());
}

#[test]
fn non_episode_page_stays_idle() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::PageLoaded {
            url: "https://www.xiaoyuzhoufm.com/".to_string(),
        },
    );
    assert_eq!(state.pipeline(), PipelineState::Idle);
    assert!(state.view().affordance.is_none());
    assert!(effects.is_empty());
}

#[test]
fn found_element_moves_to_ready_and_stops_polling() {
    init_logging();
    let state = armed();
    let (state, effects) = tick(state, None);
    assert!(effects.is_empty());

    let (state, effects) = tick(state, Some("https://media.example.com/a.m4a"));
    assert_eq!(state.pipeline(), PipelineState::Ready);
    assert_eq!(effects, vec![Effect::CancelDiscovery { arm_id: 1 }]);
    let source = state.source().expect("captured source");
    assert_eq!(source.hint, FormatHint::RequiresTranscode);
    assert_eq!(state.view().affordance.unwrap().label, "download audio");

    // Late ticks after READY change nothing.
    let before = state.clone();
    let (state, effects) = tick(state, Some("https://media.example.com/b.mp3"));
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn empty_src_keeps_searching() {
    init_logging();
    let (state, effects) = tick(armed(), Some("   "));
    assert_eq!(state.pipeline(), PipelineState::Searching { attempts: 1 });
    assert!(effects.is_empty());
}

#[test]
fn not_found_after_exactly_the_attempt_budget() {
    init_logging();
    let settings = ScriptSettings {
        discovery: DiscoveryPolicy {
            max_attempts: 4,
            ..DiscoveryPolicy::default()
        },
        ..ScriptSettings::default()
    };
    let (mut state, _) = update(
        AppState::with_settings(settings),
        Msg::PageLoaded {
            url: EPISODE.to_string(),
        },
    );

    for attempt in 1..4 {
        let (next, effects) = tick(state, None);
        assert_eq!(next.pipeline(), PipelineState::Searching { attempts: attempt });
        assert!(effects.is_empty());
        state = next;
    }

    let (state, effects) = tick(state, None);
    assert_eq!(state.pipeline(), PipelineState::NotFound);
    assert_eq!(effects, vec![Effect::CancelDiscovery { arm_id: 1 }]);
    let affordance = state.view().affordance.unwrap();
    assert_eq!(affordance.status, AffordanceStatus::Error);
    assert_eq!(affordance.label, "audio not found");

    // The budget is never exceeded: NOT_FOUND absorbs further ticks.
    let (state, effects) = tick(state, Some("https://media.example.com/a.mp3"));
    assert_eq!(state.pipeline(), PipelineState::NotFound);
    assert!(effects.is_empty());
}

#[test]
fn zero_attempt_budget_is_not_found_without_polling() {
    init_logging();
    let settings = ScriptSettings {
        discovery: DiscoveryPolicy {
            max_attempts: 0,
            ..DiscoveryPolicy::default()
        },
        ..ScriptSettings::default()
    };
    let (mut state, effects) = update(
        AppState::with_settings(settings),
        Msg::PageLoaded {
            url: EPISODE.to_string(),
        },
    );

    assert_eq!(state.arm_id(), 1);
    assert_eq!(state.pipeline(), PipelineState::NotFound);
    assert_eq!(effects, vec![Effect::RemoveAffordance]);
    assert!(state.consume_dirty());
    assert_eq!(state.view().affordance.unwrap().label, "audio not found");

    // Navigating on re-arms into NOT_FOUND again, with nothing left to cancel.
    let (state, effects) = update(
        state,
        Msg::PageMutated {
            url: "https://www.xiaoyuzhoufm.com/episode/65ffffff".to_string(),
        },
    );
    assert_eq!(state.arm_id(), 2);
    assert_eq!(state.pipeline(), PipelineState::NotFound);
    assert_eq!(effects, vec![Effect::RemoveAffordance]);
}

#[test]
fn element_on_last_attempt_wins_over_not_found() {
    init_logging();
    let mut state = armed();
    for _ in 0..9 {
        state = tick(state, None).0;
    }
    let (state, _) = tick(state, Some("https://media.example.com/a.mp3"));
    assert_eq!(state.pipeline(), PipelineState::Ready);
}

#[test]
fn navigation_mid_search_cancels_and_restarts_counter() {
    init_logging();
    let state = armed();
    let (state, _) = tick(state, None);
    let (state, _) = tick(state, None);

    let (state, effects) = update(
        state,
        Msg::PageMutated {
            url: "https://www.xiaoyuzhoufm.com/episode/other".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::CancelDiscovery { arm_id: 1 },
            Effect::RemoveAffordance,
            Effect::StartDiscovery {
                arm_id: 2,
                policy: DiscoveryPolicy::default(),
            },
        ]
    );
    assert_eq!(state.pipeline(), PipelineState::Searching { attempts: 0 });

    // Ticks from the superseded view are ignored.
    let (state, effects) = update(
        state,
        Msg::DiscoveryTick {
            arm_id: 1,
            audio_url: Some("https://media.example.com/old.mp3".to_string()),
        },
    );
    assert_eq!(state.pipeline(), PipelineState::Searching { attempts: 0 });
    assert!(effects.is_empty());
}

#[test]
fn repeated_mutations_on_same_url_do_not_rearm() {
    init_logging();
    let state = armed();
    let (state, effects) = update(
        state,
        Msg::PageMutated {
            url: EPISODE.to_string(),
        },
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::PageMutated {
            url: EPISODE.to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.arm_id(), 1);
}

#[test]
fn rearm_from_ready_does_not_cancel_finished_poller() {
    init_logging();
    let (state, _) = tick(armed(), Some("https://media.example.com/a.mp3"));
    let (state, effects) = update(
        state,
        Msg::PageMutated {
            url: "https://www.xiaoyuzhoufm.com/episode/next".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::RemoveAffordance,
            Effect::StartDiscovery {
                arm_id: 2,
                policy: DiscoveryPolicy::default(),
            },
        ]
    );
    assert!(state.source().is_none());
}
