use std::sync::Arc;
use std::time::Duration;

use podgrab_core::{
    update, AppState, Effect, Msg, Notice, PipelineError, PipelineState, ScriptSettings,
    TitleCandidates,
};
use podgrab_engine::{
    DownloadSink, EngineConfig, EngineHandle, EngineServices, LivePage, PageProbe,
};
use podgrab_logging::{podgrab_debug, podgrab_warn, set_page_view};

use crate::effects::{map_event, EffectRunner};
use crate::presenter::Presenter;

/// Content-script host: owns the pipeline state, feeds it page and engine
/// messages and carries out the resulting effects.
pub struct ContentScript<P: Presenter> {
    state: AppState,
    engine: EngineHandle,
    page: Arc<LivePage>,
    presenter: P,
}

impl<P: Presenter> ContentScript<P> {
    pub fn new(
        settings: ScriptSettings,
        engine: EngineHandle,
        page: Arc<LivePage>,
        presenter: P,
    ) -> Self {
        Self {
            state: AppState::with_settings(settings),
            engine,
            page,
            presenter,
        }
    }

    /// Spawns the standard engine (reqwest + ffmpeg) on the current runtime.
    pub fn start(
        settings: ScriptSettings,
        config: EngineConfig,
        sink: Arc<dyn DownloadSink>,
        page: Arc<LivePage>,
        presenter: P,
    ) -> Self {
        let probe: Arc<dyn PageProbe> = page.clone();
        let services = EngineServices::standard(&config, sink, probe);
        let engine = EngineHandle::spawn(config, services);
        Self::new(settings, engine, page, presenter)
    }

    /// The script was injected into the current page.
    pub fn injected(&mut self) {
        let url = self.page.url();
        self.dispatch(Msg::PageLoaded { url });
    }

    /// One coalesced batch of DOM mutations.
    pub fn mutation_batch(&mut self) {
        let url = self.page.url();
        self.dispatch(Msg::PageMutated { url });
    }

    /// The user activated the download button.
    pub fn click(&mut self) {
        let titles = self.page.titles();
        self.dispatch(Msg::DownloadClicked {
            titles: TitleCandidates {
                episode_title: titles.episode_title,
                document_title: titles.document_title,
            },
        });
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let previous_arm = self.state.arm_id();
        let previous_pipeline = self.state.pipeline();

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if self.state.arm_id() != previous_arm {
            set_page_view(self.state.arm_id());
        }
        self.log_failures(previous_pipeline, &effects);

        EffectRunner {
            engine: &self.engine,
            presenter: &mut self.presenter,
            toast_duration: self.state.settings().toast_duration,
        }
        .run(effects);

        if was_dirty {
            let view = self.state.view();
            // The button sits next to the title element; no title, no button.
            let anchored = self.page.snapshot().has_title_anchor;
            if !anchored && view.affordance.is_some() {
                podgrab_debug!("no title element to place the button next to");
            }
            self.presenter
                .render(view.affordance.as_ref().filter(|_| anchored));
        }
    }

    fn log_failures(&self, previous: PipelineState, effects: &[Effect]) {
        if self.state.pipeline() == PipelineState::NotFound && previous != PipelineState::NotFound
        {
            let error = PipelineError::DiscoveryTimeout {
                attempts: self.state.settings().discovery.max_attempts,
            };
            podgrab_warn!("{}", error);
        }
        if effects
            .iter()
            .any(|effect| matches!(effect, Effect::Notify(Notice::SourceMissing)))
        {
            podgrab_warn!("{}", PipelineError::MissingSource);
        }
    }

    /// Waits for the next engine event and dispatches it. Returns `false`
    /// once the engine is gone.
    pub async fn pump(&mut self) -> bool {
        match self.engine.next_event().await {
            Some(event) => {
                self.dispatch(map_event(event));
                true
            }
            None => false,
        }
    }

    /// Dispatches engine events until none arrives for `quiet`.
    pub async fn run_until_idle(&mut self, quiet: Duration) {
        loop {
            match tokio::time::timeout(quiet, self.engine.next_event()).await {
                Ok(Some(event)) => self.dispatch(map_event(event)),
                Ok(None) => return,
                Err(_) => {
                    podgrab_debug!("engine idle in state {:?}", self.state.pipeline());
                    return;
                }
            }
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn page(&self) -> &Arc<LivePage> {
        &self.page
    }
}
