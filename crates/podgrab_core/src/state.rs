use crate::view_model::{affordance_for, AppViewModel};
use crate::{classify_source, FormatHint, PageObserver, ScriptSettings};

/// Identifies one page view. Every arm hands out a fresh id; 0 means never armed.
pub type ArmId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Searching {
        attempts: u32,
    },
    Ready,
    NotFound,
    Converting,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Audio location captured once per page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub url: String,
    pub hint: FormatHint,
}

impl AudioSource {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let hint = classify_source(&url);
        Self { url, hint }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: ScriptSettings,
    observer: PageObserver,
    arm_id: ArmId,
    pipeline: PipelineState,
    source: Option<AudioSource>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ScriptSettings) -> Self {
        Self {
            observer: PageObserver::new(settings.target.clone()),
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            arm_id: self.arm_id,
            pipeline: self.pipeline,
            affordance: affordance_for(self.pipeline),
            audio_url: self.source.as_ref().map(|source| source.url.clone()),
            dirty: self.dirty,
        }
    }

    pub fn settings(&self) -> &ScriptSettings {
        &self.settings
    }

    pub fn arm_id(&self) -> ArmId {
        self.arm_id
    }

    pub fn pipeline(&self) -> PipelineState {
        self.pipeline
    }

    pub fn source(&self) -> Option<&AudioSource> {
        self.source.as_ref()
    }

    pub fn last_url(&self) -> Option<&str> {
        self.observer.last_url()
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn observer_mut(&mut self) -> &mut PageObserver {
        &mut self.observer
    }

    /// Replaces the per-view state with a fresh SEARCHING pipeline.
    pub(crate) fn arm(&mut self) -> ArmId {
        self.arm_id += 1;
        self.pipeline = PipelineState::Searching { attempts: 0 };
        self.source = None;
        self.dirty = true;
        self.arm_id
    }

    /// Counts a poll that came back empty. The view does not change.
    pub(crate) fn record_attempt(&mut self) -> u32 {
        let attempts = match self.pipeline {
            PipelineState::Searching { attempts } => attempts + 1,
            _ => return 0,
        };
        self.pipeline = PipelineState::Searching { attempts };
        attempts
    }

    pub(crate) fn capture(&mut self, source: AudioSource) {
        self.source = Some(source);
        self.transition(PipelineState::Ready);
    }

    pub(crate) fn transition(&mut self, next: PipelineState) {
        if self.pipeline != next {
            self.pipeline = next;
            self.dirty = true;
        }
    }
}
