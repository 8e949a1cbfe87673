use crate::{ArmId, PipelineState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffordanceStatus {
    Searching,
    Ready,
    Busy,
    Error,
}

/// Label and icon of the injected download button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffordanceView {
    pub status: AffordanceStatus,
    pub icon: &'static str,
    pub label: &'static str,
    pub actionable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub arm_id: ArmId,
    pub pipeline: PipelineState,
    pub affordance: Option<AffordanceView>,
    pub audio_url: Option<String>,
    pub dirty: bool,
}

/// Pure mapping from pipeline state to the button; `None` while unarmed.
pub fn affordance_for(state: PipelineState) -> Option<AffordanceView> {
    let (status, icon, label, actionable) = match state {
        PipelineState::Idle => return None,
        PipelineState::Searching { .. } => {
            (AffordanceStatus::Searching, "🔍", "looking for audio", false)
        }
        PipelineState::Ready | PipelineState::Done => {
            (AffordanceStatus::Ready, "⬇️", "download audio", true)
        }
        PipelineState::NotFound => (AffordanceStatus::Error, "⚠️", "audio not found", false),
        PipelineState::Converting => (AffordanceStatus::Busy, "⏳", "converting to MP3", false),
        PipelineState::Failed => (AffordanceStatus::Error, "⚠️", "conversion failed", true),
    };
    Some(AffordanceView {
        status,
        icon,
        label,
        actionable,
    })
}
