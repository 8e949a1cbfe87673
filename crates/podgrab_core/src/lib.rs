//! Podgrab core: pure pipeline state machine, page observer and view-model helpers.
mod effect;
mod error;
mod filename;
mod format;
mod msg;
mod observer;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notice};
pub use error::PipelineError;
pub use filename::{episode_filename, sanitize, TitleCandidates, DEFAULT_TITLE, TARGET_EXTENSION};
pub use format::{classify_source, FormatHint, TRANSCODE_EXTENSION};
pub use msg::{ConversionStep, Msg};
pub use observer::{Navigation, PageObserver, TargetPattern};
pub use settings::{DiscoveryPolicy, ScriptSettings};
pub use state::{AppState, ArmId, AudioSource, PipelineState};
pub use update::update;
pub use view_model::{affordance_for, AffordanceStatus, AffordanceView, AppViewModel};
