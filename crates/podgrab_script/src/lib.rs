//! Content-script host for podcast episode pages.
//!
//! Glues the pure pipeline in `podgrab_core` to the async engine in
//! `podgrab_engine`: page events go in as messages, effects come out as engine
//! commands and presenter calls.
mod effects;
pub mod logging;
mod presenter;
mod script;

pub use logging::{initialize as initialize_logging, LogDestination};
pub use presenter::{HeadlessPresenter, Presenter, Toast, ToastBoard};
pub use script::ContentScript;
