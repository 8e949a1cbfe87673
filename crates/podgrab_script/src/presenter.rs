use std::collections::VecDeque;
use std::time::Duration;

use podgrab_core::AffordanceView;
use podgrab_logging::podgrab_info;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toast {
    pub message: &'static str,
    pub duration: Duration,
}

/// Passive UI surface. Never consulted for pipeline state.
pub trait Presenter {
    /// Places or updates the button next to the title element.
    fn render(&mut self, affordance: Option<&AffordanceView>);
    fn remove_affordance(&mut self);
    fn notify(&mut self, toast: Toast);
}

/// Toasts on screen, each dismissed once its duration has elapsed.
#[derive(Debug, Default)]
pub struct ToastBoard {
    toasts: VecDeque<(Instant, Toast)>,
}

impl ToastBoard {
    pub fn push(&mut self, toast: Toast, now: Instant) {
        self.toasts.push_back((now + toast.duration, toast));
    }

    /// Drops toasts whose time is up and returns the remaining messages.
    pub fn visible(&mut self, now: Instant) -> Vec<&'static str> {
        self.toasts.retain(|(expires, _)| *expires > now);
        self.toasts.iter().map(|(_, toast)| toast.message).collect()
    }
}

/// Presenter without a DOM: keeps the current button and the toast board in
/// memory and mirrors every change to the log.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    affordance: Option<AffordanceView>,
    toasts: ToastBoard,
    history: Vec<&'static str>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn affordance(&self) -> Option<&AffordanceView> {
        self.affordance.as_ref()
    }

    pub fn visible_toasts(&mut self) -> Vec<&'static str> {
        self.toasts.visible(Instant::now())
    }

    /// Every toast message ever shown, oldest first.
    pub fn history(&self) -> &[&'static str] {
        &self.history
    }
}

impl Presenter for HeadlessPresenter {
    fn render(&mut self, affordance: Option<&AffordanceView>) {
        if let Some(view) = affordance {
            podgrab_info!("button: {} {}", view.icon, view.label);
        }
        self.affordance = affordance.copied();
    }

    fn remove_affordance(&mut self) {
        self.affordance = None;
    }

    fn notify(&mut self, toast: Toast) {
        podgrab_info!("toast: {}", toast.message);
        self.history.push(toast.message);
        self.toasts.push(toast, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn toasts_dismiss_after_their_duration() {
        let mut board = ToastBoard::default();
        let start = Instant::now();
        board.push(
            Toast {
                message: "first",
                duration: Duration::from_secs(3),
            },
            start,
        );
        board.push(
            Toast {
                message: "second",
                duration: Duration::from_secs(3),
            },
            start + Duration::from_secs(2),
        );

        assert_eq!(board.visible(start + Duration::from_secs(1)), vec!["first", "second"]);
        assert_eq!(board.visible(start + Duration::from_secs(3)), vec!["second"]);
        assert!(board.visible(start + Duration::from_secs(5)).is_empty());
    }
}
