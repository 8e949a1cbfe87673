use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use podgrab_logging::{podgrab_debug, podgrab_info};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{ArmId, DiscoverySettings, EngineEvent, PageProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Found { attempts: u32 },
    Exhausted { attempts: u32 },
    Cancelled { attempts: u32 },
}

/// Decrements the live poller count however the loop ends.
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Polls the page for an audio element, one check per interval, at most
/// `max_attempts` times. The first check happens one interval after start.
pub(crate) async fn poll_for_audio(
    arm_id: ArmId,
    settings: DiscoverySettings,
    probe: Arc<dyn PageProbe>,
    cancel: CancellationToken,
    active: Arc<AtomicUsize>,
    events: mpsc::UnboundedSender<EngineEvent>,
) -> DiscoveryOutcome {
    let _guard = ActiveGuard::enter(active);
    let period = settings.interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts = 0;
    while attempts < settings.max_attempts {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                podgrab_debug!("discovery for view {} cancelled after {} attempts", arm_id, attempts);
                return DiscoveryOutcome::Cancelled { attempts };
            }
            _ = ticker.tick() => {}
        }
        attempts += 1;

        let audio_url = probe.audio_source().filter(|url| !url.trim().is_empty());
        let found = audio_url.is_some();
        podgrab_debug!("discovery attempt {}/{} found={}", attempts, settings.max_attempts, found);
        if events
            .send(EngineEvent::DiscoveryTick { arm_id, audio_url })
            .is_err()
        {
            return DiscoveryOutcome::Cancelled { attempts };
        }
        if found {
            return DiscoveryOutcome::Found { attempts };
        }
    }

    podgrab_info!("no audio element after {} attempts", attempts);
    DiscoveryOutcome::Exhausted { attempts }
}
