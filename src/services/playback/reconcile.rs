//! Retrying state-convergence protocol.
//!
//! Drives a media handle toward a [`PlaybackTarget`]: right media loaded,
//! playhead near the start offset, playback underway. Embed calls are
//! asynchronous and unreliable, so each attempt re-observes the embed and
//! issues at most one corrective action; re-running after a delay either
//! converges or exhausts the attempt budget. Every step is idempotent: an
//! action is only issued while the corresponding state is still wrong.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, warn};

use crate::config::PlaybackConfig;

use super::handle::MediaHandle;
use super::types::{MediaId, PlaybackTarget};

/// Reason a reconciliation chain gave up on its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReconcileFailure {
    /// The attempt budget ran out before the embed converged
    #[error("too many tries")]
    TooManyTries,

    /// The target went stale without the embed reaching an active state
    #[error("took too long")]
    TookTooLong,
}

/// Phase of the convergence state machine after the latest attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcileStep {
    /// No attempt has run yet
    #[default]
    Idle,

    /// A load for the target media was issued
    Loading,

    /// A corrective seek was issued
    Seeking,

    /// A start-at-offset command was issued
    Starting,

    /// The embed matches the target
    Converged,

    /// The chain gave up
    Failed(ReconcileFailure),
}

impl ReconcileStep {
    /// Whether the chain is finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::Failed(_))
    }
}

/// Outcome of driving a reconciliation chain to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The embed reached the target state
    Converged,

    /// The chain gave up for the given reason
    Failed(ReconcileFailure),

    /// A newer target replaced this one; the chain was abandoned silently
    Superseded,
}

/// Guard a chain checks before every attempt to detect target supersession.
///
/// The generation counter is bumped whenever a new target is issued; a
/// chain holding an older generation must not issue further corrective
/// actions.
pub(crate) struct Supersession {
    pub(crate) rx: watch::Receiver<u64>,
    pub(crate) generation: u64,
}

impl Supersession {
    fn is_superseded(&self) -> bool {
        *self.rx.borrow() != self.generation
    }
}

/// State machine converging a media handle on a playback target.
///
/// One call to [`tick`](Reconciler::tick) is one attempt: observe the
/// embed, issue at most one corrective action, report the new step. The
/// caller decides pacing and cancellation between ticks.
#[derive(Debug)]
pub struct Reconciler {
    target: PlaybackTarget,
    config: PlaybackConfig,
    attempt: u32,
    step: ReconcileStep,
}

impl Reconciler {
    /// Create a machine for the given target
    pub fn new(target: PlaybackTarget, config: PlaybackConfig) -> Self {
        Self {
            target,
            config,
            attempt: 0,
            step: ReconcileStep::Idle,
        }
    }

    /// The target this machine converges on
    pub fn target(&self) -> &PlaybackTarget {
        &self.target
    }

    /// Step after the latest attempt
    pub fn step(&self) -> ReconcileStep {
        self.step
    }

    /// Attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Run one reconciliation attempt against the handle.
    ///
    /// An absent handle converges immediately: with no embed mounted there
    /// is nothing to correct, and failing would only surface noise to the
    /// caller.
    pub async fn tick(&mut self, handle: Option<&Arc<dyn MediaHandle>>) -> ReconcileStep {
        if self.step.is_terminal() {
            return self.step;
        }

        let Some(handle) = handle else {
            self.step = ReconcileStep::Converged;
            return self.step;
        };

        self.attempt += 1;
        if self.attempt > self.config.max_attempts {
            self.step = ReconcileStep::Failed(ReconcileFailure::TooManyTries);
            return self.step;
        }

        let current_id = handle
            .media_url()
            .await
            .as_deref()
            .map(MediaId::from_url)
            .unwrap_or_default();

        if current_id != self.target.media_id {
            debug!(
                attempt = self.attempt,
                target = %self.target.media_id,
                current = %current_id,
                "Wrong media loaded, issuing load"
            );
            if let Err(e) = handle.load(&self.target.media_id, self.target.start_offset).await {
                warn!("Load command failed: {e}");
            }
            self.step = ReconcileStep::Loading;
            return self.step;
        }

        // An empty target means unload. With nothing to position or start,
        // a matching embed is already converged.
        if self.target.media_id.is_empty() {
            self.step = ReconcileStep::Converged;
            return self.step;
        }

        let state = handle.state().await;

        // A stale target means timers were suspended (backgrounded tab) or
        // the network is slow; strict checks would retry forever. Accept
        // any active state, fail otherwise.
        if self.target.age() > self.config.staleness_threshold() {
            self.step = if state.is_active() {
                ReconcileStep::Converged
            } else {
                ReconcileStep::Failed(ReconcileFailure::TookTooLong)
            };
            return self.step;
        }

        let position = handle.current_time().await;
        if position.abs_diff(self.target.start_offset) > self.config.seek_tolerance() {
            debug!(
                attempt = self.attempt,
                position_secs = position.as_secs_f64(),
                target_secs = self.target.start_offset.as_secs_f64(),
                "Playhead off target, issuing seek"
            );
            if let Err(e) = handle.seek_to(self.target.start_offset).await {
                warn!("Seek command failed: {e}");
            }
            self.step = ReconcileStep::Seeking;
            return self.step;
        }

        if !state.is_active() {
            debug!(attempt = self.attempt, ?state, "Embed not started, issuing start");
            if let Err(e) = handle.start_at(self.target.start_offset).await {
                warn!("Start command failed: {e}");
            }
            self.step = ReconcileStep::Starting;
            return self.step;
        }

        self.step = ReconcileStep::Converged;
        self.step
    }
}

/// Drive a chain to completion, re-resolving the handle before each
/// attempt and honoring supersession between attempts.
///
/// The second element reports whether the outcome was reached against a
/// live handle: false for the absent-handle no-op convergence, which
/// verified nothing about the embed.
pub(crate) async fn drive<F>(
    mut lookup: F,
    target: PlaybackTarget,
    config: PlaybackConfig,
    supersession: Option<Supersession>,
) -> (ReconcileOutcome, bool)
where
    F: FnMut() -> Option<Arc<dyn MediaHandle>> + Send,
{
    let retry_delay = config.retry_delay();
    let mut reconciler = Reconciler::new(target, config);

    loop {
        if let Some(guard) = &supersession {
            if guard.is_superseded() {
                debug!(target = %reconciler.target().media_id, "Target superseded, abandoning chain");
                return (ReconcileOutcome::Superseded, false);
            }
        }

        let handle = lookup();
        let verified = handle.is_some();
        match reconciler.tick(handle.as_ref()).await {
            ReconcileStep::Converged => return (ReconcileOutcome::Converged, verified),
            ReconcileStep::Failed(reason) => return (ReconcileOutcome::Failed(reason), verified),
            _ => {}
        }

        time::sleep(retry_delay).await;
    }
}

/// Drive a media handle toward a playback target.
///
/// Converges within `config.max_attempts` attempts separated by
/// `config.retry_delay()` or reports a failure; never hangs. Failures are
/// values for the caller to act on, never panics or fatal errors.
pub async fn reconcile(
    handle: Option<Arc<dyn MediaHandle>>,
    target: PlaybackTarget,
    config: &PlaybackConfig,
) -> ReconcileOutcome {
    let (outcome, _) = drive(move || handle.clone(), target, config.clone(), None).await;
    outcome
}
