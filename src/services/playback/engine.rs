use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::PlaybackConfig;
use crate::services::common::Property;

use super::advance::{self, AdvanceDetector, AdvanceSignal};
use super::handle::{MediaHandle, PlayerErrorEvent};
use super::reconcile::{self, ReconcileOutcome, Supersession};
use super::sampler::SnapshotSampler;
use super::sync::{IntentSync, TransportCorrection};
use super::types::{MediaId, MediaItem, PlaybackIntent, PlaybackTarget, PlayerSnapshot, Volume};

/// Playback engine with reactive property-based state.
///
/// Owns the binding between application intent (current item, play/pause,
/// volume, mute) and an external media player handle: selecting an item
/// spawns a reconciliation chain, an adaptive poll keeps a status snapshot
/// fresh, and completion or unplayable items surface as advance signals
/// for the surrounding application's queue.
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    pub(crate) config: PlaybackConfig,
    pub(crate) status: Property<PlayerSnapshot>,
    pub(crate) playing: Property<bool>,
    pub(crate) volume: Property<Volume>,
    pub(crate) muted: Property<bool>,
    pub(crate) current_item: Property<Option<MediaItem>>,
    pub(crate) target: Property<Option<PlaybackTarget>>,
    pub(crate) error_flag: Property<bool>,
    handle: Mutex<Option<Arc<dyn MediaHandle>>>,
    generation: watch::Sender<u64>,
    advance_tx: broadcast::Sender<AdvanceSignal>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PlaybackEngine {
    /// Create an engine with the given configuration.
    ///
    /// No background work runs until a handle is attached.
    pub fn new(config: PlaybackConfig) -> Self {
        info!("Starting playback engine");

        let (generation, _) = watch::channel(0);
        let (advance_tx, _) = broadcast::channel(32);

        Self {
            inner: Arc::new(EngineInner {
                config,
                status: Property::new(PlayerSnapshot::default()),
                playing: Property::new(false),
                volume: Property::new(Volume::default()),
                muted: Property::new(false),
                current_item: Property::new(None),
                target: Property::new(None),
                error_flag: Property::new(false),
                handle: Mutex::new(None),
                generation,
                advance_tx,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Attach a mounted embed.
    ///
    /// Starts the snapshot sampler, the intent sync loop, and the error
    /// listener, and re-reconciles the current target against the new
    /// embed (the embed may mount after an item was already selected).
    #[instrument(skip_all)]
    pub fn attach_handle(&self, handle: Arc<dyn MediaHandle>) {
        self.inner.abort_tasks();

        let errors = handle.error_events();
        {
            let mut slot = self
                .inner
                .handle
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *slot = Some(handle);
        }

        let weak = Arc::downgrade(&self.inner);
        let tasks = vec![
            SnapshotSampler::start(weak.clone()),
            tokio::spawn(Self::run_sync_loop(weak.clone())),
            tokio::spawn(Self::run_error_listener(weak, errors)),
        ];
        self.inner.store_tasks(tasks);

        debug!("Handle attached");

        if let Some(target) = self.inner.target.get() {
            self.inner.spawn_reconcile(target);
        }
    }

    /// Detach the embed, stopping all polling and pending corrections.
    pub fn detach_handle(&self) {
        self.inner.abort_tasks();

        let mut slot = self
            .inner
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        drop(slot);

        self.inner.status.set(PlayerSnapshot::default());
        debug!("Handle detached");
    }

    /// Select the item to play, or `None` to unload.
    ///
    /// Supersedes any in-flight reconciliation chain and clears the error
    /// flag. Unloading still reconciles, toward the empty identifier, so
    /// the embed stops playing the previous media.
    pub fn set_current_item(&self, item: Option<MediaItem>) {
        self.inner.error_flag.set(false);

        let target = match &item {
            Some(item) => {
                // Selecting an item implies the user wants to hear it;
                // without this the sync loop would pause what the
                // reconciler just started.
                self.inner.playing.set(true);
                PlaybackTarget::new(item.id.clone(), item.start)
            }
            None => {
                self.inner.playing.set(false);
                PlaybackTarget::new(MediaId::default(), Duration::ZERO)
            }
        };

        debug!(media = %target.media_id, offset_secs = target.start_offset.as_secs_f64(), "Current item changed");

        self.inner.current_item.set(item);
        self.inner.target.set(Some(target.clone()));
        self.inner.spawn_reconcile(target);
    }

    /// Seek within the current item to an absolute media offset.
    ///
    /// No-op when nothing is selected. Seeking implies the user wants to
    /// hear the result, so intent flips to playing.
    pub fn seek(&self, offset: Duration) {
        let Some(item) = self.inner.current_item.get() else {
            return;
        };

        self.set_playing(true);

        let target = PlaybackTarget::new(item.id.clone(), offset);
        self.inner.target.set(Some(target.clone()));
        self.inner.spawn_reconcile(target);
    }

    /// Seek to a fraction (0.0–1.0) of the current item.
    pub fn seek_fraction(&self, fraction: f64) {
        let Some(item) = self.inner.current_item.get() else {
            return;
        };

        let offset = item.start + item.duration().mul_f64(fraction.clamp(0.0, 1.0));
        self.seek(offset);
    }

    /// Set whether playback should be running; pushed to the embed
    /// immediately.
    pub fn set_playing(&self, playing: bool) {
        self.inner.playing.set(playing);

        if let Some(handle) = self.inner.handle() {
            tokio::spawn(async move {
                let result = if playing {
                    handle.play().await
                } else {
                    handle.pause().await
                };
                if let Err(e) = result {
                    warn!("Transport command failed: {e}");
                }
            });
        }
    }

    /// Toggle play/pause.
    pub fn toggle_play(&self) {
        self.set_playing(!self.inner.playing.get());
    }

    /// Set the desired volume; pushed to the embed immediately.
    pub fn set_volume(&self, volume: Volume) {
        self.inner.volume.set(volume);

        if let Some(handle) = self.inner.handle() {
            tokio::spawn(async move {
                if let Err(e) = handle.set_volume(volume).await {
                    warn!("Volume command failed: {e}");
                }
            });
        }
    }

    /// Set the desired mute state; pushed to the embed immediately.
    pub fn set_muted(&self, muted: bool) {
        self.inner.muted.set(muted);

        if let Some(handle) = self.inner.handle() {
            tokio::spawn(async move {
                let result = if muted {
                    handle.mute().await
                } else {
                    handle.unmute().await
                };
                if let Err(e) = result {
                    warn!("Mute command failed: {e}");
                }
            });
        }
    }

    /// Request a user-initiated advance by `count` queue entries.
    pub fn skip(&self, count: u32) {
        self.inner.emit_advance(AdvanceSignal::user_skip(count));
    }

    /// Current status snapshot.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.inner.status.get()
    }

    /// Stream of status snapshots, one per poll tick.
    pub fn snapshot_monitored(&self) -> impl Stream<Item = PlayerSnapshot> + Send {
        self.inner.status.watch()
    }

    /// Whether intent says playback should be running.
    pub fn playing(&self) -> bool {
        self.inner.playing.get()
    }

    /// Stream of play/pause intent changes.
    pub fn playing_monitored(&self) -> impl Stream<Item = bool> + Send {
        self.inner.playing.watch()
    }

    /// Desired volume.
    pub fn volume(&self) -> Volume {
        self.inner.volume.get()
    }

    /// Stream of volume intent changes, including embed-originated ones.
    pub fn volume_monitored(&self) -> impl Stream<Item = Volume> + Send {
        self.inner.volume.watch()
    }

    /// Desired mute state.
    pub fn muted(&self) -> bool {
        self.inner.muted.get()
    }

    /// Stream of mute intent changes, including embed-originated ones.
    pub fn muted_monitored(&self) -> impl Stream<Item = bool> + Send {
        self.inner.muted.watch()
    }

    /// The currently selected item, if any.
    pub fn current_item(&self) -> Option<MediaItem> {
        self.inner.current_item.get()
    }

    /// Combined transport and audio intent.
    pub fn intent(&self) -> PlaybackIntent {
        self.inner.intent()
    }

    /// Whether the embed has reported a playback error that has not been
    /// cleared by a successful reconciliation yet.
    pub fn error_flagged(&self) -> bool {
        self.inner.error_flag.get()
    }

    /// Fraction of the current item played, 0.0–1.0.
    ///
    /// Zero while no item is selected or the embed still has different
    /// media loaded.
    pub fn progress(&self) -> f64 {
        let Some(item) = self.inner.current_item.get() else {
            return 0.0;
        };

        let snapshot = self.inner.status.get();
        if snapshot.current_media != item.id {
            return 0.0;
        }

        advance::progress(&item, &snapshot)
    }

    /// Subscribe to queue advancement requests.
    pub fn advance_signals(&self) -> broadcast::Receiver<AdvanceSignal> {
        self.inner.advance_tx.subscribe()
    }

    async fn run_sync_loop(weak: Weak<EngineInner>) {
        let Some(engine) = weak.upgrade() else {
            return;
        };

        // Hold a clone of the property, not the engine: the stream must not
        // keep the engine alive or borrow the upgraded Arc.
        let status = engine.status.clone();
        let mut detector = AdvanceDetector::new(engine.config.clone());
        drop(engine);

        let mut snapshots = Box::pin(status.watch());
        let mut sync = IntentSync::new();

        while let Some(snapshot) = snapshots.next().await {
            let Some(engine) = weak.upgrade() else {
                break;
            };

            let correction = sync.apply(&snapshot, &engine.playing, &engine.volume, &engine.muted);
            if let Some(correction) = correction {
                if let Some(handle) = engine.handle() {
                    let result = match correction {
                        TransportCorrection::Play => handle.play().await,
                        TransportCorrection::Pause => handle.pause().await,
                    };
                    if let Err(e) = result {
                        warn!("Transport correction failed: {e}");
                    }
                }
            }

            let item = engine.current_item.get();
            let target = engine.target.get();
            let intent = engine.intent();
            if let Some(signal) = detector.evaluate(
                item.as_ref(),
                target.as_ref(),
                &snapshot,
                &intent,
                engine.error_flag.get(),
            ) {
                engine.emit_advance(signal);
            }

            drop(engine);
        }

        debug!("Sync loop ended");
    }

    async fn run_error_listener(
        weak: Weak<EngineInner>,
        mut events: broadcast::Receiver<PlayerErrorEvent>,
    ) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Some(engine) = weak.upgrade() else {
                        break;
                    };
                    warn!(code = event.code, "Embed reported a playback error");
                    engine.error_flag.set(true);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Error listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        debug!("Error listener ended");
    }
}

impl EngineInner {
    pub(crate) fn handle(&self) -> Option<Arc<dyn MediaHandle>> {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn intent(&self) -> PlaybackIntent {
        PlaybackIntent {
            playing: self.playing.get(),
            volume: self.volume.get(),
            muted: self.muted.get(),
        }
    }

    fn emit_advance(&self, signal: AdvanceSignal) {
        debug!(?signal, "Requesting queue advance");
        let _ = self.advance_tx.send(signal);
    }

    fn next_generation(&self) -> u64 {
        let mut generation = 0;
        self.generation.send_modify(|value| {
            *value += 1;
            generation = *value;
        });
        generation
    }

    /// Start a reconciliation chain for the target, invalidating any chain
    /// still in flight for a previous target.
    fn spawn_reconcile(self: &Arc<Self>, target: PlaybackTarget) {
        let generation = self.next_generation();
        let rx = self.generation.subscribe();
        let weak = Arc::downgrade(self);
        let config = self.config.clone();

        tokio::spawn(async move {
            let lookup = {
                let weak = weak.clone();
                move || weak.upgrade().and_then(|engine| engine.handle())
            };

            let (outcome, verified) =
                reconcile::drive(lookup, target, config, Some(Supersession { rx, generation }))
                    .await;

            match outcome {
                ReconcileOutcome::Converged => {
                    // A chain that converged only because no handle was
                    // mounted proved nothing about the media; the error
                    // flag stays.
                    if verified {
                        if let Some(engine) = weak.upgrade() {
                            engine.error_flag.set(false);
                        }
                    }
                }
                ReconcileOutcome::Failed(reason) => {
                    // Not fatal: the sync loop keeps watching, and the
                    // detector decides whether the item warrants a skip.
                    warn!("Reconciliation failed: {reason}");
                }
                ReconcileOutcome::Superseded => {}
            }
        });
    }

    fn store_tasks(&self, new_tasks: Vec<JoinHandle<()>>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        *tasks = new_tasks;
    }

    fn abort_tasks(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
