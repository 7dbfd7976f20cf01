use std::sync::Weak;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use super::engine::EngineInner;
use super::handle::MediaHandle;
use super::types::{MediaId, PlayerSnapshot};

/// Polls the media handle into immutable status snapshots.
///
/// The poll interval adapts to playback activity: fast while playing so
/// progress and seek UI stay fresh, slow while idle to keep overhead down.
/// While no item is selected the handle is not sampled at all; the
/// snapshot is the empty default until a selection appears. The sampler
/// only reads from the handle; corrective calls are the reconciler's and
/// sync layer's business.
pub(crate) struct SnapshotSampler;

impl SnapshotSampler {
    /// Start polling.
    ///
    /// The task ends on its own when the engine is dropped or the handle
    /// is detached; the timer never outlives the handle it samples.
    pub(crate) fn start(engine: Weak<EngineInner>) -> JoinHandle<()> {
        tokio::spawn(Self::run(engine))
    }

    async fn run(weak: Weak<EngineInner>) {
        loop {
            let Some(engine) = weak.upgrade() else {
                debug!("Engine dropped, stopping sampler");
                return;
            };

            let Some(handle) = engine.handle() else {
                engine.status.set(PlayerSnapshot::default());
                debug!("Handle detached, stopping sampler");
                return;
            };

            // Nothing selected: there is no target to observe. Keep the
            // snapshot empty and stay on the idle interval until an item
            // appears.
            if engine.current_item.get().is_none() {
                engine.status.set(PlayerSnapshot::default());
                let interval = engine.config.poll_interval(false);
                drop(engine);
                time::sleep(interval).await;
                continue;
            }

            let snapshot = Self::sample(handle.as_ref()).await;
            // Unconditional: watchers treat each snapshot as a poll tick,
            // and the advance detector must re-evaluate even when the embed
            // is stuck reporting the same state.
            engine.status.replace(snapshot);

            let interval = engine.config.poll_interval(engine.playing.get());
            drop(engine);

            time::sleep(interval).await;
        }
    }

    async fn sample(handle: &dyn MediaHandle) -> PlayerSnapshot {
        PlayerSnapshot {
            current_time: handle.current_time().await,
            duration: handle.duration().await,
            current_media: handle
                .media_url()
                .await
                .as_deref()
                .map(MediaId::from_url)
                .unwrap_or_default(),
            state: handle.state().await,
            volume: handle.volume().await,
            muted: handle.is_muted().await,
        }
    }
}
