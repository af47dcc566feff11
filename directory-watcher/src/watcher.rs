//! Staging tree watcher.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::WatcherConfig;
use crate::error::{Result, WatcherError};
use crate::event::{FileEvent, FileEventKind};
use crate::queue::JobProducer;

/// Upper bound on how long `stop()` waits for notify's thread to let go.
const SENDER_RELEASE_GRACE: Duration = Duration::from_secs(2);

/// Lifecycle of a [`StagingWatcher`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    /// Constructed, not yet subscribed.
    Idle,

    /// Subscribed and forwarding events.
    Observing,

    /// Unsubscribed and quiesced.
    Stopped,
}

/// A creation event together with the monotonic instant it was seen.
#[derive(Debug)]
struct Observed {
    event: FileEvent,
    at: Instant,
}

/// Watches the staging tree and queues newly created files.
///
/// The notify callback runs on notify's own thread and only filters. Debouncing
/// and queueing happen in a forwarder task, which is what [`stop`](Self::stop)
/// waits for.
pub struct StagingWatcher {
    /// Configuration.
    config: WatcherConfig,

    /// Current lifecycle state.
    state: WatcherState,

    /// Internal notify watcher.
    watcher: Option<RecommendedWatcher>,

    /// Root being watched.
    root: Option<PathBuf>,

    /// Signals the forwarder to drain and exit.
    cancel: CancellationToken,

    /// Forwarder task.
    forwarder: Option<JoinHandle<()>>,
}

impl StagingWatcher {
    /// Create an idle watcher.
    pub fn new(config: WatcherConfig) -> Self {
        Self {
            config,
            state: WatcherState::Idle,
            watcher: None,
            root: None,
            cancel: CancellationToken::new(),
            forwarder: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Whether the watcher is observing.
    pub fn is_running(&self) -> bool {
        self.state == WatcherState::Observing
    }

    /// Subscribe to `root` recursively and forward creations into `producer`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, root: &Path, producer: JobProducer) -> Result<()> {
        if self.state != WatcherState::Idle {
            return Err(WatcherError::InvalidState {
                expected: WatcherState::Idle,
                actual: self.state,
            });
        }

        if !root.is_dir() {
            return Err(WatcherError::DirectoryNotFound(root.display().to_string()));
        }

        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<Observed>();
        let config = self.config.clone();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if FileEventKind::from(event.kind) != FileEventKind::Created {
                        return;
                    }

                    for path in event.paths {
                        if !path.is_file() || config.should_exclude(&path) {
                            continue;
                        }

                        let observed = Observed {
                            event: FileEvent::new(path),
                            at: Instant::now(),
                        };
                        if raw_tx.send(observed).is_err() {
                            debug!("Forwarder gone, dropping creation event");
                        }
                    }
                }
                Err(e) => {
                    error!("Watch error: {e}");
                }
            },
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;

        self.forwarder = Some(tokio::spawn(forward(
            raw_rx,
            producer,
            self.config.debounce(),
            self.cancel.clone(),
        )));
        self.watcher = Some(watcher);
        self.root = Some(root.to_path_buf());
        self.state = WatcherState::Observing;

        info!("Watching {}", root.display());
        Ok(())
    }

    /// Unsubscribe and wait until every event observed so far has been queued.
    ///
    /// Dropping the notify watcher shuts its thread down; the forwarder keeps
    /// delivering until that thread has released the channel, bounded by a
    /// short grace period. Nothing is pushed into the queue after this returns.
    pub async fn stop(&mut self) -> Result<()> {
        if self.state != WatcherState::Observing {
            return Err(WatcherError::InvalidState {
                expected: WatcherState::Observing,
                actual: self.state,
            });
        }

        if let Some(mut watcher) = self.watcher.take() {
            if let Some(root) = &self.root {
                if let Err(e) = watcher.unwatch(root) {
                    warn!("Failed to unwatch {}: {e}", root.display());
                }
            }
        }

        self.cancel.cancel();
        if let Some(forwarder) = self.forwarder.take() {
            if let Err(e) = forwarder.await {
                error!("Watcher forwarder ended abnormally: {e}");
            }
        }

        self.state = WatcherState::Stopped;
        info!("Directory watcher stopped");
        Ok(())
    }
}

impl Drop for StagingWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn forward(
    mut raw_rx: mpsc::UnboundedReceiver<Observed>,
    producer: JobProducer,
    debounce: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            observed = raw_rx.recv() => match observed {
                Some(observed) => deliver(observed, &producer, debounce).await,
                None => return,
            },
        }
    }

    // The notify thread owns the sender and releases it only after its last
    // callback has returned, so a closed channel means nothing is in flight.
    let drain = async {
        while let Some(observed) = raw_rx.recv().await {
            deliver(observed, &producer, debounce).await;
        }
    };
    if tokio::time::timeout(SENDER_RELEASE_GRACE, drain).await.is_err() {
        warn!(
            "Notify thread still alive after {SENDER_RELEASE_GRACE:?}, later creation events are dropped"
        );
    }
}

async fn deliver(observed: Observed, producer: &JobProducer, debounce: Duration) {
    let deadline = tokio::time::Instant::from_std(observed.at + debounce);
    tokio::time::sleep_until(deadline).await;

    debug!("Queueing {}", observed.event.path.display());
    if producer.push(observed.event.path).is_err() {
        warn!("Job queue closed, dropping creation event");
    }
}
