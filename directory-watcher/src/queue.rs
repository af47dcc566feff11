//! Handoff queue between the watcher and the conversion pipeline.
//!
//! Unbounded and FIFO per producer. No deduplication: a path observed twice is
//! queued twice and the pipeline treats the repeat as a no-op.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{Result, WatcherError};

/// Create a connected producer/consumer pair.
pub fn job_queue() -> (JobProducer, JobConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (JobProducer { tx }, JobConsumer { rx })
}

/// Sending half. Cheap to clone; never blocks.
#[derive(Debug, Clone)]
pub struct JobProducer {
    tx: mpsc::UnboundedSender<PathBuf>,
}

impl JobProducer {
    /// Queue a path for conversion.
    pub fn push(&self, path: PathBuf) -> Result<()> {
        self.tx.send(path).map_err(|_| WatcherError::ChannelSend)
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the single consumer.
#[derive(Debug)]
pub struct JobConsumer {
    rx: mpsc::UnboundedReceiver<PathBuf>,
}

impl JobConsumer {
    /// Wait up to `timeout` for the next path.
    ///
    /// Returns `None` on timeout, and immediately once every producer is dropped
    /// and the queue is drained.
    pub async fn pop(&mut self, timeout: Duration) -> Option<PathBuf> {
        tokio::time::timeout(timeout, self.rx.recv()).await.ok().flatten()
    }

    /// Take the next path if one is already queued.
    pub fn try_pop(&mut self) -> Option<PathBuf> {
        self.rx.try_recv().ok()
    }
}
