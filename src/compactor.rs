//! Compactor Module
//!
//! Runs compaction passes off the write path.
//!
//! ## Protocol
//! - The worker receives a deep clone of the core state
//! - The `Compactor` returns a complete new `CoreState`: L0 with its oldest
//!   tables removed (never reordered, never added to), `l0_last_compacted`
//!   naming the newest removed table, and the resulting higher levels
//! - The result travels back over a channel; only the engine applies it
//!
//! How a compactor picks its inputs and writes its outputs is up to the
//! implementation.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use tracing::{debug, error};

use crate::error::{Result, StrataError};
use crate::state::CoreState;

/// Computes a compacted tree shape from a snapshot
pub trait Compactor: Send + 'static {
    fn compact(&mut self, snapshot: CoreState) -> Result<CoreState>;
}

/// Background thread running a `Compactor`
pub struct CompactionWorker {
    requests: Option<Sender<CoreState>>,
    results: Receiver<Result<CoreState>>,
    handle: Option<JoinHandle<()>>,
}

impl CompactionWorker {
    /// Spawn the worker thread
    pub fn spawn<C: Compactor>(mut compactor: C) -> Result<Self> {
        let (request_tx, request_rx) = channel::unbounded::<CoreState>();
        let (result_tx, result_rx) = channel::unbounded::<Result<CoreState>>();

        let handle = thread::Builder::new()
            .name("strata-compactor".to_string())
            .spawn(move || {
                for snapshot in request_rx.iter() {
                    debug!(l0 = snapshot.l0.len(), "compaction pass started");
                    let result = compactor.compact(snapshot);
                    if let Err(e) = &result {
                        error!(error = %e, "compaction pass failed");
                    }
                    if result_tx.send(result).is_err() {
                        // Nobody is waiting for results anymore
                        break;
                    }
                }
                debug!("compaction worker stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a snapshot for compaction
    pub fn submit(&self, snapshot: CoreState) -> Result<()> {
        let requests = self
            .requests
            .as_ref()
            .ok_or_else(|| StrataError::Compaction("compaction worker is shut down".to_string()))?;

        requests
            .send(snapshot)
            .map_err(|_| StrataError::Compaction("compaction worker has exited".to_string()))
    }

    /// Next finished result, if one is ready
    pub fn try_recv_result(&self) -> Option<Result<CoreState>> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(StrataError::Compaction(
                "compaction worker has exited".to_string(),
            ))),
        }
    }

    /// Block until the next result arrives
    pub fn recv_result(&self) -> Result<CoreState> {
        self.results
            .recv()
            .map_err(|_| StrataError::Compaction("compaction worker has exited".to_string()))?
    }

    /// Stop accepting work, let queued passes finish, and join the thread
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        // Closing the request channel ends the worker loop
        self.requests.take();

        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StrataError::Compaction("compaction worker panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for CompactionWorker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!(error = %e, "compaction worker did not stop cleanly");
        }
    }
}
