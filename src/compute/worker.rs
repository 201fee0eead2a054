//! Background compute worker.
//!
//! A dedicated thread owns the compute loop; requests go in over a channel
//! and responses come back tagged with the id returned by `submit`. The host
//! polls `latest()` without blocking, so a UI thread never waits on a run.

use log::{debug, error};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

use super::{compute, ComputeRequest, ComputeResponse};

/// Failures at the host boundary
#[derive(Error, Debug)]
pub enum BoundaryError {
    /// The platform cannot run a background thread
    #[error("Background compute unsupported: {0}")]
    Unsupported(String),

    /// The worker thread has exited
    #[error("Simulation worker disconnected")]
    Disconnected,
}

/// Commands for the background compute thread.
enum WorkerCommand {
    Compute { request_id: u64, request: Box<ComputeRequest> },
    Shutdown,
}

/// A finished run tagged with its request id
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub request_id: u64,
    pub response: ComputeResponse,
}

pub struct SimulationWorker {
    sender: Sender<WorkerCommand>,
    receiver: Receiver<WorkerResponse>,
    handle: Option<JoinHandle<()>>,
    next_id: u64,
    latest: Option<WorkerResponse>,
}

impl SimulationWorker {
    /// Spawn the worker thread
    pub fn spawn() -> Result<Self, BoundaryError> {
        let (command_tx, command_rx) = mpsc::channel::<WorkerCommand>();
        let (response_tx, response_rx) = mpsc::channel::<WorkerResponse>();

        let handle = thread::Builder::new()
            .name("physio-compute".to_string())
            .spawn(move || {
                while let Ok(cmd) = command_rx.recv() {
                    match cmd {
                        WorkerCommand::Compute { request_id, request } => {
                            debug!("Worker running request {}", request_id);
                            let response = match panic::catch_unwind(AssertUnwindSafe(|| compute(&request))) {
                                Ok(r) => r,
                                Err(_) => {
                                    error!("Request {} panicked, worker continues", request_id);
                                    continue;
                                }
                            };
                            if response_tx.send(WorkerResponse { request_id, response }).is_err() {
                                break;
                            }
                        }
                        WorkerCommand::Shutdown => break,
                    }
                }
            })
            .map_err(|e| BoundaryError::Unsupported(e.to_string()))?;

        Ok(Self {
            sender: command_tx,
            receiver: response_rx,
            handle: Some(handle),
            next_id: 0,
            latest: None,
        })
    }

    /// Queue a request; returns its id
    pub fn submit(&mut self, request: ComputeRequest) -> Result<u64, BoundaryError> {
        self.next_id += 1;
        let request_id = self.next_id;
        self.sender
            .send(WorkerCommand::Compute {
                request_id,
                request: Box::new(request),
            })
            .map_err(|_| BoundaryError::Disconnected)?;
        Ok(request_id)
    }

    /// Newest response received so far, without blocking
    pub fn latest(&mut self) -> Option<&WorkerResponse> {
        loop {
            match self.receiver.try_recv() {
                Ok(r) => self.latest = Some(r),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.handle.is_some() {
                        error!("Simulation worker exited unexpectedly");
                    }
                    break;
                }
            }
        }
        self.latest.as_ref()
    }

    /// Block until the next response arrives or `timeout` elapses
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<WorkerResponse>, BoundaryError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(r) => {
                self.latest = Some(r.clone());
                Ok(Some(r))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BoundaryError::Disconnected),
        }
    }

    /// Stop the thread after the queued requests
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.sender.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Simulation worker panicked");
            }
        }
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
