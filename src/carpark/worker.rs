use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use log::{debug, error};

use crate::EaseParkError;

use super::{CarparkProvider, CarparkRecord, VehicleType, fetch_carparks};

/// A request for the worker to fetch and merge carparks for one vehicle type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub vehicle_type: VehicleType,
}

/// The result of a [`FetchRequest`], tagged with the request's generation so the
/// receiver can drop completions that were overtaken by a newer request.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub vehicle_type: VehicleType,
    pub result: Result<Vec<CarparkRecord>, EaseParkError>,
}

/// Background thread that owns a single-threaded async runtime and runs fetches one
/// at a time. When several requests are queued only the newest one is executed.
pub struct FetchWorker {
    requests: Sender<FetchRequest>,
    outcomes: Receiver<FetchOutcome>,
}

impl FetchWorker {
    /// Starts the worker. `on_complete` is called from the worker thread after every
    /// outcome is sent, typically to wake up the UI.
    pub fn spawn<P, F>(provider: P, on_complete: F) -> Result<Self, EaseParkError>
    where
        P: CarparkProvider + Send + 'static,
        F: Fn() + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<FetchOutcome>();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| EaseParkError::RuntimeStart { source: e })?;

        thread::Builder::new()
            .name("fetch-worker".to_string())
            .spawn(move || {
                while let Ok(mut request) = request_rx.recv() {
                    while let Ok(newer) = request_rx.try_recv() {
                        debug!(
                            "Skipping fetch generation {} in favour of {}",
                            request.generation, newer.generation
                        );
                        request = newer;
                    }

                    debug!(
                        "Fetching carparks for {} (generation {})",
                        request.vehicle_type, request.generation
                    );
                    let result = runtime.block_on(fetch_carparks(&provider, request.vehicle_type));
                    let outcome = FetchOutcome {
                        generation: request.generation,
                        vehicle_type: request.vehicle_type,
                        result,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                    on_complete();
                }
                debug!("Fetch worker stopped");
            })
            .map_err(|e| EaseParkError::RuntimeStart { source: e })?;

        Ok(Self {
            requests: request_tx,
            outcomes: outcome_rx,
        })
    }

    pub fn request(&self, request: FetchRequest) {
        if let Err(e) = self.requests.send(request) {
            error!("Fetch worker is gone, dropping request: {}", e);
        }
    }

    /// Non-blocking poll for a finished fetch.
    pub fn try_recv(&self) -> Option<FetchOutcome> {
        self.outcomes.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchOutcome> {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                error!("Fetch worker disconnected");
                None
            }
        }
    }
}
