use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::cancel::CancellationSlot;
use super::error::TrimError;
use super::request::TrimRequest;
use super::state::{OperationGraph, OperationRequest, OperationState};
use super::time::validate_range;
use crate::outputs::handle::{HandleRegistry, ResourceHandle};
use crate::services::trim::TrimService;

struct Inner {
    state: OperationState,
    registry: HandleRegistry,
    cancel: CancellationSlot,
}

/// Owns the lifecycle of a single trim attempt and the handle it produces.
///
/// Clones share the same state, registry and in-flight slot, so a clone can
/// be moved into a spawned task while the original keeps observing.
pub struct TrimController<S> {
    service: Arc<S>,
    inner: Arc<Mutex<Inner>>,
    state_tx: Arc<watch::Sender<OperationState>>,
}

impl<S> Clone for TrimController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            inner: Arc::clone(&self.inner),
            state_tx: Arc::clone(&self.state_tx),
        }
    }
}

impl<S: TrimService> TrimController<S> {
    pub fn new(service: S) -> Self {
        Self::with_service(Arc::new(service))
    }

    pub fn with_service(service: Arc<S>) -> Self {
        let (state_tx, _) = watch::channel(OperationState::Idle);
        Self {
            service,
            inner: Arc::new(Mutex::new(Inner {
                state: OperationState::Idle,
                registry: HandleRegistry::new(),
                cancel: CancellationSlot::new(),
            })),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Validates the input, issues exactly one trim request and mints a handle
    /// for the returned payload.
    ///
    /// Rejected with [`TrimError::Busy`] while another attempt is in flight.
    /// Otherwise any previous handle is revoked before anything else happens.
    pub async fn submit(&self, source_url: &str, start_text: &str, end_text: &str) -> Result<ResourceHandle, TrimError> {
        let (request, token) = {
            let mut inner = self.lock();
            if inner.state.is_in_flight() {
                warn!("Trim rejected: another request is in flight");
                return Err(TrimError::Busy);
            }

            let revoked = inner.registry.revoke_all();
            if revoked > 0 {
                info!(revoked, "Revoked previous download link");
            }
            self.apply(&mut inner, OperationRequest::Reset);

            let request = match prepare(source_url, start_text, end_text) {
                Ok(request) => request,
                Err(err) => {
                    warn!(reason = %err.detail(), "Trim input rejected");
                    self.apply(&mut inner, OperationRequest::Fail(err.clone()));
                    return Err(err);
                }
            };

            let token = inner.cancel.arm();
            self.apply(&mut inner, OperationRequest::Dispatch);
            (request, token)
        };

        info!(
            url = %request.source_url,
            start = request.start_seconds,
            end = request.end_seconds,
            "Submitting trim request"
        );

        let guard = InFlightGuard { controller: self, settled: false };
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(TrimError::Cancelled),
            result = self.service.trim(&request) => result.map_err(TrimError::from),
        };
        guard.settle(&token, outcome)
    }

    /// Signals the in-flight request, if any. Its `submit` resolves to
    /// [`TrimError::Cancelled`].
    pub fn cancel(&self) -> bool {
        let cancelled = self.lock().cancel.cancel();
        if cancelled {
            info!("Cancelling in-flight trim request");
        }
        cancelled
    }

    /// Revokes the current handle and returns to idle.
    pub fn reset(&self) -> Result<(), TrimError> {
        let mut inner = self.lock();
        if inner.state.is_in_flight() {
            return Err(TrimError::Busy);
        }
        inner.registry.revoke_all();
        self.apply(&mut inner, OperationRequest::Reset);
        Ok(())
    }

    /// Session teardown: abandons any in-flight request and revokes every handle.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        inner.cancel.cancel();
        let revoked = inner.registry.revoke_all();
        if !inner.state.is_in_flight() {
            self.apply(&mut inner, OperationRequest::Reset);
        }
        info!(revoked, "Trim controller shut down");
    }

    pub fn state(&self) -> OperationState {
        self.lock().state.clone()
    }

    pub fn in_progress(&self) -> bool {
        self.lock().state.is_in_flight()
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().state.error().map(ToString::to_string)
    }

    pub fn download_link(&self) -> Option<ResourceHandle> {
        self.lock().state.handle().cloned()
    }

    /// Dereferences a live handle. Revoked handles resolve to `None`.
    pub fn resolve(&self, handle: &ResourceHandle) -> Option<Arc<[u8]>> {
        self.lock().registry.resolve(handle)
    }

    pub fn live_handles(&self) -> usize {
        self.lock().registry.live()
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.state_tx.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn apply(&self, inner: &mut Inner, request: OperationRequest) {
        match OperationGraph::transition(&inner.state, request) {
            Some(next) => {
                if next != inner.state {
                    info!(from = inner.state.label(), to = next.label(), "Operation state changed");
                }
                inner.state = next.clone();
                self.state_tx.send_replace(next);
            }
            None => warn!(state = inner.state.label(), "Ignored invalid operation transition"),
        }
    }
}

fn prepare(source_url: &str, start_text: &str, end_text: &str) -> Result<TrimRequest, TrimError> {
    // Blank counts as missing; a non-blank URL is sent as given
    if source_url.trim().is_empty() {
        return Err(TrimError::MissingInput);
    }
    let range = validate_range(start_text, end_text)?;
    Ok(TrimRequest::new(source_url, range))
}

/// Clears the in-flight state on every exit path, including the `submit`
/// future being dropped mid-await.
struct InFlightGuard<'a, S: TrimService> {
    controller: &'a TrimController<S>,
    settled: bool,
}

impl<S: TrimService> InFlightGuard<'_, S> {
    fn settle(mut self, token: &CancellationToken, outcome: Result<Vec<u8>, TrimError>) -> Result<ResourceHandle, TrimError> {
        self.settled = true;
        let controller = self.controller;
        let mut inner = controller.lock();
        inner.cancel.disarm();

        // A cancel or shutdown that lands after the response wins over it
        let outcome = match outcome {
            Ok(_) if token.is_cancelled() => {
                info!("Discarding trim response received after cancellation");
                Err(TrimError::Cancelled)
            }
            other => other,
        };

        match outcome {
            Ok(payload) => {
                let handle = inner.registry.mint(payload);
                info!(handle = %handle, bytes = handle.len(), "Trim succeeded");
                controller.apply(&mut inner, OperationRequest::Completed(handle.clone()));
                Ok(handle)
            }
            Err(err) => {
                warn!(reason = %err.detail(), "Trim failed: {}", err);
                controller.apply(&mut inner, OperationRequest::Fail(err.clone()));
                Err(err)
            }
        }
    }
}

impl<S: TrimService> Drop for InFlightGuard<'_, S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.controller.lock();
        inner.cancel.disarm();
        if inner.state.is_in_flight() {
            warn!("Trim request abandoned before completion");
            self.controller.apply(&mut inner, OperationRequest::Abandon);
        }
    }
}
