use tokio_util::sync::CancellationToken;

/// Holds the cancellation token of the one request allowed in flight.
///
/// Dropping the slot cancels whatever is still armed, so tearing down the
/// controller abandons its outstanding request.
#[derive(Debug, Default)]
pub struct CancellationSlot {
    current: Option<CancellationToken>,
}

impl CancellationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a fresh token for the next request. Any previous token is cancelled first.
    pub fn arm(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    /// Clears the slot once the request has produced an outcome.
    pub fn disarm(&mut self) {
        self.current = None;
    }

    /// Returns true if an armed request was signalled.
    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

impl Drop for CancellationSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
