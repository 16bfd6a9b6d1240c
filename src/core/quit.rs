//! One-shot quit signal shared by the event loop and every handler.

use log::{debug, info};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct QuitSignal {
    token: CancellationToken,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Returns `false` if it had already fired; a repeat
    /// trigger is ignored.
    pub fn trigger(&self) -> bool {
        if self.token.is_cancelled() {
            debug!("Quit already requested, ignoring duplicate trigger");
            return false;
        }
        info!("Quit requested");
        self.token.cancel();
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}
