use std::time::Duration;

use spdlog::trace;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivers the last value pushed once `delay` has passed without another
/// push. The pending timer is aborted when the debouncer is dropped, so
/// nothing is delivered after the owning view is gone.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer {
            delay,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    /// Restarts the timer with `value`. Must be called inside a tokio runtime.
    pub fn push(&mut self, value: T) {
        self.cancel();

        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(value).is_err() {
                trace!("Debounced value dropped, receiver is gone");
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
