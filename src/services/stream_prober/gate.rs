//! Single-assignment result slot shared between the probe task and its caller

use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

/// Publishes at most one value to the paired receiver; later calls are ignored
#[derive(Debug)]
pub struct ResultGate<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> ResultGate<T> {
    pub fn new() -> (Self, oneshot::Receiver<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(sender)),
            },
            receiver,
        )
    }

    /// Publish `value` if nothing was published yet. Returns whether this call won.
    pub fn fire(&self, value: T) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            // A dropped receiver still consumes the slot
            Some(sender) => {
                let _ = sender.send(value);
                true
            }
            None => false,
        }
    }

    pub fn is_fired(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
