//! One-shot completion primitive.
//!
//! A [`Completion`] is written at most once, from whatever thread the provider
//! calls back on; the [`Waiter`] is consumed by the thread that started the
//! call. Nothing is reused across calls.

use parking_lot::Mutex;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::oneshot;
use tokio::task;

/// Why a [`Waiter`] produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The [`Completion`] was dropped without a value.
    Closed,
    /// The current thread belongs to a current-thread runtime, which would
    /// stall if blocked.
    CurrentThreadRuntime,
}

/// Checks whether the current thread may block on a [`Waiter`].
///
/// Outside any runtime and inside a multi-thread runtime blocking is fine;
/// inside a current-thread runtime it is refused.
pub fn ensure_can_block() -> Result<(), WaitError> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
            Err(WaitError::CurrentThreadRuntime)
        },
        _ => Ok(()),
    }
}

/// Creates a linked completion/waiter pair.
pub fn channel<T>() -> (Completion<T>, Waiter<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion {
            sender: Mutex::new(Some(sender)),
        },
        Waiter { receiver },
    )
}

/// Write side. The first [`complete`](Completion::complete) wins; later calls
/// are no-ops.
pub struct Completion<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Completion<T> {
    /// Publishes `value`. Returns `false` if a value was already published.
    pub fn complete(&self, value: T) -> bool {
        match self.sender.lock().take() {
            Some(sender) => {
                // The waiter may already be gone; nothing to deliver to then.
                let _ = sender.send(value);
                true
            },
            None => false,
        }
    }
}

/// Read side, consumed by the waiting thread.
pub struct Waiter<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> Waiter<T> {
    /// Blocks the current thread until a value is published.
    ///
    /// On a multi-thread runtime worker the wait runs inside
    /// [`block_in_place`](tokio::task::block_in_place) so the other workers
    /// keep going.
    ///
    /// # Errors
    ///
    /// [`WaitError::CurrentThreadRuntime`] when called on a current-thread
    /// runtime, [`WaitError::Closed`] if the [`Completion`] was dropped
    /// without a value.
    pub fn wait(self) -> Result<T, WaitError> {
        let receiver = self.receiver;
        let received = match Handle::try_current() {
            Err(_) => receiver.blocking_recv(),
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                return Err(WaitError::CurrentThreadRuntime);
            },
            Ok(_) => task::block_in_place(move || receiver.blocking_recv()),
        };
        received.map_err(|_| WaitError::Closed)
    }

    /// Waits for the value without blocking the thread.
    pub async fn wait_async(self) -> Result<T, WaitError> {
        self.receiver.await.map_err(|_| WaitError::Closed)
    }
}
