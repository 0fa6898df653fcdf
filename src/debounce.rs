//! Single-slot deferred task: arming replaces whatever was pending.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct Debouncer {
    slot: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Run `task` after `delay`, cancelling any previously armed task.
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Abort the pending task. Returns `true` if one was armed and had not
    /// finished yet.
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.slot.take() {
            handle.abort();
        }
    }
}
