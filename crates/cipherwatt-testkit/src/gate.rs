//! Test gates for holding collaborator calls in flight

use std::sync::Arc;
use tokio::sync::Semaphore;

/// Barrier a mocked call waits on while closed.
///
/// Open by default. [`Gate::close`] makes subsequent calls wait until
/// [`Gate::release`] hands out permits or [`Gate::open`] lets everything
/// through again.
#[derive(Debug, Default)]
pub struct Gate {
    inner: parking_lot::Mutex<Option<Arc<Semaphore>>>,
}

impl Gate {
    /// Create an open gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent calls wait
    pub fn close(&self) {
        *self.inner.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` waiting (or future) calls through
    pub fn release(&self, n: usize) {
        if let Some(semaphore) = self.inner.lock().as_ref() {
            semaphore.add_permits(n);
        }
    }

    /// Let every call through from now on
    pub fn open(&self) {
        if let Some(semaphore) = self.inner.lock().take() {
            // Closing wakes every waiter with an error, which `pass` treats as open.
            semaphore.close();
        }
    }

    /// Whether calls currently wait
    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Wait for a permit if the gate is closed.
    pub async fn pass(&self) {
        let semaphore = self.inner.lock().clone();
        if let Some(semaphore) = semaphore {
            if let Ok(permit) = semaphore.acquire().await {
                permit.forget();
            }
        }
    }
}
