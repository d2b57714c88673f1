//! Global admission gate bounding how many bid evaluations may run
//! concurrently across the entire simulation, independent of how many
//! auctions or bidders exist.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;


/// A shared, fungible pool of evaluation permits sized once at startup.
///
/// Permits are not owned by any auction. Every bid evaluation must hold a
/// permit for its full duration; the permit returns to the pool when the
/// [`AdmissionPermit`] is dropped.
#[derive(Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

/// RAII guard for one admitted evaluation. Dropping it releases the permit
/// back to the pool without blocking.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AdmissionGate {
    /// Creates a gate admitting at most `capacity` concurrent evaluations
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits for a permit, or returns `None` if `cancel` fires first.
    ///
    /// A caller whose token is already cancelled observes cancellation
    /// immediately, without consuming a permit and without blocking.
    pub async fn admit(&self, cancel: &CancellationToken) -> Option<AdmissionPermit> {
        if cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            _ = cancel.cancelled() => None,
            acquired = self.permits.clone().acquire_owned() => match acquired {
                Ok(permit) => {
                    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
                    Some(AdmissionPermit {
                        _permit: permit,
                        in_flight: self.in_flight.clone(),
                    })
                }
                // The semaphore is never closed while the gate is alive
                Err(_) => None,
            },
        }
    }

    /// The configured permit pool size
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of evaluations currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous evaluations observed so far
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}
