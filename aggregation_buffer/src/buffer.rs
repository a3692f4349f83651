use core::{
    any::Any,
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    aggregation::Aggregation,
    cause::Cause,
    config::{BufferConfig, Consistency},
};

/// Accumulates outcomes of concurrent operations between two snapshots.
///
/// Share it between producers with an `Arc`. Recording never blocks on I/O and never fails.
///
/// With [`Consistency::Relaxed`] the failure details are guarded by a mutex and the counters are
/// plain atomics, so [`AggregationBuffer::take_aggregation`] is not atomic as a whole.
/// With [`Consistency::Strict`] producers additionally hold a shared gate that snapshots
/// acquire exclusively.
#[derive(Default, Debug)]
pub struct AggregationBuffer {
    config: BufferConfig,
    gate: RwLock<()>,
    error_details: Mutex<Vec<Cause>>,
    successes: AtomicU64,
    errors: AtomicU64,
}

impl AggregationBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn config(&self) -> BufferConfig {
        self.config
    }

    /// Appends a failure detail without touching the error counter.
    pub fn record_error(&self, cause: impl Into<Cause>) {
        let cause = cause.into();
        let _gate = self.producer_gate();
        self.push_error_detail(cause);
    }

    /// Takes every failure detail recorded so far, leaving none behind.
    pub fn drain_failure_details(&self) -> Vec<Cause> {
        core::mem::take(&mut *self.error_details.lock())
    }

    #[must_use]
    pub fn pending_failure_details(&self) -> usize {
        self.error_details.lock().len()
    }

    pub fn record_success(&self) {
        let _gate = self.producer_gate();
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the error counter without recording a failure detail.
    pub fn record_error_count(&self) {
        let _gate = self.producer_gate();
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the error counter and records `cause` as a single producer call.
    pub fn record_failure(&self, cause: impl Into<Cause>) {
        let cause = cause.into();
        let _gate = self.producer_gate();
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.push_error_detail(cause);
    }

    pub fn record_outcome<T, E: Into<Cause>>(&self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => {
                self.record_success();
                Some(value)
            }
            Err(error) => {
                self.record_failure(error);
                None
            }
        }
    }

    /// Records a panic payload as a failure.
    ///
    /// Suitable as the body of a thread pool panic handler.
    pub fn record_panic(&self, payload: Box<dyn Any + Send + 'static>) {
        self.record_failure(Cause::from_panic_payload(payload));
    }

    pub fn reset_counts(&self) {
        let _gate = self.snapshot_gate();
        self.zero_counts();
    }

    #[must_use]
    pub fn read_success_count(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn read_error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Reads the counters, drains the failure details and resets the counters, in that order.
    pub fn take_aggregation(&self) -> Aggregation {
        let _gate = self.snapshot_gate();

        let successes = self.read_success_count();
        let errors = self.read_error_count();
        let error_details = self.drain_failure_details();

        self.zero_counts();

        Aggregation {
            successes,
            errors,
            error_details,
        }
    }

    pub fn summarize_and_reset(&self) -> String {
        self.take_aggregation().to_string()
    }

    fn push_error_detail(&self, cause: Cause) {
        self.error_details.lock().push(cause);
    }

    fn zero_counts(&self) {
        self.successes.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }

    fn producer_gate(&self) -> Option<RwLockReadGuard<'_, ()>> {
        match self.config.consistency {
            Consistency::Relaxed => None,
            Consistency::Strict => Some(self.gate.read()),
        }
    }

    fn snapshot_gate(&self) -> Option<RwLockWriteGuard<'_, ()>> {
        match self.config.consistency {
            Consistency::Relaxed => None,
            Consistency::Strict => Some(self.gate.write()),
        }
    }
}
