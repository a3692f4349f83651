use core::sync::atomic::{AtomicU64, Ordering};

use derive_more::Display;

pub use crate::subscriber::{initialize_tracing_logger, TracingHandle};

mod subscriber;

pub static REPORT_LOG_METRICS: ReportLogMetrics = ReportLogMetrics::new();

#[derive(Display, Debug)]
#[display("reports: {reports_emitted:?}")]
pub struct ReportLogMetrics {
    reports_emitted: AtomicU64,
}

impl ReportLogMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reports_emitted: AtomicU64::new(0),
        }
    }

    pub fn increment_reports_emitted(&self) {
        self.reports_emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn reports_emitted(&self) -> u64 {
        self.reports_emitted.load(Ordering::Relaxed)
    }
}

impl Default for ReportLogMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[macro_export]
macro_rules! info_with_totals {
    ($($arg:tt)*) => {
        ::tracing::info!("[{}] {}", $crate::REPORT_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! debug_with_totals {
    ($($arg:tt)*) => {
        ::tracing::debug!("[{}] {}", $crate::REPORT_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn_with_totals {
    ($($arg:tt)*) => {
        ::tracing::warn!("[{}] {}", $crate::REPORT_LOG_METRICS, format_args!($($arg)*));
    };
}
