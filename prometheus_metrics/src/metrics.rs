use anyhow::Result;
use prometheus::{histogram_opts, opts, HistogramVec, IntCounterVec};
use tracing::warn;

const BUFFER_LABEL: &str = "buffer";
const KIND_LABEL: &str = "kind";

#[derive(Debug)]
pub struct Metrics {
    // Aggregation reports
    aggregation_successes: IntCounterVec,
    aggregation_errors: IntCounterVec,
    aggregation_error_details: IntCounterVec,
    aggregation_reports: IntCounterVec,
    pub aggregation_report_times: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            aggregation_successes: IntCounterVec::new(
                opts!(
                    "AGGREGATION_SUCCESSES_TOTAL",
                    "Number of successful operations reported by aggregation buffers"
                ),
                &[BUFFER_LABEL],
            )?,

            aggregation_errors: IntCounterVec::new(
                opts!(
                    "AGGREGATION_ERRORS_TOTAL",
                    "Number of failed operations reported by aggregation buffers"
                ),
                &[BUFFER_LABEL],
            )?,

            aggregation_error_details: IntCounterVec::new(
                opts!(
                    "AGGREGATION_ERROR_DETAILS_TOTAL",
                    "Number of failure details reported by aggregation buffers"
                ),
                &[BUFFER_LABEL, KIND_LABEL],
            )?,

            aggregation_reports: IntCounterVec::new(
                opts!(
                    "AGGREGATION_REPORTS_TOTAL",
                    "Number of reports emitted for aggregation buffers"
                ),
                &[BUFFER_LABEL],
            )?,

            aggregation_report_times: HistogramVec::new(
                histogram_opts!(
                    "AGGREGATION_REPORT_TIMES",
                    "Time taken to snapshot and report an aggregation buffer",
                ),
                &[BUFFER_LABEL],
            )?,
        })
    }

    pub fn register_with_default_metrics(&self) -> Result<()> {
        let default_registry = prometheus::default_registry();

        default_registry.register(Box::new(self.aggregation_successes.clone()))?;
        default_registry.register(Box::new(self.aggregation_errors.clone()))?;
        default_registry.register(Box::new(self.aggregation_error_details.clone()))?;
        default_registry.register(Box::new(self.aggregation_reports.clone()))?;
        default_registry.register(Box::new(self.aggregation_report_times.clone()))?;

        Ok(())
    }

    pub fn observe_aggregation<'kind>(
        &self,
        buffer: &str,
        successes: u64,
        errors: u64,
        kind_counts: impl IntoIterator<Item = (&'kind str, u64)>,
    ) {
        match self.aggregation_reports.get_metric_with_label_values(&[buffer]) {
            Ok(counter) => counter.inc(),
            Err(error) => warn!("unable to count aggregation report for {buffer}: {error:?}"),
        }

        match self
            .aggregation_successes
            .get_metric_with_label_values(&[buffer])
        {
            Ok(counter) => counter.inc_by(successes),
            Err(error) => warn!("unable to track aggregation successes for {buffer}: {error:?}"),
        }

        match self.aggregation_errors.get_metric_with_label_values(&[buffer]) {
            Ok(counter) => counter.inc_by(errors),
            Err(error) => warn!("unable to track aggregation errors for {buffer}: {error:?}"),
        }

        for (kind, count) in kind_counts {
            match self
                .aggregation_error_details
                .get_metric_with_label_values(&[buffer, kind])
            {
                Ok(counter) => counter.inc_by(count),
                Err(error) => {
                    warn!("unable to track {kind} error details for {buffer}: {error:?}")
                }
            }
        }
    }
}
