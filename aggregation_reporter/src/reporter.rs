use std::sync::Arc;

use aggregation_buffer::{Aggregation, AggregationBuffer};
use anyhow::Result;
use futures::{channel::mpsc::UnboundedReceiver, select, StreamExt as _};
use logging::{debug_with_totals, info_with_totals, warn_with_totals, REPORT_LOG_METRICS};
use prometheus_metrics::{start_timer_vec, stop_and_discard, stop_and_record, Metrics};
use tokio::time::Instant;
use tokio_stream::wrappers::IntervalStream;

use crate::{config::ReporterConfig, error::Error, messages::ReporterMessage};

/// Periodically takes an [`Aggregation`] out of a shared buffer and logs it.
pub struct AggregationReporter {
    config: ReporterConfig,
    buffer: Arc<AggregationBuffer>,
    metrics: Option<Arc<Metrics>>,
    rx: UnboundedReceiver<ReporterMessage>,
}

impl AggregationReporter {
    pub fn new(
        config: ReporterConfig,
        buffer: Arc<AggregationBuffer>,
        metrics: Option<Arc<Metrics>>,
        rx: UnboundedReceiver<ReporterMessage>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            buffer,
            metrics,
            rx,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let period = self.config.interval;
        let start = Instant::now()
            .checked_add(period)
            .ok_or(Error::IntervalTooLarge)?;

        let interval = tokio::time::interval_at(start, period);
        let mut interval = IntervalStream::new(interval).fuse();

        loop {
            select! {
                _ = interval.select_next_some() => {
                    self.report();
                },

                message = self.rx.next() => {
                    match message {
                        Some(ReporterMessage::Flush(sender)) => {
                            let aggregation = self.report();

                            if sender.send(aggregation).is_err() {
                                debug_with_totals!(
                                    "{} aggregation was flushed but the requester was dropped",
                                    self.config.label,
                                );
                            }
                        }
                        Some(ReporterMessage::Stop) => {
                            self.report();
                            break Ok(());
                        }
                        None => {
                            debug_with_totals!(
                                "all senders to {} aggregation reporter were dropped",
                                self.config.label,
                            );

                            self.report();
                            break Ok(());
                        }
                    }
                }
            }
        }
    }

    fn report(&self) -> Aggregation {
        let label = self.config.label.as_str();

        let timer = self
            .metrics
            .as_ref()
            .and_then(|metrics| start_timer_vec(&metrics.aggregation_report_times, label));

        let aggregation = self.buffer.take_aggregation();

        if aggregation.is_empty() && !self.config.report_empty {
            stop_and_discard(timer);
            return aggregation;
        }

        REPORT_LOG_METRICS.increment_reports_emitted();

        let summary = aggregation.to_string();
        let summary = summary.trim_end();

        if aggregation.errors > 0 || !aggregation.error_details.is_empty() {
            warn_with_totals!("{label}: {summary}");
        } else {
            info_with_totals!("{label}: {summary}");
        }

        if let Some(metrics) = self.metrics.as_ref() {
            let kind_counts = aggregation.kind_counts();

            metrics.observe_aggregation(
                label,
                aggregation.successes,
                aggregation.errors,
                kind_counts
                    .iter()
                    .map(|(kind, count)| (kind.as_ref(), *count)),
            );
        }

        stop_and_record(timer);

        aggregation
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use aggregation_buffer::{Cause, CauseKind};
    use futures::channel::{mpsc, oneshot};

    use super::*;

    fn reporter(
        config: ReporterConfig,
        metrics: Option<Arc<Metrics>>,
    ) -> Result<(
        Arc<AggregationBuffer>,
        mpsc::UnboundedSender<ReporterMessage>,
        AggregationReporter,
    )> {
        let buffer = Arc::new(AggregationBuffer::new());
        let (tx, rx) = mpsc::unbounded();
        let reporter = AggregationReporter::new(config, Arc::clone(&buffer), metrics, rx)?;
        Ok((buffer, tx, reporter))
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = ReporterConfig {
            interval: Duration::ZERO,
            ..ReporterConfig::default()
        };

        assert!(reporter(config, None).is_err());
    }

    #[test]
    fn new_rejects_interval_that_overflows_instant() {
        let config = ReporterConfig {
            interval: Duration::from_secs(u64::MAX),
            ..ReporterConfig::default()
        };

        assert!(reporter(config, None).is_err());
    }

    #[tokio::test]
    async fn flush_sends_snapshot_and_resets_buffer() -> Result<()> {
        let (buffer, tx, reporter) = reporter(ReporterConfig::default(), None)?;
        let (flush_tx, flush_rx) = oneshot::channel();

        buffer.record_success();
        buffer.record_success();
        buffer.record_error_count();
        buffer.record_error("x");
        buffer.record_error(Cause::new(CauseKind::Unavailable, "y"));

        ReporterMessage::Flush(flush_tx).send(&tx);
        ReporterMessage::Stop.send(&tx);

        reporter.run().await?;

        let aggregation = flush_rx.await?;

        assert_eq!(
            aggregation.to_string(),
            "Aggregation Summary:\n  Successes: 2\n  Errors: 1\n  Error Details:\n    1: x\n    2: y\n",
        );

        assert_eq!(buffer.read_success_count(), 0);
        assert_eq!(buffer.read_error_count(), 0);
        assert_eq!(buffer.pending_failure_details(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn flush_of_empty_buffer_still_answers() -> Result<()> {
        let (_buffer, tx, reporter) = reporter(ReporterConfig::default(), None)?;
        let (flush_tx, flush_rx) = oneshot::channel();

        ReporterMessage::Flush(flush_tx).send(&tx);
        ReporterMessage::Stop.send(&tx);

        reporter.run().await?;

        assert!(flush_rx.await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn stop_emits_final_report_into_metrics() -> Result<()> {
        let metrics = Arc::new(Metrics::new()?);
        let config = ReporterConfig {
            label: "sync_committee_messages".to_owned(),
            ..ReporterConfig::default()
        };

        let (buffer, tx, reporter) = reporter(config, Some(Arc::clone(&metrics)))?;

        buffer.record_success();
        buffer.record_failure(Cause::new(CauseKind::BadRequest, "invalid sync committee message"));

        ReporterMessage::Stop.send(&tx);

        reporter.run().await?;

        let report_times = metrics
            .aggregation_report_times
            .get_metric_with_label_values(&["sync_committee_messages"])?;

        assert_eq!(report_times.get_sample_count(), 1);
        assert_eq!(buffer.read_success_count(), 0);
        assert_eq!(buffer.read_error_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn empty_reports_are_skipped_unless_configured() -> Result<()> {
        for (report_empty, expected_samples) in [(false, 0), (true, 1)] {
            let metrics = Arc::new(Metrics::new()?);
            let config = ReporterConfig {
                report_empty,
                ..ReporterConfig::default()
            };

            let (_buffer, tx, reporter) = reporter(config, Some(Arc::clone(&metrics)))?;

            ReporterMessage::Stop.send(&tx);

            reporter.run().await?;

            let report_times = metrics
                .aggregation_report_times
                .get_metric_with_label_values(&["aggregation"])?;

            assert_eq!(report_times.get_sample_count(), expected_samples);
        }

        Ok(())
    }

    #[tokio::test]
    async fn dropped_senders_end_run_after_final_report() -> Result<()> {
        let (buffer, tx, reporter) = reporter(ReporterConfig::default(), None)?;

        buffer.record_failure("peer disconnected");

        drop(tx);

        reporter.run().await?;

        assert_eq!(buffer.read_error_count(), 0);
        assert_eq!(buffer.pending_failure_details(), 0);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticks_drain_buffer() -> Result<()> {
        let config = ReporterConfig {
            interval: Duration::from_secs(12),
            ..ReporterConfig::default()
        };

        let (buffer, tx, reporter) = reporter(config, None)?;
        let handle = tokio::spawn(reporter.run());

        buffer.record_success();
        buffer.record_failure("late attestation");

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(buffer.read_success_count(), 1);

        tokio::time::sleep(Duration::from_secs(7)).await;

        assert_eq!(buffer.read_success_count(), 0);
        assert_eq!(buffer.read_error_count(), 0);
        assert_eq!(buffer.pending_failure_details(), 0);

        ReporterMessage::Stop.send(&tx);

        handle.await??;

        Ok(())
    }

    #[test]
    fn send_to_dropped_reporter_is_ignored() {
        let (tx, rx) = mpsc::unbounded();

        drop(rx);

        ReporterMessage::Stop.send(&tx);
    }
}
