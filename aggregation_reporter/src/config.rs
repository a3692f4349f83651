use core::time::Duration;
use std::time::Instant;

use anyhow::{ensure, Result};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};

use crate::error::Error;

const DEFAULT_LABEL: &str = "aggregation";
const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ReporterConfig {
    /// Prefix of log lines and value of the `buffer` metric label.
    pub label: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub interval: Duration,
    /// Log and count reports in which nothing was recorded.
    pub report_empty: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_owned(),
            interval: DEFAULT_INTERVAL,
            report_empty: false,
        }
    }
}

impl ReporterConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.label.is_empty(), Error::EmptyLabel);
        ensure!(!self.interval.is_zero(), Error::ZeroInterval);

        ensure!(
            Instant::now().checked_add(self.interval).is_some(),
            Error::IntervalTooLarge,
        );

        Ok(())
    }
}
