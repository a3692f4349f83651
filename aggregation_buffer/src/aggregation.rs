use core::fmt::{Display, Formatter, Result as FmtResult};
use std::collections::BTreeMap;

use crate::cause::{Cause, CauseKind};

/// Snapshot of an [`AggregationBuffer`] taken between two resets.
///
/// `errors` is counted independently of `error_details`, so the two need not agree.
///
/// [`AggregationBuffer`]: crate::AggregationBuffer
#[derive(Default, Debug)]
pub struct Aggregation {
    pub successes: u64,
    pub errors: u64,
    pub error_details: Vec<Cause>,
}

impl Display for Aggregation {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        writeln!(formatter, "Aggregation Summary:")?;
        writeln!(formatter, "  Successes: {}", self.successes)?;
        writeln!(formatter, "  Errors: {}", self.errors)?;

        if !self.error_details.is_empty() {
            writeln!(formatter, "  Error Details:")?;

            for (index, cause) in self.error_details.iter().enumerate() {
                writeln!(formatter, "    {}: {cause}", index + 1)?;
            }
        }

        Ok(())
    }
}

impl Aggregation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successes == 0 && self.errors == 0 && self.error_details.is_empty()
    }

    #[must_use]
    pub fn kind_counts(&self) -> BTreeMap<CauseKind, u64> {
        let mut counts = BTreeMap::new();

        for cause in &self.error_details {
            *counts.entry(cause.kind()).or_default() += 1;
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn aggregation(successes: u64, errors: u64, details: &[&str]) -> Aggregation {
        Aggregation {
            successes,
            errors,
            error_details: details.iter().copied().map(Cause::msg).collect(),
        }
    }

    #[test_case(
        aggregation(0, 0, &[])
        => "Aggregation Summary:\n  Successes: 0\n  Errors: 0\n";
        "empty"
    )]
    #[test_case(
        aggregation(5, 3, &[])
        => "Aggregation Summary:\n  Successes: 5\n  Errors: 3\n";
        "counts without details"
    )]
    #[test_case(
        aggregation(2, 1, &["x", "y"])
        => "Aggregation Summary:\n  Successes: 2\n  Errors: 1\n  Error Details:\n    1: x\n    2: y\n";
        "counts with details"
    )]
    #[test_case(
        aggregation(0, 0, &["only detail"])
        => "Aggregation Summary:\n  Successes: 0\n  Errors: 0\n  Error Details:\n    1: only detail\n";
        "details without error count"
    )]
    fn display_matches_report_format(aggregation: Aggregation) -> String {
        aggregation.to_string()
    }

    #[test]
    fn detail_indices_are_not_padded() {
        let details = (1..=10).map(|index| format!("cause {index}")).collect::<Vec<_>>();
        let details = details.iter().map(String::as_str).collect::<Vec<_>>();
        let report = aggregation(0, 10, &details).to_string();

        assert!(report.contains("\n    9: cause 9\n"));
        assert!(report.ends_with("\n    10: cause 10\n"));
    }

    #[test_case(aggregation(0, 0, &[]) => true; "nothing recorded")]
    #[test_case(aggregation(1, 0, &[]) => false; "success recorded")]
    #[test_case(aggregation(0, 1, &[]) => false; "error counted")]
    #[test_case(aggregation(0, 0, &["x"]) => false; "detail recorded")]
    fn is_empty(aggregation: Aggregation) -> bool {
        aggregation.is_empty()
    }

    #[test]
    fn kind_counts_groups_details_by_kind() {
        let aggregation = Aggregation {
            successes: 0,
            errors: 4,
            error_details: vec![
                Cause::new(CauseKind::Unavailable, "execution engine offline"),
                Cause::new(CauseKind::BadRequest, "signed aggregate request can't be nil"),
                Cause::new(CauseKind::Unavailable, "execution engine still offline"),
                Cause::new(CauseKind::Panic, "worker died"),
            ],
        };

        let counts = aggregation.kind_counts().into_iter().collect::<Vec<_>>();

        assert_eq!(
            counts,
            [
                (CauseKind::BadRequest, 1),
                (CauseKind::Unavailable, 2),
                (CauseKind::Panic, 1),
            ],
        );
    }
}
