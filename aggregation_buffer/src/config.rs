use serde::Deserialize;

/// How much a snapshot may disagree with the producer calls it covers.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Consistency {
    /// Counters and failure details are synchronized independently.
    /// A producer racing with a snapshot may be reflected in the counts but not the details
    /// (or the other way around), and increments landing between the read and the reset of
    /// the counters are dropped.
    #[default]
    Relaxed,
    /// Snapshots exclude producers entirely.
    /// Every producer call is reflected in exactly one snapshot, in full.
    Strict,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct BufferConfig {
    pub consistency: Consistency,
}
