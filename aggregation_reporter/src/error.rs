use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("aggregation report label must not be empty")]
    EmptyLabel,
    #[error("aggregation report interval must be greater than zero")]
    ZeroInterval,
    #[error("aggregation report interval is too large")]
    IntervalTooLarge,
}
