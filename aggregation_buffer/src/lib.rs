//! Thread-safe accumulation of operation outcomes.
//!
//! Producers record successes, error counts and failure details concurrently.
//! A single consumer periodically takes an [`Aggregation`] snapshot, which resets the buffer.

pub use crate::{
    aggregation::Aggregation,
    buffer::AggregationBuffer,
    cause::{Cause, CauseKind},
    config::{BufferConfig, Consistency},
};

mod aggregation;
mod buffer;
mod cause;
mod config;
