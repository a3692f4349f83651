pub use crate::{
    config::ReporterConfig,
    messages::ReporterMessage,
    reporter::AggregationReporter,
};

mod config;
mod error;
mod messages;
mod reporter;
