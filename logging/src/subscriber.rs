use std::io::{self, IsTerminal as _};

use anyhow::Result;
use chrono::{Local, SecondsFormat};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    reload::{self, Handle},
    EnvFilter, Registry,
};

const LOG_ENV_VARIABLE: &str = "AGGREGATION_LOG";

const WORKSPACE_CRATES: &[&str] = &[
    "aggregation_buffer",
    "aggregation_reporter",
    "logging",
    "prometheus_metrics",
];

#[derive(Clone)]
pub struct TracingHandle {
    log_handle: Handle<EnvFilter, Registry>,
}

impl TracingHandle {
    pub fn modify_log<F>(&self, f: F) -> Result<(), reload::Error>
    where
        F: FnOnce(&mut EnvFilter),
    {
        self.log_handle.modify(f)
    }
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        write!(
            w,
            "[{}]",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

/// Installs the global `tracing` subscriber.
///
/// Every workspace crate and `module_path` log at `info` by default.
/// Directives in the `AGGREGATION_LOG` environment variable are applied on top.
/// Fails if a global subscriber has already been installed.
pub fn initialize_tracing_logger(
    module_path: &str,
    always_write_style: bool,
) -> Result<TracingHandle> {
    let (filter_layer, log_handle) = reload::Layer::new(default_filter(module_path)?);
    let enable_ansi = always_write_style || io::stdout().is_terminal();

    let stdout_layer = fmt::layer::<Registry>()
        .compact()
        .with_thread_ids(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(true)
        .with_timer(LocalTimer)
        .with_ansi(enable_ansi);

    tracing_subscriber::registry()
        .with(stdout_layer.with_filter(filter_layer))
        .try_init()?;

    tracing::debug!("tracing started!");

    Ok(TracingHandle { log_handle })
}

fn default_filter(module_path: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::default().add_directive(LevelFilter::OFF.into());

    for crate_name in WORKSPACE_CRATES {
        filter = filter.add_directive(format!("{crate_name}=info").parse()?);
    }

    filter = filter.add_directive(format!("{module_path}=info").parse()?);

    if let Ok(env_filter) = EnvFilter::try_from_env(LOG_ENV_VARIABLE) {
        for directive in env_filter.to_string().split(',') {
            filter = filter.add_directive(directive.parse()?);
        }
    }

    Ok(filter)
}
