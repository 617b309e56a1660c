//! Setup logging subsystem.

use std::collections::HashSet;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::config::{Log, LogFormat};

/// Crates whose events are logged at the configured level when no filtering directive is set
pub const WORKSPACE_CRATES: [&str; 6] = [
    "common_enums",
    "common_utils",
    "cards",
    "domain_types",
    "external_services",
    "connector_integration",
];

/// Keeps the non-blocking log writers alive; logs are flushed when it is dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    _log_guards: Vec<WorkerGuard>,
}

/// Setup logging sub-system specifying the logging configuration, service (binary) name, and a
/// list of external crates for which a more verbose logging must be enabled. All crates within the
/// current cargo workspace are automatically considered for verbose logging.
pub fn setup(
    config: &Log,
    service_name: &str,
    crates_to_filter: impl AsRef<[&'static str]>,
) -> TelemetryGuard {
    let mut guards = Vec::new();

    let console_layer = if config.console.enabled {
        let (console_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);

        let console_filter = get_envfilter(
            config.console.filtering_directive.as_ref(),
            config.console.level.into_level(),
            crates_to_filter.as_ref(),
        );

        let layer = match config.console.log_format {
            LogFormat::Default => fmt::layer()
                .pretty()
                .with_writer(console_writer)
                .with_filter(console_filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(console_writer)
                .with_filter(console_filter)
                .boxed(),
        };
        Some(layer)
    } else {
        None
    };

    if let Err(error) = tracing_subscriber::registry().with(console_layer).try_init() {
        tracing::warn!(%error, "a global tracing subscriber is already installed");
    }

    tracing::debug!(service = service_name, "logging subsystem initialized");

    TelemetryGuard {
        _log_guards: guards,
    }
}

fn get_envfilter(
    filtering_directive: Option<&String>,
    default_log_level: tracing::Level,
    crates_to_filter: &[&'static str],
) -> EnvFilter {
    filtering_directive
        .map(|filter| {
            // Try to create target filter from specified filtering directive, if set
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(default_log_level).into())
                .parse_lossy(filter)
        })
        .unwrap_or_else(|| {
            // Construct a default target filter otherwise
            let workspace_members = WORKSPACE_CRATES
                .iter()
                .chain(crates_to_filter.iter())
                .map(|crate_name| crate_name.replace('-', "_"))
                .collect::<HashSet<_>>();

            let directives = workspace_members
                .into_iter()
                .map(|crate_name| format!("{crate_name}={default_log_level}"))
                .collect::<Vec<_>>()
                .join(",");

            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .parse_lossy(directives)
        })
}
