use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging on stderr.
///
/// Status lines go to stdout, so logs never interleave with them. `RUST_LOG`
/// wins over the configured level; `verbose` forces debug output.
pub fn init_telemetry(config: &ObservabilityConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (json_layer, text_layer) = if config.json_logs {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    tracing::debug!("pbi-fixer telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the API calls of one fixer run
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create the span every fixer run executes in
pub fn create_fixer_span(
    fixer: &str,
    item: &str,
    workspace: Option<&str>,
    scan_only: bool,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "fixer",
        fixer = fixer,
        item = item,
        workspace = workspace,
        scan_only = scan_only,
        correlation.id = correlation_id,
    )
}
