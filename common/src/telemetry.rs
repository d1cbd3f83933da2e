// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting
///
/// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(log_level = log_level, "Structured logging initialized");
    Ok(())
}

/// Install the Prometheus recorder and describe the service metrics
///
/// The returned handle renders the text exposition for `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_counter!(
        "table_reassignments_total",
        "Number of completed table renumbering runs, by mode"
    );
    describe_counter!(
        "projects_renumbered_total",
        "Number of projects given a new table number by a renumbering run"
    );
    describe_counter!(
        "judge_group_rotations_total",
        "Number of manual judge group rotations"
    );
    describe_counter!("projects_added_total", "Number of projects added, by group");

    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Record a completed renumbering run
#[inline]
pub fn record_reassignment(mode: &'static str, project_count: usize) {
    counter!("table_reassignments_total", "mode" => mode).increment(1);
    counter!("projects_renumbered_total", "mode" => mode).increment(project_count as u64);
}

/// Record a manual judge group rotation
#[inline]
pub fn record_judge_rotation(judge_count: usize) {
    counter!("judge_group_rotations_total").increment(1);
    tracing::debug!(judge_count = judge_count, "Judge rotation recorded");
}

/// Record a project added at the next free table
#[inline]
pub fn record_project_added(group: i64) {
    counter!("projects_added_total", "group" => group.to_string()).increment(1);
}
