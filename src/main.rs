//! `smartlist` demo: drives a viewport over an in-memory list and prints
//! what a host would draw.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use smartlist::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use smartlist::{ListSource, RenderModel, SmartListConfig, SmartListError, ViewportController};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), SmartListError> {
    let config = load_config()?;
    config.validate()?;

    let titles = (1..=config.item_count).map(|n| format!("Item {n}")).collect();
    let source = Arc::new(ListSource::with_page_size(titles, config.page_size()?));
    let telemetry: Arc<dyn TelemetrySink> = if config.telemetry {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    };

    let mut controller =
        ViewportController::new(Arc::clone(&source), config.viewport_options()?, telemetry)
            .with_viewport(config.viewport().scrolled_to(0));
    controller.initialize().await;
    controller.set_viewport(config.viewport()).await;

    let first_appended = config.item_count.saturating_add(1);
    source.extend(
        (first_appended..first_appended.saturating_add(config.append_count))
            .map(|n| format!("Item {n}")),
    );
    let handled = controller.pump_events().await;
    tracing::debug!("applied {handled} source notifications");

    let model = controller.render_model();
    controller.shutdown();

    if config.json {
        write_json(&model)
    } else {
        write_text(&model)
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`SmartListError::Configuration`] when ortho-config fails to
/// parse arguments or load configuration files.
fn load_config() -> Result<SmartListConfig, SmartListError> {
    SmartListConfig::load().map_err(|error| SmartListError::Configuration {
        message: error.to_string(),
    })
}

fn write_json(model: &RenderModel<String>) -> Result<(), SmartListError> {
    let json = serde_json::to_string_pretty(model).map_err(|error| SmartListError::Io {
        message: error.to_string(),
    })?;
    write_lines(std::iter::once(json))
}

fn write_text(model: &RenderModel<String>) -> Result<(), SmartListError> {
    let rows = model.render_with(String::clone);
    let count = if model.count_known { "known" } else { "unknown" };
    let summary = format!(
        "total height {} ({count} count) in {} filler blocks",
        model.total_height,
        model.filler_blocks.len()
    );

    write_lines(
        rows.into_iter()
            .map(|row| format!("{:>8}  {}", row.top_offset.to_string(), row.item))
            .chain(std::iter::once(summary)),
    )
}

fn write_lines(lines: impl IntoIterator<Item = String>) -> Result<(), SmartListError> {
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}").map_err(|error| SmartListError::Io {
            message: error.to_string(),
        })?;
    }
    Ok(())
}
