use anyhow::Result;

mod config;
mod controller;
mod disposition;
mod download;
mod endpoint;
mod error;
mod http_client;
mod submission;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let mut config = config::Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        origin = %config.origin,
        api_base = %config.api_base,
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    if config.interactive {
        config::complete_interactively(&mut config.fields)?;
    }

    if !config::template_exists(&config.fields) {
        tracing::warn!("Template file not found, the submission will fail");
    }

    let client = http_client::GenerateClient::new(config.connect_timeout)?;
    let controller =
        controller::Controller::new(client, config.api_base.clone(), config.output_dir.clone());

    tracing::info!("Backend: {}", controller.api_base());

    let mut view = controller::FormView::echoing();
    let outcome = controller.submit(&mut view, &config.fields).await;

    match outcome {
        controller::SubmitOutcome::Downloaded { path, .. } => {
            tracing::info!("Saved to {}", path.display());
            Ok(())
        }
        controller::SubmitOutcome::Failed { .. } => std::process::exit(1),
    }
}
