//! Slide Viewer - resolve server-held images into a viewing surface.
//!
//! This binary runs the viewer core headlessly against a REST API and
//! reports what it would display.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slide_viewer::{
    config::{CheckConfig, Cli, Command, ResolveConfig},
    AnnotationModel, Collaborators, HeadlessAnnotationList, HeadlessBackend, HeadlessHost,
    HeadlessOverlayBackend, HeadlessSelection, LogAlertSink, MetadataService, RestClient,
    Visualization,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.clone() {
        Command::Resolve(config) => run_resolve(&cli, config).await,
        Command::Check(config) => run_check(&cli, config).await,
    }
}

/// Build the REST client from the global arguments.
fn build_client(cli: &Cli) -> Result<RestClient, String> {
    cli.validate()?;
    let client = RestClient::new(&cli.api_root).map_err(|e| e.to_string())?;
    Ok(match cli.token {
        Some(ref token) => client.with_token(token.clone()),
        None => client,
    })
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "slide_viewer=debug"
    } else {
        "slide_viewer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Resolve Command
// =============================================================================

async fn run_resolve(cli: &Cli, config: ResolveConfig) -> ExitCode {
    init_logging(cli.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let client = match build_client(cli) {
        Ok(client) => client,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("API root: {}", client.api_root());
    info!("Container: {}x{}", config.width, config.height);

    let alerts = Arc::new(LogAlertSink::new());
    let backend = HeadlessBackend::new();
    let surfaces = backend.handle();
    let collaborators = Collaborators {
        host: Arc::new(HeadlessHost::new(config.width, config.height)),
        selection: Arc::new(HeadlessSelection::new()),
        annotations: Arc::new(HeadlessAnnotationList::new()),
        alerts: alerts.clone(),
        overlay_backend: Arc::new(HeadlessOverlayBackend::new()),
    };

    let viewer = match Visualization::new(
        backend,
        Arc::new(client),
        collaborators,
        config.viewer_config(),
    ) {
        Ok(viewer) => viewer,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    viewer.render().await;

    let imagery = match viewer.select(&config.item_id).await {
        Ok(imagery) => imagery,
        Err(e) => {
            error!("Failed to resolve item {}: {}", config.item_id, e);
            viewer.destroy().await;
            return ExitCode::FAILURE;
        }
    };

    for id in &config.annotations {
        let outcome = viewer
            .toggle_annotation(&AnnotationModel::displayed(id.clone()))
            .await;
        info!("Annotation {}: {:?}", id, outcome);
    }

    let report = serde_json::json!({
        "state": viewer.state().await,
        "imagery": imagery,
        "surface": surfaces.live_surface(),
        "viewport": viewer.viewport().get(),
        "annotations": viewer.tracked_annotations().await,
        "alerts": alerts.alerts(),
    });

    viewer.destroy().await;

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(cli: &Cli, config: CheckConfig) -> ExitCode {
    // Initialize minimal logging for check command
    if cli.verbose {
        init_logging(true);
    }

    println!("Slide Viewer Configuration Check");
    println!("════════════════════════════════");
    println!();

    let client = match build_client(cli) {
        Ok(client) => {
            println!("✓ API root: {}", client.api_root());
            client
        }
        Err(e) => {
            println!("✗ API root: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if cli.token.is_some() {
        println!("✓ Token: provided");
    }
    println!();

    print!("Testing API connection... ");
    match client.server_version().await {
        Ok(version) => {
            println!("✓ success");
            if let Some(release) = version.get("release").and_then(|v| v.as_str()) {
                println!("  Server version: {}", release);
            }
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check:");
            println!("  - The API root is correct and reachable");
            println!("  - The server exposes the REST API under that root");
            return ExitCode::FAILURE;
        }
    }

    if let Some(ref item_id) = config.item {
        println!();
        print!("Looking up item {}... ", item_id);
        match client.get_item(item_id).await {
            Ok(item) => {
                println!("✓ found");
                println!("  Name: {}", item.name);
                println!("  Kind: {:?}", item.kind());
            }
            Err(e) => {
                println!("✗ failed");
                println!();
                println!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("All checks passed!");
    ExitCode::SUCCESS
}
