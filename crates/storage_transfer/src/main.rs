mod app;

use actix_web::web;
use std::sync::Arc;
use storage_transfer::{config, routes, utils};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .json()
        .init();

    info!("Starting Storage Transfer");

    // Load configuration; a missing required field is fatal here, never
    // inside the workflow.
    let config_path = std::env::var("TRANSFER_CONFIG").ok();
    let config = config::Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load config: {}", e);
        e
    })?;

    info!("Configuration loaded");

    // Register metrics before anything can record into them
    let _ = utils::metrics::Metrics::init();

    // Initialize application
    let app = app::App::initialize(&config).await?;

    // One token shared by the timer loop, in-flight sweeps and the HTTP
    // adapters; cancelled on shutdown, checked between batch items.
    let shutdown = CancellationToken::new();

    // Timer trigger: periodic sweep of the scheduled container
    let sweep_handle = if config.sweep.enabled {
        let orchestrator = Arc::clone(&app.orchestrator);
        let interval = config.sweep.interval_secs;
        let cancel = shutdown.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so startup does not
            // race an operator-triggered run.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                info!("Timer trigger fired");
                if let Err(e) = orchestrator.sweep(&cancel).await {
                    // Return value of a timer-driven sweep is consumed only
                    // here; per-item failures were already logged.
                    error!(error = %e, "Scheduled sweep could not run");
                    utils::metrics::Metrics::init().record_error(e.kind());
                }
            }
        }))
    } else {
        warn!("Scheduled sweeps disabled by configuration");
        None
    };

    // Start HTTP server
    use actix_web::{App as ActixApp, HttpServer};
    let server_addr = format!("{}:{}", config.server.host, config.server.port);
    let orchestrator_for_server = Arc::clone(&app.orchestrator);
    let auth_state_for_server = app.auth_state.clone();
    let shutdown_for_server = shutdown.clone();

    info!("Starting HTTP server on {}", server_addr);
    let server = HttpServer::new(move || {
        let app_state = routes::api::AppState {
            orchestrator: Arc::clone(&orchestrator_for_server),
            auth_state: auth_state_for_server.clone(),
            shutdown: shutdown_for_server.clone(),
        };
        ActixApp::new()
            .app_data(web::Data::new(app_state))
            .route("/health", web::get().to(routes::api::health_check))
            .route("/metrics", web::get().to(routes::api::metrics_handler))
            .route(
                "/api/v1/transferfiles",
                web::post().to(routes::api::transfer_files),
            )
            .route(
                "/api/v1/events/blob-created",
                web::post().to(routes::api::blob_created),
            )
            .route("/api-docs", web::get().to(routes::api::scalar_docs))
            .route(
                "/api-docs/openapi.json",
                web::get().to(routes::api::openapi_json),
            )
    })
    .bind(&server_addr)?
    .run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    info!("Storage Transfer started successfully");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    // Graceful shutdown: stop new sweeps, let the current item finish
    info!("Initiating graceful shutdown");
    shutdown.cancel();
    if let Some(handle) = sweep_handle {
        if let Err(e) = handle.await {
            warn!("Sweep task ended abnormally: {}", e);
        }
    }
    server_handle.stop(true).await;
    let _ = server_task.await;

    info!("Storage Transfer stopped");
    Ok(())
}
