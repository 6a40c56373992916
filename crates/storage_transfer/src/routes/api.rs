//! HTTP route handlers for the transfer triggers

use actix_web::{web, HttpRequest, HttpResponse, Responder, Result as ActixResult};
use chrono::Utc;
use prometheus::Encoder;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::middleware::auth::AuthState;
use crate::models::types::{BlobCreatedEvent, TransferItem};
use crate::services::orchestrator::TransferOrchestrator;

pub struct AppState {
    pub orchestrator: Arc<TransferOrchestrator>,
    pub auth_state: Option<Arc<AuthState>>,
    pub shutdown: CancellationToken,
}

// Helper function to check auth
async fn check_auth(
    req: &HttpRequest,
    auth_state: &Option<Arc<AuthState>>,
) -> Result<(), HttpResponse> {
    if let Some(auth) = auth_state {
        if auth.api_keys.is_empty() {
            return Ok(()); // Auth disabled
        }

        let api_key = req
            .headers()
            .get("X-API-Key")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        if let Some(key) = api_key {
            if !auth.api_keys.contains(&key) {
                return Err(HttpResponse::Unauthorized().json(json!({
                    "error": "Invalid API key"
                })));
            }

            if !auth.rate_limiter.check(&key).await {
                return Err(HttpResponse::TooManyRequests().json(json!({
                    "error": "Rate limit exceeded"
                })));
            }
        } else {
            return Err(HttpResponse::Unauthorized().json(json!({
                "error": "Missing API key header: X-API-Key"
            })));
        }
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/transferfiles",
    tag = "transfers",
    responses(
        (status = 200, description = "Batch was attempted; per-item failures are logged, not surfaced"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "The sweep itself could not run")
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn transfer_files(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> ActixResult<impl Responder> {
    if let Err(resp) = check_auth(&req, &data.auth_state).await {
        return Ok(resp);
    }

    info!("On-demand transfer request received");
    match data.orchestrator.sweep(&data.shutdown).await {
        // The acknowledgment means "batch was attempted", nothing more.
        Ok(_) => Ok(HttpResponse::Ok().finish()),
        Err(e) => {
            error!(error = %e, "On-demand sweep could not run");
            crate::utils::metrics::Metrics::init().record_error(e.kind());
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": e.to_string()
            })))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/events/blob-created",
    tag = "transfers",
    request_body = BlobCreatedEvent,
    responses(
        (status = 200, description = "Event processed; body carries the per-item outcome"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "The transfer failed; surfaced for platform-level retry")
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn blob_created(
    req: HttpRequest,
    data: web::Data<AppState>,
    event: web::Json<BlobCreatedEvent>,
) -> ActixResult<impl Responder> {
    if let Err(resp) = check_auth(&req, &data.auth_state).await {
        return Ok(resp);
    }

    let event = event.into_inner();
    info!(name = %event.name, size = event.size, "Processing blob-created event");

    let item = TransferItem::new(event.name, event.size);
    match data.orchestrator.transfer_single(&item).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        // Single-item failures are surfaced, never swallowed, so the event
        // source can see and retry them.
        Err(e) => {
            error!(name = %item.name, error = %e, "Event-driven transfer failed");
            crate::utils::metrics::Metrics::init().record_error(e.kind());
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": e.to_string(),
                "name": item.name
            })))
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status")
    )
)]
pub async fn health_check() -> ActixResult<impl Responder> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now()
    })))
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "Prometheus metrics")
    )
)]
pub async fn metrics_handler() -> ActixResult<impl Responder> {
    use prometheus::TextEncoder;

    // Ensure metrics are registered before the first scrape
    let _ = crate::utils::metrics::Metrics::init();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => Ok(HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buffer)),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            Ok(HttpResponse::InternalServerError().body(format!("Failed to encode metrics: {}", e)))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api-docs/openapi.json",
    tag = "docs",
    responses(
        (status = 200, description = "OpenAPI specification", content_type = "application/json")
    )
)]
pub async fn openapi_json() -> ActixResult<impl Responder> {
    use utoipa::OpenApi;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .json(serde_json::to_value(crate::libs::openapi::ApiDoc::openapi()).unwrap_or_default()))
}

#[utoipa::path(
    get,
    path = "/api-docs",
    tag = "docs",
    responses(
        (status = 200, description = "Scalar API documentation UI", content_type = "text/html")
    )
)]
pub async fn scalar_docs() -> ActixResult<impl Responder> {
    Ok(crate::libs::scalar::scalar_ui().await)
}
