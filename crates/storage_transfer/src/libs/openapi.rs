//! OpenAPI specification and documentation

use utoipa::OpenApi;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify,
};

use crate::models::types::{
    BlobCreatedEvent, SweepSummary, TransferItem, TransferOutcome, TransferStage,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::api::health_check,
        crate::routes::api::metrics_handler,
        crate::routes::api::transfer_files,
        crate::routes::api::blob_created,
        crate::routes::api::openapi_json,
        crate::routes::api::scalar_docs,
    ),
    components(schemas(
        BlobCreatedEvent,
        TransferItem,
        TransferOutcome,
        TransferStage,
        SweepSummary,
    )),
    tags(
        (name = "health", description = "Health checks"),
        (name = "metrics", description = "Prometheus metrics"),
        (name = "transfers", description = "Transfer trigger endpoints"),
        (name = "docs", description = "API documentation"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            )
        }
    }
}
