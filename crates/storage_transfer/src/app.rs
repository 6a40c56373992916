//! Application initialization and setup

use std::sync::Arc;

use storage_transfer::config::Config;
use storage_transfer::middleware::auth::AuthState;
use storage_transfer::models::error::TransferError;
use storage_transfer::services::orchestrator::TransferOrchestrator;
use storage_transfer::stores::azure_source::AzureBlobStore;
use storage_transfer::stores::destination_trait::DestinationStore;
use storage_transfer::stores::s3_destination::S3BucketStore;
use storage_transfer::stores::source_trait::SourceStore;

/// Application components
pub struct App {
    pub orchestrator: Arc<TransferOrchestrator>,
    pub auth_state: Option<Arc<AuthState>>,
}

impl App {
    /// Initialize application components
    pub async fn initialize(config: &Config) -> Result<Self, TransferError> {
        let source: Arc<dyn SourceStore> =
            Arc::new(AzureBlobStore::from_connection_string(
                &config.source.connection_string,
            )?);
        let destination: Arc<dyn DestinationStore> =
            Arc::new(S3BucketStore::new(&config.destination));

        let orchestrator = Arc::new(TransferOrchestrator::new(config, source, destination)?);

        let auth_state = if config.auth.enabled {
            Some(Arc::new(AuthState::from_config(&config.auth).await?))
        } else {
            None
        };

        Ok(App {
            orchestrator,
            auth_state,
        })
    }
}
