//! Storage Transfer Library
//!
//! Moves files from Azure Blob Storage containers to an Amazon S3 bucket,
//! filtering by file extension. Event-driven arrivals in the live container
//! are uploaded as-is; objects swept from the scheduled container are
//! uploaded and then relocated into the archive container.

// Core modules
pub mod config;
pub mod models;

// Routes and middleware
pub mod middleware;
pub mod routes;

// Services
pub mod services;

// Storage
pub mod stores;

// Utilities
pub mod utils;

// External library integrations
pub mod libs;

// Re-export commonly used types
pub use config::Config;
pub use models::error::TransferError;
pub use models::types::{TransferItem, TransferOutcome, TransferStage};
pub use services::orchestrator::TransferOrchestrator;
