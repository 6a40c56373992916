//! Storage implementations

pub mod azure_source;
pub mod destination_trait;
pub mod memory;
pub mod s3_destination;
pub mod source_trait;
