//! Business logic services

pub mod archiver;
pub mod copier;
pub mod filter;
pub mod orchestrator;
