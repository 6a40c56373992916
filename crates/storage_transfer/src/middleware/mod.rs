//! Route-level middleware

pub mod auth;
