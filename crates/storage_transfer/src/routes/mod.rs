//! HTTP routes

pub mod api;
