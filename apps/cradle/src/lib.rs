//! # Cradle Application Library
//!
//! Exposes the HTTP API and CLI modules for the binary and for integration
//! tests (`cradle::api::*`).

pub mod api;
pub mod cli;
