//! services/client/src/lib.rs
//!
//! The PACE client: local session storage, the REST adapter and the application
//! layer that drives sign-in and the assessment flow.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod telemetry;
