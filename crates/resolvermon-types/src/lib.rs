//! Shared domain types for the resolver monitor.

pub mod config;
pub mod events;
pub mod metrics;
pub mod subject;

mod errors;

pub use errors::{InvalidEventReason, ResolverError, Result};
