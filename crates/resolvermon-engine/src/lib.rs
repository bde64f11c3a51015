//! Resolver event aggregation: subject ledger, aggregator, and read-only queries.

mod aggregator;
mod ledger;
mod query;

pub use aggregator::Aggregator;
pub use ledger::SubjectLedger;
pub use query::{DashboardSnapshot, QuerySurface};
