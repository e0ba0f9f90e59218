// Port Layer - Interfaces for external dependencies

pub mod application_store;
pub mod id_provider; // For deterministic testing
pub mod job_store;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use application_store::ApplicationStore;
pub use id_provider::IdProvider;
pub use job_store::JobStore;
pub use time_provider::TimeProvider;
pub use transaction::{MatchStoreTransaction, Transaction, TransactionalMatchStore};
