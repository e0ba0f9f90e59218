// WorkSite Infrastructure - SQLite Adapter
// Implements: JobStore, ApplicationStore, TransactionalMatchStore

mod connection;
mod match_store;
mod migration;
mod transaction;

pub use connection::create_pool;
pub use match_store::SqliteMatchStore;
pub use migration::run_migrations;
pub use transaction::SqliteMatchTransaction;

// Note: sqlx::Error conversion is handled by helper functions in match_store
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
