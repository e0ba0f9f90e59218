// Application Layer - Use Cases and Business Logic

pub mod matching;
pub mod retry;

// Re-exports
pub use matching::{JobSnapshot, MatchingService};
pub use retry::RetryPolicy;
