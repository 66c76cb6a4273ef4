pub mod extract;
pub mod rules;

// Re-export command functions for convenience
pub use extract::{extract, ExtractParams};
pub use rules::rules;
