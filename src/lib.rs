// Re-export modules
pub mod browser;
pub mod challenge;
pub mod collect;
pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod filter;
pub mod output;
pub mod readiness;
pub mod records;
pub mod stages;

// Re-export commonly used types for convenience
pub use browser::{DriverError, PageDriver, WebDriverPage};
pub use readiness::{DeadReason, PageReadiness};
pub use records::{DetailRecord, LinkSet};
