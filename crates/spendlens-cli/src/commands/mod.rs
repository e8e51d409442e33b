//! CLI command implementations
//!
//! Commands are organized by view:
//! - `shared` - Shared utilities (config, source selection, one-shot refresh)
//! - `dashboard` - Headline figures and category breakdown
//! - `clusters` - Spend-pattern clusters
//! - `trend` - Monthly trend with forecast
//! - `budget` - Budget utilization
//! - `calendar` - Month calendar and day detail
//! - `records` - Filtered receipt list

pub mod budget;
pub mod calendar;
pub mod clusters;
pub mod dashboard;
pub mod records;
pub mod shared;
pub mod trend;

// Re-export command functions for main.rs
pub use budget::*;
pub use calendar::*;
pub use clusters::*;
pub use dashboard::*;
pub use records::*;
pub use shared::*;
pub use trend::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
