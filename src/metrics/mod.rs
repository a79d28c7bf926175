//! NPS metrics engine.
//!
//! Consumes normalized records and produces the overall category breakdown,
//! the monthly trend, per-service averages and the correlation between
//! recommendation and retention scores.

pub mod category;
pub mod comments;
pub mod summary;
pub mod trend;
pub mod types;
pub mod utility;

pub use category::NpsCategory;
pub use comments::recent_comments;
pub use summary::summarize;
pub use types::{CategoryBreakdown, CommentEntry, MonthKey, MonthlyBucket, NpsSummary};
