pub mod columns;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod report;
pub mod source;
pub mod table;
