//! Input boundary: obtains a [`RawTable`](crate::table::RawTable) from a
//! delimited-text file, a CSV URL or the Google Sheets values API.
//!
//! Every failure here is an [`IngestError::SourceUnavailable`](crate::error::IngestError)
//! or a CSV error; nothing is retried.

pub mod csv_file;
pub mod sheets;

pub use csv_file::{detect_delimiter, load_csv, parse_csv};
pub use sheets::{SheetsAuth, SheetsClient};
