use csv::{ByteRecord, ReaderBuilder};
use std::path::Path;
use tracing::debug;

use crate::error::IngestError;
use crate::table::RawTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Picks the delimiter (comma, semicolon, tab, pipe) that appears most
/// consistently across the first lines. Defaults to a comma.
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample: Vec<&str> = content.lines().take(10).filter(|l| !l.is_empty()).collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0usize;

    for &delimiter in &candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|l| l.bytes().filter(|&b| b == delimiter).count())
            .collect();
        let min = counts.iter().copied().min().unwrap_or(0);
        if min > best_score {
            best_score = min;
            best = delimiter;
        }
    }

    best
}

fn decode(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Parses delimited text into a [`RawTable`]. The first record is the header.
///
/// Ragged rows are kept as-is; invalid UTF-8 is replaced rather than rejected.
pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, IngestError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = detect_delimiter(&String::from_utf8_lossy(bytes));
    debug!(delimiter = %(delimiter as char).escape_default(), "Parsing delimited text");

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        rows.push(decode(&record?));
    }

    Ok(RawTable::new(rows))
}

/// Reads and parses a local delimited-text file.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_csv(path: &Path) -> Result<RawTable, IngestError> {
    let bytes = std::fs::read(path)
        .map_err(|e| IngestError::SourceUnavailable(format!("{}: {e}", path.display())))?;
    parse_csv(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("a;b;c\n1;2,5;3"), b';');
        assert_eq!(detect_delimiter("a\tb\n1\t2"), b'\t');
        assert_eq!(detect_delimiter("single"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_parse_csv_with_quotes_and_ragged_rows() {
        let table = parse_csv(b"Horodateur,Note\n\"24/03/2024 14:30:00\",\"9, super\"\n25/03/2024 10:00:00\n").unwrap();
        assert_eq!(table.headers(), ["Horodateur", "Note"]);
        assert_eq!(table.data_rows()[0], vec!["24/03/2024 14:30:00", "9, super"]);
        assert_eq!(table.data_rows()[1], vec!["25/03/2024 10:00:00"]);
    }

    #[test]
    fn test_parse_csv_strips_bom_and_reads_semicolons() {
        let table = parse_csv("\u{feff}Avis;Note\nTrès bien;10\n".as_bytes()).unwrap();
        assert_eq!(table.headers(), ["Avis", "Note"]);
        assert_eq!(table.data_rows()[0], vec!["Très bien", "10"]);
    }

    #[test]
    fn test_parse_empty_input() {
        let table = parse_csv(b"").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let err = load_csv(&temp_path("survey_nps_does_not_exist.csv")).unwrap_err();
        assert!(matches!(err, IngestError::SourceUnavailable(_)));
    }

    #[test]
    fn test_load_csv_from_disk() {
        let path = temp_path("survey_nps_test_load.csv");
        fs::write(&path, "Recommandation\n8\n").unwrap();
        let table = load_csv(&path).unwrap();
        assert_eq!(table.dimensions(), (1, 1));
        fs::remove_file(&path).unwrap();
    }
}
