//! Raw tabular input and the structural clean-up applied before discovery.

use std::collections::{HashMap, HashSet};

/// Unprocessed table of string cells. The first row holds the headers.
///
/// Rows may be ragged; missing trailing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_str_rows(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of data rows and number of header columns.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.data_rows().len(), self.headers().len())
    }
}

/// Makes header names unique.
///
/// The first occurrence keeps its name; each repetition gets `_1`, `_2`, ...
/// A suffix already taken by another header is skipped.
pub fn dedup_headers(headers: &[String]) -> Vec<String> {
    let originals: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let mut used: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut repeats: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());

    for header in headers {
        if used.insert(header.clone()) {
            out.push(header.clone());
            continue;
        }

        let n = repeats.entry(header.as_str()).or_insert(0);
        let candidate = loop {
            *n += 1;
            let candidate = format!("{header}_{n}");
            if !used.contains(&candidate) && !originals.contains(candidate.as_str()) {
                break candidate;
            }
        };
        used.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Indices of columns holding at least one non-blank cell.
///
/// With no data rows every column is kept.
pub fn non_empty_columns(width: usize, rows: &[Vec<String>]) -> Vec<usize> {
    if rows.is_empty() {
        return (0..width).collect();
    }
    (0..width)
        .filter(|&idx| rows.iter().any(|r| !cell(r, idx).trim().is_empty()))
        .collect()
}

/// A de-duplicated, pruned view of a [`RawTable`] keyed by unique column name.
#[derive(Debug, Clone)]
pub struct CleanTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub pruned: Vec<String>,
}

impl CleanTable {
    pub fn from_raw(raw: &RawTable) -> Self {
        let headers = dedup_headers(raw.headers());
        let keep = non_empty_columns(headers.len(), raw.data_rows());

        let pruned = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !keep.contains(i))
            .map(|(_, h)| h.clone())
            .collect();

        let rows = raw
            .data_rows()
            .iter()
            .map(|r| keep.iter().map(|&i| cell(r, i).to_string()).collect())
            .collect();

        CleanTable {
            headers: keep.iter().map(|&i| headers[i].clone()).collect(),
            rows,
            pruned,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn value(&self, row: usize, col: usize) -> &str {
        self.rows.get(row).map(|r| cell(r, col)).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedup_duplicate_score() {
        let out = dedup_headers(&strings(&["Score", "Score"]));
        assert_eq!(out, strings(&["Score", "Score_1"]));
    }

    #[test]
    fn test_dedup_three_repeats() {
        let out = dedup_headers(&strings(&["a", "b", "a", "a"]));
        assert_eq!(out, strings(&["a", "b", "a_1", "a_2"]));
    }

    #[test]
    fn test_dedup_is_idempotent_on_unique_headers() {
        let unique = strings(&["Horodateur", "Score", "Score_1", ""]);
        assert_eq!(dedup_headers(&unique), unique);
        assert_eq!(dedup_headers(&dedup_headers(&unique)), unique);
    }

    #[test]
    fn test_dedup_skips_taken_suffix() {
        let out = dedup_headers(&strings(&["x", "x_1", "x"]));
        assert_eq!(out, strings(&["x", "x_1", "x_2"]));
    }

    #[test]
    fn test_dedup_empty_headers() {
        let out = dedup_headers(&strings(&["", ""]));
        assert_eq!(out, strings(&["", "_1"]));
    }

    #[test]
    fn test_clean_table_prunes_empty_columns() {
        let raw = RawTable::from_str_rows(&[
            &["a", "empty", "b"],
            &["1", "", "x"],
            &["2", "  ", ""],
        ]);
        let clean = CleanTable::from_raw(&raw);
        assert_eq!(clean.headers, strings(&["a", "b"]));
        assert_eq!(clean.pruned, strings(&["empty"]));
        assert_eq!(clean.value(0, 1), "x");
        assert_eq!(clean.value(1, 1), "");
    }

    #[test]
    fn test_clean_table_keeps_columns_without_rows() {
        let raw = RawTable::from_str_rows(&[&["a", "b"]]);
        let clean = CleanTable::from_raw(&raw);
        assert_eq!(clean.headers, strings(&["a", "b"]));
        assert!(clean.rows.is_empty());
    }

    #[test]
    fn test_ragged_rows_read_as_empty() {
        let raw = RawTable::from_str_rows(&[&["a", "b"], &["1"]]);
        let clean = CleanTable::from_raw(&raw);
        assert_eq!(clean.headers, strings(&["a"]));
        assert_eq!(clean.value(0, 0), "1");
        assert_eq!(clean.value(5, 0), "");
    }

    #[test]
    fn test_dimensions() {
        let raw = RawTable::from_str_rows(&[&["a", "b"], &["1", "2"], &["3", "4"]]);
        assert_eq!(raw.dimensions(), (2, 2));
        assert_eq!(RawTable::default().dimensions(), (0, 0));
    }
}
