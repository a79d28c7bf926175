use std::cmp::Ordering;

use crate::metrics::types::CommentEntry;
use crate::normalize::NormalizedRecord;

/// Returns up to `limit` non-empty comments, most recent first.
///
/// Comments without a timestamp sort after dated ones, in source order.
pub fn recent_comments(records: &[NormalizedRecord], limit: usize) -> Vec<CommentEntry> {
    let mut entries: Vec<CommentEntry> = records
        .iter()
        .filter_map(|r| {
            let text = r.comment_text.as_ref()?;
            Some(CommentEntry {
                row: r.row,
                timestamp: r.timestamp,
                category: r.category(),
                text: text.clone(),
            })
        })
        .collect();

    entries.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.row.cmp(&b.row),
    });
    entries.truncate(limit);
    entries
}
