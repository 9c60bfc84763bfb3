//! Filter-list chunking for large `IN (...)` queries.
//!
//! SOQL caps a query at 20,000 characters, which a `WHERE ... IN` list
//! over a few thousand ids blows through easily. Splitting the key list
//! into fixed-size chunks and issuing one query per chunk keeps every
//! query inside the limit.

use std::collections::HashSet;

use forcepull_client::security::soql;

/// Maximum keys per rendered filter list. 300 record ids per list keeps
/// the rendered query well under the SOQL length cap.
pub const FILTER_CHUNK_SIZE: usize = 300;

/// Distinct keys in first-seen order.
pub(crate) fn dedup_keys<S: AsRef<str>>(keys: &[S]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut distinct = Vec::new();
    for key in keys {
        let key = key.as_ref();
        if seen.insert(key) {
            distinct.push(key.to_string());
        }
    }
    distinct
}

/// Render one chunk as a quoted, parenthesized SOQL list.
///
/// Keys are single-quoted and escaped, so a key like `O'Brien` cannot
/// break out of the list.
pub(crate) fn render_filter_list(keys: &[String]) -> String {
    let quoted: Vec<String> = keys
        .iter()
        .map(|key| format!("'{}'", soql::escape_string(key)))
        .collect();
    format!("({})", quoted.join(", "))
}
