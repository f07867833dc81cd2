//! Plain-text edge lists.
//!
//! One link per line, `source target`, separated by whitespace or a single comma. Blank lines
//! and `#` comments are skipped.
//!
//! ```text
//! # web graph
//! A B
//! B, C
//! ```

use crate::{Error, Result};

/// Parse `text` into `(source, target)` pairs in line order.
///
/// A line with a missing or extra field fails with [`Error::InvalidInput`] quoting its
/// 1-based line number.
pub fn parse_edges(text: &str) -> Result<Vec<(String, String)>> {
    let mut edges = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = match raw.find('#') {
            Some(at) => &raw[..at],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = if line.contains(',') {
            line.split(',').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };
        match fields.as_slice() {
            [source, target] if !source.is_empty() && !target.is_empty() => {
                edges.push((source.to_string(), target.to_string()));
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "line {}: expected `source target`, got {:?}",
                    i + 1,
                    raw.trim()
                )))
            }
        }
    }
    Ok(edges)
}
