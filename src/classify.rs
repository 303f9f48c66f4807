//! Statement classification by leading keyword.

/// Result shape of a statement, derived from its first keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementCategory {
    /// SELECT, SHOW, DESCRIBE, EXPLAIN: rows are returned.
    RowReturning,
    /// INSERT: the connection's last insert id is returned.
    Insert,
    /// Anything else: the affected-row count is returned.
    Mutating,
}

const ROW_RETURNING_KEYWORDS: [&str; 4] = ["SELECT", "SHOW", "DESCRIBE", "EXPLAIN"];

/// Leading keyword of `query`, uppercased.
///
/// The keyword ends at the first whitespace character; a query without any whitespace is
/// its own keyword.
#[must_use]
pub fn leading_keyword(query: &str) -> String {
    let trimmed = query.trim();
    let end = trimmed
        .find(char::is_whitespace)
        .unwrap_or(trimmed.len());
    trimmed[..end].to_ascii_uppercase()
}

/// Classify `query` into the shape its result will take.
#[must_use]
pub fn classify(query: &str) -> StatementCategory {
    let keyword = leading_keyword(query);
    if ROW_RETURNING_KEYWORDS.contains(&keyword.as_str()) {
        StatementCategory::RowReturning
    } else if keyword == "INSERT" {
        StatementCategory::Insert
    } else {
        StatementCategory::Mutating
    }
}
