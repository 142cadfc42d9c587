//! Statement completion tags.

use std::fmt;

/// The completion tag the server reports for a statement, such as
/// `INSERT 0 1` or `UPDATE 3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CommandTag(String);

impl CommandTag {
    /// Build a tag for `op` affecting `rows_affected` rows.
    ///
    /// `INSERT` tags carry the legacy OID field the server still emits.
    ///
    /// ```rust
    /// use pgmock_client::CommandTag;
    ///
    /// let tag = CommandTag::new("INSERT", 1);
    /// assert_eq!(tag.as_str(), "INSERT 0 1");
    /// assert_eq!(tag.rows_affected(), 1);
    /// assert!(tag.is_insert());
    /// ```
    pub fn new(op: &str, rows_affected: u64) -> Self {
        let op = op.trim().to_ascii_uppercase();
        if op == "INSERT" {
            Self(format!("INSERT 0 {rows_affected}"))
        } else {
            Self(format!("{op} {rows_affected}"))
        }
    }

    /// Wrap a raw tag string as reported by the server.
    pub fn from_raw(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The raw tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of rows the statement affected, 0 if the tag has no count.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.0
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }

    /// Check if the tag reports an `INSERT`.
    #[must_use]
    pub fn is_insert(&self) -> bool {
        self.0.starts_with("INSERT")
    }

    /// Check if the tag reports an `UPDATE`.
    #[must_use]
    pub fn is_update(&self) -> bool {
        self.0.starts_with("UPDATE")
    }

    /// Check if the tag reports a `DELETE`.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0.starts_with("DELETE")
    }

    /// Check if the tag reports a `SELECT`.
    #[must_use]
    pub fn is_select(&self) -> bool {
        self.0.starts_with("SELECT")
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_format() {
        let tag = CommandTag::new("insert", 5);
        assert_eq!(tag.to_string(), "INSERT 0 5");
        assert_eq!(tag.rows_affected(), 5);
    }

    #[test]
    fn test_predicates() {
        assert!(CommandTag::new("UPDATE", 2).is_update());
        assert!(CommandTag::new("DELETE", 0).is_delete());
        assert!(CommandTag::new("SELECT", 10).is_select());
        assert!(!CommandTag::new("SELECT", 10).is_insert());
    }

    #[test]
    fn test_tag_without_count() {
        let tag = CommandTag::from_raw("BEGIN");
        assert_eq!(tag.rows_affected(), 0);
        assert_eq!(CommandTag::default().rows_affected(), 0);
    }
}
