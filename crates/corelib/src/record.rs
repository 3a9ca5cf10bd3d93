//! The DICT3 row: a `(key, relationship)` identity and its stored value.

use chrono::{DateTime, Local};
use std::fmt;

/// Uniquely identifies a row within the union of all nodes' data maps.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataKey {
    pub key: String,
    pub relationship: String,
}

impl DataKey {
    pub fn new(key: impl Into<String>, relationship: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            relationship: relationship.into(),
        }
    }
}

/// Read/write permission carried by a row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Permission {
    /// Mutable and deletable.
    ReadWrite,
    /// Neither `insertOrUpdate` nor `delete` may touch it.
    ReadOnly,
}

impl Permission {
    pub fn is_writable(self) -> bool {
        matches!(self, Permission::ReadWrite)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::ReadWrite => "RW",
            Permission::ReadOnly => "R",
        })
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RW" => Ok(Permission::ReadWrite),
            "R" => Ok(Permission::ReadOnly),
            other => Err(format!("unknown permission {other:?}, expected \"RW\" or \"R\"")),
        }
    }
}

/// The wire-format timestamp layout: `MM/DD/YYYY, HH:MM:SS`.
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

/// Renders a timestamp the way the wire contract and the persisted file expect.
pub fn render_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// The stored value half of a DICT3 row.
///
/// Timestamps are kept as real `DateTime<Local>` values and rendered to the
/// `MM/DD/YYYY, HH:MM:SS` wire format only at the edge, rather than stored
/// pre-formatted and re-parsed for comparisons like `purge`.
#[derive(Clone, Debug)]
pub struct ValueRecord {
    pub content: String,
    pub created: DateTime<Local>,
    pub modified: Option<DateTime<Local>>,
    pub accessed: DateTime<Local>,
    pub permission: Permission,
}

impl ValueRecord {
    /// Creates a freshly inserted row: `created == accessed == now`, `modified` unset.
    pub fn new(content: impl Into<String>, permission: Permission, now: DateTime<Local>) -> Self {
        Self {
            content: content.into(),
            created: now,
            modified: None,
            accessed: now,
            permission,
        }
    }

    /// Size rendered as `"{n}KB"` where `n = max(1, floor(len(content)/1000))`.
    pub fn size(&self) -> String {
        let kb = (self.content.len() / 1000).max(1);
        format!("{kb}KB")
    }

    /// Refreshes `accessed` after a successful `lookup`.
    pub fn touch(&mut self, now: DateTime<Local>) {
        self.accessed = now;
    }

    /// Applies an `insertOrUpdate` against an existing `RW` row.
    pub fn update(&mut self, content: impl Into<String>, permission: Permission, now: DateTime<Local>) {
        self.content = content.into();
        self.modified = Some(now);
        self.accessed = now;
        self.permission = permission;
    }

    /// Renders the eight tab-separated persisted-file columns for `(k, r)`.
    pub fn to_persisted_line(&self, key: &DataKey) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            key.key,
            key.relationship,
            self.content,
            self.size(),
            render_timestamp(self.created),
            self.modified.map(render_timestamp).unwrap_or_default(),
            render_timestamp(self.accessed),
            self.permission,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rounds_down_and_floors_at_one_kb() {
        let now = Local::now();
        assert_eq!(ValueRecord::new("x", Permission::ReadWrite, now).size(), "1KB");
        assert_eq!(
            ValueRecord::new("x".repeat(2500), Permission::ReadWrite, now).size(),
            "2KB"
        );
    }

    #[test]
    fn permission_round_trips_through_display_and_parse() {
        use std::str::FromStr;
        assert_eq!(Permission::from_str("RW").unwrap(), Permission::ReadWrite);
        assert_eq!(Permission::from_str("R").unwrap(), Permission::ReadOnly);
        assert_eq!(Permission::ReadWrite.to_string(), "RW");
        assert!(Permission::from_str("garbage").is_err());
    }

    #[test]
    fn update_preserves_created_but_advances_modified_and_accessed() {
        let t0 = Local::now();
        let mut record = ValueRecord::new("v1", Permission::ReadWrite, t0);
        let t1 = t0 + chrono::Duration::seconds(5);
        record.update("v2", Permission::ReadWrite, t1);
        assert_eq!(record.created, t0);
        assert_eq!(record.modified, Some(t1));
        assert_eq!(record.accessed, t1);
        assert_eq!(record.content, "v2");
    }
}
