//! Identifier and reference types
//!
//! - [`RecordId`]: store-assigned record identifier
//! - [`ListId`]: handle of an opened list
//! - [`Slug`]: workspace dedup key derived from a record id
//! - [`UserRef`]: reference to a principal held in a user field

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used by lookup-encoded field values (`"7;#alice"`)
pub const LOOKUP_SEPARATOR: &str = ";#";

/// Record identifier, assigned by the store at creation and never changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RecordId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Handle of a list opened through the record store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListId(pub String);

impl ListId {
    /// Create new list handle
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw handle
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workspace url slug, the dedup key of a provisioned workspace
///
/// Deterministic in the record id: `prefix + id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    /// Derive the slug for a record
    #[inline]
    #[must_use]
    pub fn for_record(prefix: &str, id: RecordId) -> Self {
        Self(format!("{prefix}{id}"))
    }

    /// Wrap an existing slug value
    #[inline]
    #[must_use]
    pub fn from_raw(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Get slug text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a user principal
///
/// Equality is by principal id and login; the login is what the provisioning
/// layer uses as identity (group owner, membership).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserRef {
    /// Principal id in the hosting directory
    pub id: u32,
    /// Login identity
    pub login: String,
}

impl UserRef {
    /// Create new user reference
    #[inline]
    #[must_use]
    pub fn new(id: u32, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
        }
    }

    /// Parse a single lookup-encoded user (`"7;#alice"`)
    ///
    /// Returns `None` for anything that is not exactly one `id;#login` pair.
    #[must_use]
    pub fn parse_lookup(raw: &str) -> Option<Self> {
        match Self::parse_lookup_multi(raw).as_deref() {
            Some([single]) => Some(single.clone()),
            _ => None,
        }
    }

    /// Parse a lookup-encoded user collection (`"7;#alice;#9;#bob"`)
    ///
    /// Returns `None` when the text is malformed. Blank text is an empty collection.
    #[must_use]
    pub fn parse_lookup_multi(raw: &str) -> Option<Vec<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Vec::new());
        }

        let parts: Vec<&str> = raw.split(LOOKUP_SEPARATOR).collect();
        if parts.len() % 2 != 0 {
            return None;
        }

        parts
            .chunks(2)
            .map(|pair| {
                let id = pair[0].trim().parse::<u32>().ok()?;
                let login = pair[1].trim();
                if login.is_empty() {
                    return None;
                }
                Some(Self::new(id, login))
            })
            .collect()
    }

    /// Encode as lookup text
    #[must_use]
    pub fn to_lookup(&self) -> String {
        format!("{}{LOOKUP_SEPARATOR}{}", self.id, self.login)
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.login)
    }
}
