//! Typed field access over raw records
//!
//! Field keys are resolved once, at startup, from configuration into
//! [`OfficeFields`] and [`ArchiveFields`]. Every read goes through
//! [`FromFieldValue`], which coerces what it can and reports absence for the
//! rest; a read never fails.

use crate::error::{ConfigError, OfficesError};
use crate::store::RecordStore;
use crate::types::{ListId, RecordId, UserRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Static name of a list field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldKey(String);

impl FieldKey {
    /// Create new field key
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the static name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw value stored in a record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Single or multi-line text
    Text(String),
    /// Yes/No
    Bool(bool),
    /// Integer
    Number(i64),
    /// Single user
    User(UserRef),
    /// Multiple users
    Users(Vec<UserRef>),
}

/// Typed extraction from a [`FieldValue`]
///
/// Implementations return `None` when the value cannot be read as `Self`.
pub trait FromFieldValue: Sized {
    /// Extract a typed value
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

impl FromFieldValue for String {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::User(_) | FieldValue::Users(_) => None,
        }
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Number(n) => Some(*n != 0),
            FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" | "" => Some(false),
                _ => None,
            },
            FieldValue::User(_) | FieldValue::Users(_) => None,
        }
    }
}

impl FromFieldValue for i64 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(text) => text.trim().parse().ok(),
            FieldValue::Bool(_) | FieldValue::User(_) | FieldValue::Users(_) => None,
        }
    }
}

impl FromFieldValue for UserRef {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::User(user) => Some(user.clone()),
            FieldValue::Users(users) if users.len() == 1 => users.first().cloned(),
            FieldValue::Text(text) => UserRef::parse_lookup(text),
            _ => None,
        }
    }
}

impl FromFieldValue for Vec<UserRef> {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Users(users) => Some(users.clone()),
            FieldValue::User(user) => Some(vec![user.clone()]),
            FieldValue::Text(text) => UserRef::parse_lookup_multi(text),
            FieldValue::Bool(_) | FieldValue::Number(_) => None,
        }
    }
}

/// Snapshot of a record: id, owning list and field values
///
/// A snapshot returned by a projected query only carries the projected fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record id
    pub id: RecordId,
    /// Owning list
    pub list: ListId,
    fields: BTreeMap<FieldKey, FieldValue>,
}

impl Record {
    /// Create an empty record snapshot
    #[inline]
    #[must_use]
    pub fn new(id: RecordId, list: ListId) -> Self {
        Self {
            id,
            list,
            fields: BTreeMap::new(),
        }
    }

    /// With field value
    #[inline]
    #[must_use]
    pub fn with_field(mut self, key: FieldKey, value: FieldValue) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// Raw field value, if present
    #[inline]
    #[must_use]
    pub fn field(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Set a field value
    #[inline]
    pub fn set_field(&mut self, key: FieldKey, value: FieldValue) {
        self.fields.insert(key, value);
    }

    /// Remove a field value
    #[inline]
    pub fn clear_field(&mut self, key: &FieldKey) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Typed read; `None` when absent or not coercible
    #[inline]
    #[must_use]
    pub fn get<T: FromFieldValue>(&self, key: &FieldKey) -> Option<T> {
        self.field(key).and_then(T::from_field_value)
    }

    /// Typed read with a default
    #[inline]
    #[must_use]
    pub fn get_or<T: FromFieldValue>(&self, key: &FieldKey, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Iterate over present fields
    pub fn fields(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.fields.iter()
    }

    /// Copy selected fields into another record
    ///
    /// Each pair is `(source key, destination key)`. Fields absent on `self`
    /// are skipped, leaving the destination untouched. Returns the number of
    /// fields copied.
    pub fn copy_fields_to(&self, dest: &mut Record, pairs: &[(FieldKey, FieldKey)]) -> usize {
        let mut copied = 0;
        for (from, to) in pairs {
            if let Some(value) = self.field(from) {
                dest.set_field(to.clone(), value.clone());
                copied += 1;
            }
        }
        copied
    }

    /// Keep only the given fields
    #[must_use]
    pub fn project(&self, keys: &[FieldKey]) -> Record {
        let fields = self
            .fields
            .iter()
            .filter(|(key, _)| keys.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Record {
            id: self.id,
            list: self.list.clone(),
            fields,
        }
    }
}

/// Field keys of the source (office) list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeFields {
    /// Office name
    pub name: FieldKey,
    /// Director (single user)
    pub director: FieldKey,
    /// Members (multi user)
    pub members: FieldKey,
    /// Copy-flag maintained by the synchronizer
    pub is_copied: FieldKey,
    /// Built-in title
    pub title: FieldKey,
}

impl OfficeFields {
    /// Every key the services read or write on the source list
    #[must_use]
    pub fn all(&self) -> Vec<FieldKey> {
        vec![
            self.name.clone(),
            self.director.clone(),
            self.members.clone(),
            self.is_copied.clone(),
            self.title.clone(),
        ]
    }

    /// Check that the opened list carries every configured field
    ///
    /// # Errors
    /// - `ConfigError::MissingFields` naming the absent keys
    /// - store errors from listing the fields
    pub async fn verify(&self, store: &dyn RecordStore, list: &ListId) -> Result<(), OfficesError> {
        verify_fields(store, list, &self.all()).await
    }
}

/// Field keys of the archive list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFields {
    /// Office name copy
    pub name: FieldKey,
    /// Director copy
    pub director: FieldKey,
    /// Built-in title
    pub title: FieldKey,
    /// Back-reference to the source record id
    pub source_id: FieldKey,
}

impl ArchiveFields {
    /// Every key the synchronizer writes on the archive list
    #[must_use]
    pub fn all(&self) -> Vec<FieldKey> {
        vec![
            self.name.clone(),
            self.director.clone(),
            self.title.clone(),
            self.source_id.clone(),
        ]
    }

    /// Check that the opened list carries every configured field
    ///
    /// # Errors
    /// - `ConfigError::MissingFields` naming the absent keys
    /// - store errors from listing the fields
    pub async fn verify(&self, store: &dyn RecordStore, list: &ListId) -> Result<(), OfficesError> {
        verify_fields(store, list, &self.all()).await
    }
}

async fn verify_fields(
    store: &dyn RecordStore,
    list: &ListId,
    expected: &[FieldKey],
) -> Result<(), OfficesError> {
    let present = store.list_fields(list).await?;
    let missing: Vec<String> = expected
        .iter()
        .filter(|key| !present.contains(key))
        .map(ToString::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingFields {
            list: list.to_string(),
            fields: missing,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> FieldKey {
        FieldKey::new(name)
    }

    fn record() -> Record {
        Record::new(RecordId(1), ListId::new("/lists/Offices"))
    }

    #[test]
    fn typed_reads_coerce_text() {
        let rec = record()
            .with_field(key("flag"), FieldValue::Text("TRUE".into()))
            .with_field(key("count"), FieldValue::Text(" 12 ".into()))
            .with_field(key("director"), FieldValue::Text("7;#alice".into()))
            .with_field(key("members"), FieldValue::Text("7;#alice;#9;#bob".into()));

        assert_eq!(rec.get::<bool>(&key("flag")), Some(true));
        assert_eq!(rec.get::<i64>(&key("count")), Some(12));
        assert_eq!(rec.get::<UserRef>(&key("director")), Some(UserRef::new(7, "alice")));
        assert_eq!(rec.get::<Vec<UserRef>>(&key("members")).map(|m| m.len()), Some(2));
    }

    #[test]
    fn mismatched_types_read_as_absent() {
        let rec = record()
            .with_field(key("name"), FieldValue::User(UserRef::new(1, "alice")))
            .with_field(key("flag"), FieldValue::Text("maybe".into()));

        assert_eq!(rec.get::<String>(&key("name")), None);
        assert_eq!(rec.get::<bool>(&key("flag")), None);
        assert!(!rec.get_or(&key("flag"), false));
        assert_eq!(rec.get::<String>(&key("missing")), None);
    }

    #[test]
    fn single_user_reads_as_collection() {
        let rec = record().with_field(key("members"), FieldValue::User(UserRef::new(1, "alice")));
        assert_eq!(
            rec.get::<Vec<UserRef>>(&key("members")),
            Some(vec![UserRef::new(1, "alice")])
        );
    }

    #[test]
    fn copy_fields_skips_absent_sources() {
        let src = record()
            .with_field(key("a"), FieldValue::Text("x".into()))
            .with_field(key("skip"), FieldValue::Bool(true));
        let mut dest = Record::new(RecordId(9), ListId::new("/lists/Offices2"));

        let copied = src.copy_fields_to(&mut dest, &[(key("a"), key("a2")), (key("b"), key("b2"))]);

        assert_eq!(copied, 1);
        assert_eq!(dest.get::<String>(&key("a2")).as_deref(), Some("x"));
        assert!(dest.field(&key("b2")).is_none());
        assert!(dest.field(&key("skip")).is_none());
    }

    #[test]
    fn project_keeps_only_requested() {
        let rec = record()
            .with_field(key("a"), FieldValue::Number(1))
            .with_field(key("b"), FieldValue::Number(2));
        let projected = rec.project(&[key("b")]);
        assert_eq!(projected.fields().count(), 1);
        assert_eq!(projected.get::<i64>(&key("b")), Some(2));
        assert_eq!(projected.id, rec.id);
    }
}
