//! Validation gate
//!
//! A record is actionable only when it has a non-blank name, a director and
//! at least one member. Anything less is skipped silently by the services.

use crate::fields::{OfficeFields, Record};
use crate::types::{RecordId, UserRef};

/// Why a record is not actionable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Name missing or blank
    MissingName,
    /// Director missing
    MissingDirector,
    /// Members missing or empty
    MissingMembers,
}

impl ValidationFailure {
    /// Short label for logs
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingName => "missing name",
            Self::MissingDirector => "missing director",
            Self::MissingMembers => "missing members",
        }
    }
}

/// Office fields read from a record snapshot, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeSnapshot {
    /// Record id
    pub id: RecordId,
    /// Name, if readable
    pub name: Option<String>,
    /// Director, if readable
    pub director: Option<UserRef>,
    /// Members, if readable
    pub members: Option<Vec<UserRef>>,
}

impl OfficeSnapshot {
    /// Read the office fields from a record
    #[must_use]
    pub fn from_record(record: &Record, fields: &OfficeFields) -> Self {
        Self {
            id: record.id,
            name: record.get(&fields.name),
            director: record.get(&fields.director),
            members: record.get(&fields.members),
        }
    }
}

/// A record that passed the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionableOffice {
    /// Record id
    pub id: RecordId,
    /// Trimmed office name
    pub name: String,
    /// Director
    pub director: UserRef,
    /// Members, de-duplicated, in first-seen order
    pub members: Vec<UserRef>,
}

/// Decide whether the mandatory attributes are present
#[must_use]
pub fn is_actionable(
    name: Option<&str>,
    director: Option<&UserRef>,
    members: Option<&[UserRef]>,
) -> bool {
    let has_name = name.is_some_and(|n| !n.trim().is_empty());
    let has_director = director.is_some();
    let has_members = members.is_some_and(|m| !m.is_empty());
    has_name && has_director && has_members
}

/// Validate a snapshot into an [`ActionableOffice`]
///
/// # Errors
/// The first missing attribute, checked in name, director, members order.
pub fn check(snapshot: &OfficeSnapshot) -> Result<ActionableOffice, ValidationFailure> {
    let name = snapshot
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ValidationFailure::MissingName)?;
    let director = snapshot
        .director
        .clone()
        .ok_or(ValidationFailure::MissingDirector)?;
    let members = snapshot
        .members
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or(ValidationFailure::MissingMembers)?;

    let mut unique: Vec<UserRef> = Vec::with_capacity(members.len());
    for member in members {
        if !unique.contains(member) {
            unique.push(member.clone());
        }
    }

    Ok(ActionableOffice {
        id: snapshot.id,
        name: name.to_string(),
        director,
        members: unique,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot(name: Option<&str>, director: bool, members: Option<Vec<UserRef>>) -> OfficeSnapshot {
        OfficeSnapshot {
            id: RecordId(42),
            name: name.map(str::to_string),
            director: director.then(|| UserRef::new(1, "alice")),
            members,
        }
    }

    #[test]
    fn complete_record_is_actionable() {
        let snap = snapshot(
            Some(" Berlin "),
            true,
            Some(vec![UserRef::new(1, "alice"), UserRef::new(2, "bob")]),
        );
        let office = check(&snap).unwrap();
        assert_eq!(office.name, "Berlin");
        assert_eq!(office.members.len(), 2);
    }

    #[test]
    fn reports_first_missing_attribute() {
        let members = Some(vec![UserRef::new(1, "alice")]);
        assert_eq!(
            check(&snapshot(Some("  "), true, members.clone())),
            Err(ValidationFailure::MissingName)
        );
        assert_eq!(
            check(&snapshot(Some("Berlin"), false, members)),
            Err(ValidationFailure::MissingDirector)
        );
        assert_eq!(
            check(&snapshot(Some("Berlin"), true, Some(vec![]))),
            Err(ValidationFailure::MissingMembers)
        );
        assert_eq!(
            check(&snapshot(Some("Berlin"), true, None)),
            Err(ValidationFailure::MissingMembers)
        );
    }

    #[test]
    fn duplicate_members_collapse() {
        let alice = UserRef::new(1, "alice");
        let bob = UserRef::new(2, "bob");
        let snap = snapshot(
            Some("Berlin"),
            true,
            Some(vec![alice.clone(), bob.clone(), alice.clone()]),
        );
        assert_eq!(check(&snap).unwrap().members, vec![alice, bob]);
    }

    proptest! {
        #[test]
        fn prop_gate_agrees_with_check(
            name in proptest::option::of("[ a-z]{0,6}"),
            director in any::<bool>(),
            member_count in proptest::option::of(0usize..4),
        ) {
            let members = member_count.map(|n| {
                (0..n).map(|i| UserRef::new(u32::try_from(i).unwrap_or(0), format!("u{i}"))).collect::<Vec<_>>()
            });
            let snap = snapshot(name.as_deref(), director, members);

            let gate = is_actionable(
                snap.name.as_deref(),
                snap.director.as_ref(),
                snap.members.as_deref(),
            );
            prop_assert_eq!(gate, check(&snap).is_ok());
        }
    }
}
