//! Testing utilities for the offices workspace
//!
//! In-memory collaborators, fixtures and assertion helpers.

#![allow(missing_docs)]

mod provisioner;
mod scheduler;
mod store;

pub use provisioner::{InMemoryProvisioner, WorkspaceSnapshot};
pub use scheduler::InMemoryScheduler;
pub use store::InMemoryRecordStore;

use offices_core::{FieldKey, FieldValue, ListId, OfficesConfig, Record, RecordId, UserRef};

pub fn user(id: u32, login: &str) -> UserRef {
    UserRef::new(id, login)
}

/// Default configuration with job urls filled in and a short call timeout
pub fn test_config() -> OfficesConfig {
    OfficesConfig::new()
        .with_site("http://intranet", "/offices")
        .with_call_timeout_secs(5)
}

/// Store with the source and archive lists defined per `config`
pub fn office_store(config: &OfficesConfig) -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    store.add_list(&config.lists.source, config.office_fields().all());
    store.add_list(&config.lists.archive, config.archive_fields().all());
    store
}

/// Office field values; `None` and empty members are left unset
pub fn office_values(
    config: &OfficesConfig,
    name: Option<&str>,
    director: Option<UserRef>,
    members: Vec<UserRef>,
) -> Vec<(FieldKey, FieldValue)> {
    let fields = config.office_fields();
    let mut values = Vec::new();
    if let Some(name) = name {
        values.push((fields.name.clone(), FieldValue::Text(name.to_string())));
        values.push((fields.title, FieldValue::Text(name.to_string())));
    }
    if let Some(director) = director {
        values.push((fields.director, FieldValue::User(director)));
    }
    if !members.is_empty() {
        values.push((fields.members, FieldValue::Users(members)));
    }
    values
}

/// Event snapshot of an office record
pub fn office_record(
    config: &OfficesConfig,
    id: u32,
    name: Option<&str>,
    director: Option<UserRef>,
    members: Vec<UserRef>,
) -> Record {
    office_values(config, name, director, members)
        .into_iter()
        .fold(
            Record::new(RecordId(id), ListId::new(config.lists.source.clone())),
            |record, (key, value)| record.with_field(key, value),
        )
}

/// The "Berlin" office: director alice, members alice and bob
pub fn berlin(config: &OfficesConfig, id: u32) -> Record {
    office_record(
        config,
        id,
        Some("Berlin"),
        Some(user(1, "alice")),
        vec![user(1, "alice"), user(2, "bob")],
    )
}
