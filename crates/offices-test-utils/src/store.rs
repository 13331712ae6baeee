use async_trait::async_trait;
use offices_core::{FieldKey, FieldValue, Filter, ListId, Record, RecordId, RecordStore, StoreError};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Record store kept in memory, with write-failure injection
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    lists: BTreeMap<String, ListState>,
    next_id: u32,
    allocations: usize,
    mutations: usize,
    unavailable: bool,
    write_budget: BTreeMap<String, usize>,
}

#[derive(Debug, Default)]
struct ListState {
    fields: Vec<FieldKey>,
    records: BTreeMap<RecordId, Record>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_list(&self, url: &str, fields: Vec<FieldKey>) {
        self.inner.lock().lists.insert(
            url.to_string(),
            ListState {
                fields,
                records: BTreeMap::new(),
            },
        );
    }

    /// Seed a persisted record; not counted as a mutation
    pub fn insert(&self, url: &str, values: Vec<(FieldKey, FieldValue)>) -> RecordId {
        let id = {
            let mut state = self.inner.lock();
            state.next_id += 1;
            RecordId(state.next_id)
        };
        self.insert_with_id(url, id, values);
        id
    }

    /// Seed a persisted record under a chosen id
    pub fn insert_with_id(&self, url: &str, id: RecordId, values: Vec<(FieldKey, FieldValue)>) {
        let mut state = self.inner.lock();
        state.next_id = state.next_id.max(id.0);
        let record = values.into_iter().fold(
            Record::new(id, ListId::new(url)),
            |record, (key, value)| record.with_field(key, value),
        );
        state
            .lists
            .entry(url.to_string())
            .or_default()
            .records
            .insert(id, record);
    }

    pub fn records(&self, url: &str) -> Vec<Record> {
        self.inner
            .lock()
            .lists
            .get(url)
            .map(|list| list.records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn record(&self, url: &str, id: RecordId) -> Option<Record> {
        self.inner
            .lock()
            .lists
            .get(url)
            .and_then(|list| list.records.get(&id).cloned())
    }

    /// Persisted writes so far
    pub fn mutation_count(&self) -> usize {
        self.inner.lock().mutations
    }

    /// Records allocated through `create_record`
    pub fn allocation_count(&self) -> usize {
        self.inner.lock().allocations
    }

    /// Allow `successes` more writes to `url`, then reject every write
    pub fn fail_writes_after(&self, url: &str, successes: usize) {
        self.inner.lock().write_budget.insert(url.to_string(), successes);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    fn check_available(state: &StoreState) -> Result<(), StoreError> {
        if state.unavailable {
            Err(StoreError::Unavailable("in-memory store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn open_list(&self, url: &str) -> Result<ListId, StoreError> {
        let state = self.inner.lock();
        Self::check_available(&state)?;
        if state.lists.contains_key(url) {
            Ok(ListId::new(url))
        } else {
            Err(StoreError::ListNotFound(url.to_string()))
        }
    }

    async fn list_fields(&self, list: &ListId) -> Result<Vec<FieldKey>, StoreError> {
        let state = self.inner.lock();
        Self::check_available(&state)?;
        state
            .lists
            .get(list.as_str())
            .map(|l| l.fields.clone())
            .ok_or_else(|| StoreError::ListNotFound(list.to_string()))
    }

    async fn query(
        &self,
        list: &ListId,
        filter: &Filter,
        projection: &[FieldKey],
    ) -> Result<Vec<Record>, StoreError> {
        let state = self.inner.lock();
        Self::check_available(&state)?;
        let list_state = state
            .lists
            .get(list.as_str())
            .ok_or_else(|| StoreError::ListNotFound(list.to_string()))?;

        Ok(list_state
            .records
            .values()
            .filter(|record| filter.matches(record))
            .map(|record| record.project(projection))
            .collect())
    }

    async fn create_record(&self, list: &ListId) -> Result<Record, StoreError> {
        let mut state = self.inner.lock();
        Self::check_available(&state)?;
        if !state.lists.contains_key(list.as_str()) {
            return Err(StoreError::ListNotFound(list.to_string()));
        }
        state.next_id += 1;
        state.allocations += 1;
        Ok(Record::new(RecordId(state.next_id), list.clone()))
    }

    async fn update_record(&self, record: &Record) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        Self::check_available(&state)?;

        let url = record.list.as_str();
        if let Some(budget) = state.write_budget.get_mut(url) {
            if *budget == 0 {
                return Err(StoreError::WriteRejected(format!(
                    "injected failure writing record {} to {url}",
                    record.id
                )));
            }
            *budget -= 1;
        }

        let list_state = state
            .lists
            .get_mut(url)
            .ok_or_else(|| StoreError::ListNotFound(url.to_string()))?;

        let stored = list_state
            .records
            .entry(record.id)
            .or_insert_with(|| Record::new(record.id, record.list.clone()));
        for (key, value) in record.fields() {
            stored.set_field(key.clone(), value.clone());
        }

        state.mutations += 1;
        Ok(())
    }
}
