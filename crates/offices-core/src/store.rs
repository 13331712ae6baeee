//! Record store contract
//!
//! The store is an external, list-structured datastore. Calls are remote and
//! carry no timeout of their own; wrap them with [`crate::call::bounded`].

use crate::error::StoreError;
use crate::fields::{FieldKey, FieldValue, Record};
use crate::types::ListId;
use async_trait::async_trait;

/// Query filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every record in the list
    All,
    /// Records whose field is absent or differs from the value
    NotEqual(FieldKey, FieldValue),
}

impl Filter {
    /// Evaluate the filter against a record
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::NotEqual(key, value) => record.field(key) != Some(value),
        }
    }
}

/// List-structured record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Resolve a list by its web-relative url
    async fn open_list(&self, url: &str) -> Result<ListId, StoreError>;

    /// Static names of the fields defined on a list
    async fn list_fields(&self, list: &ListId) -> Result<Vec<FieldKey>, StoreError>;

    /// Select records matching `filter`, carrying only the `projection` fields
    ///
    /// Records come back in the store's default order.
    async fn query(
        &self,
        list: &ListId,
        filter: &Filter,
        projection: &[FieldKey],
    ) -> Result<Vec<Record>, StoreError>;

    /// Allocate a new, not yet persisted record in a list
    async fn create_record(&self, list: &ListId) -> Result<Record, StoreError>;

    /// Persist the fields present on the snapshot
    ///
    /// Fields missing from a projected snapshot are left untouched.
    async fn update_record(&self, record: &Record) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordId;

    #[test]
    fn not_equal_matches_absent_and_different() {
        let flag = FieldKey::new("swc_FieldIsCopied");
        let filter = Filter::NotEqual(flag.clone(), FieldValue::Bool(true));
        let base = Record::new(RecordId(1), ListId::new("offices"));

        assert!(filter.matches(&base));
        assert!(filter.matches(&base.clone().with_field(flag.clone(), FieldValue::Bool(false))));
        assert!(!filter.matches(&base.with_field(flag, FieldValue::Bool(true))));
    }

    #[test]
    fn all_matches_everything() {
        let base = Record::new(RecordId(1), ListId::new("offices"));
        assert!(Filter::All.matches(&base));
    }
}
