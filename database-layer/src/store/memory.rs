use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::record::{Column, Record, RecordFilter};
use crate::store::Store;

/// In-memory store for testing and development.
///
/// The secondary unique key of each record is claimed through the DashMap
/// entry API, so two concurrent inserts for the same key cannot both succeed.
pub struct MemoryStore<T> {
    rows: Arc<DashMap<Uuid, T>>,
    unique: Arc<DashMap<String, Uuid>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(DashMap::new()),
            unique: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn index_key(constraint: &str, key: &str) -> String {
        format!("{constraint}:{key}")
    }

    fn claim(&self, constraint: &'static str, key: &str, owner: Uuid) -> DatabaseResult<()> {
        match self.unique.entry(Self::index_key(constraint, key)) {
            Entry::Occupied(slot) if *slot.get() != owner => {
                Err(DatabaseError::UniqueViolation(constraint.to_string()))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(owner);
                Ok(())
            }
        }
    }

    fn release(&self, constraint: &str, key: &str, owner: Uuid) {
        self.unique
            .remove_if(&Self::index_key(constraint, key), |_, holder| *holder == owner);
    }

    fn matching_ids(&self, filter: &RecordFilter) -> Vec<Uuid> {
        self.rows
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| *entry.key())
            .collect()
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            unique: Arc::clone(&self.unique),
        }
    }
}

#[async_trait]
impl<T: Record> Store<T> for MemoryStore<T> {
    async fn insert(&self, record: T) -> DatabaseResult<T> {
        let id = record.id();
        match self.rows.entry(id) {
            Entry::Occupied(_) => Err(DatabaseError::UniqueViolation(format!("{}_pkey", T::TABLE))),
            Entry::Vacant(slot) => {
                if let Some((constraint, key)) = record.unique_key() {
                    self.claim(constraint, &key, id)?;
                }
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update(&self, record: T) -> DatabaseResult<T> {
        let id = record.id();
        let previous_key = match self.rows.get(&id) {
            Some(existing) => existing.unique_key(),
            None => return Err(DatabaseError::RecordNotFound { table: T::TABLE, id }),
        };

        let next_key = record.unique_key();
        if next_key != previous_key {
            if let Some((constraint, key)) = &next_key {
                self.claim(constraint, key, id)?;
            }
            if let Some((constraint, key)) = previous_key {
                self.release(constraint, &key, id);
            }
        }

        self.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> DatabaseResult<Option<T>> {
        Ok(self.rows.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, filter: &RecordFilter) -> DatabaseResult<Vec<T>> {
        if filter.is_empty_set() {
            return Ok(Vec::new());
        }

        let mut rows: Vec<T> = self
            .rows
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        if let Some(page) = filter.page {
            let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
            rows = rows.into_iter().skip(offset).take(limit).collect();
        }
        Ok(rows)
    }

    async fn count(&self, filter: &RecordFilter) -> DatabaseResult<u64> {
        if filter.is_empty_set() {
            return Ok(0);
        }
        let count = self
            .rows
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        match self.rows.remove(&id) {
            Some((_, removed)) => {
                if let Some((constraint, key)) = removed.unique_key() {
                    self.release(constraint, &key, id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_where(&self, filter: &RecordFilter) -> DatabaseResult<u64> {
        if filter.conditions.is_empty() && filter.status.is_none() {
            return Err(DatabaseError::QueryFailed(format!(
                "refusing unfiltered delete on {}",
                T::TABLE
            )));
        }
        if filter.is_empty_set() {
            return Ok(0);
        }

        let mut removed = 0;
        for id in self.matching_ids(filter) {
            if self.delete(id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn clear_reference(&self, column: Column, id: Uuid) -> DatabaseResult<u64> {
        if !T::NULLABLE_REFERENCES.contains(&column) {
            return Err(DatabaseError::QueryFailed(format!(
                "{} is not a nullable reference of {}",
                column.as_str(),
                T::TABLE
            )));
        }

        let mut cleared = 0;
        for mut entry in self.rows.iter_mut() {
            if entry.value().reference(column) == Some(id) {
                entry.value_mut().clear_reference(column);
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}
