//! The data-store seam. Services only ever talk to `dyn Store<T>`.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::query::Page;
use crate::record::{Column, Record, RecordFilter};

/// Storage interface for one record type
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    /// Insert a new row. Unique constraints surface as `UniqueViolation`.
    async fn insert(&self, record: T) -> DatabaseResult<T>;

    /// Replace an existing row by id.
    async fn update(&self, record: T) -> DatabaseResult<T>;

    async fn get(&self, id: Uuid) -> DatabaseResult<Option<T>>;

    /// Rows matching the filter, newest first.
    async fn list(&self, filter: &RecordFilter) -> DatabaseResult<Vec<T>>;

    /// Number of rows matching the filter, ignoring its page.
    async fn count(&self, filter: &RecordFilter) -> DatabaseResult<u64>;

    /// Returns false when no row had this id.
    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;

    async fn delete_where(&self, filter: &RecordFilter) -> DatabaseResult<u64>;

    /// Set `column` to NULL wherever it references `id`.
    async fn clear_reference(&self, column: Column, id: Uuid) -> DatabaseResult<u64>;

    /// First row matching the filter, if any.
    async fn find_one(&self, filter: &RecordFilter) -> DatabaseResult<Option<T>> {
        let single = filter.clone().paginate(Page::new(Some(1), Some(1)));
        Ok(self.list(&single).await?.into_iter().next())
    }
}
