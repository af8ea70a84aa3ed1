//! PostgreSQL-backed store, generic over any [`Record`].

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder, Postgres};
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::query::PaginatedQuery;
use crate::record::{Column, Record, RecordFilter};
use crate::store::Store;

pub struct PgStore<T> {
    pool: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> PgStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn column_list() -> String {
        T::COLUMNS.join(", ")
    }
}

impl<T> Clone for PgStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Record> Store<T> for PgStore<T> {
    async fn insert(&self, record: T) -> DatabaseResult<T> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            T::TABLE,
            Self::column_list()
        ));
        {
            let mut values = query.separated(", ");
            record.push_values(&mut values);
        }
        query.push(")");

        query.build().execute(&self.pool).await?;
        debug!(table = T::TABLE, id = %record.id(), "Inserted row");
        Ok(record)
    }

    async fn update(&self, record: T) -> DatabaseResult<T> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "UPDATE {} SET ({}) = ROW(",
            T::TABLE,
            Self::column_list()
        ));
        {
            let mut values = query.separated(", ");
            record.push_values(&mut values);
        }
        query.push(format!(") WHERE {} = ", T::ID_COLUMN));
        query.push_bind(record.id());

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound {
                table: T::TABLE,
                id: record.id(),
            });
        }
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> DatabaseResult<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE {} = $1", T::TABLE, T::ID_COLUMN);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self, filter: &RecordFilter) -> DatabaseResult<Vec<T>> {
        if filter.is_empty_set() {
            return Ok(Vec::new());
        }

        let mut query = PaginatedQuery::new(format!("SELECT * FROM {} WHERE 1=1", T::TABLE));
        query
            .apply_on(filter, T::STATUS_COLUMN)
            .order_by(T::ORDER_COLUMN, "DESC")
            .paginate(filter.page);

        let rows = query.build::<T>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count(&self, filter: &RecordFilter) -> DatabaseResult<u64> {
        if filter.is_empty_set() {
            return Ok(0);
        }

        let mut query = PaginatedQuery::new(format!("SELECT COUNT(*) FROM {} WHERE 1=1", T::TABLE));
        query.apply_on(filter, T::STATUS_COLUMN);

        let total = query.build_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", T::TABLE, T::ID_COLUMN);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
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

        let mut query = PaginatedQuery::new(format!("DELETE FROM {} WHERE 1=1", T::TABLE));
        query.apply_on(filter, T::STATUS_COLUMN);

        let result = query.build_statement().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn clear_reference(&self, column: Column, id: Uuid) -> DatabaseResult<u64> {
        if !T::NULLABLE_REFERENCES.contains(&column) {
            return Err(DatabaseError::QueryFailed(format!(
                "{} is not a nullable reference of {}",
                column.as_str(),
                T::TABLE
            )));
        }

        let sql = format!(
            "UPDATE {table} SET {col} = NULL WHERE {col} = $1",
            table = T::TABLE,
            col = column.as_str()
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
