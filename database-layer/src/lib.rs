//! Clinic record storage.
//!
//! Models for every persisted entity, the [`Store`] seam the services talk
//! to, and two implementations of it:
//!
//! - [`MemoryStore`]: DashMap-backed, used by tests and `--in-memory` runs
//! - [`PgStore`]: PostgreSQL through sqlx, schema in `migrations/`
//!
//! [`Repositories`] bundles one store per record type and owns the
//! cross-table cascades (deleting a user removes its patient profile and
//! every record describing it; staff references become NULL).
//!
//! ```rust,ignore
//! use database_layer::{Repositories, RecordFilter, Column};
//!
//! let repos = Repositories::in_memory();
//! let mine = repos
//!     .appointments
//!     .list(&RecordFilter::eq(Column::DoctorId, doctor_id))
//!     .await?;
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod query;
pub mod record;
pub mod repositories;
pub mod schema;
pub mod store;

pub use connection::{DatabasePool, PoolOptions};
pub use error::{DatabaseError, DatabaseResult};
pub use query::{Page, PaginatedQuery};
pub use record::{Column, Condition, Record, RecordFilter};
pub use repositories::Repositories;
pub use store::{MemoryStore, PgStore, Store};
