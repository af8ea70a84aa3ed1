//! Role-scoped access policy for AfyaCare clinic resources.
//!
//! Every inbound request carries an [`Identity`] with exactly one role.
//! This crate decides, without touching storage:
//!
//! - which rows of each [`ResourceKind`] the role may read ([`VisibilityTable`])
//! - whether a create/update/delete is permitted ([`PolicyEngine`])
//! - which lifecycle moves are legal ([`transitions`])
//!
//! Decisions come back as [`Decision`] or [`PolicyError`]. A row outside the
//! caller's visible set is reported as `NotFound`, never `Forbidden`, so
//! denials do not confirm that the row exists.
//!
//! # Example
//!
//! ```rust
//! use auth_policy::{Identity, PolicyEngine, ResourceKind, RowFacts, Decision};
//! use database_layer::models::Role;
//! use uuid::Uuid;
//!
//! let engine = PolicyEngine::new();
//! let doctor = Identity::new(Uuid::new_v4(), Role::Doctor);
//!
//! let someone_elses = RowFacts {
//!     assigned_doctor_id: Some(Uuid::new_v4()),
//!     ..RowFacts::default()
//! };
//! assert_eq!(
//!     engine.check_visible(&doctor, ResourceKind::Prescription, &someone_elses),
//!     Decision::NotFound
//! );
//! ```

pub mod engine;
pub mod error;
pub mod models;
pub mod mutation;
pub mod transitions;
pub mod visibility;

pub use engine::{AppointmentOrigin, Decision, PolicyEngine};
pub use error::{PolicyError, PolicyResult};
pub use models::{Identity, Operation, ResourceKind};
pub use transitions::{AppointmentAction, InvoiceAction, PatientWardAction};
pub use visibility::{RowFacts, Visibility, VisibilityTable};
