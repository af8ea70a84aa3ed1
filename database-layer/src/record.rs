//! The `Record` trait ties a model struct to its table, and `RecordFilter`
//! expresses the row subsets both store backends understand.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres};
use uuid::Uuid;

use crate::query::Page;

/// A reference column that rows can be filtered, cascaded or nulled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    UserId,
    PatientId,
    DoctorId,
    AssignedDoctorId,
    AppointmentId,
    MedicalRecordId,
    PrescriptionId,
    CreatedBy,
    PrescribedBy,
    IssuedBy,
    NurseId,
    RaisedBy,
    AcknowledgedBy,
    AdministeredBy,
    UpdatedBy,
    RequestedBy,
    PlannedBy,
}

impl Column {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserId => "user_id",
            Self::PatientId => "patient_id",
            Self::DoctorId => "doctor_id",
            Self::AssignedDoctorId => "assigned_doctor_id",
            Self::AppointmentId => "appointment_id",
            Self::MedicalRecordId => "medical_record_id",
            Self::PrescriptionId => "prescription_id",
            Self::CreatedBy => "created_by",
            Self::PrescribedBy => "prescribed_by",
            Self::IssuedBy => "issued_by",
            Self::NurseId => "nurse_id",
            Self::RaisedBy => "raised_by",
            Self::AcknowledgedBy => "acknowledged_by",
            Self::AdministeredBy => "administered_by",
            Self::UpdatedBy => "updated_by",
            Self::RequestedBy => "requested_by",
            Self::PlannedBy => "planned_by",
        }
    }
}

/// A model persisted in its own table.
///
/// `COLUMNS` and [`Record::push_values`] must list the same columns in the
/// same order; the PostgreSQL store builds its statements from both.
pub trait Record: for<'r> FromRow<'r, PgRow> + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const ID_COLUMN: &'static str = "id";
    const ORDER_COLUMN: &'static str = "created_at";
    /// Text column matched by `RecordFilter::status`.
    const STATUS_COLUMN: &'static str = "status";
    /// Reference columns that are set to NULL when the referenced row goes away.
    const NULLABLE_REFERENCES: &'static [Column] = &[];

    fn id(&self) -> Uuid;

    /// Value of a reference column, `None` when unset or not a column of this table.
    fn reference(&self, column: Column) -> Option<Uuid>;

    /// Null out a column listed in `NULLABLE_REFERENCES`. Other columns are left alone.
    fn clear_reference(&mut self, _column: Column) {}

    /// Value of `STATUS_COLUMN`, for tables that have one.
    fn status(&self) -> Option<&'static str> {
        None
    }

    /// Newest-first ordering key.
    fn created_at(&self) -> DateTime<Utc>;

    /// `(constraint name, key)` of the table's secondary unique constraint.
    fn unique_key(&self) -> Option<(&'static str, String)> {
        None
    }

    fn push_values(&self, row: &mut Separated<'_, '_, Postgres, &'static str>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(Column, Uuid),
    In(Column, Vec<Uuid>),
    /// Matches no row at all.
    Never,
}

impl Condition {
    fn matches<T: Record>(&self, record: &T) -> bool {
        match self {
            Self::Eq(column, id) => record.reference(*column) == Some(*id),
            Self::In(column, ids) => record
                .reference(*column)
                .is_some_and(|value| ids.contains(&value)),
            Self::Never => false,
        }
    }
}

/// Conjunction of predicates plus ordering and paging.
///
/// Filters only ever narrow: every builder method adds a condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub conditions: Vec<Condition>,
    pub status: Option<String>,
    pub page: Option<Page>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn nothing() -> Self {
        Self::default().with(Condition::Never)
    }

    pub fn eq(column: Column, id: Uuid) -> Self {
        Self::default().with(Condition::Eq(column, id))
    }

    #[must_use]
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn and_eq(self, column: Column, id: Uuid) -> Self {
        self.with(Condition::Eq(column, id))
    }

    /// Adds the condition only when a value is supplied.
    #[must_use]
    pub fn and_eq_opt(self, column: Column, id: Option<Uuid>) -> Self {
        match id {
            Some(id) => self.and_eq(column, id),
            None => self,
        }
    }

    #[must_use]
    pub fn and_in(self, column: Column, ids: Vec<Uuid>) -> Self {
        self.with(Condition::In(column, ids))
    }

    #[must_use]
    pub fn and_status(mut self, status: Option<&str>) -> Self {
        if let Some(status) = status {
            self.status = Some(status.to_string());
        }
        self
    }

    #[must_use]
    pub fn paginate(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    /// True when the filter can be decided without touching storage.
    pub fn is_empty_set(&self) -> bool {
        self.conditions.iter().any(|c| match c {
            Condition::Never => true,
            Condition::In(_, ids) => ids.is_empty(),
            Condition::Eq(..) => false,
        })
    }

    pub fn matches<T: Record>(&self, record: &T) -> bool {
        let status_ok = match &self.status {
            Some(wanted) => record
                .status()
                .is_some_and(|actual| actual.eq_ignore_ascii_case(wanted)),
            None => true,
        };
        status_ok && self.conditions.iter().all(|c| c.matches(record))
    }
}
