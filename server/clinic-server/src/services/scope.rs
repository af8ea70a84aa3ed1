//! Bridges the policy's `Visibility` predicates to store filters, and rows
//! back to the `RowFacts` the policy decides on.

use auth_policy::{Decision, Identity, ResourceKind, RowFacts, Visibility};
use database_layer::models::{
    Appointment, BedStatus, HandoverLog, Invoice, LabResult, MedicalRecord, MedicationSchedule,
    NurseTask, Patient, PendingAdmission, PlannedDischarge, Prescription, User, WardAlert,
};
use database_layer::{Column, Page, Record, RecordFilter, Repositories, Store};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

/// Columns a table exposes to visibility predicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeColumns {
    /// Patient profile the row describes.
    pub patient: Option<Column>,
    /// Set on the patients table itself: the owning user.
    pub profile_user: Option<Column>,
    /// Set on the patients table itself: the assigned doctor.
    pub assigned_doctor: Option<Column>,
    pub doctor: Option<Column>,
    pub creator: Option<Column>,
    pub owner: Option<Column>,
}

const PATIENT_LINKED: ScopeColumns = ScopeColumns {
    patient: Some(Column::PatientId),
    profile_user: None,
    assigned_doctor: None,
    doctor: None,
    creator: None,
    owner: None,
};

/// A record whose visibility the policy decides.
pub trait Scoped: Record {
    const KIND: ResourceKind;
    const SCOPE_COLUMNS: ScopeColumns;

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>>;

    /// Patient profile the row describes, looked up to fill patient facts.
    fn patient_id(&self) -> Option<Uuid>;

    /// Facts that come from the row itself.
    fn own_facts(&self) -> RowFacts {
        RowFacts::default()
    }
}

/// Facts describing a patient profile.
pub fn facts_of_patient(patient: &Patient) -> RowFacts {
    RowFacts {
        patient_user_id: Some(patient.user_id),
        assigned_doctor_id: patient.assigned_doctor_id,
        ..RowFacts::default()
    }
}

/// Facts for a patient id, empty when the profile is gone.
pub async fn patient_facts(repos: &Repositories, patient_id: Option<Uuid>) -> ApiResult<RowFacts> {
    let Some(patient_id) = patient_id else {
        return Ok(RowFacts::default());
    };
    Ok(repos
        .patients
        .get(patient_id)
        .await?
        .map(|p| facts_of_patient(&p))
        .unwrap_or_default())
}

pub async fn facts<T: Scoped>(repos: &Repositories, row: &T) -> ApiResult<RowFacts> {
    let patient = patient_facts(repos, row.patient_id()).await?;
    let own = row.own_facts();
    Ok(RowFacts {
        patient_user_id: own.patient_user_id.or(patient.patient_user_id),
        assigned_doctor_id: own.assigned_doctor_id.or(patient.assigned_doctor_id),
        attending_doctor_id: own.attending_doctor_id,
        created_by: own.created_by,
        owner_id: own.owner_id,
    })
}

/// Filter selecting exactly the rows of `T` the caller may read.
pub async fn visible_filter<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
) -> ApiResult<RecordFilter> {
    let visibility = server.policy.visibility(identity, T::KIND)?;
    let columns = T::SCOPE_COLUMNS;
    let me = identity.user_id;

    let filter = match visibility {
        Visibility::All => RecordFilter::all(),
        Visibility::Nothing => RecordFilter::nothing(),
        Visibility::OwnProfile => match (columns.profile_user, columns.patient) {
            (Some(user_column), _) => RecordFilter::eq(user_column, me),
            (None, Some(patient_column)) => match server.repos.patient_for_user(me).await? {
                Some(profile) => RecordFilter::eq(patient_column, profile.id),
                None => RecordFilter::nothing(),
            },
            (None, None) => RecordFilter::nothing(),
        },
        Visibility::AssignedPatients => match (columns.assigned_doctor, columns.patient) {
            (Some(doctor_column), _) => RecordFilter::eq(doctor_column, me),
            (None, Some(patient_column)) => RecordFilter::all()
                .and_in(patient_column, server.repos.patient_ids_for_doctor(me).await?),
            (None, None) => RecordFilter::nothing(),
        },
        Visibility::AttendingDoctor => by_column(columns.doctor, me),
        Visibility::CreatedBy => by_column(columns.creator, me),
        Visibility::OwnedBy => by_column(columns.owner, me),
    };

    debug!(kind = %T::KIND, role = %identity.role, ?visibility, "Visibility filter built");
    Ok(filter)
}

fn by_column(column: Option<Column>, me: Uuid) -> RecordFilter {
    column.map_or_else(RecordFilter::nothing, |c| RecordFilter::eq(c, me))
}

/// Add client-supplied narrowing to a visibility filter. Never widens.
pub fn narrow(mut base: RecordFilter, extra: RecordFilter) -> RecordFilter {
    base.conditions.extend(extra.conditions);
    if extra.status.is_some() {
        base.status = extra.status;
    }
    base
}

/// One page of the rows visible to the caller, narrowed by `extra`.
pub async fn list_visible<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
    extra: RecordFilter,
    page: Page,
) -> ApiResult<Paginated<T>> {
    let filter = narrow(visible_filter::<T>(server, identity).await?, extra);
    fetch_page(T::store(&server.repos).as_ref(), filter, page).await
}

pub async fn fetch_page<T: Record>(
    store: &dyn Store<T>,
    filter: RecordFilter,
    page: Page,
) -> ApiResult<Paginated<T>> {
    if filter.is_empty_set() {
        return Ok(Paginated::empty(page));
    }
    let total = store.count(&filter).await?;
    let items = store.list(&filter.paginate(page)).await?;
    Ok(Paginated { items, total, page })
}

/// Load a row regardless of visibility; absent rows are `NotFound`.
pub async fn load<T: Scoped>(repos: &Repositories, id: Uuid) -> ApiResult<T> {
    T::store(repos)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(T::KIND.label()))
}

/// Load a row after refusing roles with no access to its kind at all.
pub async fn load_scoped<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<(T, RowFacts)> {
    server.policy.authorize_kind(identity, T::KIND).into_result(T::KIND)?;
    let row = load::<T>(&server.repos, id).await?;
    let facts = facts(&server.repos, &row).await?;
    Ok((row, facts))
}

/// Load a row the caller may read. Rows outside the visible set are `NotFound`.
pub async fn load_visible<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<(T, RowFacts)> {
    let (row, facts) = load_scoped::<T>(server, identity, id).await?;
    server
        .policy
        .check_visible(identity, T::KIND, &facts)
        .into_result(T::KIND)?;
    Ok((row, facts))
}

/// Load a row and run an update or delete decision against it.
pub async fn load_authorized<T: Scoped>(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    decide: impl FnOnce(&RowFacts) -> Decision,
) -> ApiResult<(T, RowFacts)> {
    let (row, facts) = load_scoped::<T>(server, identity, id).await?;
    decide(&facts).into_result(T::KIND)?;
    Ok((row, facts))
}

// =============================================================================
// Scoped records
// =============================================================================

/// Staff accounts. Only admins see the table; no row relationships apply.
impl Scoped for User {
    const KIND: ResourceKind = ResourceKind::User;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        patient: None,
        profile_user: None,
        assigned_doctor: None,
        doctor: None,
        creator: None,
        owner: None,
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.users
    }

    fn patient_id(&self) -> Option<Uuid> {
        None
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            owner_id: Some(self.id),
            ..RowFacts::default()
        }
    }
}

impl Scoped for Patient {
    const KIND: ResourceKind = ResourceKind::Patient;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        patient: None,
        profile_user: Some(Column::UserId),
        assigned_doctor: Some(Column::AssignedDoctorId),
        doctor: None,
        creator: None,
        owner: None,
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.patients
    }

    fn patient_id(&self) -> Option<Uuid> {
        None
    }

    fn own_facts(&self) -> RowFacts {
        facts_of_patient(self)
    }
}

impl Scoped for Appointment {
    const KIND: ResourceKind = ResourceKind::Appointment;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        doctor: Some(Column::DoctorId),
        ..PATIENT_LINKED
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.appointments
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            attending_doctor_id: Some(self.doctor_id),
            ..RowFacts::default()
        }
    }
}

impl Scoped for MedicalRecord {
    const KIND: ResourceKind = ResourceKind::MedicalRecord;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        creator: Some(Column::CreatedBy),
        ..PATIENT_LINKED
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.medical_records
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            created_by: self.created_by,
            ..RowFacts::default()
        }
    }
}

impl Scoped for Prescription {
    const KIND: ResourceKind = ResourceKind::Prescription;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        creator: Some(Column::PrescribedBy),
        ..PATIENT_LINKED
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.prescriptions
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            created_by: self.prescribed_by,
            ..RowFacts::default()
        }
    }
}

impl Scoped for LabResult {
    const KIND: ResourceKind = ResourceKind::LabResult;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        creator: Some(Column::CreatedBy),
        ..PATIENT_LINKED
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.lab_results
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            created_by: self.created_by,
            ..RowFacts::default()
        }
    }
}

impl Scoped for Invoice {
    const KIND: ResourceKind = ResourceKind::Invoice;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        doctor: Some(Column::DoctorId),
        ..PATIENT_LINKED
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.invoices
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            attending_doctor_id: self.doctor_id,
            ..RowFacts::default()
        }
    }
}

impl Scoped for NurseTask {
    const KIND: ResourceKind = ResourceKind::NurseTask;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        owner: Some(Column::NurseId),
        ..PATIENT_LINKED
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.nurse_tasks
    }

    fn patient_id(&self) -> Option<Uuid> {
        self.patient_id
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            owner_id: Some(self.nurse_id),
            ..RowFacts::default()
        }
    }
}

impl Scoped for HandoverLog {
    const KIND: ResourceKind = ResourceKind::HandoverLog;
    const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
        owner: Some(Column::NurseId),
        ..PATIENT_LINKED
    };

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.handovers
    }

    fn patient_id(&self) -> Option<Uuid> {
        self.patient_id
    }

    fn own_facts(&self) -> RowFacts {
        RowFacts {
            owner_id: Some(self.nurse_id),
            ..RowFacts::default()
        }
    }
}

impl Scoped for WardAlert {
    const KIND: ResourceKind = ResourceKind::WardAlert;
    const SCOPE_COLUMNS: ScopeColumns = PATIENT_LINKED;

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.ward_alerts
    }

    fn patient_id(&self) -> Option<Uuid> {
        self.patient_id
    }
}

impl Scoped for BedStatus {
    const KIND: ResourceKind = ResourceKind::BedStatus;
    const SCOPE_COLUMNS: ScopeColumns = PATIENT_LINKED;

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.beds
    }

    fn patient_id(&self) -> Option<Uuid> {
        self.patient_id
    }
}

impl Scoped for MedicationSchedule {
    const KIND: ResourceKind = ResourceKind::MedicationSchedule;
    const SCOPE_COLUMNS: ScopeColumns = PATIENT_LINKED;

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.medications
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }
}

impl Scoped for PendingAdmission {
    const KIND: ResourceKind = ResourceKind::PendingAdmission;
    const SCOPE_COLUMNS: ScopeColumns = PATIENT_LINKED;

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.pending_admissions
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }
}

impl Scoped for PlannedDischarge {
    const KIND: ResourceKind = ResourceKind::PlannedDischarge;
    const SCOPE_COLUMNS: ScopeColumns = PATIENT_LINKED;

    fn store(repos: &Repositories) -> &Arc<dyn Store<Self>> {
        &repos.planned_discharges
    }

    fn patient_id(&self) -> Option<Uuid> {
        Some(self.patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database_layer::Condition;

    #[test]
    fn narrowing_only_adds_conditions() {
        let me = Uuid::new_v4();
        let base = RecordFilter::eq(Column::DoctorId, me);
        let narrowed = narrow(
            base,
            RecordFilter::eq(Column::PatientId, Uuid::new_v4()).and_status(Some("ACCEPTED")),
        );

        assert_eq!(narrowed.conditions.len(), 2);
        assert_eq!(narrowed.conditions.first(), Some(&Condition::Eq(Column::DoctorId, me)));
        assert_eq!(narrowed.status.as_deref(), Some("ACCEPTED"));
    }

    #[test]
    fn row_facts_prefer_the_row_over_the_patient() {
        let doctor = Uuid::new_v4();
        let mut patient = Patient::new(Uuid::new_v4());
        patient.assigned_doctor_id = Some(doctor);

        let facts = facts_of_patient(&patient);
        assert_eq!(facts.patient_user_id, Some(patient.user_id));
        assert_eq!(facts.assigned_doctor_id, Some(doctor));
        assert_eq!(facts.created_by, None);
    }
}
