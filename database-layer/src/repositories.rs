//! One store per record type, plus the ownership cascades that span them.
//!
//! PostgreSQL enforces the same cascades through foreign keys; running them
//! here keeps the in-memory backend identical.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use crate::models::{
    Appointment, BedStatus, HandoverLog, Invoice, LabResult, MedicalRecord, MedicationSchedule,
    NurseTask, Patient, PendingAdmission, PlannedDischarge, Prescription, User, UserSettings,
    WardAlert,
};
use crate::record::{Column, RecordFilter};
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn Store<User>>,
    pub settings: Arc<dyn Store<UserSettings>>,
    pub patients: Arc<dyn Store<Patient>>,
    pub appointments: Arc<dyn Store<Appointment>>,
    pub medical_records: Arc<dyn Store<MedicalRecord>>,
    pub prescriptions: Arc<dyn Store<Prescription>>,
    pub lab_results: Arc<dyn Store<LabResult>>,
    pub invoices: Arc<dyn Store<Invoice>>,
    pub nurse_tasks: Arc<dyn Store<NurseTask>>,
    pub ward_alerts: Arc<dyn Store<WardAlert>>,
    pub beds: Arc<dyn Store<BedStatus>>,
    pub medications: Arc<dyn Store<MedicationSchedule>>,
    pub handovers: Arc<dyn Store<HandoverLog>>,
    pub pending_admissions: Arc<dyn Store<PendingAdmission>>,
    pub planned_discharges: Arc<dyn Store<PlannedDischarge>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryStore::new()),
            settings: Arc::new(MemoryStore::new()),
            patients: Arc::new(MemoryStore::new()),
            appointments: Arc::new(MemoryStore::new()),
            medical_records: Arc::new(MemoryStore::new()),
            prescriptions: Arc::new(MemoryStore::new()),
            lab_results: Arc::new(MemoryStore::new()),
            invoices: Arc::new(MemoryStore::new()),
            nurse_tasks: Arc::new(MemoryStore::new()),
            ward_alerts: Arc::new(MemoryStore::new()),
            beds: Arc::new(MemoryStore::new()),
            medications: Arc::new(MemoryStore::new()),
            handovers: Arc::new(MemoryStore::new()),
            pending_admissions: Arc::new(MemoryStore::new()),
            planned_discharges: Arc::new(MemoryStore::new()),
        }
    }

    pub fn postgres(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            users: Arc::new(PgStore::new(pool.clone())),
            settings: Arc::new(PgStore::new(pool.clone())),
            patients: Arc::new(PgStore::new(pool.clone())),
            appointments: Arc::new(PgStore::new(pool.clone())),
            medical_records: Arc::new(PgStore::new(pool.clone())),
            prescriptions: Arc::new(PgStore::new(pool.clone())),
            lab_results: Arc::new(PgStore::new(pool.clone())),
            invoices: Arc::new(PgStore::new(pool.clone())),
            nurse_tasks: Arc::new(PgStore::new(pool.clone())),
            ward_alerts: Arc::new(PgStore::new(pool.clone())),
            beds: Arc::new(PgStore::new(pool.clone())),
            medications: Arc::new(PgStore::new(pool.clone())),
            handovers: Arc::new(PgStore::new(pool.clone())),
            pending_admissions: Arc::new(PgStore::new(pool.clone())),
            planned_discharges: Arc::new(PgStore::new(pool)),
        }
    }

    /// Patient profile owned by a user, if any.
    pub async fn patient_for_user(&self, user_id: Uuid) -> DatabaseResult<Option<Patient>> {
        self.patients
            .find_one(&RecordFilter::eq(Column::UserId, user_id))
            .await
    }

    /// Ids of the patients assigned to a doctor.
    pub async fn patient_ids_for_doctor(&self, doctor_id: Uuid) -> DatabaseResult<Vec<Uuid>> {
        let assigned = self
            .patients
            .list(&RecordFilter::eq(Column::AssignedDoctorId, doctor_id))
            .await?;
        Ok(assigned.into_iter().map(|p| p.id).collect())
    }

    /// Remove a user with everything it owns; staff references to it become NULL.
    pub async fn delete_user_cascade(&self, user_id: Uuid) -> DatabaseResult<bool> {
        if let Some(profile) = self.patient_for_user(user_id).await? {
            self.delete_patient_cascade(profile.id).await?;
        }

        let owned = RecordFilter::eq(Column::NurseId, user_id);
        self.nurse_tasks.delete_where(&owned).await?;
        self.handovers.delete_where(&owned).await?;
        self.settings.delete(user_id).await?;
        for appointment in self.appointments.list(&RecordFilter::eq(Column::DoctorId, user_id)).await? {
            self.delete_appointment(appointment.id).await?;
        }

        self.patients.clear_reference(Column::AssignedDoctorId, user_id).await?;
        self.medical_records.clear_reference(Column::CreatedBy, user_id).await?;
        self.prescriptions.clear_reference(Column::PrescribedBy, user_id).await?;
        self.lab_results.clear_reference(Column::CreatedBy, user_id).await?;
        self.invoices.clear_reference(Column::DoctorId, user_id).await?;
        self.invoices.clear_reference(Column::IssuedBy, user_id).await?;
        self.ward_alerts.clear_reference(Column::RaisedBy, user_id).await?;
        self.ward_alerts.clear_reference(Column::AcknowledgedBy, user_id).await?;
        self.beds.clear_reference(Column::UpdatedBy, user_id).await?;
        self.medications.clear_reference(Column::AdministeredBy, user_id).await?;
        self.medications.clear_reference(Column::CreatedBy, user_id).await?;
        self.pending_admissions.clear_reference(Column::RequestedBy, user_id).await?;
        self.planned_discharges.clear_reference(Column::PlannedBy, user_id).await?;

        let removed = self.users.delete(user_id).await?;
        if removed {
            info!(user_id = %user_id, "User deleted with owned records");
        }
        Ok(removed)
    }

    /// Remove a patient profile and every clinical record describing it.
    pub async fn delete_patient_cascade(&self, patient_id: Uuid) -> DatabaseResult<bool> {
        let owned = RecordFilter::eq(Column::PatientId, patient_id);

        for appointment in self.appointments.list(&owned).await? {
            self.delete_appointment(appointment.id).await?;
        }
        self.prescriptions.delete_where(&owned).await?;
        self.medical_records.delete_where(&owned).await?;
        self.lab_results.delete_where(&owned).await?;
        self.invoices.delete_where(&owned).await?;
        self.nurse_tasks.delete_where(&owned).await?;
        self.ward_alerts.delete_where(&owned).await?;
        self.medications.delete_where(&owned).await?;
        self.handovers.delete_where(&owned).await?;
        self.pending_admissions.delete_where(&owned).await?;
        self.planned_discharges.delete_where(&owned).await?;

        for mut bed in self.beds.list(&owned).await? {
            bed.patient_id = None;
            bed.occupied = false;
            self.beds.update(bed).await?;
        }

        self.patients.delete(patient_id).await
    }

    /// Remove an appointment; records that mention it keep existing.
    pub async fn delete_appointment(&self, appointment_id: Uuid) -> DatabaseResult<bool> {
        self.medical_records.clear_reference(Column::AppointmentId, appointment_id).await?;
        self.prescriptions.clear_reference(Column::AppointmentId, appointment_id).await?;
        self.lab_results.clear_reference(Column::AppointmentId, appointment_id).await?;
        self.invoices.clear_reference(Column::AppointmentId, appointment_id).await?;
        self.appointments.delete(appointment_id).await
    }

    /// Remove a medical record with the prescriptions written against it.
    pub async fn delete_medical_record(&self, record_id: Uuid) -> DatabaseResult<bool> {
        for prescription in self
            .prescriptions
            .list(&RecordFilter::eq(Column::MedicalRecordId, record_id))
            .await?
        {
            self.delete_prescription(prescription.id).await?;
        }
        self.medical_records.delete(record_id).await
    }

    pub async fn delete_prescription(&self, prescription_id: Uuid) -> DatabaseResult<bool> {
        self.medications.clear_reference(Column::PrescriptionId, prescription_id).await?;
        self.prescriptions.delete(prescription_id).await
    }
}
