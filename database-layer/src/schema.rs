//! Table mapping for every record type. Column order mirrors
//! `migrations/20250101000000_clinic_schema.sql`.

use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::Postgres;
use uuid::Uuid;

use crate::models::{
    Appointment, BedStatus, HandoverLog, Invoice, LabResult, MedicalRecord, MedicationSchedule,
    NurseTask, Patient, PendingAdmission, PlannedDischarge, Prescription, User, UserSettings,
    WardAlert,
};
use crate::record::{Column, Record};

type Row<'qb, 'args> = Separated<'qb, 'args, Postgres, &'static str>;

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "first_name",
        "last_name",
        "role",
        "specialization",
        "is_active",
        "date_joined",
    ];
    const ORDER_COLUMN: &'static str = "date_joined";
    const STATUS_COLUMN: &'static str = "role";

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, _column: Column) -> Option<Uuid> {
        None
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.role.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.date_joined
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("users_username_key", self.username.trim().to_lowercase()))
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.username.clone())
            .push_bind(self.email.clone())
            .push_bind(self.first_name.clone())
            .push_bind(self.last_name.clone())
            .push_bind(self.role)
            .push_bind(self.specialization)
            .push_bind(self.is_active)
            .push_bind(self.date_joined);
    }
}

impl Record for UserSettings {
    const TABLE: &'static str = "user_settings";
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "default_appointment_duration",
        "email_notifications",
        "sms_notifications",
        "auto_generate_patient_id",
        "theme",
        "layout",
        "updated_at",
    ];
    const ID_COLUMN: &'static str = "user_id";
    const ORDER_COLUMN: &'static str = "updated_at";

    fn id(&self) -> Uuid {
        self.user_id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::UserId => Some(self.user_id),
            _ => None,
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.user_id)
            .push_bind(self.default_appointment_duration)
            .push_bind(self.email_notifications)
            .push_bind(self.sms_notifications)
            .push_bind(self.auto_generate_patient_id)
            .push_bind(self.theme)
            .push_bind(self.layout)
            .push_bind(self.updated_at);
    }
}

impl Record for Patient {
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "date_of_birth",
        "gender",
        "phone",
        "address",
        "next_of_kin_name",
        "next_of_kin_phone",
        "notes_for_doctor",
        "assigned_doctor_id",
        "status",
        "ward_room",
        "admission_type",
        "signs_symptoms",
        "temperature",
        "blood_pressure",
        "heart_rate",
        "respiratory_rate",
        "ward_notes",
        "discharge_destination",
        "discharge_summary",
        "medications_on_discharge",
        "follow_up_instructions",
        "created_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::AssignedDoctorId];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::UserId => Some(self.user_id),
            Column::AssignedDoctorId => self.assigned_doctor_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        if column == Column::AssignedDoctorId {
            self.assigned_doctor_id = None;
        }
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("patients_user_id_key", self.user_id.to_string()))
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.user_id)
            .push_bind(self.date_of_birth)
            .push_bind(self.gender)
            .push_bind(self.phone.clone())
            .push_bind(self.address.clone())
            .push_bind(self.next_of_kin_name.clone())
            .push_bind(self.next_of_kin_phone.clone())
            .push_bind(self.notes_for_doctor.clone())
            .push_bind(self.assigned_doctor_id)
            .push_bind(self.status)
            .push_bind(self.ward_room.clone())
            .push_bind(self.admission_type.clone())
            .push_bind(self.signs_symptoms.clone())
            .push_bind(self.temperature.clone())
            .push_bind(self.blood_pressure.clone())
            .push_bind(self.heart_rate.clone())
            .push_bind(self.respiratory_rate.clone())
            .push_bind(self.ward_notes.clone())
            .push_bind(self.discharge_destination.clone())
            .push_bind(self.discharge_summary.clone())
            .push_bind(self.medications_on_discharge.clone())
            .push_bind(self.follow_up_instructions.clone())
            .push_bind(self.created_at);
    }
}

impl Record for Appointment {
    const TABLE: &'static str = "appointments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "doctor_id",
        "date",
        "time",
        "status",
        "requested_by_patient",
        "notes",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::DoctorId => Some(self.doctor_id),
            _ => None,
        }
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("unique_doctor_timeslot", self.slot_key()))
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.doctor_id)
            .push_bind(self.date)
            .push_bind(self.time)
            .push_bind(self.status)
            .push_bind(self.requested_by_patient)
            .push_bind(self.notes.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Record for MedicalRecord {
    const TABLE: &'static str = "medical_records";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "appointment_id",
        "created_by",
        "symptoms",
        "diagnosis",
        "notes",
        "created_at",
        "updated_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::AppointmentId, Column::CreatedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::AppointmentId => self.appointment_id,
            Column::CreatedBy => self.created_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        match column {
            Column::AppointmentId => self.appointment_id = None,
            Column::CreatedBy => self.created_by = None,
            _ => {}
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.appointment_id)
            .push_bind(self.created_by)
            .push_bind(self.symptoms.clone())
            .push_bind(self.diagnosis.clone())
            .push_bind(self.notes.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Record for Prescription {
    const TABLE: &'static str = "prescriptions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "medical_record_id",
        "prescribed_by",
        "appointment_id",
        "medication_name",
        "dosage",
        "duration",
        "notes",
        "status",
        "created_at",
        "updated_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::PrescribedBy, Column::AppointmentId];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::MedicalRecordId => Some(self.medical_record_id),
            Column::PrescribedBy => self.prescribed_by,
            Column::AppointmentId => self.appointment_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        match column {
            Column::PrescribedBy => self.prescribed_by = None,
            Column::AppointmentId => self.appointment_id = None,
            _ => {}
        }
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.medical_record_id)
            .push_bind(self.prescribed_by)
            .push_bind(self.appointment_id)
            .push_bind(self.medication_name.clone())
            .push_bind(self.dosage.clone())
            .push_bind(self.duration.clone())
            .push_bind(self.notes.clone())
            .push_bind(self.status)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Record for LabResult {
    const TABLE: &'static str = "lab_results";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "appointment_id",
        "test_name",
        "result",
        "created_by",
        "created_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::AppointmentId, Column::CreatedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::AppointmentId => self.appointment_id,
            Column::CreatedBy => self.created_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        match column {
            Column::AppointmentId => self.appointment_id = None,
            Column::CreatedBy => self.created_by = None,
            _ => {}
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.appointment_id)
            .push_bind(self.test_name.clone())
            .push_bind(self.result.clone())
            .push_bind(self.created_by)
            .push_bind(self.created_at);
    }
}

impl Record for Invoice {
    const TABLE: &'static str = "invoices";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "doctor_id",
        "appointment_id",
        "issued_by",
        "amount",
        "description",
        "status",
        "created_at",
        "updated_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] =
        &[Column::DoctorId, Column::AppointmentId, Column::IssuedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::DoctorId => self.doctor_id,
            Column::AppointmentId => self.appointment_id,
            Column::IssuedBy => self.issued_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        match column {
            Column::DoctorId => self.doctor_id = None,
            Column::AppointmentId => self.appointment_id = None,
            Column::IssuedBy => self.issued_by = None,
            _ => {}
        }
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.doctor_id)
            .push_bind(self.appointment_id)
            .push_bind(self.issued_by)
            .push_bind(self.amount)
            .push_bind(self.description.clone())
            .push_bind(self.status)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Record for NurseTask {
    const TABLE: &'static str = "nurse_tasks";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "nurse_id",
        "patient_id",
        "description",
        "due_at",
        "completed",
        "completed_at",
        "created_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::NurseId => Some(self.nurse_id),
            Column::PatientId => self.patient_id,
            _ => None,
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.nurse_id)
            .push_bind(self.patient_id)
            .push_bind(self.description.clone())
            .push_bind(self.due_at)
            .push_bind(self.completed)
            .push_bind(self.completed_at)
            .push_bind(self.created_at);
    }
}

impl Record for WardAlert {
    const TABLE: &'static str = "ward_alerts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "message",
        "severity",
        "raised_by",
        "acknowledged",
        "acknowledged_by",
        "acknowledged_at",
        "created_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::RaisedBy, Column::AcknowledgedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => self.patient_id,
            Column::RaisedBy => self.raised_by,
            Column::AcknowledgedBy => self.acknowledged_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        match column {
            Column::RaisedBy => self.raised_by = None,
            Column::AcknowledgedBy => self.acknowledged_by = None,
            _ => {}
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.message.clone())
            .push_bind(self.severity)
            .push_bind(self.raised_by)
            .push_bind(self.acknowledged)
            .push_bind(self.acknowledged_by)
            .push_bind(self.acknowledged_at)
            .push_bind(self.created_at);
    }
}

impl Record for BedStatus {
    const TABLE: &'static str = "bed_statuses";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "ward",
        "bed_number",
        "patient_id",
        "occupied",
        "updated_by",
        "created_at",
        "updated_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::PatientId, Column::UpdatedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => self.patient_id,
            Column::UpdatedBy => self.updated_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        match column {
            Column::PatientId => self.patient_id = None,
            Column::UpdatedBy => self.updated_by = None,
            _ => {}
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("unique_ward_bed", self.bed_key()))
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.ward.clone())
            .push_bind(self.bed_number.clone())
            .push_bind(self.patient_id)
            .push_bind(self.occupied)
            .push_bind(self.updated_by)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Record for MedicationSchedule {
    const TABLE: &'static str = "medication_schedules";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "prescription_id",
        "name",
        "dosage",
        "scheduled_for",
        "administered",
        "administered_by",
        "administered_at",
        "created_by",
        "created_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] =
        &[Column::PrescriptionId, Column::AdministeredBy, Column::CreatedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::PrescriptionId => self.prescription_id,
            Column::AdministeredBy => self.administered_by,
            Column::CreatedBy => self.created_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        match column {
            Column::PrescriptionId => self.prescription_id = None,
            Column::AdministeredBy => self.administered_by = None,
            Column::CreatedBy => self.created_by = None,
            _ => {}
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.prescription_id)
            .push_bind(self.name.clone())
            .push_bind(self.dosage.clone())
            .push_bind(self.scheduled_for)
            .push_bind(self.administered)
            .push_bind(self.administered_by)
            .push_bind(self.administered_at)
            .push_bind(self.created_by)
            .push_bind(self.created_at);
    }
}

impl Record for HandoverLog {
    const TABLE: &'static str = "handover_logs";
    const COLUMNS: &'static [&'static str] =
        &["id", "nurse_id", "patient_id", "note", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::NurseId => Some(self.nurse_id),
            Column::PatientId => self.patient_id,
            _ => None,
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.nurse_id)
            .push_bind(self.patient_id)
            .push_bind(self.note.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Record for PendingAdmission {
    const TABLE: &'static str = "pending_admissions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "requested_by",
        "ward",
        "reason",
        "admitted",
        "admitted_at",
        "created_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::RequestedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::RequestedBy => self.requested_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        if column == Column::RequestedBy {
            self.requested_by = None;
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.requested_by)
            .push_bind(self.ward.clone())
            .push_bind(self.reason.clone())
            .push_bind(self.admitted)
            .push_bind(self.admitted_at)
            .push_bind(self.created_at);
    }
}

impl Record for PlannedDischarge {
    const TABLE: &'static str = "planned_discharges";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "patient_id",
        "planned_by",
        "planned_for",
        "notes",
        "completed",
        "completed_at",
        "created_at",
    ];
    const NULLABLE_REFERENCES: &'static [Column] = &[Column::PlannedBy];

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self, column: Column) -> Option<Uuid> {
        match column {
            Column::PatientId => Some(self.patient_id),
            Column::PlannedBy => self.planned_by,
            _ => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        if column == Column::PlannedBy {
            self.planned_by = None;
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn push_values(&self, row: &mut Row<'_, '_>) {
        row.push_bind(self.id)
            .push_bind(self.patient_id)
            .push_bind(self.planned_by)
            .push_bind(self.planned_for)
            .push_bind(self.notes.clone())
            .push_bind(self.completed)
            .push_bind(self.completed_at)
            .push_bind(self.created_at);
    }
}
