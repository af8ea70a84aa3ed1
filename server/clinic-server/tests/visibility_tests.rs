//! Visible row sets per role, read through the store filters.

use std::collections::BTreeSet;

use auth_policy::Identity;
use chrono::{NaiveDate, NaiveTime, Utc};
use database_layer::models::{
    Appointment, AppointmentStatus, Invoice, InvoiceStatus, LabResult, MedicalRecord, Patient,
    Prescription, PrescriptionStatus, Role, Specialization, User,
};
use database_layer::{Column, Page, Record, RecordFilter};
use rust_decimal::Decimal;
use uuid::Uuid;

use clinic_server::services::scope::{list_visible, Scoped};
use clinic_server::{ApiError, ClinicConfig, ClinicServer};

struct Clinic {
    server: ClinicServer,
    admin: Identity,
    doctor: Identity,
    nurse: Identity,
    desk: Identity,
    lab: Identity,
    pharmacist: Identity,
    patient: Identity,
    /// Assigned to `doctor`, owned by `patient`
    mine: Uuid,
    /// Assigned to another doctor
    theirs: Uuid,
}

impl Clinic {
    async fn user(server: &ClinicServer, username: &str, role: Role) -> Identity {
        let mut user = User::new(username, role);
        if role == Role::Doctor {
            user.specialization = Some(Specialization::Pediatrician);
        }
        let user = server.repos.users.insert(user).await.unwrap();
        Identity::new(user.id, role)
    }

    /// Two patients with one row of every clinical kind each. The first is
    /// seen by `doctor`; the second by a colleague, with its record written
    /// by the lab.
    async fn seed() -> Self {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let admin = Self::user(&server, "admin", Role::Admin).await;
        let doctor = Self::user(&server, "dr_mutua", Role::Doctor).await;
        let colleague = Self::user(&server, "dr_nyambura", Role::Doctor).await;
        let nurse = Self::user(&server, "nurse_adhiambo", Role::Nurse).await;
        let desk = Self::user(&server, "desk", Role::Receptionist).await;
        let lab = Self::user(&server, "lab_kibet", Role::Lab).await;
        let pharmacist = Self::user(&server, "pharm_wairimu", Role::Pharmacist).await;
        let patient = Self::user(&server, "tumaini", Role::Patient).await;
        let other_patient = Self::user(&server, "jabari", Role::Patient).await;

        let mut profile = Patient::new(patient.user_id);
        profile.assigned_doctor_id = Some(doctor.user_id);
        let mine = server.repos.patients.insert(profile).await.unwrap().id;

        let mut profile = Patient::new(other_patient.user_id);
        profile.assigned_doctor_id = Some(colleague.user_id);
        let theirs = server.repos.patients.insert(profile).await.unwrap().id;

        Self::clinical_rows(&server, mine, doctor.user_id, doctor.user_id, lab.user_id).await;
        Self::clinical_rows(&server, theirs, colleague.user_id, lab.user_id, colleague.user_id).await;

        Self {
            server,
            admin,
            doctor,
            nurse,
            desk,
            lab,
            pharmacist,
            patient,
            mine,
            theirs,
        }
    }

    async fn clinical_rows(server: &ClinicServer, patient_id: Uuid, doctor_id: Uuid, record_author: Uuid, lab_author: Uuid) {
        let repos = &server.repos;
        let now = Utc::now();

        let appointment = repos
            .appointments
            .insert(Appointment {
                id: Uuid::new_v4(),
                patient_id,
                doctor_id,
                date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                status: AppointmentStatus::Accepted,
                requested_by_patient: false,
                notes: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let record = repos
            .medical_records
            .insert(MedicalRecord {
                id: Uuid::new_v4(),
                patient_id,
                appointment_id: Some(appointment.id),
                created_by: Some(record_author),
                symptoms: "fever".into(),
                diagnosis: "malaria".into(),
                notes: String::new(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        repos
            .prescriptions
            .insert(Prescription {
                id: Uuid::new_v4(),
                patient_id,
                medical_record_id: record.id,
                prescribed_by: Some(doctor_id),
                appointment_id: Some(appointment.id),
                medication_name: "Artemether".into(),
                dosage: "80mg".into(),
                duration: "3 days".into(),
                notes: String::new(),
                status: PrescriptionStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        repos
            .lab_results
            .insert(LabResult {
                id: Uuid::new_v4(),
                patient_id,
                appointment_id: Some(appointment.id),
                test_name: "Blood smear".into(),
                result: "positive".into(),
                created_by: Some(lab_author),
                created_at: now,
            })
            .await
            .unwrap();

        repos
            .invoices
            .insert(Invoice {
                id: Uuid::new_v4(),
                patient_id,
                doctor_id: Some(doctor_id),
                appointment_id: Some(appointment.id),
                issued_by: None,
                amount: Decimal::new(120_000, 2),
                description: "Consultation".into(),
                status: InvoiceStatus::Unpaid,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    /// Patients whose rows of `T` the caller sees; `None` when refused outright.
    async fn seen<T: Scoped>(&self, identity: &Identity) -> Option<BTreeSet<Uuid>> {
        match list_visible::<T>(&self.server, identity, RecordFilter::all(), Page::new(None, None)).await {
            Ok(page) => Some(
                page.items
                    .iter()
                    .map(|row| row.patient_id().unwrap_or_else(|| row.id()))
                    .collect(),
            ),
            Err(ApiError::Authorization { .. }) => None,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    /// Visible patients for each of the six clinical kinds, in a fixed order.
    async fn row(&self, identity: &Identity) -> [Option<BTreeSet<Uuid>>; 6] {
        [
            self.seen::<Patient>(identity).await,
            self.seen::<Appointment>(identity).await,
            self.seen::<MedicalRecord>(identity).await,
            self.seen::<Prescription>(identity).await,
            self.seen::<LabResult>(identity).await,
            self.seen::<Invoice>(identity).await,
        ]
    }
}

#[tokio::test]
async fn each_role_lists_exactly_its_rows() {
    let clinic = Clinic::seed().await;
    let both = || Some(BTreeSet::from([clinic.mine, clinic.theirs]));
    let mine = || Some(BTreeSet::from([clinic.mine]));
    let theirs = || Some(BTreeSet::from([clinic.theirs]));
    let empty = || Some(BTreeSet::new());

    // Patient, Appointment, MedicalRecord, Prescription, LabResult, Invoice
    let expected = [
        (&clinic.admin, [both(), both(), both(), both(), both(), both()]),
        (&clinic.doctor, [mine(), mine(), mine(), mine(), mine(), mine()]),
        (&clinic.nurse, [both(), both(), both(), both(), both(), None]),
        (&clinic.desk, [both(), both(), empty(), None, empty(), both()]),
        (&clinic.patient, [mine(), mine(), mine(), mine(), mine(), mine()]),
        (&clinic.lab, [None, None, theirs(), None, mine(), None]),
        (&clinic.pharmacist, [both(), None, None, both(), None, None]),
    ];

    for (identity, rows) in expected {
        assert_eq!(clinic.row(identity).await, rows, "{}", identity.role);
    }
}

#[tokio::test]
async fn narrowing_never_widens_the_visible_set() {
    let clinic = Clinic::seed().await;
    let narrowing = RecordFilter::eq(Column::PatientId, clinic.theirs);

    let page = list_visible::<Prescription>(&clinic.server, &clinic.doctor, narrowing, Page::new(None, None))
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}
