//! Clinic workflow scenarios run straight against the policy engine.

use auth_policy::*;
use chrono::{NaiveDate, NaiveTime, Utc};
use database_layer::models::{
    Appointment, AppointmentStatus, Invoice, InvoiceStatus, Patient, PatientStatus, Role,
    Specialization,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn doctor() -> Identity {
    let mut identity = Identity::new(Uuid::new_v4(), Role::Doctor);
    identity.specialization = Some(Specialization::GeneralPractitioner);
    identity
}

fn appointment(doctor_id: Uuid, status: AppointmentStatus) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id,
        date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
        time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        status,
        requested_by_patient: true,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn attending(doctor_id: Uuid) -> RowFacts {
    RowFacts {
        attending_doctor_id: Some(doctor_id),
        ..RowFacts::default()
    }
}

#[test]
fn patients_book_for_themselves_and_staff_for_anyone() {
    let engine = PolicyEngine::new();
    let patient_user = Identity::new(Uuid::new_v4(), Role::Patient);
    let profile = Patient::new(patient_user.user_id);

    let origin = engine
        .authorize_create_appointment(&patient_user, Some(&profile))
        .unwrap();
    assert_eq!(origin, AppointmentOrigin::Patient { patient_id: profile.id });
    assert!(origin.requested_by_patient());

    let desk = Identity::new(Uuid::new_v4(), Role::Receptionist);
    let origin = engine.authorize_create_appointment(&desk, None).unwrap();
    assert!(!origin.requested_by_patient());

    let nurse = Identity::new(Uuid::new_v4(), Role::Nurse);
    assert!(matches!(
        engine.authorize_create_appointment(&nurse, None),
        Err(PolicyError::Forbidden(_))
    ));
}

#[test]
fn only_the_attending_doctor_approves() {
    let engine = PolicyEngine::new();
    let dr_mwangi = doctor();
    let dr_achieng = doctor();
    let visit = appointment(dr_mwangi.user_id, AppointmentStatus::Requested);

    let next = engine
        .authorize_appointment_transition(
            &dr_mwangi,
            &visit,
            &attending(dr_mwangi.user_id),
            AppointmentAction::Approve,
        )
        .unwrap();
    assert_eq!(next, AppointmentStatus::Accepted);

    // Another doctor cannot even see it.
    let err = engine
        .authorize_appointment_transition(
            &dr_achieng,
            &visit,
            &attending(dr_mwangi.user_id),
            AppointmentAction::Approve,
        )
        .unwrap_err();
    assert_eq!(err, PolicyError::NotFound(ResourceKind::Appointment));

    // The desk sees it but may not approve.
    let desk = Identity::new(Uuid::new_v4(), Role::Admin);
    let err = engine
        .authorize_appointment_transition(
            &desk,
            &visit,
            &attending(dr_mwangi.user_id),
            AppointmentAction::Approve,
        )
        .unwrap_err();
    assert!(matches!(err, PolicyError::Forbidden(_)));
}

#[test]
fn declined_appointments_cannot_be_approved() {
    let engine = PolicyEngine::new();
    let dr = doctor();
    let visit = appointment(dr.user_id, AppointmentStatus::Declined);

    let err = engine
        .authorize_appointment_transition(&dr, &visit, &attending(dr.user_id), AppointmentAction::Approve)
        .unwrap_err();
    match err {
        PolicyError::Conflict(message) => assert!(message.contains("Declined")),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn patients_cancel_their_own_appointments_only() {
    let engine = PolicyEngine::new();
    let dr = doctor();
    let owner = Identity::new(Uuid::new_v4(), Role::Patient);
    let visit = appointment(dr.user_id, AppointmentStatus::Accepted);
    let own_row = RowFacts {
        patient_user_id: Some(owner.user_id),
        attending_doctor_id: Some(dr.user_id),
        ..RowFacts::default()
    };

    assert_eq!(
        engine.authorize_appointment_transition(&owner, &visit, &own_row, AppointmentAction::Cancel),
        Ok(AppointmentStatus::Cancelled)
    );

    let stranger = Identity::new(Uuid::new_v4(), Role::Patient);
    assert_eq!(
        engine.authorize_appointment_transition(&stranger, &visit, &own_row, AppointmentAction::Cancel),
        Err(PolicyError::NotFound(ResourceKind::Appointment))
    );

    // Patients never approve, even their own.
    assert!(matches!(
        engine.authorize_appointment_transition(&owner, &visit, &own_row, AppointmentAction::Complete),
        Err(PolicyError::Forbidden(_))
    ));
}

#[test]
fn invoices_are_marked_paid_once_by_the_desk() {
    let engine = PolicyEngine::new();
    let now = Utc::now();
    let mut invoice = Invoice {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id: None,
        appointment_id: None,
        issued_by: None,
        amount: Decimal::new(1500, 0),
        description: "Consultation".into(),
        status: InvoiceStatus::Unpaid,
        created_at: now,
        updated_at: now,
    };
    let desk = Identity::new(Uuid::new_v4(), Role::Receptionist);
    let row = RowFacts::default();

    invoice.status = engine
        .authorize_invoice_transition(&desk, &invoice, &row, InvoiceAction::MarkPaid)
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    let again = engine.authorize_invoice_transition(&desk, &invoice, &row, InvoiceAction::MarkPaid);
    assert!(matches!(again, Err(PolicyError::Conflict(_))));

    let dr = doctor();
    let by_doctor = engine.authorize_invoice_transition(&dr, &invoice, &attending(dr.user_id), InvoiceAction::MarkPaid);
    assert!(matches!(by_doctor, Err(PolicyError::Forbidden(_))));
}

#[test]
fn doctor_updates_only_assigned_patients_records() {
    let engine = PolicyEngine::new();
    let dr = doctor();
    let mine = RowFacts {
        assigned_doctor_id: Some(dr.user_id),
        ..RowFacts::default()
    };
    let theirs = RowFacts {
        assigned_doctor_id: Some(Uuid::new_v4()),
        ..RowFacts::default()
    };

    assert_eq!(engine.authorize_update(&dr, ResourceKind::MedicalRecord, &mine), Decision::Allowed);
    assert!(matches!(
        engine.authorize_update(&dr, ResourceKind::MedicalRecord, &theirs),
        Decision::Forbidden(_)
    ));

    // Creation follows the same rule, lab technicians are unrestricted.
    assert!(matches!(
        engine.authorize_create(&dr, ResourceKind::MedicalRecord, &theirs),
        Decision::Forbidden(_)
    ));
    let lab = Identity::new(Uuid::new_v4(), Role::Lab);
    assert_eq!(engine.authorize_create(&lab, ResourceKind::MedicalRecord, &theirs), Decision::Allowed);

    let desk = Identity::new(Uuid::new_v4(), Role::Receptionist);
    assert!(matches!(
        engine.authorize_create(&desk, ResourceKind::MedicalRecord, &mine),
        Decision::Forbidden(_)
    ));
}

#[test]
fn pharmacists_only_move_prescription_status() {
    let engine = PolicyEngine::new();
    let pharmacist = Identity::new(Uuid::new_v4(), Role::Pharmacist);
    let row = RowFacts::default();

    assert_eq!(engine.authorize_prescription_update(&pharmacist, &row, false), Decision::Allowed);
    assert!(matches!(
        engine.authorize_prescription_update(&pharmacist, &row, true),
        Decision::Forbidden(_)
    ));
}

#[test]
fn nurses_keep_their_own_tasks_and_handovers() {
    let engine = PolicyEngine::new();
    let nurse = Identity::new(Uuid::new_v4(), Role::Nurse);
    let colleague = RowFacts {
        owner_id: Some(Uuid::new_v4()),
        ..RowFacts::default()
    };
    let own = RowFacts {
        owner_id: Some(nurse.user_id),
        ..RowFacts::default()
    };

    assert_eq!(engine.authorize_update(&nurse, ResourceKind::NurseTask, &own), Decision::Allowed);
    assert_eq!(engine.authorize_update(&nurse, ResourceKind::NurseTask, &colleague), Decision::NotFound);

    // Handovers are readable ward-wide but only editable by the author.
    assert_eq!(engine.check_visible(&nurse, ResourceKind::HandoverLog, &colleague), Decision::Allowed);
    assert!(matches!(
        engine.authorize_delete(&nurse, ResourceKind::HandoverLog, &colleague),
        Decision::Forbidden(_)
    ));

    // Alerts are ward-wide for every nurse.
    assert_eq!(engine.authorize_update(&nurse, ResourceKind::WardAlert, &colleague), Decision::Allowed);
}

#[test]
fn ward_actions_for_nurses_and_the_assigned_doctor() {
    let engine = PolicyEngine::new();
    let dr = doctor();
    let assigned = RowFacts {
        assigned_doctor_id: Some(dr.user_id),
        ..RowFacts::default()
    };

    let nurse = Identity::new(Uuid::new_v4(), Role::Nurse);
    assert_eq!(
        engine.authorize_ward_action(&nurse, &RowFacts::default(), PatientWardAction::Admit),
        Ok(PatientStatus::Admitted)
    );
    assert_eq!(
        engine.authorize_ward_action(&dr, &assigned, PatientWardAction::Discharge),
        Ok(PatientStatus::Discharged)
    );
    assert_eq!(
        engine.authorize_ward_action(&dr, &RowFacts::default(), PatientWardAction::Discharge),
        Err(PolicyError::NotFound(ResourceKind::Patient))
    );

    let pharmacist = Identity::new(Uuid::new_v4(), Role::Pharmacist);
    assert!(matches!(
        engine.authorize_ward_action(&pharmacist, &RowFacts::default(), PatientWardAction::Attend),
        Err(PolicyError::Forbidden(_))
    ));
}

#[test]
fn dash_entries_are_refused_not_emptied() {
    let engine = PolicyEngine::new();
    let desk = Identity::new(Uuid::new_v4(), Role::Receptionist);
    assert!(matches!(
        engine.visibility(&desk, ResourceKind::Prescription),
        Err(PolicyError::Forbidden(_))
    ));
    assert_eq!(
        engine.visibility(&desk, ResourceKind::MedicalRecord),
        Ok(Visibility::Nothing)
    );
}

#[test]
fn refusals_on_unseen_rows_do_not_confirm_existence() {
    let engine = PolicyEngine::new();
    let dr = doctor();
    let visit = appointment(dr.user_id, AppointmentStatus::Requested);
    let someone_elses = RowFacts {
        patient_user_id: Some(Uuid::new_v4()),
        attending_doctor_id: Some(dr.user_id),
        ..RowFacts::default()
    };

    let desk = Identity::new(Uuid::new_v4(), Role::Receptionist);
    assert_eq!(
        engine.authorize_update(&desk, ResourceKind::MedicalRecord, &someone_elses),
        Decision::NotFound
    );

    let patient = Identity::new(Uuid::new_v4(), Role::Patient);
    assert_eq!(
        engine.authorize_delete(&patient, ResourceKind::Appointment, &someone_elses),
        Decision::NotFound
    );
    assert_eq!(
        engine.authorize_appointment_transition(&patient, &visit, &someone_elses, AppointmentAction::Approve),
        Err(PolicyError::NotFound(ResourceKind::Appointment))
    );

    // Roles with no access at all are refused before any row is consulted.
    assert!(matches!(
        engine.authorize_kind(&desk, ResourceKind::Prescription),
        Decision::Forbidden(_)
    ));
    assert_eq!(engine.authorize_kind(&desk, ResourceKind::MedicalRecord), Decision::Allowed);
}
