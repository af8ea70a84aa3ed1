pub mod paths;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{appointments, clinical, health, invoices, patients, users, ward},
    openapi,
    server::ClinicServer,
};

/// Health and version, unauthenticated
pub fn health_routes() -> Router<ClinicServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

pub fn auth_routes() -> Router<ClinicServer> {
    Router::new().route(paths::auth::SIGNUP, post(users::signup))
}

pub fn user_routes() -> Router<ClinicServer> {
    Router::new()
        .route(paths::users::ME, get(users::me))
        .route(paths::users::USERS, get(users::list_users).post(users::create_user))
        .route(
            paths::users::USER_BY_ID,
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route(
            paths::users::SETTINGS,
            get(users::get_settings)
                .put(users::replace_settings)
                .patch(users::patch_settings),
        )
}

pub fn doctor_routes() -> Router<ClinicServer> {
    Router::new()
        .route(paths::doctors::DOCTORS, get(users::list_doctors))
        .route(paths::doctors::DASHBOARD, get(users::dashboard))
        .route(paths::doctors::MY_PATIENTS, get(users::my_patients))
        .route(paths::doctors::MY_APPOINTMENTS, get(users::my_appointments))
        .route(paths::doctors::DOCTOR_BY_ID, get(users::get_doctor))
}

pub fn patient_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::patients::PATIENTS,
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            paths::patients::PATIENT_BY_ID,
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        // Ward status
        .route(paths::patients::ADMIT, post(patients::admit))
        .route(paths::patients::ATTEND, post(patients::attend))
        .route(paths::patients::DISCHARGE, post(patients::discharge))
        .route(paths::patients::MEDICAL_RECORDS, get(patients::patient_medical_records))
}

pub fn appointment_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::appointments::APPOINTMENTS,
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            paths::appointments::APPOINTMENT_BY_ID,
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(paths::appointments::APPROVE, post(appointments::approve))
        .route(paths::appointments::DECLINE, post(appointments::decline))
        .route(paths::appointments::COMPLETE, post(appointments::complete))
        .route(paths::appointments::CANCEL, post(appointments::cancel))
}

pub fn clinical_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::clinical::MEDICAL_RECORDS,
            get(clinical::list_medical_records).post(clinical::create_medical_record),
        )
        .route(
            paths::clinical::MEDICAL_RECORD_BY_ID,
            get(clinical::get_medical_record)
                .put(clinical::update_medical_record)
                .delete(clinical::delete_medical_record),
        )
        .route(
            paths::clinical::PRESCRIPTIONS,
            get(clinical::list_prescriptions).post(clinical::create_prescription),
        )
        .route(
            paths::clinical::PRESCRIPTION_BY_ID,
            get(clinical::get_prescription)
                .put(clinical::update_prescription)
                .delete(clinical::delete_prescription),
        )
        .route(
            paths::clinical::LAB_RESULTS,
            get(clinical::list_lab_results).post(clinical::create_lab_result),
        )
        .route(
            paths::clinical::LAB_RESULT_BY_ID,
            get(clinical::get_lab_result)
                .put(clinical::update_lab_result)
                .delete(clinical::delete_lab_result),
        )
}

pub fn invoice_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::invoices::INVOICES,
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(paths::invoices::UNPAID, get(invoices::list_unpaid))
        .route(
            paths::invoices::INVOICE_BY_ID,
            get(invoices::get_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        .route(paths::invoices::MARK_PAID, post(invoices::mark_paid))
        .route(paths::invoices::CANCEL, post(invoices::cancel))
        .route(paths::invoices::DOWNLOAD, get(invoices::download))
}

pub fn ward_routes() -> Router<ClinicServer> {
    Router::new()
        // Tasks
        .route(paths::ward::TASKS, get(ward::list_tasks).post(ward::create_task))
        .route(
            paths::ward::TASK_BY_ID,
            get(ward::get_task).put(ward::update_task).delete(ward::delete_task),
        )
        .route(paths::ward::TASK_COMPLETE, post(ward::complete_task))
        // Alerts
        .route(paths::ward::ALERTS, get(ward::list_alerts).post(ward::raise_alert))
        .route(paths::ward::ALERT_BY_ID, get(ward::get_alert).delete(ward::delete_alert))
        .route(paths::ward::ALERT_ACKNOWLEDGE, post(ward::acknowledge_alert))
        // Beds
        .route(paths::ward::BEDS, get(ward::list_beds).post(ward::create_bed))
        .route(paths::ward::BED_BY_ID, get(ward::get_bed).delete(ward::delete_bed))
        .route(paths::ward::BED_ASSIGN, post(ward::assign_bed))
        .route(paths::ward::BED_RELEASE, post(ward::release_bed))
        // Medication rounds
        .route(
            paths::ward::MEDICATIONS,
            get(ward::list_medications).post(ward::schedule_medication),
        )
        .route(
            paths::ward::MEDICATION_BY_ID,
            get(ward::get_medication).delete(ward::delete_medication),
        )
        .route(paths::ward::MEDICATION_ADMINISTER, post(ward::administer_medication))
        // Handovers
        .route(paths::ward::HANDOVERS, get(ward::list_handovers).post(ward::create_handover))
        .route(
            paths::ward::HANDOVER_BY_ID,
            get(ward::get_handover)
                .put(ward::update_handover)
                .delete(ward::delete_handover),
        )
        // Admissions and discharges
        .route(
            paths::ward::ADMISSIONS,
            get(ward::list_admissions).post(ward::request_admission),
        )
        .route(
            paths::ward::ADMISSION_BY_ID,
            get(ward::get_admission).delete(ward::delete_admission),
        )
        .route(paths::ward::ADMISSION_RESOLVE, post(ward::resolve_admission))
        .route(
            paths::ward::DISCHARGES,
            get(ward::list_discharges).post(ward::plan_discharge),
        )
        .route(
            paths::ward::DISCHARGE_BY_ID,
            get(ward::get_discharge).delete(ward::delete_discharge),
        )
        .route(paths::ward::DISCHARGE_COMPLETE, post(ward::complete_discharge))
}

/// Everything under `/api/v1`
pub fn api_v1_routes() -> Router<ClinicServer> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(doctor_routes())
        .merge(patient_routes())
        .merge(appointment_routes())
        .merge(clinical_routes())
        .merge(invoice_routes())
        .merge(ward_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<ClinicServer> {
    Router::new()
        // Health check routes (no authentication required)
        .merge(health_routes())
        // API documentation routes
        .merge(openapi::create_docs_routes())
        .nest(paths::API_V1, api_v1_routes())
}
