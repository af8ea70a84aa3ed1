use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::ClinicServer;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Accounts
        crate::handlers::users::signup,
        crate::handlers::users::me,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::list_doctors,
        crate::handlers::users::get_doctor,
        crate::handlers::users::dashboard,
        crate::handlers::users::my_patients,
        crate::handlers::users::my_appointments,
        crate::handlers::users::get_settings,
        crate::handlers::users::replace_settings,
        crate::handlers::users::patch_settings,

        // Patients
        crate::handlers::patients::list_patients,
        crate::handlers::patients::get_patient,
        crate::handlers::patients::create_patient,
        crate::handlers::patients::update_patient,
        crate::handlers::patients::delete_patient,
        crate::handlers::patients::admit,
        crate::handlers::patients::attend,
        crate::handlers::patients::discharge,
        crate::handlers::patients::patient_medical_records,

        // Appointments
        crate::handlers::appointments::list_appointments,
        crate::handlers::appointments::get_appointment,
        crate::handlers::appointments::create_appointment,
        crate::handlers::appointments::update_appointment,
        crate::handlers::appointments::delete_appointment,
        crate::handlers::appointments::approve,
        crate::handlers::appointments::decline,
        crate::handlers::appointments::complete,
        crate::handlers::appointments::cancel,

        // Clinical
        crate::handlers::clinical::list_medical_records,
        crate::handlers::clinical::get_medical_record,
        crate::handlers::clinical::create_medical_record,
        crate::handlers::clinical::update_medical_record,
        crate::handlers::clinical::delete_medical_record,
        crate::handlers::clinical::list_prescriptions,
        crate::handlers::clinical::get_prescription,
        crate::handlers::clinical::create_prescription,
        crate::handlers::clinical::update_prescription,
        crate::handlers::clinical::delete_prescription,
        crate::handlers::clinical::list_lab_results,
        crate::handlers::clinical::get_lab_result,
        crate::handlers::clinical::create_lab_result,
        crate::handlers::clinical::update_lab_result,
        crate::handlers::clinical::delete_lab_result,

        // Billing
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::list_unpaid,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::update_invoice,
        crate::handlers::invoices::mark_paid,
        crate::handlers::invoices::cancel,
        crate::handlers::invoices::delete_invoice,
        crate::handlers::invoices::download,

        // Ward
        crate::handlers::ward::list_tasks,
        crate::handlers::ward::create_task,
        crate::handlers::ward::get_task,
        crate::handlers::ward::update_task,
        crate::handlers::ward::complete_task,
        crate::handlers::ward::delete_task,
        crate::handlers::ward::list_alerts,
        crate::handlers::ward::raise_alert,
        crate::handlers::ward::get_alert,
        crate::handlers::ward::acknowledge_alert,
        crate::handlers::ward::delete_alert,
        crate::handlers::ward::list_beds,
        crate::handlers::ward::create_bed,
        crate::handlers::ward::get_bed,
        crate::handlers::ward::assign_bed,
        crate::handlers::ward::release_bed,
        crate::handlers::ward::delete_bed,
        crate::handlers::ward::list_medications,
        crate::handlers::ward::schedule_medication,
        crate::handlers::ward::get_medication,
        crate::handlers::ward::administer_medication,
        crate::handlers::ward::delete_medication,
        crate::handlers::ward::list_handovers,
        crate::handlers::ward::create_handover,
        crate::handlers::ward::get_handover,
        crate::handlers::ward::update_handover,
        crate::handlers::ward::delete_handover,
        crate::handlers::ward::list_admissions,
        crate::handlers::ward::request_admission,
        crate::handlers::ward::get_admission,
        crate::handlers::ward::resolve_admission,
        crate::handlers::ward::delete_admission,
        crate::handlers::ward::list_discharges,
        crate::handlers::ward::plan_discharge,
        crate::handlers::ward::get_discharge,
        crate::handlers::ward::complete_discharge,
        crate::handlers::ward::delete_discharge,
    ),
    components(
        schemas(
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,

            // Records
            database_layer::models::User,
            database_layer::models::UserSettings,
            database_layer::models::Patient,
            database_layer::models::Appointment,
            database_layer::models::MedicalRecord,
            database_layer::models::Prescription,
            database_layer::models::LabResult,
            database_layer::models::Invoice,
            database_layer::models::NurseTask,
            database_layer::models::WardAlert,
            database_layer::models::BedStatus,
            database_layer::models::MedicationSchedule,
            database_layer::models::HandoverLog,
            database_layer::models::PendingAdmission,
            database_layer::models::PlannedDischarge,

            // Requests
            crate::services::users::SignupRequest,
            crate::services::users::SignupResponse,
            crate::services::users::CreateUserRequest,
            crate::services::users::UpdateUserRequest,
            crate::services::users::DoctorDashboard,
            crate::services::users::SettingsRequest,
            crate::services::users::SettingsPatch,
            crate::services::patients::CreatePatientRequest,
            crate::services::patients::UpdatePatientRequest,
            crate::services::patients::WardActionRequest,
            crate::services::patients::RegisteredPatient,
            crate::services::appointments::CreateAppointmentRequest,
            crate::services::appointments::UpdateAppointmentRequest,
            crate::services::medical_records::CreateMedicalRecordRequest,
            crate::services::medical_records::UpdateMedicalRecordRequest,
            crate::services::prescriptions::CreatePrescriptionRequest,
            crate::services::prescriptions::UpdatePrescriptionRequest,
            crate::services::lab_results::CreateLabResultRequest,
            crate::services::lab_results::UpdateLabResultRequest,
            crate::services::invoices::CreateInvoiceRequest,
            crate::services::invoices::UpdateInvoiceRequest,
            crate::services::ward::CreateTaskRequest,
            crate::services::ward::UpdateTaskRequest,
            crate::services::ward::RaiseAlertRequest,
            crate::services::ward::CreateBedRequest,
            crate::services::ward::AssignBedRequest,
            crate::services::ward::ScheduleMedicationRequest,
            crate::services::ward::HandoverRequest,
            crate::services::ward::UpdateHandoverRequest,
            crate::services::ward::CreateAdmissionRequest,
            crate::services::ward::PlanDischargeRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and version"),
        (name = "authentication", description = "Public patient signup"),
        (name = "users", description = "Account administration"),
        (name = "doctors", description = "Doctor directory and dashboard"),
        (name = "settings", description = "Per-user preferences"),
        (name = "patients", description = "Patient profiles and ward status"),
        (name = "appointments", description = "Booking and appointment lifecycle"),
        (name = "medical-records", description = "Clinical notes"),
        (name = "prescriptions", description = "Prescriptions and dispensing"),
        (name = "lab-results", description = "Laboratory results"),
        (name = "billing", description = "Invoices, payments and PDF downloads"),
        (name = "ward", description = "Nursing ward operations"),
    ),
    info(
        title = "AfyaCare Clinic API",
        version = "0.1.0",
        description = "Role-scoped clinic management: patients, appointments, clinical records, billing and ward care.",
    ),
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by secured paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/docs`
pub fn create_docs_routes() -> Router<ClinicServer> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
