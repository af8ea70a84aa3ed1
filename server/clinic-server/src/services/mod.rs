//! Business operations behind the HTTP handlers.
//!
//! Every mutation runs in the same order: ask the policy, stamp the
//! server-owned fields from the caller's identity, then persist. Handlers
//! only extract request parts and delegate here.

pub mod appointments;
pub mod invoices;
pub mod lab_results;
pub mod medical_records;
pub mod patients;
pub mod prescriptions;
pub mod scope;
pub mod users;
pub mod ward;

use database_layer::models::{Appointment, Patient, Role, UnknownVariant, User};
use database_layer::Repositories;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Patient referenced by a request body. A dangling id is a validation error.
pub(crate) async fn require_patient(repos: &Repositories, patient_id: Uuid) -> ApiResult<Patient> {
    repos
        .patients
        .get(patient_id)
        .await?
        .ok_or_else(|| ApiError::field("patient_id", "Invalid patient ID."))
}

/// An active user with the Doctor role.
pub(crate) async fn require_doctor(repos: &Repositories, doctor_id: Uuid) -> ApiResult<User> {
    repos
        .users
        .get(doctor_id)
        .await?
        .filter(|u| u.role == Role::Doctor && u.is_active)
        .ok_or_else(|| ApiError::field("doctor_id", "Invalid doctor ID."))
}

/// Appointment referenced by a record, which must describe the same patient.
pub(crate) async fn require_appointment_of(
    repos: &Repositories,
    appointment_id: Uuid,
    patient_id: Uuid,
) -> ApiResult<Appointment> {
    repos
        .appointments
        .get(appointment_id)
        .await?
        .filter(|a| a.patient_id == patient_id)
        .ok_or_else(|| {
            ApiError::field("appointment_id", "Appointment does not belong to this patient.")
        })
}

/// Parse a text enum from a request field.
pub(crate) fn parse_field<E>(field: &str, value: &str) -> ApiResult<E>
where
    E: FromStr<Err = UnknownVariant>,
{
    value.parse().map_err(|e: UnknownVariant| ApiError::field(field, e.to_string()))
}

/// Optional text filter from a query string; blank means absent.
pub(crate) fn parse_filter<E>(field: &str, value: Option<&str>) -> ApiResult<Option<E>>
where
    E: FromStr<Err = UnknownVariant>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_field(field, v).map(Some),
        None => Ok(None),
    }
}

/// Replace `target` when the request carries a value.
pub(crate) fn assign<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
