//! Accounts: the caller's own profile, admin user management, public signup,
//! the doctor directory and per-user settings.

use auth_policy::{Identity, PolicyError, ResourceKind, RowFacts, Visibility};
use chrono::{NaiveDate, Utc};
use database_layer::models::{
    Appointment, Gender, Layout, Patient, Role, Specialization, Theme, User, UserSettings,
};
use database_layer::{Column, Page, RecordFilter, Repositories};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, fetch_page, list_visible};
use super::{assign, parse_field, parse_filter};
use crate::error::{ApiError, ApiResult};
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// One of ADMIN, DOCTOR, NURSE, RECEPTIONIST, PATIENT, LAB, PHARMACIST.
    pub role: String,
    /// Required for doctors, rejected for everyone else.
    pub specialization: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters."))]
    pub username: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    /// An empty string clears the specialization.
    pub specialization: Option<String>,
    pub is_active: Option<bool>,
}

/// Public registration. Always produces a patient account and profile.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// M or F
    pub gender: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub user: User,
    pub patient: Patient,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorDashboard {
    pub total_patients: u64,
    pub total_appointments: u64,
    pub total_records: u64,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct SettingsPatch {
    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes."))]
    pub default_appointment_duration: Option<i32>,
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub auto_generate_patient_id: Option<bool>,
    pub theme: Option<Theme>,
    pub layout: Option<Layout>,
}

/// Full replacement of a user's settings.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SettingsRequest {
    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes."))]
    pub default_appointment_duration: i32,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub auto_generate_patient_id: bool,
    pub theme: Theme,
    pub layout: Layout,
}

// =============================================================================
// Own account
// =============================================================================

pub fn me(user: &User) -> User {
    user.clone()
}

pub async fn signup(repos: &Repositories, req: SignupRequest) -> ApiResult<SignupResponse> {
    req.validate()?;
    let gender = parse_filter::<Gender>("gender", req.gender.as_deref())?;

    let mut user = User::new(req.username.trim(), Role::Patient);
    user.email = req.email.unwrap_or_default();
    user.first_name = req.first_name.unwrap_or_default();
    user.last_name = req.last_name.unwrap_or_default();
    let user = repos.users.insert(user).await?;

    let mut profile = Patient::new(user.id);
    profile.date_of_birth = req.date_of_birth;
    profile.gender = gender;
    profile.phone = req.phone.unwrap_or_default();
    profile.address = req.address.unwrap_or_default();
    let patient = repos.patients.insert(profile).await?;

    info!(user_id = %user.id, patient_id = %patient.id, "Patient signed up");
    Ok(SignupResponse { user, patient })
}

// =============================================================================
// Admin user management
// =============================================================================

pub async fn list_users(
    server: &ClinicServer,
    identity: &Identity,
    role: Option<&str>,
    page: Page,
) -> ApiResult<Paginated<User>> {
    let role = parse_filter::<Role>("role", role)?;
    let narrowing = RecordFilter::all().and_status(role.map(Role::as_str));
    list_visible::<User>(server, identity, narrowing, page).await
}

pub async fn get_user(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<User> {
    let (user, _) = scope::load_visible::<User>(server, identity, id).await?;
    Ok(user)
}

pub async fn create_user(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateUserRequest,
) -> ApiResult<User> {
    server
        .policy
        .authorize_create(identity, ResourceKind::User, &RowFacts::default())
        .into_result(ResourceKind::User)?;
    req.validate()?;

    let role: Role = parse_field("role", &req.role)?;
    let specialization = parse_specialization(req.specialization.as_deref())?;
    Identity::validate_specialization(role, specialization)?;

    let mut user = User::new(req.username.trim(), role);
    user.email = req.email.unwrap_or_default();
    user.first_name = req.first_name.unwrap_or_default();
    user.last_name = req.last_name.unwrap_or_default();
    user.specialization = specialization;
    assign(&mut user.is_active, req.is_active);

    let user = server.repos.users.insert(user).await?;
    if role == Role::Patient {
        server.repos.patients.insert(Patient::new(user.id)).await?;
    }

    info!(user_id = %user.id, role = %user.role, by = %identity.user_id, "User created");
    Ok(user)
}

pub async fn update_user(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdateUserRequest,
) -> ApiResult<User> {
    let (mut user, _) = scope::load_authorized::<User>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, ResourceKind::User, facts)
    })
    .await?;
    req.validate()?;

    let role = match req.role.as_deref() {
        Some(text) => parse_field::<Role>("role", text)?,
        None => user.role,
    };
    let specialization = match req.specialization.as_deref() {
        Some(text) => parse_specialization(Some(text))?,
        None if role == Role::Doctor => user.specialization,
        None => None,
    };
    Identity::validate_specialization(role, specialization)?;

    if let Some(username) = req.username {
        user.username = username.trim().to_string();
    }
    assign(&mut user.email, req.email);
    assign(&mut user.first_name, req.first_name);
    assign(&mut user.last_name, req.last_name);
    assign(&mut user.is_active, req.is_active);
    user.role = role;
    user.specialization = specialization;

    let user = server.repos.users.update(user).await?;
    if role == Role::Patient && server.repos.patient_for_user(user.id).await?.is_none() {
        server.repos.patients.insert(Patient::new(user.id)).await?;
    }

    info!(user_id = %user.id, role = %user.role, by = %identity.user_id, "User updated");
    Ok(user)
}

pub async fn delete_user(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    scope::load_authorized::<User>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, ResourceKind::User, facts)
    })
    .await?;
    if id == identity.user_id {
        return Err(ApiError::conflict("You cannot delete your own account."));
    }

    server.repos.delete_user_cascade(id).await?;
    info!(user_id = %id, by = %identity.user_id, "User deleted");
    Ok(())
}

fn parse_specialization(value: Option<&str>) -> ApiResult<Option<Specialization>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(text) => Specialization::parse_lenient(text)
            .map(Some)
            .map_err(|e| ApiError::field("specialization", e.to_string())),
        None => Ok(None),
    }
}

// =============================================================================
// Doctor directory
// =============================================================================

/// Doctors the caller may look up: the desk sees all of them, a doctor
/// sees only their own entry, everyone else sees none.
pub async fn list_doctors(
    server: &ClinicServer,
    identity: &Identity,
    page: Page,
) -> ApiResult<Paginated<User>> {
    let filter = match server.policy.visibility(identity, ResourceKind::Doctor)? {
        Visibility::Nothing => return Ok(Paginated::empty(page)),
        Visibility::OwnedBy => {
            let own = server
                .repos
                .users
                .get(identity.user_id)
                .await?
                .filter(|u| u.role == Role::Doctor);
            let total = u64::from(own.is_some());
            return Ok(Paginated {
                items: own.into_iter().collect(),
                total,
                page,
            });
        }
        _ => RecordFilter::all().and_status(Some(Role::Doctor.as_str())),
    };
    fetch_page(server.repos.users.as_ref(), filter, page).await
}

pub async fn get_doctor(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<User> {
    let doctor = server
        .repos
        .users
        .get(id)
        .await?
        .filter(|u| u.role == Role::Doctor)
        .ok_or_else(|| ApiError::not_found(ResourceKind::Doctor.label()))?;

    let facts = RowFacts {
        owner_id: Some(doctor.id),
        ..RowFacts::default()
    };
    server
        .policy
        .check_visible(identity, ResourceKind::Doctor, &facts)
        .into_result(ResourceKind::Doctor)?;
    Ok(doctor)
}

fn require_doctor_role(identity: &Identity) -> ApiResult<()> {
    if identity.is(Role::Doctor) {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("Only doctors have a dashboard.".to_string()).into())
    }
}

pub async fn doctor_dashboard(repos: &Repositories, identity: &Identity) -> ApiResult<DoctorDashboard> {
    require_doctor_role(identity)?;
    let me = identity.user_id;

    let patient_ids = repos.patient_ids_for_doctor(me).await?;
    let total_patients = patient_ids.len() as u64;
    let total_appointments = repos
        .appointments
        .count(&RecordFilter::eq(Column::DoctorId, me))
        .await?;
    let total_records = if patient_ids.is_empty() {
        0
    } else {
        repos
            .medical_records
            .count(&RecordFilter::all().and_in(Column::PatientId, patient_ids))
            .await?
    };

    Ok(DoctorDashboard {
        total_patients,
        total_appointments,
        total_records,
    })
}

pub async fn doctor_patients(
    repos: &Repositories,
    identity: &Identity,
    page: Page,
) -> ApiResult<Paginated<Patient>> {
    require_doctor_role(identity)?;
    let filter = RecordFilter::eq(Column::AssignedDoctorId, identity.user_id);
    fetch_page(repos.patients.as_ref(), filter, page).await
}

pub async fn doctor_appointments(
    repos: &Repositories,
    identity: &Identity,
    page: Page,
) -> ApiResult<Paginated<Appointment>> {
    require_doctor_role(identity)?;
    let filter = RecordFilter::eq(Column::DoctorId, identity.user_id);
    fetch_page(repos.appointments.as_ref(), filter, page).await
}

// =============================================================================
// Settings
// =============================================================================

/// The caller's settings, created with defaults on first read.
pub async fn get_settings(repos: &Repositories, identity: &Identity) -> ApiResult<UserSettings> {
    if let Some(settings) = repos.settings.get(identity.user_id).await? {
        return Ok(settings);
    }
    let defaults = UserSettings::defaults_for(identity.user_id);
    Ok(repos.settings.insert(defaults).await?)
}

pub async fn replace_settings(
    repos: &Repositories,
    identity: &Identity,
    req: SettingsRequest,
) -> ApiResult<UserSettings> {
    req.validate()?;
    let patch = SettingsPatch {
        default_appointment_duration: Some(req.default_appointment_duration),
        email_notifications: Some(req.email_notifications),
        sms_notifications: Some(req.sms_notifications),
        auto_generate_patient_id: Some(req.auto_generate_patient_id),
        theme: Some(req.theme),
        layout: Some(req.layout),
    };
    patch_settings(repos, identity, patch).await
}

pub async fn patch_settings(
    repos: &Repositories,
    identity: &Identity,
    patch: SettingsPatch,
) -> ApiResult<UserSettings> {
    patch.validate()?;
    let mut settings = get_settings(repos, identity).await?;

    assign(&mut settings.default_appointment_duration, patch.default_appointment_duration);
    assign(&mut settings.email_notifications, patch.email_notifications);
    assign(&mut settings.sms_notifications, patch.sms_notifications);
    assign(&mut settings.auto_generate_patient_id, patch.auto_generate_patient_id);
    assign(&mut settings.theme, patch.theme);
    assign(&mut settings.layout, patch.layout);
    settings.updated_at = Utc::now();

    Ok(repos.settings.update(settings).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;

    fn server() -> ClinicServer {
        ClinicServer::in_memory(ClinicConfig::default())
    }

    fn doctor_request(username: &str, specialization: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: None,
            first_name: Some("Achieng".to_string()),
            last_name: Some("Odhiambo".to_string()),
            role: "DOCTOR".to_string(),
            specialization: specialization.map(str::to_string),
            is_active: None,
        }
    }

    async fn admin(server: &ClinicServer) -> Identity {
        let user = server.repos.users.insert(User::new("admin", Role::Admin)).await.unwrap();
        Identity::from_user(&user)
    }

    #[tokio::test]
    async fn doctors_need_a_specialization() {
        let server = server();
        let admin = admin(&server).await;

        let missing = create_user(&server, &admin, doctor_request("dr-a", None)).await;
        assert!(matches!(missing, Err(ApiError::Validation { .. })));

        let created = create_user(&server, &admin, doctor_request("dr-b", Some("Cardiologist")))
            .await
            .unwrap();
        assert_eq!(created.specialization, Some(Specialization::Cardiologist));
    }

    #[tokio::test]
    async fn only_admins_manage_users() {
        let server = server();
        let nurse = server.repos.users.insert(User::new("nurse", Role::Nurse)).await.unwrap();
        let nurse = Identity::from_user(&nurse);

        let result = create_user(&server, &nurse, doctor_request("dr-c", Some("Other"))).await;
        assert!(matches!(result, Err(ApiError::Authorization { .. })));
    }

    #[tokio::test]
    async fn signup_always_creates_a_patient() {
        let repos = Repositories::in_memory();
        let response = signup(
            &repos,
            SignupRequest {
                username: "njeri".to_string(),
                email: Some("njeri@example.com".to_string()),
                first_name: None,
                last_name: None,
                date_of_birth: None,
                gender: Some("F".to_string()),
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(response.user.role, Role::Patient);
        assert_eq!(response.patient.user_id, response.user.id);
        assert_eq!(response.patient.gender, Some(Gender::Female));
    }

    #[tokio::test]
    async fn desk_sees_every_doctor_and_doctors_only_themselves() {
        let server = server();
        let admin = admin(&server).await;
        let first = create_user(&server, &admin, doctor_request("dr-1", Some("Pediatrician")))
            .await
            .unwrap();
        create_user(&server, &admin, doctor_request("dr-2", Some("Neurosurgeon")))
            .await
            .unwrap();

        let desk = server
            .repos
            .users
            .insert(User::new("desk", Role::Receptionist))
            .await
            .unwrap();
        let all = list_doctors(&server, &Identity::from_user(&desk), Page::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);

        let own = list_doctors(&server, &Identity::from_user(&first), Page::default())
            .await
            .unwrap();
        assert_eq!(own.items.len(), 1);
        assert_eq!(own.items.first().map(|u| u.id), Some(first.id));

        let patient = server.repos.users.insert(User::new("p", Role::Patient)).await.unwrap();
        let none = list_doctors(&server, &Identity::from_user(&patient), Page::default())
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn settings_default_on_first_read_and_patch_in_place() {
        let repos = Repositories::in_memory();
        let identity = Identity::new(Uuid::new_v4(), Role::Nurse);

        let initial = get_settings(&repos, &identity).await.unwrap();
        assert_eq!(initial.default_appointment_duration, 30);
        assert_eq!(initial.theme, Theme::Light);

        let patched = patch_settings(
            &repos,
            &identity,
            SettingsPatch {
                theme: Some(Theme::Dark),
                ..SettingsPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(patched.theme, Theme::Dark);
        assert_eq!(patched.default_appointment_duration, 30);
    }
}
