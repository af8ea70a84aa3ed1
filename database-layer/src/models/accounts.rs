use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::{Gender, Layout, PatientStatus, Role, Specialization, Theme};

/// An authenticated actor. Exactly one role; doctors carry a specialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub specialization: Option<Specialization>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            specialization: None,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    /// "First Last", falling back to the username when both are blank.
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Per-user preferences. Keyed by the owning user's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSettings {
    pub user_id: Uuid,
    /// Minutes.
    pub default_appointment_duration: i32,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub auto_generate_patient_id: bool,
    pub theme: Theme,
    pub layout: Layout,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            default_appointment_duration: 30,
            email_notifications: true,
            sms_notifications: false,
            auto_generate_patient_id: true,
            theme: Theme::Light,
            layout: Layout::Compact,
            updated_at: Utc::now(),
        }
    }
}

/// Patient profile, one-to-one with a `Patient`-role user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: String,
    pub address: String,
    pub next_of_kin_name: String,
    pub next_of_kin_phone: String,
    pub notes_for_doctor: Option<String>,
    pub assigned_doctor_id: Option<Uuid>,
    pub status: PatientStatus,
    // Ward fields, written by admit/attend/discharge.
    pub ward_room: Option<String>,
    pub admission_type: Option<String>,
    pub signs_symptoms: Option<String>,
    pub temperature: Option<String>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<String>,
    pub respiratory_rate: Option<String>,
    pub ward_notes: Option<String>,
    pub discharge_destination: Option<String>,
    pub discharge_summary: Option<String>,
    pub medications_on_discharge: Option<String>,
    pub follow_up_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date_of_birth: None,
            gender: None,
            phone: String::new(),
            address: String::new(),
            next_of_kin_name: String::new(),
            next_of_kin_phone: String::new(),
            notes_for_doctor: None,
            assigned_doctor_id: None,
            status: PatientStatus::Pending,
            ward_room: None,
            admission_type: None,
            signs_symptoms: None,
            temperature: None,
            blood_pressure: None,
            heart_rate: None,
            respiratory_rate: None,
            ward_notes: None,
            discharge_destination: None,
            discharge_summary: None,
            medications_on_discharge: None,
            follow_up_instructions: None,
            created_at: Utc::now(),
        }
    }
}
