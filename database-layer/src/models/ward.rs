//! Nursing ward records. Flag plus timestamp lifecycles only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::AlertSeverity;

/// A to-do item owned by the nurse who wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NurseTask {
    pub id: Uuid,
    pub nurse_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WardAlert {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub message: String,
    pub severity: AlertSeverity,
    pub raised_by: Option<Uuid>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<Uuid>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Occupancy of one bed. (ward, bed_number) is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BedStatus {
    pub id: Uuid,
    pub ward: String,
    pub bed_number: String,
    pub patient_id: Option<Uuid>,
    pub occupied: bool,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BedStatus {
    pub fn bed_key(&self) -> String {
        format!("{}/{}", self.ward.trim().to_lowercase(), self.bed_number.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MedicationSchedule {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub prescription_id: Option<Uuid>,
    pub name: String,
    pub dosage: String,
    pub scheduled_for: DateTime<Utc>,
    pub administered: bool,
    pub administered_by: Option<Uuid>,
    pub administered_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HandoverLog {
    pub id: Uuid,
    pub nurse_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PendingAdmission {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub requested_by: Option<Uuid>,
    pub ward: Option<String>,
    pub reason: String,
    pub admitted: bool,
    pub admitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlannedDischarge {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub planned_by: Option<Uuid>,
    pub planned_for: NaiveDate,
    pub notes: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
