use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::InvoiceStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Invoice {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub issued_by: Option<Uuid>,
    /// NUMERIC(10,2), always positive.
    #[schema(value_type = String, example = "1500.00")]
    pub amount: Decimal,
    pub description: String,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub const fn can_be_paid(&self) -> bool {
        matches!(self.status, InvoiceStatus::Unpaid)
    }
}
