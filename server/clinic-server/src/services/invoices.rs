//! Billing: desk-issued invoices, the unpaid queue and PDF downloads.

use auth_policy::{Identity, InvoiceAction, PolicyError, ResourceKind, RowFacts};
use chrono::Utc;
use database_layer::models::{Invoice, InvoiceStatus};
use database_layer::{Page, RecordFilter};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::scope::{self, list_visible};
use super::{assign, require_appointment_of, require_doctor, require_patient};
use crate::error::{ApiError, ApiResult};
use crate::render::invoice_pdf::{self, InvoiceDocument};
use crate::server::ClinicServer;
use crate::types::pagination::Paginated;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateInvoiceRequest {
    pub patient_id: Uuid,
    /// When present the doctor is taken from the appointment.
    pub appointment_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    #[schema(value_type = String, example = "1500.00")]
    pub amount: Decimal,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateInvoiceRequest {
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// A rendered invoice ready to be served as an attachment.
#[derive(Debug)]
pub struct InvoiceDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

fn checked_amount(amount: Decimal) -> ApiResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(ApiError::field("amount", "Amount must be greater than zero."));
    }
    Ok(amount.round_dp(2))
}

pub async fn list_invoices(
    server: &ClinicServer,
    identity: &Identity,
    page: Page,
) -> ApiResult<Paginated<Invoice>> {
    list_visible::<Invoice>(server, identity, RecordFilter::all(), page).await
}

/// The desk's queue of invoices still awaiting payment.
pub async fn list_unpaid(
    server: &ClinicServer,
    identity: &Identity,
    page: Page,
) -> ApiResult<Paginated<Invoice>> {
    if !identity.is_staff_desk() {
        return Err(PolicyError::Forbidden("Not authorized to view unpaid invoices.".to_string()).into());
    }
    let narrowing = RecordFilter::all().and_status(Some(InvoiceStatus::Unpaid.as_str()));
    list_visible::<Invoice>(server, identity, narrowing, page).await
}

pub async fn get_invoice(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<Invoice> {
    let (invoice, _) = scope::load_visible::<Invoice>(server, identity, id).await?;
    Ok(invoice)
}

pub async fn create_invoice(
    server: &ClinicServer,
    identity: &Identity,
    req: CreateInvoiceRequest,
) -> ApiResult<Invoice> {
    server
        .policy
        .authorize_create(identity, ResourceKind::Invoice, &RowFacts::default())
        .into_result(ResourceKind::Invoice)?;
    req.validate()?;
    let amount = checked_amount(req.amount)?;

    let patient = require_patient(&server.repos, req.patient_id).await?;
    let doctor_id = match (req.appointment_id, req.doctor_id) {
        (Some(appointment_id), _) => {
            Some(require_appointment_of(&server.repos, appointment_id, patient.id).await?.doctor_id)
        }
        (None, Some(doctor_id)) => Some(require_doctor(&server.repos, doctor_id).await?.id),
        (None, None) => None,
    };

    let now = Utc::now();
    let invoice = Invoice {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        doctor_id,
        appointment_id: req.appointment_id,
        issued_by: Some(identity.user_id),
        amount,
        description: req.description,
        status: InvoiceStatus::Unpaid,
        created_at: now,
        updated_at: now,
    };
    let invoice = server.repos.invoices.insert(invoice).await?;

    info!(invoice_id = %invoice.id, patient_id = %patient.id, amount = %invoice.amount, by = %identity.user_id, "Invoice issued");
    Ok(invoice)
}

/// Amount and description stay editable until the invoice is settled.
pub async fn update_invoice(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    req: UpdateInvoiceRequest,
) -> ApiResult<Invoice> {
    let (mut invoice, _) = scope::load_authorized::<Invoice>(server, identity, id, |facts| {
        server.policy.authorize_update(identity, ResourceKind::Invoice, facts)
    })
    .await?;
    req.validate()?;

    if !invoice.can_be_paid() {
        return Err(ApiError::conflict(format!(
            "Cannot edit an invoice in {} state",
            invoice.status.label()
        )));
    }

    if let Some(amount) = req.amount {
        invoice.amount = checked_amount(amount)?;
    }
    assign(&mut invoice.description, req.description);
    invoice.updated_at = Utc::now();

    let invoice = server.repos.invoices.update(invoice).await?;
    info!(invoice_id = %id, by = %identity.user_id, "Invoice updated");
    Ok(invoice)
}

pub async fn transition(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
    action: InvoiceAction,
) -> ApiResult<Invoice> {
    let (mut invoice, facts) = scope::load_scoped::<Invoice>(server, identity, id).await?;

    invoice.status = server
        .policy
        .authorize_invoice_transition(identity, &invoice, &facts, action)?;
    invoice.updated_at = Utc::now();

    let invoice = server.repos.invoices.update(invoice).await?;
    info!(invoice_id = %id, action = action.verb(), status = %invoice.status, by = %identity.user_id, "Invoice status changed");
    Ok(invoice)
}

pub async fn delete_invoice(server: &ClinicServer, identity: &Identity, id: Uuid) -> ApiResult<()> {
    scope::load_authorized::<Invoice>(server, identity, id, |facts| {
        server.policy.authorize_delete(identity, ResourceKind::Invoice, facts)
    })
    .await?;

    server.repos.invoices.delete(id).await?;
    info!(invoice_id = %id, by = %identity.user_id, "Invoice deleted");
    Ok(())
}

/// Render a visible invoice as a PDF.
pub async fn download_invoice(
    server: &ClinicServer,
    identity: &Identity,
    id: Uuid,
) -> ApiResult<InvoiceDownload> {
    let (invoice, facts) = scope::load_visible::<Invoice>(server, identity, id).await?;
    let repos = &server.repos;

    let patient_name = match facts.patient_user_id {
        Some(user_id) => repos.users.get(user_id).await?.map(|u| u.full_name()),
        None => None,
    }
    .unwrap_or_default();

    let doctor = match invoice.doctor_id {
        Some(doctor_id) => repos.users.get(doctor_id).await?,
        None => None,
    };
    let appointment_date = match invoice.appointment_id {
        Some(appointment_id) => repos.appointments.get(appointment_id).await?.map(|a| a.date),
        None => None,
    };

    let document = InvoiceDocument {
        clinic_name: server.clinic_name(),
        invoice: &invoice,
        patient_name: &patient_name,
        doctor: doctor.as_ref(),
        appointment_date,
    };
    let bytes = invoice_pdf::render(&document)?;

    info!(invoice_id = %id, size = bytes.len(), by = %identity.user_id, "Invoice rendered");
    Ok(InvoiceDownload {
        filename: format!("invoice_{}.pdf", invoice.id),
        bytes,
    })
}
