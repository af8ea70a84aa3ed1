use auth_policy::InvoiceAction;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use database_layer::models::Invoice;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::ClinicServer;
use crate::services::invoices::{self, CreateInvoiceRequest, UpdateInvoiceRequest};
use crate::types::pagination::PaginationParams;

#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    params(PaginationParams),
    responses(
        (status = 200, description = "Invoices visible to the caller", body = [Invoice])
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn list_invoices(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Invoice>>>, ApiError> {
    let page = invoices::list_invoices(&server, &auth.identity, params.page()).await?;
    Ok(Json(page.into_response()))
}

/// Invoices still awaiting payment
#[utoipa::path(
    get,
    path = "/api/v1/invoices/unpaid",
    params(PaginationParams),
    responses(
        (status = 200, description = "Unpaid invoices", body = [Invoice]),
        (status = 403, description = "Receptionist or Admin only")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn list_unpaid(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Invoice>>>, ApiError> {
    let page = invoices::list_unpaid(&server, &auth.identity, params.page()).await?;
    Ok(Json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = Invoice),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn get_invoice(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let invoice = invoices::get_invoice(&server, &auth.identity, id).await?;
    Ok(Json(api_success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice issued", body = Invoice),
        (status = 400, description = "Amount must be greater than zero, or invalid references"),
        (status = 403, description = "Receptionist or Admin only")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn create_invoice(
    State(server): State<ClinicServer>,
    auth: AuthContext,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Invoice>>), ApiError> {
    let invoice = invoices::create_invoice(&server, &auth.identity, req).await?;
    Ok((StatusCode::CREATED, Json(api_success(invoice))))
}

#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = Invoice),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice is no longer unpaid")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn update_invoice(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let invoice = invoices::update_invoice(&server, &auth.identity, id, req).await?;
    Ok(Json(api_success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/mark-paid",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice paid", body = Invoice),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice already paid or cancelled")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn mark_paid(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let invoice = invoices::transition(&server, &auth.identity, id, InvoiceAction::MarkPaid).await?;
    Ok(Json(api_success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/cancel",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice cancelled", body = Invoice),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice is no longer unpaid")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn cancel(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let invoice = invoices::transition(&server, &auth.identity, id, InvoiceAction::Cancel).await?;
    Ok(Json(api_success(invoice)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn delete_invoice(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    invoices::delete_invoice(&server, &auth.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Invoice as a PDF attachment
#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}/download",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Rendered invoice", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Invoice not found")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn download(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Response, ApiError> {
    let download = invoices::download_invoice(&server, &auth.identity, id).await?;
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", download.filename))
        .map_err(|e| ApiError::internal(format!("Invalid Content-Disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}
