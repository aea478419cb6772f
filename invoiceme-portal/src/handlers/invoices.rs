use crate::models::{InvoiceDetailResponse, PortalContext};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use invoiceme_client::models::{
    CreateInvoiceRequest, Invoice, InvoiceFilters, InvoiceStatus, UpdateInvoiceRequest,
};
use invoiceme_client::resources::filter_invoices;
use invoiceme_client::validation::check;
use invoiceme_client::workflow::{InvoiceAction, PermittedActions};
use invoiceme_core::error::AppError;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListParams {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Invoice number or customer name, matched locally.
    #[serde(default)]
    pub q: String,
}

impl InvoiceListParams {
    fn filters(&self) -> InvoiceFilters {
        InvoiceFilters {
            status: self.status,
            customer_id: self.customer_id,
            from_date: self.from_date,
            to_date: self.to_date,
        }
    }
}

pub async fn list_invoices(
    portal: PortalContext,
    Query(params): Query<InvoiceListParams>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = portal
        .backend
        .invoices
        .list_filtered(&params.filters())
        .await?;

    Ok(Json(
        filter_invoices(&invoices, params.status, &params.q)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

pub async fn invoice_detail(
    portal: PortalContext,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceDetailResponse>, AppError> {
    let view = portal.detail(id).await?;
    Ok(Json(portal.respond(&view, None).await?))
}

pub async fn create_invoice(
    portal: PortalContext,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    check(&request)?;
    let invoice = portal.backend.invoices.create(&request).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Only drafts can be edited; the check runs against a fresh snapshot.
pub async fn update_invoice(
    portal: PortalContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceRequest>,
) -> Result<Json<Invoice>, AppError> {
    check(&request)?;
    let current = portal.backend.invoices.get(id).await?;
    PermittedActions::require(&current, InvoiceAction::Edit)?;

    Ok(Json(portal.backend.invoices.update(id, &request).await?))
}
