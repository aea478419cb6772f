use crate::models::PortalContext;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use invoiceme_client::models::{CreateCustomerRequest, Customer, Invoice, UpdateCustomerRequest};
use invoiceme_client::resources::filter_customers;
use invoiceme_client::validation::check;
use invoiceme_core::error::AppError;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Customer list, narrowed in place by `q` (business name, contact, email).
pub async fn list_customers(
    portal: PortalContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let customers = portal.backend.customers.list().await?;
    Ok(Json(
        filter_customers(&customers, &params.q)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

/// Server-side search.
pub async fn search_customers(
    portal: PortalContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(portal.backend.customers.search(&params.q).await?))
}

pub async fn get_customer(
    portal: PortalContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(portal.backend.customers.get(id).await?))
}

pub async fn customer_invoices(
    portal: PortalContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    Ok(Json(portal.backend.invoices.list_by_customer(id).await?))
}

pub async fn create_customer(
    portal: PortalContext,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    check(&request)?;
    let customer = portal.backend.customers.create(&request).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    portal: PortalContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    check(&request)?;
    Ok(Json(portal.backend.customers.update(id, &request).await?))
}

pub async fn delete_customer(
    portal: PortalContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    portal.backend.customers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
