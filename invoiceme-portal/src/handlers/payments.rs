use crate::models::PortalContext;
use axum::{extract::Path, Json};
use invoiceme_client::models::Payment;
use invoiceme_core::error::AppError;
use uuid::Uuid;

pub async fn list_payments(portal: PortalContext) -> Result<Json<Vec<Payment>>, AppError> {
    Ok(Json(portal.backend.payments.list().await?))
}

pub async fn get_payment(
    portal: PortalContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, AppError> {
    Ok(Json(portal.backend.payments.get(id).await?))
}
