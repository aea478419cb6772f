use crate::models::PortalContext;
use axum::Json;
use invoiceme_client::metrics::DashboardSummary;
use invoiceme_core::error::AppError;

/// Everything the dashboard shows, from four concurrent fetches. One failed
/// fetch fails the page.
pub async fn dashboard_handler(portal: PortalContext) -> Result<Json<DashboardSummary>, AppError> {
    let backend = &portal.backend;
    let (invoices, payments, customers, overdue) = tokio::try_join!(
        backend.invoices.list(),
        backend.payments.list(),
        backend.customers.list(),
        backend.reminders.overdue(),
    )?;

    Ok(Json(DashboardSummary::compute(
        &invoices,
        &payments,
        customers.len(),
        overdue,
        portal.today(),
    )))
}
