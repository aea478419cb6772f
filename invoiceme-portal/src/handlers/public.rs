//! Pay-by-link page. No sign-in; the link is the only credential.

use crate::models::PortalContext;
use axum::{extract::Path, http::StatusCode, Json};
use invoiceme_client::models::{Invoice, Payment};
use invoiceme_client::workflow::{InvoiceAction, PaymentForm, PermittedActions, RecordPaymentFlow};
use invoiceme_core::error::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicInvoice {
    pub invoice: Invoice,
    pub can_pay: bool,
    /// Pre-filled with the remaining balance while payment is possible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<PaymentForm>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPaymentReceipt {
    pub payment: Payment,
    pub invoice: Invoice,
}

pub async fn payment_page(
    portal: PortalContext,
    Path(link): Path<String>,
) -> Result<Json<PublicInvoice>, AppError> {
    let invoice = portal.backend.invoices.get_by_payment_link(&link).await?;
    let can_pay = PermittedActions::for_invoice(&invoice).allows(InvoiceAction::RecordPayment);
    let form = can_pay.then(|| PaymentForm::for_invoice(&invoice, portal.today()));

    Ok(Json(PublicInvoice {
        invoice,
        can_pay,
        form,
    }))
}

/// Check the form against the invoice behind the link, submit it, and return
/// the refreshed invoice with the recorded payment.
pub async fn submit_payment(
    portal: PortalContext,
    Path(link): Path<String>,
    Json(form): Json<PaymentForm>,
) -> Result<(StatusCode, Json<PublicPaymentReceipt>), AppError> {
    let invoices = &portal.backend.invoices;
    let invoice = invoices.get_by_payment_link(&link).await?;

    let mut flow = RecordPaymentFlow::default();
    flow.open(&invoice, portal.today())?;
    flow.update(form)?;
    let request = flow.submit(&invoice)?;

    let payment = portal.backend.payments.submit_public(&request).await?;

    tracing::info!(
        invoice_id = %invoice.id,
        payment_id = %payment.id,
        "Payment received through payment link"
    );

    let invoice = invoices.get_by_payment_link(&link).await?;
    Ok((StatusCode::CREATED, Json(PublicPaymentReceipt { payment, invoice })))
}
