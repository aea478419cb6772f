//! Step endpoints for the invoice lifecycle actions.
//!
//! Every step loads a fresh snapshot, resumes this browser's flows for the
//! invoice, applies one transition and stores the flows again. A completed
//! action refetches the snapshot before responding. Steps that mutate the
//! backend hold this browser's in-flight claim on the invoice throughout.

use crate::models::{InvoiceDetailResponse, PortalContext};
use axum::{
    extract::Path,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use invoiceme_client::models::ReminderType;
use invoiceme_client::workflow::{
    CancellationReason, DetailError, InvoiceAction, PaymentForm,
};
use invoiceme_core::error::{AppError, REDIRECT_HEADER};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

type DetailResult = Result<Json<InvoiceDetailResponse>, AppError>;

async fn close(portal: PortalContext, id: Uuid, action: InvoiceAction) -> DetailResult {
    let mut view = portal.detail(id).await?;
    view.close(action);
    Ok(Json(portal.respond(&view, None).await?))
}

// Send

pub async fn open_send(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let mut view = portal.detail(id).await?;
    view.open_send()?;
    Ok(Json(portal.respond(&view, None).await?))
}

pub async fn confirm_send(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let _in_flight = portal.begin_action(id)?;
    let mut view = portal.detail(id).await?;
    let result = view.confirm_send().await;
    Ok(Json(portal.settle(&view, result).await?))
}

#[derive(Debug, Serialize)]
pub struct RedirectBody {
    pub redirect: String,
}

/// Leave the send preview for the edit form.
pub async fn edit_from_send(
    portal: PortalContext,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let mut view = portal.detail(id).await?;
    let target = view.edit_from_send_preview()?.path();
    portal.save_flows(id, view.flows()).await?;

    let header = HeaderValue::from_str(&target)
        .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;
    let mut response = Json(RedirectBody { redirect: target }).into_response();
    response.headers_mut().insert(REDIRECT_HEADER, header);
    Ok(response)
}

pub async fn close_send(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    close(portal, id, InvoiceAction::Send).await
}

// Cancel

#[derive(Debug, Deserialize)]
pub struct CancelReasonBody {
    pub reason: CancellationReason,
    /// Free text, required when the reason is `other`.
    #[serde(default)]
    pub detail: String,
}

pub async fn open_cancel(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let mut view = portal.detail(id).await?;
    view.open_cancel()?;
    Ok(Json(portal.respond(&view, None).await?))
}

/// Submit the reason. Drafts are cancelled here; sent invoices move on to
/// the customer email preview.
pub async fn submit_cancel_reason(
    portal: PortalContext,
    Path(id): Path<Uuid>,
    Json(body): Json<CancelReasonBody>,
) -> DetailResult {
    let _in_flight = portal.begin_action(id)?;
    let mut view = portal.detail(id).await?;
    view.choose_cancel_reason(body.reason, body.detail)?;
    let result = view.submit_cancel_reason().await;
    Ok(Json(portal.settle(&view, result).await?))
}

pub async fn back_to_cancel_reason(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let mut view = portal.detail(id).await?;
    view.back_to_cancel_reason()?;
    Ok(Json(portal.respond(&view, None).await?))
}

pub async fn confirm_cancel(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let _in_flight = portal.begin_action(id)?;
    let mut view = portal.detail(id).await?;
    let result = view.confirm_cancel().await;
    Ok(Json(portal.settle(&view, result).await?))
}

pub async fn close_cancel(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    close(portal, id, InvoiceAction::Cancel).await
}

// Reminder

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderTypeBody {
    #[serde(default)]
    pub reminder_type: Option<ReminderType>,
}

/// Open the reminder preview. Without a type, the detail view starts from
/// `ON_DUE_DATE`.
pub async fn open_reminder(
    portal: PortalContext,
    Path(id): Path<Uuid>,
    body: Option<Json<ReminderTypeBody>>,
) -> DetailResult {
    let chosen = body.and_then(|Json(body)| body.reminder_type);
    let mut view = portal.detail(id).await?;
    let result = view
        .open_reminder(Some(chosen.unwrap_or(ReminderType::OnDueDate)), portal.today())
        .await;
    Ok(Json(portal.settle(&view, result).await?))
}

pub async fn select_reminder_type(
    portal: PortalContext,
    Path(id): Path<Uuid>,
    Json(body): Json<ReminderTypeBody>,
) -> DetailResult {
    let reminder_type = body
        .reminder_type
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("reminderType is required")))?;

    let mut view = portal.detail(id).await?;
    let result = view.select_reminder_type(reminder_type).await;
    Ok(Json(portal.settle(&view, result).await?))
}

pub async fn confirm_reminder(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let _in_flight = portal.begin_action(id)?;
    let mut view = portal.detail(id).await?;
    let result = view.confirm_reminder().await;
    Ok(Json(portal.settle(&view, result).await?))
}

pub async fn close_reminder(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    close(portal, id, InvoiceAction::SendReminder).await
}

// Mark as paid

pub async fn open_mark_paid(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let mut view = portal.detail(id).await?;
    view.open_mark_paid()?;
    Ok(Json(portal.respond(&view, None).await?))
}

pub async fn confirm_mark_paid(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let _in_flight = portal.begin_action(id)?;
    let mut view = portal.detail(id).await?;
    let result = view.confirm_mark_paid().await;
    Ok(Json(portal.settle(&view, result).await?))
}

pub async fn close_mark_paid(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    close(portal, id, InvoiceAction::MarkPaid).await
}

// Record payment

pub async fn open_payment(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    let mut view = portal.detail(id).await?;
    view.open_record_payment(portal.today())?;
    Ok(Json(portal.respond(&view, None).await?))
}

/// Submit the open form as filled in. Amount problems keep the form open
/// with the error attached; nothing reaches the backend.
pub async fn submit_payment(
    portal: PortalContext,
    Path(id): Path<Uuid>,
    Json(form): Json<PaymentForm>,
) -> DetailResult {
    let _in_flight = portal.begin_action(id)?;
    let mut view = portal.detail(id).await?;
    view.update_payment_form(form)?;
    match view.submit_payment().await {
        Err(DetailError::Workflow(e)) => {
            portal.save_flows(id, view.flows()).await?;
            Err(e.into())
        }
        result => Ok(Json(portal.settle(&view, result).await?)),
    }
}

pub async fn close_payment(portal: PortalContext, Path(id): Path<Uuid>) -> DetailResult {
    close(portal, id, InvoiceAction::RecordPayment).await
}
