use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Escalating reminder categories tied to due-date proximity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    BeforeDue,
    OnDueDate,
    #[serde(rename = "OVERDUE_7_DAYS")]
    Overdue7Days,
    #[serde(rename = "OVERDUE_14_DAYS")]
    Overdue14Days,
    #[serde(rename = "OVERDUE_30_DAYS")]
    Overdue30Days,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::BeforeDue => "BEFORE_DUE",
            ReminderType::OnDueDate => "ON_DUE_DATE",
            ReminderType::Overdue7Days => "OVERDUE_7_DAYS",
            ReminderType::Overdue14Days => "OVERDUE_14_DAYS",
            ReminderType::Overdue30Days => "OVERDUE_30_DAYS",
        }
    }

    /// Reminder type for an invoice that is `days_overdue` days late.
    ///
    /// Bands are checked from the highest threshold down; the first hit wins.
    pub fn for_days_overdue(days_overdue: i64) -> Self {
        if days_overdue >= 30 {
            ReminderType::Overdue30Days
        } else if days_overdue >= 14 {
            ReminderType::Overdue14Days
        } else if days_overdue >= 7 {
            ReminderType::Overdue7Days
        } else {
            ReminderType::OnDueDate
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReminderType::BeforeDue => "Before Due Date",
            ReminderType::OnDueDate => "On Due Date",
            ReminderType::Overdue7Days => "7 Days Overdue",
            ReminderType::Overdue14Days => "14 Days Overdue",
            ReminderType::Overdue30Days => "30 Days Overdue",
        };
        f.write_str(label)
    }
}

/// A reminder that was sent; append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderHistory {
    pub id: Uuid,
    pub invoice_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub reminder_type: ReminderType,
    #[serde(default, alias = "sentAt", skip_serializing_if = "Option::is_none")]
    pub sent_date: Option<NaiveDateTime>,
    pub recipient_email: String,
    pub subject: String,
    #[serde(default, alias = "emailBody")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPreview {
    pub subject: String,
    #[serde(alias = "emailBody")]
    pub message: String,
    pub recipient_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendReminderRequest {
    #[validate(custom(function = "crate::validation::required_id"))]
    pub invoice_id: Uuid,
    pub reminder_type: ReminderType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueInvoiceSummary {
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub customer_name: String,
    pub due_date: NaiveDate,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance_remaining: Decimal,
    pub days_overdue: i64,
}

impl OverdueInvoiceSummary {
    pub fn suggested_reminder(&self) -> ReminderType {
        ReminderType::for_days_overdue(self.days_overdue)
    }
}
