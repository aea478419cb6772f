//! Dashboard aggregates computed from fetched snapshots.

use crate::models::{Invoice, InvoiceStatus, OverdueInvoiceSummary, Payment};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days covered by the revenue trend, ending today.
pub const TREND_DAYS: i64 = 7;

/// Rows shown in the recent invoices and recent payments lists.
pub const RECENT_LIMIT: usize = 5;

/// Sum of `total_amount` over paid invoices.
pub fn total_revenue(invoices: &[Invoice]) -> Decimal {
    invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Paid)
        .map(|inv| inv.total_amount)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: InvoiceStatus,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub total: usize,
    pub statuses: Vec<StatusCount>,
}

impl StatusBreakdown {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let total = invoices.len();
        let statuses = InvoiceStatus::ALL
            .iter()
            .map(|&status| {
                let count = invoices.iter().filter(|inv| inv.status == status).count();
                StatusCount {
                    status,
                    count,
                    percentage: percentage_of(count, total),
                }
            })
            .collect();

        Self { total, statuses }
    }

    pub fn count(&self, status: InvoiceStatus) -> usize {
        self.statuses
            .iter()
            .find(|s| s.status == status)
            .map_or(0, |s| s.count)
    }

    pub fn percentage(&self, status: InvoiceStatus) -> f64 {
        self.statuses
            .iter()
            .find(|s| s.status == status)
            .map_or(0.0, |s| s.percentage)
    }
}

fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Most recent invoices by issue date.
pub fn recent_invoices(invoices: &[Invoice], limit: usize) -> Vec<Invoice> {
    let mut sorted = invoices.to_vec();
    sorted.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
    sorted.truncate(limit);
    sorted
}

/// Most recent payments by payment date.
pub fn recent_payments(payments: &[Payment], limit: usize) -> Vec<Payment> {
    let mut sorted = payments.to_vec();
    sorted.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
    sorted.truncate(limit);
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// Payments received per day over the last [`TREND_DAYS`] days, oldest
/// first, ending at `today`.
pub fn revenue_trend(payments: &[Payment], today: NaiveDate) -> Vec<TrendPoint> {
    (0..TREND_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let revenue = payments
                .iter()
                .filter(|p| p.payment_date == date)
                .map(|p| p.payment_amount)
                .sum();
            TrendPoint { date, revenue }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_days_overdue(days: i64) -> Self {
        if days >= 30 {
            Severity::Critical
        } else if days >= 14 {
            Severity::High
        } else if days >= 7 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Totals shown above the overdue list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueStats {
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_outstanding: Decimal,
    pub over_7_days: usize,
    pub over_30_days: usize,
}

impl OverdueStats {
    pub fn from_overdue(overdue: &[OverdueInvoiceSummary]) -> Self {
        Self {
            count: overdue.len(),
            total_outstanding: overdue.iter().map(|o| o.balance_remaining).sum(),
            over_7_days: overdue.iter().filter(|o| o.days_overdue >= 7).count(),
            over_30_days: overdue.iter().filter(|o| o.days_overdue >= 30).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_invoices: usize,
    pub total_customers: usize,
    pub breakdown: StatusBreakdown,
    pub recent_invoices: Vec<Invoice>,
    pub recent_payments: Vec<Payment>,
    pub revenue_trend: Vec<TrendPoint>,
    pub overdue: Vec<OverdueInvoiceSummary>,
    pub overdue_stats: OverdueStats,
}

impl DashboardSummary {
    pub fn compute(
        invoices: &[Invoice],
        payments: &[Payment],
        customer_count: usize,
        overdue: Vec<OverdueInvoiceSummary>,
        today: NaiveDate,
    ) -> Self {
        Self {
            total_revenue: total_revenue(invoices),
            total_invoices: invoices.len(),
            total_customers: customer_count,
            breakdown: StatusBreakdown::from_invoices(invoices),
            recent_invoices: recent_invoices(invoices, RECENT_LIMIT),
            recent_payments: recent_payments(payments, RECENT_LIMIT),
            revenue_trend: revenue_trend(payments, today),
            overdue_stats: OverdueStats::from_overdue(&overdue),
            overdue,
        }
    }
}
