//! Typed facades over the backend, one function per operation.
//!
//! Lists come back whole; filtering beyond what the backend's query
//! parameters support happens client-side with [`filter_customers`] and
//! [`filter_invoices`].

pub mod chat;
pub mod customers;
pub mod invoices;
pub mod payments;
pub mod reminders;

pub use chat::ChatApi;
pub use customers::CustomerApi;
pub use invoices::InvoiceApi;
pub use payments::PaymentApi;
pub use reminders::ReminderApi;

use crate::gateway::RestGateway;
use crate::models::{Customer, Invoice, InvoiceStatus};
use std::sync::Arc;

/// All resource clients sharing one gateway.
#[derive(Clone)]
pub struct Backend {
    pub gateway: Arc<RestGateway>,
    pub customers: CustomerApi,
    pub invoices: InvoiceApi,
    pub payments: PaymentApi,
    pub reminders: ReminderApi,
    pub chat: ChatApi,
}

impl Backend {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self {
            customers: CustomerApi::new(gateway.clone()),
            invoices: InvoiceApi::new(gateway.clone()),
            payments: PaymentApi::new(gateway.clone()),
            reminders: ReminderApi::new(gateway.clone()),
            chat: ChatApi::new(gateway.clone()),
            gateway,
        }
    }
}

pub fn filter_customers<'a>(customers: &'a [Customer], query: &str) -> Vec<&'a Customer> {
    customers.iter().filter(|c| c.matches(query)).collect()
}

/// Filter by status and a case-insensitive match on invoice number or
/// customer name.
pub fn filter_invoices<'a>(
    invoices: &'a [Invoice],
    status: Option<InvoiceStatus>,
    query: &str,
) -> Vec<&'a Invoice> {
    let needle = query.trim().to_lowercase();
    invoices
        .iter()
        .filter(|inv| status.map_or(true, |s| inv.status == s))
        .filter(|inv| {
            needle.is_empty()
                || inv.invoice_number.to_lowercase().contains(&needle)
                || inv.customer_name.to_lowercase().contains(&needle)
        })
        .collect()
}
