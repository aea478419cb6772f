pub mod app;
pub mod auth;
pub mod chat;
pub mod customers;
pub mod dashboard;
pub mod invoices;
pub mod metrics;
pub mod payments;
pub mod public;
pub mod reminders;
pub mod workflow;
