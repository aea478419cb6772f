//! Entity snapshots exchanged with the InvoiceMe backend.
//!
//! Every type here is a read-through copy of server-owned state.

pub mod chat;
pub mod customer;
pub mod invoice;
pub mod payment;
pub mod reminder;

pub use chat::{ChatMessage, ChatMessageRequest, ChatMessageResponse, ChatSender};
pub use customer::{Address, CreateCustomerRequest, Customer, UpdateCustomerRequest};
pub use invoice::{
    CancelInvoiceRequest, CreateInvoiceRequest, Invoice, InvoiceFilters, InvoiceStatus,
    LineItem, LineItemInput, UpdateInvoiceRequest,
};
pub use payment::{Payment, PaymentMethod, RecordPaymentRequest};
pub use reminder::{
    OverdueInvoiceSummary, ReminderHistory, ReminderPreview, ReminderType, SendReminderRequest,
};
