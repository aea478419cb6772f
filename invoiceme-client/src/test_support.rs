use crate::models::{Invoice, InvoiceStatus, LineItem};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// A 110.00 invoice (100.00 + 10.00 tax) with the given status and balance.
pub(crate) fn invoice(status: InvoiceStatus, balance: Decimal) -> Invoice {
    let total = dec!(110.00);
    Invoice {
        id: Uuid::new_v4(),
        invoice_number: "INV-0001".into(),
        customer_id: Uuid::new_v4(),
        customer_name: "Acme Corp".into(),
        customer_email: "ap@acme.test".into(),
        issue_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        status,
        subtotal: dec!(100.00),
        tax_amount: dec!(10.00),
        total_amount: total,
        amount_paid: total - balance,
        balance_remaining: balance,
        allows_partial_payment: true,
        payment_link: None,
        line_items: vec![LineItem {
            id: Uuid::new_v4(),
            description: "Consulting".into(),
            quantity: dec!(1),
            unit_price: dec!(100.00),
            line_total: dec!(100.00),
        }],
        notes: None,
        terms: None,
    }
}
