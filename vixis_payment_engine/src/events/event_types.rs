use serde::{Deserialize, Serialize};

use crate::db_types::{Invoice, PayerInfo};

/// Emitted after an invoice has been transitioned to `paid`.
///
/// The invoice carries the post-transition state (status, transaction id and paid timestamp all
/// set). The payer info is whatever the provider reported, since the invoice record may predate
/// the customer's details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePaidEvent {
    pub invoice: Invoice,
    pub payer: PayerInfo,
}

impl InvoicePaidEvent {
    pub fn new(invoice: Invoice, payer: PayerInfo) -> Self {
        Self { invoice, payer }
    }

    /// The customer name to display in notifications. The invoice record wins over the provider's
    /// payer data.
    pub fn customer_name(&self) -> &str {
        self.invoice.user_name.as_deref().or(self.payer.name.as_deref()).unwrap_or("N/A")
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.invoice.user_email.as_deref().or(self.payer.email.as_deref())
    }
}
