use thiserror::Error;
use vixis_common::InvoiceNumber;

use crate::db_types::{Invoice, NewInvoice, PaymentReceipt};

/// The storage contract for backends supporting the Vixis payment engine.
///
/// The store is the only shared mutable resource in the system. Concurrent payment notifications
/// for the same invoice are reconciled by [`InvoiceStore::settle_invoice`], whose single
/// conditional update is the atomic unit; this flow does not take any locks of its own.
#[allow(async_fn_in_trait)]
pub trait InvoiceStore: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new invoice. This call is idempotent: if an invoice with the same invoice number
    /// already exists, the existing record is returned and the second element is `false`.
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<(Invoice, bool), InvoiceStoreError>;

    /// Fetches the invoice with the given internal id, if it exists.
    async fn fetch_invoice_by_id(&self, id: i64) -> Result<Option<Invoice>, InvoiceStoreError>;

    /// Fetches the invoice with the given invoice number, if it exists. Invoice numbers are a
    /// unique key.
    async fn fetch_invoice_by_number(&self, number: &InvoiceNumber) -> Result<Option<Invoice>, InvoiceStoreError>;

    /// Atomically transitions the invoice to `paid`, recording the transaction id and paid
    /// timestamp from the receipt and bumping `updated_at`.
    ///
    /// The update only applies if the invoice is not already settled. Returns the updated record,
    /// or `None` if the invoice was already settled (e.g. a concurrent notification won the
    /// race). The caller must treat `None` as an idempotent no-op, not an error.
    async fn settle_invoice(&self, id: i64, receipt: &PaymentReceipt) -> Result<Option<Invoice>, InvoiceStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), InvoiceStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum InvoiceStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert invoice, since it already exists with number {0}")]
    InvoiceAlreadyExists(InvoiceNumber),
    #[error("The requested invoice {0} does not exist")]
    InvoiceNotFound(InvoiceNumber),
    #[error("The requested invoice (internal id {0}) does not exist")]
    InvoiceIdNotFound(i64),
}

impl From<sqlx::Error> for InvoiceStoreError {
    fn from(e: sqlx::Error) -> Self {
        InvoiceStoreError::DatabaseError(e.to_string())
    }
}
