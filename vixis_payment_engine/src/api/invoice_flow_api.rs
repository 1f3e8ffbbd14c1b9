use log::*;
use thiserror::Error;

use crate::{
    db_types::{Invoice, InvoiceKey, PayerInfo, PaymentReceipt},
    events::{EventProducers, InvoicePaidEvent},
    traits::{InvoiceStore, InvoiceStoreError},
};

#[derive(Debug, Error)]
pub enum InvoiceFlowError {
    #[error("Invoice {0} does not exist")]
    NotFound(InvoiceKey),
    #[error("Storage error: {0}")]
    Store(#[from] InvoiceStoreError),
}

/// The result of trying to confirm a payment against an invoice.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// The invoice moved from an open status to `Paid` as a result of this call.
    Paid(Invoice),
    /// The invoice was already settled. The stored record is returned untouched.
    AlreadyPaid(Invoice),
}

impl PaymentOutcome {
    pub fn invoice(&self) -> &Invoice {
        match self {
            PaymentOutcome::Paid(inv) => inv,
            PaymentOutcome::AlreadyPaid(inv) => inv,
        }
    }

    pub fn is_new_payment(&self) -> bool {
        matches!(self, PaymentOutcome::Paid(_))
    }
}

/// `InvoiceFlowApi` orchestrates the invoice payment lifecycle on top of a storage backend.
///
/// Payment providers deliver notifications at least once, so every entry point here is
/// idempotent. When two notifications for the same invoice race, exactly one caller
/// receives [`PaymentOutcome::Paid`] and fires the paid event; the rest see
/// [`PaymentOutcome::AlreadyPaid`].
pub struct InvoiceFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B: std::fmt::Debug> std::fmt::Debug for InvoiceFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InvoiceFlowApi ({:?})", self.db)
    }
}

impl<B> InvoiceFlowApi<B>
where
    B: InvoiceStore,
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Record a successful payment against the invoice identified by `key`.
    ///
    /// If the invoice is still open, it is marked paid with the given receipt and an
    /// [`InvoicePaidEvent`] is published. If it has already been settled, the call is a
    /// no-op and the existing record is returned.
    pub async fn confirm_payment(
        &self,
        key: &InvoiceKey,
        receipt: PaymentReceipt,
        payer: PayerInfo,
    ) -> Result<PaymentOutcome, InvoiceFlowError> {
        let invoice = self
            .fetch_invoice(key)
            .await?
            .ok_or_else(|| InvoiceFlowError::NotFound(key.clone()))?;
        if invoice.status.is_settled() {
            debug!(
                "🔄️ Invoice {} is already {}. Ignoring duplicate payment notification.",
                invoice.invoice_number, invoice.status
            );
            return Ok(PaymentOutcome::AlreadyPaid(invoice));
        }
        match self.db.settle_invoice(invoice.id, &receipt).await? {
            Some(updated) => {
                info!(
                    "🔄️ Invoice {} marked as paid. Transaction id: {}",
                    updated.invoice_number, receipt.transaction_id
                );
                let event = InvoicePaidEvent::new(updated.clone(), payer);
                for producer in &self.producers.invoice_paid_producer {
                    debug!("🔄️ Publishing invoice paid event for {}", updated.invoice_number);
                    producer.publish_event(event.clone()).await;
                }
                Ok(PaymentOutcome::Paid(updated))
            },
            // Another notification settled the invoice between our fetch and the update.
            None => {
                let settled = self
                    .fetch_invoice(key)
                    .await?
                    .ok_or_else(|| InvoiceFlowError::NotFound(key.clone()))?;
                debug!(
                    "🔄️ Invoice {} was settled concurrently. Ignoring duplicate payment notification.",
                    settled.invoice_number
                );
                Ok(PaymentOutcome::AlreadyPaid(settled))
            },
        }
    }

    pub async fn fetch_invoice(&self, key: &InvoiceKey) -> Result<Option<Invoice>, InvoiceFlowError> {
        let invoice = match key {
            InvoiceKey::Id(id) => self.db.fetch_invoice_by_id(*id).await?,
            InvoiceKey::Number(number) => self.db.fetch_invoice_by_number(number).await?,
        };
        Ok(invoice)
    }
}
