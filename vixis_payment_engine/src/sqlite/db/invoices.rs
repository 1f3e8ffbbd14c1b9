use log::debug;
use sqlx::SqliteConnection;
use vixis_common::InvoiceNumber;

use crate::{
    db_types::{Invoice, NewInvoice, PaymentReceipt},
    traits::InvoiceStoreError,
};

/// Inserts the invoice into the database, returning `false` in the second parameter if an invoice
/// with the same invoice number already exists.
pub async fn idempotent_insert(
    invoice: NewInvoice,
    conn: &mut SqliteConnection,
) -> Result<(Invoice, bool), InvoiceStoreError> {
    let inserted = match fetch_invoice_by_number(&invoice.invoice_number, conn).await? {
        Some(invoice) => (invoice, false),
        None => {
            let invoice = insert_invoice(invoice, conn).await?;
            debug!("📝️ Invoice [{}] inserted with id {}", invoice.invoice_number, invoice.id);
            (invoice, true)
        },
    };
    Ok(inserted)
}

/// Inserts a new invoice using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection
/// argument.
async fn insert_invoice(invoice: NewInvoice, conn: &mut SqliteConnection) -> Result<Invoice, InvoiceStoreError> {
    let invoice = sqlx::query_as(
        r#"
            INSERT INTO invoices (
                invoice_number,
                product_id,
                user_name,
                user_email,
                amount,
                currency,
                custom_fields
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(invoice.invoice_number)
    .bind(invoice.product_id)
    .bind(invoice.user_name)
    .bind(invoice.user_email)
    .bind(invoice.amount)
    .bind(invoice.currency)
    .bind(invoice.custom_fields.to_string())
    .fetch_one(conn)
    .await?;
    Ok(invoice)
}

pub async fn fetch_invoice_by_number(
    number: &InvoiceNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Invoice>, sqlx::Error> {
    let invoice = sqlx::query_as("SELECT * FROM invoices WHERE invoice_number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(invoice)
}

pub async fn fetch_invoice_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Invoice>, sqlx::Error> {
    let invoice = sqlx::query_as("SELECT * FROM invoices WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(invoice)
}

/// Applies the `pending → paid` transition as a single conditional update.
///
/// The `status NOT IN` guard makes the update atomic with respect to concurrent payment
/// notifications: at most one of them gets a row back, and the rest see `None`. Callers must
/// treat `None` as "already settled", not as a missing invoice.
pub async fn settle_invoice(
    id: i64,
    receipt: &PaymentReceipt,
    conn: &mut SqliteConnection,
) -> Result<Option<Invoice>, InvoiceStoreError> {
    let invoice: Option<Invoice> = sqlx::query_as(
        r#"
            UPDATE invoices SET
                status = 'paid',
                transaction_id = $1,
                paid_at = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND status NOT IN ('paid', 'completed')
            RETURNING *;
        "#,
    )
    .bind(receipt.transaction_id.as_str())
    .bind(receipt.paid_at)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    if let Some(invoice) = &invoice {
        debug!("📝️ Invoice [{}] settled with transaction {}", invoice.invoice_number, receipt.transaction_id);
    }
    Ok(invoice)
}
