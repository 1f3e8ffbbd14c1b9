//! `SqliteDatabase` is a concrete implementation of a Vixis payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`InvoiceStore`] trait defined
//! in the [`crate::traits`] module.
use std::fmt::Debug;

use sqlx::SqlitePool;
use vixis_common::InvoiceNumber;

use super::db::{db_url, invoices, new_pool};
use crate::{
    db_types::{Invoice, NewInvoice, PaymentReceipt},
    traits::{InvoiceStore, InvoiceStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database pool and tries to connect to the database at the URL given by the
    /// `VPS_DATABASE_URL` environment variable, or a default SQLite database.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the database schema up to date with the migrations embedded in this crate.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

impl InvoiceStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    // The `RETURNING` statements yield their row before the write is committed, so the mutating
    // operations run inside an explicit transaction. Without it, a fetch on another pool
    // connection can miss an invoice that was just inserted or settled.
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<(Invoice, bool), InvoiceStoreError> {
        let mut tx = self.pool.begin().await?;
        let inserted = invoices::idempotent_insert(invoice, &mut tx).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn fetch_invoice_by_id(&self, id: i64) -> Result<Option<Invoice>, InvoiceStoreError> {
        let mut conn = self.pool.acquire().await?;
        let invoice = invoices::fetch_invoice_by_id(id, &mut conn).await?;
        Ok(invoice)
    }

    async fn fetch_invoice_by_number(&self, number: &InvoiceNumber) -> Result<Option<Invoice>, InvoiceStoreError> {
        let mut conn = self.pool.acquire().await?;
        let invoice = invoices::fetch_invoice_by_number(number, &mut conn).await?;
        Ok(invoice)
    }

    async fn settle_invoice(&self, id: i64, receipt: &PaymentReceipt) -> Result<Option<Invoice>, InvoiceStoreError> {
        let mut tx = self.pool.begin().await?;
        let invoice = invoices::settle_invoice(id, receipt, &mut tx).await?;
        tx.commit().await?;
        Ok(invoice)
    }

    async fn close(&mut self) -> Result<(), InvoiceStoreError> {
        self.pool.close().await;
        Ok(())
    }
}
