//! Backend interface contracts for the payment engine.
//!
//! The [`InvoiceStore`] trait defines everything a storage backend needs to expose in order to
//! support the invoice payment flow. The bundled SQLite backend implements it; endpoint tests use
//! mocked implementations.
mod invoice_store;

pub use invoice_store::{InvoiceStore, InvoiceStoreError};
