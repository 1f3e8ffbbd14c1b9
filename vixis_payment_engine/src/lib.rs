//! Vixis Payment Engine
//!
//! The payment engine contains the core logic for the Vixis storefront backend. It is
//! provider-agnostic: everything dLocal-specific (signature headers, wire formats) lives in the
//! server crate, while this crate owns the invoice lifecycle.
//!
//! The crate is divided into three main sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the only supported backend at present. You
//!    should never need to access the database directly; use the public API instead. The exception
//!    is the data types used in the database, which are defined in [`mod@db_types`] and are public.
//! 2. The public API ([`InvoiceFlowApi`]). This is responsible for resolving invoices and applying
//!    the idempotent `pending → paid` transition. Backends implement the [`traits::InvoiceStore`]
//!    trait to plug in.
//! 3. Events ([`mod@events`]). When an invoice is marked as paid, an [`events::InvoicePaidEvent`]
//!    is emitted. A simple actor framework lets callers hook into these events for best-effort
//!    side effects (chat messages, confirmation emails) without ever feeding back into the
//!    transition result.

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

mod api;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{InvoiceFlowApi, InvoiceFlowError, PaymentOutcome};
