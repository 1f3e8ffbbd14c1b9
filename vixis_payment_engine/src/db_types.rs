use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
pub use sqlx::types::Json;
use thiserror::Error;
use vixis_common::InvoiceNumber;

//--------------------------------------   InvoiceStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// The invoice has been issued, and no payment has been received.
    Pending,
    /// Payment has been received in full.
    Paid,
    /// The work covered by the invoice has been delivered.
    Completed,
    /// The invoice has been cancelled by the studio.
    Cancelled,
}

impl InvoiceStatus {
    /// Settled invoices have already been paid for. A second "mark as paid" request against a
    /// settled invoice must be a no-op.
    pub fn is_settled(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Completed)
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Pending => write!(f, "pending"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Completed => write!(f, "completed"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid invoice status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for InvoiceStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for InvoiceStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid invoice status: {value}. But this conversion cannot fail. Defaulting to pending");
            InvoiceStatus::Pending
        })
    }
}

//--------------------------------------      Invoice        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: InvoiceNumber,
    /// The product this invoice was issued for, if any.
    pub product_id: Option<String>,
    /// The customer's name, captured at invoice creation or backfilled from the payment.
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    /// The provider's payment identifier. Set together with `paid_at`, exactly once, when the
    /// invoice transitions to `paid`.
    pub transaction_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Free-form metadata captured at creation time (language, feature selections, etc).
    pub custom_fields: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     NewInvoice      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: InvoiceNumber,
    pub product_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub custom_fields: Value,
}

impl NewInvoice {
    pub fn new(invoice_number: InvoiceNumber, amount: f64, currency: impl Into<String>) -> Self {
        Self {
            invoice_number,
            product_id: None,
            user_name: None,
            user_email: None,
            amount,
            currency: currency.into(),
            custom_fields: Value::Null,
        }
    }
}

//--------------------------------------   PaymentReceipt    ---------------------------------------------------------
/// The fields recorded against an invoice at the `pending → paid` transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// The provider's payment identifier.
    pub transaction_id: String,
    /// The provider-supplied payment timestamp, or the time of processing if the provider did not
    /// send one.
    pub paid_at: DateTime<Utc>,
}

impl PaymentReceipt {
    pub fn new(transaction_id: impl Into<String>, paid_at: Option<DateTime<Utc>>) -> Self {
        Self { transaction_id: transaction_id.into(), paid_at: paid_at.unwrap_or_else(Utc::now) }
    }
}

//--------------------------------------      PayerInfo      ---------------------------------------------------------
/// Customer details as reported by the payment provider. Used as a fallback when the invoice
/// record itself has no name or email on file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
}

//--------------------------------------     InvoiceKey      ---------------------------------------------------------
/// Invoices can be addressed by their internal id or by their issued invoice number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceKey {
    Id(i64),
    Number(InvoiceNumber),
}

impl Display for InvoiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceKey::Id(id) => write!(f, "id {id}"),
            InvoiceKey::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<InvoiceNumber> for InvoiceKey {
    fn from(value: InvoiceNumber) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for InvoiceKey {
    fn from(value: i64) -> Self {
        Self::Id(value)
    }
}
