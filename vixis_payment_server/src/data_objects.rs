use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vixis_common::InvoiceNumber;
use vixis_payment_engine::db_types::PayerInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The payment-status notification dLocal POSTs to the webhook endpoint.
///
/// `order_id` is the opaque reference we supplied when creating the payment; the invoice number
/// is embedded in it. The provider may deliver the same notification more than once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    /// The provider's payment id.
    pub id: String,
    pub order_id: String,
    pub status: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payer: Option<NotificationPayer>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl PaymentNotification {
    /// dLocal reports terminal success as the literal status string `PAID`.
    pub fn is_paid(&self) -> bool {
        self.status == "PAID"
    }

    pub fn payer_info(&self) -> PayerInfo {
        match &self.payer {
            Some(p) => PayerInfo { name: p.name.clone(), email: p.email.clone() },
            None => PayerInfo::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationPayer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Manual "mark as paid" request, for the storefront admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPaidRequest {
    #[serde(default)]
    pub invoice_id: Option<i64>,
    #[serde(default)]
    pub invoice_number: Option<InvoiceNumber>,
    pub transaction_id: String,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Request to create a dLocal payment for an existing invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub invoice_number: InvoiceNumber,
    /// ISO country code of the payer, required by dLocal.
    pub country: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateQuery {
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateResult {
    pub base: String,
    pub currency: String,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractEventRequest {
    pub url: String,
    /// If supplied, the HTML is used as-is and the URL is never fetched.
    #[serde(default)]
    pub html: Option<String>,
}
