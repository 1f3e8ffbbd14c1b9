use std::sync::Arc;

use chrono::Utc;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::{json, Value};
use thiserror::Error;
use vixis_payment_engine::db_types::Invoice;

use crate::{config::DlocalConfig, errors::ServerError, helpers::calculate_signature};

#[derive(Debug, Error)]
pub enum DlocalApiError {
    #[error("Could not initialize the dLocal client. {0}")]
    Initialization(String),
    #[error("The dLocal request failed. {0}")]
    RequestError(String),
    #[error("Could not parse the dLocal response. {0}")]
    JsonError(String),
    #[error("dLocal returned an error ({status}): {message}")]
    QueryError { status: u16, message: String },
}

impl From<DlocalApiError> for ServerError {
    fn from(e: DlocalApiError) -> Self {
        ServerError::UpstreamError(e.to_string())
    }
}

#[derive(Clone)]
pub struct DlocalApi {
    config: DlocalConfig,
    client: Arc<Client>,
}

impl DlocalApi {
    pub fn new(config: DlocalConfig) -> Result<Self, DlocalApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let login = HeaderValue::from_str(&config.x_login).map_err(|e| DlocalApiError::Initialization(e.to_string()))?;
        let trans_key = HeaderValue::from_str(config.x_trans_key.reveal().as_str())
            .map_err(|e| DlocalApiError::Initialization(e.to_string()))?;
        headers.insert("X-Login", login);
        headers.insert("X-Trans-Key", trans_key);
        headers.insert("X-Version", HeaderValue::from_static("2.1"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("Vixis-Portfolio/1.0")
            .default_headers(headers)
            .build()
            .map_err(|e| DlocalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Creates a payment at dLocal for the given invoice and returns the provider response
    /// (including `redirect_url` when the payment flow needs one).
    ///
    /// The request is signed over `x_login + x_date + body` with the shared secret, the same
    /// scheme dLocal uses for inbound webhooks. The body is serialized exactly once, and those
    /// bytes are both signed and sent.
    pub async fn create_payment(
        &self,
        invoice: &Invoice,
        country: &str,
        payment_method: Option<&str>,
    ) -> Result<Value, DlocalApiError> {
        let order_id = order_reference(invoice);
        let mut payment_body = json!({
            "amount": invoice.amount,
            "currency": invoice.currency,
            "country": country,
            "payment_method_id": payment_method.unwrap_or("CARD"),
            "payment_method_flow": "DIRECT",
            "payer": {
                "name": invoice.user_name.as_deref().unwrap_or("Customer"),
                "email": invoice.user_email.as_deref().unwrap_or(""),
                "user_reference": invoice.id,
            },
            "order_id": order_id,
            "description": format!("Payment for Invoice #{}", invoice.invoice_number),
        });
        if let Some(url) = &self.config.notification_url {
            payment_body["notification_url"] = json!(url);
        }
        let body = payment_body.to_string();
        let x_date = Utc::now().to_rfc3339();
        let authorization = calculate_signature(self.config.secret_key.reveal(), &self.config.x_login, &x_date, body.as_bytes());
        let url = format!("{}/payments", self.config.api_url());
        trace!("🏦️ Creating dLocal payment for invoice {} at {url}", invoice.invoice_number);
        let response = self
            .client
            .post(&url)
            .header("X-Date", x_date)
            .header("Authorization", authorization)
            .body(body)
            .send()
            .await
            .map_err(|e| DlocalApiError::RequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            let payment = response.json::<Value>().await.map_err(|e| DlocalApiError::JsonError(e.to_string()))?;
            debug!("🏦️ dLocal payment created: {}", payment["id"]);
            Ok(json!({
                "success": true,
                "payment": payment,
                "redirect_url": payment["redirect_url"],
                "status": payment["status"],
            }))
        } else {
            let message = response.text().await.map_err(|e| DlocalApiError::RequestError(e.to_string()))?;
            Err(DlocalApiError::QueryError { status: status.as_u16(), message })
        }
    }
}

/// Builds the composite payment reference the invoice number is later extracted from, e.g.
/// `Product #abcd1234 - Invoice #INV-2025-0007 - Vixis`.
pub fn order_reference(invoice: &Invoice) -> String {
    let product: String = invoice.product_id.as_deref().unwrap_or("unknown").chars().take(8).collect();
    format!("Product #{product} - Invoice #{} - Vixis", invoice.invoice_number)
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use serde_json::json;
    use vixis_payment_engine::{
        db_types::{Invoice, InvoiceStatus, Json},
        helpers::extract_invoice_number,
    };

    use super::order_reference;

    fn invoice(product_id: Option<&str>) -> Invoice {
        Invoice {
            id: 1,
            invoice_number: "INV-2025-0007".parse().unwrap(),
            product_id: product_id.map(String::from),
            user_name: None,
            user_email: None,
            amount: 100.0,
            currency: "USD".into(),
            status: InvoiceStatus::Pending,
            transaction_id: None,
            paid_at: None,
            custom_fields: Json(json!(null)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn references_truncate_the_product_id() {
        let reference = order_reference(&invoice(Some("abcd1234-something-long")));
        assert_eq!(reference, "Product #abcd1234 - Invoice #INV-2025-0007 - Vixis");
    }

    #[test]
    fn references_survive_the_extraction_round_trip() {
        let reference = order_reference(&invoice(None));
        let number = extract_invoice_number(&reference).unwrap();
        assert_eq!(number.as_str(), "INV-2025-0007");
    }
}
