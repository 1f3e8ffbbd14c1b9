use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use vixis_common::Secret;
use vixis_payment_engine::events::InvoicePaidEvent;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Could not initialize the email client. {0}")]
    Initialization(String),
    #[error("The invoice has no email address on file")]
    NoRecipient,
    #[error("The email request failed. {0}")]
    RequestError(String),
    #[error("The email API returned an error ({status}): {message}")]
    QueryError { status: u16, message: String },
}

/// Sends payment-confirmation emails through the Resend API.
#[derive(Clone)]
pub struct EmailNotifier {
    api_key: Secret<String>,
    from: String,
    client: Arc<Client>,
}

impl EmailNotifier {
    pub fn new(api_key: Secret<String>, from: impl Into<String>) -> Result<Self, EmailError> {
        let client = Client::builder().build().map_err(|e| EmailError::Initialization(e.to_string()))?;
        Ok(Self { api_key, from: from.into(), client: Arc::new(client) })
    }

    pub async fn send_payment_confirmation(&self, event: &InvoicePaidEvent) -> Result<(), EmailError> {
        let invoice = &event.invoice;
        let to = event.customer_email().ok_or(EmailError::NoRecipient)?;
        let subject = format!("Invoice #{} - Vixis Studio", invoice.invoice_number);
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": confirmation_html(event),
        });
        trace!("📧️ Sending payment confirmation for invoice {} to {to}", invoice.invoice_number);
        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(self.api_key.reveal())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            debug!("📧️ Payment confirmation sent for invoice {}", invoice.invoice_number);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(EmailError::QueryError { status, message })
        }
    }
}

fn confirmation_html(event: &InvoicePaidEvent) -> String {
    let invoice = &event.invoice;
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Invoice #{number}</title></head>
<body style="font-family: sans-serif; background-color: #f5f5f5; padding: 20px;">
  <div style="max-width: 480px; margin: 0 auto; background: #fff; padding: 24px; border: 1px solid #ddd;">
    <h1 style="font-size: 20px;">Payment received</h1>
    <p>Hi {name},</p>
    <p>We have received your payment for invoice <strong>#{number}</strong>.</p>
    <table style="width: 100%; border-collapse: collapse;">
      <tr><td style="padding: 4px 0;">Amount</td><td style="text-align: right;">{amount:.2} {currency}</td></tr>
      <tr><td style="padding: 4px 0;">Payment reference</td><td style="text-align: right;">{reference}</td></tr>
    </table>
    <p style="color: #777; font-size: 12px;">Vixis Studio</p>
  </div>
</body>
</html>"#,
        number = invoice.invoice_number,
        name = event.customer_name(),
        amount = invoice.amount,
        currency = invoice.currency,
        reference = invoice.transaction_id.as_deref().unwrap_or("N/A"),
    )
}
