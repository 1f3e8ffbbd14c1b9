use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use vixis_common::Secret;
use vixis_payment_engine::events::InvoicePaidEvent;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Could not initialize the Slack client. {0}")]
    Initialization(String),
    #[error("The Slack request failed. {0}")]
    RequestError(String),
    #[error("Slack returned an error ({status}): {message}")]
    QueryError { status: u16, message: String },
}

/// Posts payment notifications to a Slack incoming webhook.
#[derive(Clone)]
pub struct SlackNotifier {
    webhook_url: Secret<String>,
    client: Arc<Client>,
}

impl SlackNotifier {
    pub fn new(webhook_url: Secret<String>) -> Result<Self, SlackError> {
        let client = Client::builder().build().map_err(|e| SlackError::Initialization(e.to_string()))?;
        Ok(Self { webhook_url, client: Arc::new(client) })
    }

    /// Sends the "payment received" Block Kit message for a freshly paid invoice.
    pub async fn notify_invoice_paid(&self, event: &InvoicePaidEvent) -> Result<(), SlackError> {
        let invoice = &event.invoice;
        let message = json!({
            "text": "✅ Payment received",
            "blocks": [
                {
                    "type": "header",
                    "text": { "type": "plain_text", "text": "✅ Payment received" }
                },
                {
                    "type": "section",
                    "fields": [
                        { "type": "mrkdwn", "text": format!("*Invoice:*\n{}", invoice.invoice_number) },
                        { "type": "mrkdwn", "text": format!("*Amount:*\n{} {}", invoice.amount, invoice.currency) },
                        { "type": "mrkdwn", "text": format!("*Product:*\n{}", invoice.product_id.as_deref().unwrap_or("N/A")) },
                        { "type": "mrkdwn", "text": format!("*Customer:*\n{}", event.customer_name()) },
                        { "type": "mrkdwn", "text": format!("*Email:*\n{}", event.customer_email().unwrap_or("N/A")) },
                        { "type": "mrkdwn", "text": format!("*Payment ID:*\n{}", invoice.transaction_id.as_deref().unwrap_or("N/A")) }
                    ]
                }
            ]
        });
        trace!("💬️ Posting payment notification for invoice {} to Slack", invoice.invoice_number);
        let response = self
            .client
            .post(self.webhook_url.reveal())
            .json(&message)
            .send()
            .await
            .map_err(|e| SlackError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            debug!("💬️ Slack notification sent for invoice {}", invoice.invoice_number);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(SlackError::QueryError { status, message })
        }
    }
}
