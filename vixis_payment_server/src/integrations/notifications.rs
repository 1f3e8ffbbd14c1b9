use log::*;
use vixis_payment_engine::events::{EventHandlers, EventHooks};

use crate::{
    config::NotificationConfig,
    integrations::{email::EmailNotifier, slack::SlackNotifier},
};

pub const NOTIFICATION_EVENT_BUFFER_SIZE: usize = 25;

/// Assigns the notification event handlers.
///
/// A single hook listens for [`InvoicePaidEvent`]s and fans out to whichever channels are
/// configured: a Slack Block Kit message, and a confirmation email to the customer. Both are
/// best-effort: a failure is logged and swallowed, and can never affect the webhook response
/// that triggered the event.
///
/// [`InvoicePaidEvent`]: vixis_payment_engine::events::InvoicePaidEvent
pub fn create_notification_event_handlers(config: NotificationConfig) -> EventHandlers {
    let mut hooks = EventHooks::default();
    let slack = match &config.slack_webhook_url {
        Some(url) => match SlackNotifier::new(url.clone()) {
            Ok(notifier) => Some(notifier),
            Err(e) => {
                error!("💬️ Could not initialize the Slack notifier. Slack notifications are disabled. {e}");
                None
            },
        },
        None => None,
    };
    let email = match &config.resend_api_key {
        Some(key) => match EmailNotifier::new(key.clone(), config.email_from.clone()) {
            Ok(notifier) => Some(notifier),
            Err(e) => {
                error!("📧️ Could not initialize the email notifier. Confirmation emails are disabled. {e}");
                None
            },
        },
        None => None,
    };
    if slack.is_none() && email.is_none() {
        info!("📬️ No notification channels are configured.");
        return EventHandlers::new(NOTIFICATION_EVENT_BUFFER_SIZE, hooks);
    }
    hooks.on_invoice_paid(move |event| {
        let slack = slack.clone();
        let email = email.clone();
        Box::pin(async move {
            if let Some(slack) = slack {
                if let Err(e) = slack.notify_invoice_paid(&event).await {
                    error!("💬️ Could not send the Slack notification for invoice {}. {e}", event.invoice.invoice_number);
                }
            }
            if let Some(email) = email {
                if let Err(e) = email.send_payment_confirmation(&event).await {
                    error!(
                        "📧️ Could not send the confirmation email for invoice {}. {e}",
                        event.invoice.invoice_number
                    );
                }
            }
        })
    });
    EventHandlers::new(NOTIFICATION_EVENT_BUFFER_SIZE, hooks)
}
