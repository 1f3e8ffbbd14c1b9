//! Outbound integrations: the dLocal payments API, Slack notifications, confirmation emails via
//! Resend, the upstream exchange-rate API, and third-party event pages.

pub mod dlocal;
pub mod email;
pub mod event_pages;
pub mod exchange_rate;
pub mod notifications;
pub mod slack;
