//! # Vixis payment server
//!
//! This crate hosts the HTTP surface of the Vixis payment gateway. It is responsible for:
//! * Listening for payment-status webhooks from dLocal and verifying their signatures.
//! * Resolving the referenced invoice and applying the idempotent `pending → paid` transition
//!   via the payment engine.
//! * Fanning out best-effort notifications (Slack, confirmation email) after a successful
//!   transition.
//! * A handful of helper endpoints: creating a dLocal payment, manually marking an invoice
//!   paid, a rate-limited exchange-rate proxy, and an event-page data extractor.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
