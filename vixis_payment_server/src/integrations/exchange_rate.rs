use std::{collections::HashMap, sync::Arc};

use log::*;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use vixis_common::Secret;

#[derive(Debug, Error)]
pub enum ExchangeRateError {
    #[error("Could not initialize the exchange rate client. {0}")]
    Initialization(String),
    #[error("The exchange rate request failed. {0}")]
    RequestError(String),
    #[error("The exchange rate API returned an error ({status}): {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not parse the exchange rate response. {0}")]
    JsonError(String),
}

/// Source of USD exchange rates. The HTTP client implements this; tests mock it.
#[allow(async_fn_in_trait)]
pub trait RateSource: Clone {
    /// The USD → `currency` rate, or `None` if the upstream does not quote that currency.
    async fn usd_rate(&self, currency: &str) -> Result<Option<f64>, ExchangeRateError>;
}

/// Client for exchangerate-api.com.
#[derive(Clone)]
pub struct ExchangeRateApi {
    api_key: Secret<String>,
    client: Arc<Client>,
}

#[derive(Deserialize)]
struct LatestRatesResponse {
    conversion_rates: HashMap<String, f64>,
}

impl ExchangeRateApi {
    pub fn new(api_key: Secret<String>) -> Result<Self, ExchangeRateError> {
        let client = Client::builder().build().map_err(|e| ExchangeRateError::Initialization(e.to_string()))?;
        Ok(Self { api_key, client: Arc::new(client) })
    }
}

impl RateSource for ExchangeRateApi {
    async fn usd_rate(&self, currency: &str) -> Result<Option<f64>, ExchangeRateError> {
        let url = format!("https://v6.exchangerate-api.com/v6/{}/latest/USD", self.api_key.reveal());
        trace!("💱️ Fetching USD exchange rates");
        let response = self.client.get(url).send().await.map_err(|e| ExchangeRateError::RequestError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ExchangeRateError::QueryError { status, message });
        }
        let rates =
            response.json::<LatestRatesResponse>().await.map_err(|e| ExchangeRateError::JsonError(e.to_string()))?;
        let rate = rates.conversion_rates.get(currency).copied();
        if rate.is_none() {
            debug!("💱️ The upstream does not quote {currency}");
        }
        Ok(rate)
    }
}
