use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use thiserror::Error;

use crate::errors::ServerError;

/// How long a fetch of a third-party event page may take before the request is abandoned.
pub const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum EventPageError {
    #[error("Could not initialize the event page client. {0}")]
    Initialization(String),
    #[error("The event page request failed. {0}")]
    RequestError(String),
    #[error("The event page returned an error. {0}")]
    QueryError(String),
}

impl From<EventPageError> for ServerError {
    fn from(e: EventPageError) -> Self {
        ServerError::UpstreamError(e.to_string())
    }
}

/// Fetches third-party event pages for the extraction endpoint.
///
/// A single shared client with a hard timeout, since the pages being scraped are entirely
/// outside our control.
#[derive(Clone)]
pub struct EventPageClient {
    client: Arc<Client>,
}

impl EventPageClient {
    pub fn new() -> Result<Self, EventPageError> {
        let client = Client::builder()
            .user_agent("Vixis-Portfolio/1.0")
            .timeout(PAGE_FETCH_TIMEOUT)
            .build()
            .map_err(|e| EventPageError::Initialization(e.to_string()))?;
        Ok(Self { client: Arc::new(client) })
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String, EventPageError> {
        debug!("💻️ Fetching event page {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("💻️ Could not fetch event page {url}. {e}");
            EventPageError::RequestError(e.to_string())
        })?;
        if !response.status().is_success() {
            return Err(EventPageError::QueryError(format!("Event page returned {}", response.status())));
        }
        response.text().await.map_err(|e| EventPageError::RequestError(e.to_string()))
    }
}
