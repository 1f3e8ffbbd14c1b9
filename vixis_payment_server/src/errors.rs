use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use thiserror::Error;
use vixis_payment_engine::{traits::InvoiceStoreError, InvoiceFlowError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request was rate limited. Try again in {0} seconds.")]
    RateLimited(u64),
    #[error("The upstream service could not be reached. {0}")]
    UpstreamError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Self::RateLimited(secs) = self {
            builder.insert_header(("Retry-After", secs.to_string()));
        }
        builder.insert_header(ContentType::json()).body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<InvoiceFlowError> for ServerError {
    fn from(e: InvoiceFlowError) -> Self {
        match e {
            InvoiceFlowError::NotFound(key) => Self::NoRecordFound(format!("No invoice matching {key}")),
            InvoiceFlowError::Store(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<InvoiceStoreError> for ServerError {
    fn from(e: InvoiceStoreError) -> Self {
        Self::BackendError(e.to_string())
    }
}
