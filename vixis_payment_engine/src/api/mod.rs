mod invoice_flow_api;

pub use invoice_flow_api::{InvoiceFlowApi, InvoiceFlowError, PaymentOutcome};
