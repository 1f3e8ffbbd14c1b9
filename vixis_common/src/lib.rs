mod helpers;
mod invoice_number;
mod secret;

pub use helpers::parse_boolean_flag;
pub use invoice_number::{InvoiceNumber, InvoiceNumberError};
pub use secret::Secret;
