use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

/// A human-readable invoice reference in the form `INV-YYYY-NNNN`.
///
/// Invoice numbers are issued when the invoice is created and are unique across the store. They are
/// the key that payment notifications use to refer back to an invoice, so parsing is strict: a fixed
/// `INV` prefix, a four-digit year and a four-digit sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber(String);

#[derive(Debug, Clone, Error)]
#[error("{0} is not a valid invoice number")]
pub struct InvoiceNumberError(String);

impl InvoiceNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_well_formed(s: &str) -> bool {
    let mut parts = s.splitn(3, '-');
    let prefix = parts.next();
    let year = parts.next();
    let seq = parts.next();
    matches!((prefix, year, seq), (Some("INV"), Some(y), Some(n))
        if y.len() == 4 && n.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()) && n.bytes().all(|b| b.is_ascii_digit()))
}

impl FromStr for InvoiceNumber {
    type Err = InvoiceNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvoiceNumberError(s.to_string()))
        }
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = InvoiceNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(value: InvoiceNumber) -> Self {
        value.0
    }
}

impl Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
