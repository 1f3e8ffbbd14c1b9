use regex::Regex;
use vixis_common::InvoiceNumber;

/// Extract the invoice number embedded in a payment provider's order reference.
///
/// References are usually composite strings of the form
/// `Product #abcd1234 - Invoice #INV-2025-0007 - Vixis`, but the format is not guaranteed to be
/// stable, so a reference that is itself a bare invoice number is also accepted. Anything else is
/// an explicit `None`; we never fall back to an arbitrary key.
pub fn extract_invoice_number(reference: &str) -> Option<InvoiceNumber> {
    let labelled = Regex::new(r"Invoice #(INV-\d{4}-\d{4})").unwrap();
    if let Some(caps) = labelled.captures(reference) {
        return caps.get(1).and_then(|m| m.as_str().parse().ok());
    }
    reference.trim().parse().ok()
}
