mod event_extractor;
mod invoice_extractor;

pub use event_extractor::{detect_platform, extract_event_data, EventPlatform, ExtractedEventData};
pub use invoice_extractor::extract_invoice_number;
