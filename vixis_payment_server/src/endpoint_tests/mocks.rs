use mockall::mock;
use vixis_common::InvoiceNumber;
use vixis_payment_engine::{
    db_types::{Invoice, NewInvoice, PaymentReceipt},
    traits::{InvoiceStore, InvoiceStoreError},
};

use crate::integrations::exchange_rate::{ExchangeRateError, RateSource};

mock! {
    pub InvoiceDb {}

    impl Clone for InvoiceDb {
        fn clone(&self) -> Self;
    }

    impl InvoiceStore for InvoiceDb {
        fn url(&self) -> &str;
        async fn insert_invoice(&self, invoice: NewInvoice) -> Result<(Invoice, bool), InvoiceStoreError>;
        async fn fetch_invoice_by_id(&self, id: i64) -> Result<Option<Invoice>, InvoiceStoreError>;
        async fn fetch_invoice_by_number(&self, number: &InvoiceNumber) -> Result<Option<Invoice>, InvoiceStoreError>;
        async fn settle_invoice(&self, id: i64, receipt: &PaymentReceipt) -> Result<Option<Invoice>, InvoiceStoreError>;
        async fn close(&mut self) -> Result<(), InvoiceStoreError>;
    }
}

mock! {
    pub Rates {}

    impl Clone for Rates {
        fn clone(&self) -> Self;
    }

    impl RateSource for Rates {
        async fn usd_rate(&self, currency: &str) -> Result<Option<f64>, ExchangeRateError>;
    }
}
