use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use mockall::predicate::eq;
use serde_json::json;
use vixis_payment_engine::{db_types::InvoiceStatus, events::EventProducers, InvoiceFlowApi};

use super::{helpers::test_invoice, mocks::MockInvoiceDb};
use crate::routes::MarkInvoicePaidRoute;

async fn send_mark_paid_request(store: MockInvoiceDb, body: serde_json::Value) -> (StatusCode, String) {
    let api = InvoiceFlowApi::new(store, EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(api))
        .service(web::scope("/api").service(MarkInvoicePaidRoute::<MockInvoiceDb>::new()));
    let service = test::init_service(app).await;
    let req = TestRequest::post().uri("/api/invoices/mark_paid").set_json(body).to_request();
    match test::try_call_service(&service, req).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => {
            let res = e.error_response();
            (res.status(), String::new())
        },
    }
}

#[actix_web::test]
async fn invoices_can_be_marked_paid_by_id() {
    let mut store = MockInvoiceDb::new();
    store.expect_fetch_invoice_by_id().with(eq(7)).returning(|_| Ok(Some(test_invoice(InvoiceStatus::Pending))));
    store
        .expect_settle_invoice()
        .withf(|id, receipt| *id == 7 && receipt.transaction_id == "MANUAL-001")
        .returning(|_, _| Ok(Some(test_invoice(InvoiceStatus::Paid))));
    let body = json!({ "invoice_id": 7, "transaction_id": "MANUAL-001" });
    let (status, body) = send_mark_paid_request(store, body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("marked as paid"), "unexpected body: {body}");
}

#[actix_web::test]
async fn invoices_can_be_marked_paid_by_number() {
    let mut store = MockInvoiceDb::new();
    store.expect_fetch_invoice_by_number().returning(|_| Ok(Some(test_invoice(InvoiceStatus::Pending))));
    store.expect_settle_invoice().returning(|_, _| Ok(Some(test_invoice(InvoiceStatus::Paid))));
    let body = json!({ "invoice_number": "INV-2025-0007", "transaction_id": "MANUAL-002" });
    let (status, _) = send_mark_paid_request(store, body).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn settled_invoices_report_an_idempotent_no_op() {
    let mut store = MockInvoiceDb::new();
    store.expect_fetch_invoice_by_id().returning(|_| Ok(Some(test_invoice(InvoiceStatus::Completed))));
    let body = json!({ "invoice_id": 7, "transaction_id": "MANUAL-003" });
    let (status, body) = send_mark_paid_request(store, body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already processed"), "unexpected body: {body}");
}

#[actix_web::test]
async fn requests_without_a_key_are_rejected() {
    let store = MockInvoiceDb::new();
    let body = json!({ "transaction_id": "MANUAL-004" });
    let (status, _) = send_mark_paid_request(store, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_invoice_numbers_are_rejected() {
    let store = MockInvoiceDb::new();
    let body = json!({ "invoice_number": "INVOICE-99", "transaction_id": "MANUAL-005" });
    let (status, _) = send_mark_paid_request(store, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
