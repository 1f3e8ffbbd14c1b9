use actix_web::{http::StatusCode, test::TestRequest};
use mockall::predicate::eq;
use vixis_common::InvoiceNumber;
use vixis_payment_engine::{db_types::InvoiceStatus, traits::InvoiceStoreError};

use super::{
    helpers::{
        notification_body,
        send_webhook_request,
        send_webhook_request_with_producers,
        signed_webhook_request,
        test_dlocal_config,
        test_invoice,
        TEST_X_DATE,
    },
    mocks::MockInvoiceDb,
};
use crate::{config::NotificationConfig, integrations::notifications::create_notification_event_handlers};

const ORDER_ID: &str = "Product #abcd1234 - Invoice #INV-2025-0007 - Vixis";

fn invoice_number() -> InvoiceNumber {
    "INV-2025-0007".parse().unwrap()
}

#[actix_web::test]
async fn paid_notification_settles_a_pending_invoice() {
    let mut store = MockInvoiceDb::new();
    store
        .expect_fetch_invoice_by_number()
        .with(eq(invoice_number()))
        .returning(|_| Ok(Some(test_invoice(InvoiceStatus::Pending))));
    store.expect_settle_invoice().withf(|id, receipt| *id == 7 && receipt.transaction_id == "PAY-123456").returning(
        |_, receipt| {
            let mut invoice = test_invoice(InvoiceStatus::Paid);
            invoice.transaction_id = Some(receipt.transaction_id.clone());
            invoice.paid_at = Some(receipt.paid_at);
            Ok(Some(invoice))
        },
    );
    let body = notification_body("PAID", ORDER_ID);
    let req = signed_webhook_request(&body);
    let (status, body) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("marked as paid"), "unexpected body: {body}");
}

#[actix_web::test]
async fn duplicate_notifications_are_acknowledged_without_a_second_settle() {
    let mut store = MockInvoiceDb::new();
    store
        .expect_fetch_invoice_by_number()
        .with(eq(invoice_number()))
        .returning(|_| Ok(Some(test_invoice(InvoiceStatus::Paid))));
    // No settle_invoice expectation: calling it would fail the test.
    let body = notification_body("PAID", ORDER_ID);
    let req = signed_webhook_request(&body);
    let (status, body) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already processed"), "unexpected body: {body}");
}

#[actix_web::test]
async fn non_paid_statuses_are_acknowledged_without_touching_the_store() {
    for provider_status in ["PENDING", "REJECTED", "CANCELLED"] {
        let store = MockInvoiceDb::new();
        let body = notification_body(provider_status, ORDER_ID);
        let req = signed_webhook_request(&body);
        let (status, body) = send_webhook_request(store, test_dlocal_config(true), req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(provider_status), "unexpected body: {body}");
    }
}

#[actix_web::test]
async fn unrecognizable_references_are_rejected() {
    let store = MockInvoiceDb::new();
    let body = notification_body("PAID", "some random reference");
    let req = signed_webhook_request(&body);
    let (status, _) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_invoices_return_not_found() {
    let mut store = MockInvoiceDb::new();
    store.expect_fetch_invoice_by_number().returning(|_| Ok(None));
    let body = notification_body("PAID", ORDER_ID);
    let req = signed_webhook_request(&body);
    let (status, _) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn store_failures_return_an_internal_error() {
    let mut store = MockInvoiceDb::new();
    store
        .expect_fetch_invoice_by_number()
        .returning(|_| Err(InvoiceStoreError::DatabaseError("disk on fire".into())));
    let body = notification_body("PAID", ORDER_ID);
    let req = signed_webhook_request(&body);
    let (status, _) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn requests_without_an_x_date_header_are_rejected() {
    let store = MockInvoiceDb::new();
    let body = notification_body("PAID", ORDER_ID);
    let req = TestRequest::post()
        .uri("/webhook/dlocal")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("Authorization", "V2-HMAC-SHA256, Signature: deadbeef"))
        .set_payload(body);
    let (status, _) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn requests_without_an_authorization_header_are_rejected() {
    let store = MockInvoiceDb::new();
    let body = notification_body("PAID", ORDER_ID);
    let req = TestRequest::post()
        .uri("/webhook/dlocal")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Date", TEST_X_DATE))
        .set_payload(body);
    let (status, _) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn tampered_bodies_fail_the_signature_check() {
    let store = MockInvoiceDb::new();
    let body = notification_body("PAID", ORDER_ID);
    // Signature computed over the original body, payload swapped afterwards.
    let tampered = notification_body("PAID", "Product #evil0000 - Invoice #INV-2025-0001 - Vixis");
    let req = signed_webhook_request(&body).set_payload(tampered);
    let (status, _) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn garbage_signatures_are_rejected() {
    let store = MockInvoiceDb::new();
    let body = notification_body("PAID", ORDER_ID);
    let req = TestRequest::post()
        .uri("/webhook/dlocal")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Date", TEST_X_DATE))
        .insert_header(("Authorization", "V2-HMAC-SHA256, Signature: 0000000000"))
        .set_payload(body);
    let (status, _) = send_webhook_request(store, test_dlocal_config(true), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn disabled_signature_checks_allow_unsigned_requests() {
    let store = MockInvoiceDb::new();
    let body = notification_body("PENDING", ORDER_ID);
    let req = TestRequest::post()
        .uri("/webhook/dlocal")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body);
    let (status, _) = send_webhook_request(store, test_dlocal_config(false), req).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn unreachable_notification_channels_do_not_change_the_response() {
    let mut store = MockInvoiceDb::new();
    store
        .expect_fetch_invoice_by_number()
        .with(eq(invoice_number()))
        .returning(|_| Ok(Some(test_invoice(InvoiceStatus::Pending))));
    store.expect_settle_invoice().returning(|_, receipt| {
        let mut invoice = test_invoice(InvoiceStatus::Paid);
        invoice.transaction_id = Some(receipt.transaction_id.clone());
        Ok(Some(invoice))
    });
    // Nothing listens on the loopback discard port, so every Slack delivery fails.
    let notifications = NotificationConfig {
        slack_webhook_url: Some(vixis_common::Secret::new("http://127.0.0.1:9/services/T000/B000".to_string())),
        resend_api_key: None,
        email_from: "Vixis Studio <billing@vixis.example>".to_string(),
    };
    let handlers = create_notification_event_handlers(notifications);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let body = notification_body("PAID", ORDER_ID);
    let req = signed_webhook_request(&body);
    let (status, body) = send_webhook_request_with_producers(store, test_dlocal_config(true), producers, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("marked as paid"), "unexpected body: {body}");
    // Let the handler attempt (and fail) the delivery before the test returns.
    actix_web::rt::time::sleep(std::time::Duration::from_millis(200)).await;
}
