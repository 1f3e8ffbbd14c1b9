use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use serde_json::json;
use vixis_common::Secret;
use vixis_payment_engine::{
    db_types::{Invoice, InvoiceStatus, Json},
    events::EventProducers,
    InvoiceFlowApi,
};

use super::mocks::MockInvoiceDb;
use crate::{
    config::DlocalConfig,
    helpers::calculate_signature,
    middleware::SignatureMiddlewareFactory,
    webhook_routes::DlocalWebhookRoute,
};

pub const TEST_SECRET: &str = "test-secret-key";
pub const TEST_LOGIN: &str = "test-login";
pub const TEST_X_DATE: &str = "2025-03-14T09:26:53Z";

pub fn test_dlocal_config(signature_checks: bool) -> DlocalConfig {
    DlocalConfig {
        x_login: TEST_LOGIN.to_string(),
        secret_key: Secret::new(TEST_SECRET.to_string()),
        signature_checks,
        ..Default::default()
    }
}

pub fn test_invoice(status: InvoiceStatus) -> Invoice {
    let settled = status.is_settled();
    Invoice {
        id: 7,
        invoice_number: "INV-2025-0007".parse().unwrap(),
        product_id: Some("abcd1234".into()),
        user_name: Some("Ada Lovelace".into()),
        user_email: Some("ada@example.com".into()),
        amount: 250.0,
        currency: "USD".into(),
        status,
        transaction_id: settled.then(|| "PAY-EARLIER".to_string()),
        paid_at: settled.then(Utc::now),
        custom_fields: Json(json!(null)),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn notification_body(status: &str, order_id: &str) -> String {
    json!({
        "id": "PAY-123456",
        "order_id": order_id,
        "status": status,
        "amount": 250.0,
        "currency": "USD",
        "payer": { "name": "Ada Lovelace", "email": "ada@example.com" },
        "created_date": "2025-03-14T09:26:53Z",
    })
    .to_string()
}

/// A webhook request carrying a signature computed over exactly `body` with the test secret.
pub fn signed_webhook_request(body: &str) -> TestRequest {
    let signature = calculate_signature(TEST_SECRET, TEST_LOGIN, TEST_X_DATE, body.as_bytes());
    TestRequest::post()
        .uri("/webhook/dlocal")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Date", TEST_X_DATE))
        .insert_header(("Authorization", signature))
        .set_payload(body.to_string())
}

/// Runs the request against a webhook service backed by the given mock store. Returns the
/// response status and body whether the request succeeded or was rejected by the middleware.
pub async fn send_webhook_request(
    store: MockInvoiceDb,
    config: DlocalConfig,
    req: TestRequest,
) -> (StatusCode, String) {
    send_webhook_request_with_producers(store, config, EventProducers::default(), req).await
}

/// As [`send_webhook_request`], with explicit event producers so tests can wire up real
/// notification handlers.
pub async fn send_webhook_request_with_producers(
    store: MockInvoiceDb,
    config: DlocalConfig,
    producers: EventProducers,
    req: TestRequest,
) -> (StatusCode, String) {
    let api = InvoiceFlowApi::new(store, producers);
    let app = App::new().app_data(web::Data::new(api)).service(
        web::scope("/webhook")
            .wrap(SignatureMiddlewareFactory::new(&config.x_login, config.secret_key.clone(), config.signature_checks))
            .service(DlocalWebhookRoute::<MockInvoiceDb>::new()),
    );
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
    }
}
