use actix_web::{test, test::TestRequest, web, App};
use serde_json::{json, Value};

use crate::{integrations::event_pages::EventPageClient, routes::extract_event};

#[actix_web::test]
async fn supplied_html_is_extracted_without_fetching() {
    let pages = EventPageClient::new().unwrap();
    let app = App::new().app_data(web::Data::new(pages)).service(web::scope("/api").service(extract_event));
    let service = test::init_service(app).await;
    let html = "<h1>Vixis Invitational 2025</h1>";
    let req = TestRequest::post()
        .uri("/api/extract_event")
        .set_json(json!({ "url": "https://www.passline.com/eventos/vixis-invitational", "html": html }))
        .to_request();
    let res: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(res["success"], Value::Bool(true));
    assert_eq!(res["platform"], "passline");
    assert_eq!(res["data"]["title"], "Vixis Invitational 2025");
}

#[actix_web::test]
async fn pages_without_a_title_report_no_data() {
    let pages = EventPageClient::new().unwrap();
    let app = App::new().app_data(web::Data::new(pages)).service(web::scope("/api").service(extract_event));
    let service = test::init_service(app).await;
    let req = TestRequest::post()
        .uri("/api/extract_event")
        .set_json(json!({ "url": "https://example.com/nothing", "html": "<p>no event here</p>" }))
        .to_request();
    let res: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(res["success"], Value::Bool(false));
    assert_eq!(res["platform"], "unknown");
    assert!(res["data"].is_null());
}
