use std::net::SocketAddr;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use serde_json::Value;

use super::mocks::MockRates;
use crate::{
    config::{RateLimitConfig, ServerConfig},
    rate_limit::RateLimiter,
    routes::ExchangeRateRoute,
};

async fn send_rate_requests(
    fx: MockRates,
    limit: RateLimitConfig,
    requests: Vec<(&str, SocketAddr)>,
) -> Vec<(StatusCode, String)> {
    let limiter = web::Data::new(RateLimiter::new(limit));
    let app = App::new()
        .app_data(web::Data::new(ServerConfig::default()))
        .app_data(web::Data::new(fx))
        .app_data(limiter)
        .service(web::scope("/api").service(ExchangeRateRoute::<MockRates>::new()));
    let service = test::init_service(app).await;
    let mut results = Vec::with_capacity(requests.len());
    for (currency, peer) in requests {
        let req =
            TestRequest::get().uri(&format!("/api/exchange_rate?currency={currency}")).peer_addr(peer).to_request();
        let result = match test::try_call_service(&service, req).await {
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
        };
        results.push(result);
    }
    results
}

fn peer(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([192, 168, 1, last_octet], 4000))
}

#[actix_web::test]
async fn rates_are_proxied_from_the_upstream() {
    let mut fx = MockRates::new();
    fx.expect_usd_rate().returning(|currency| {
        assert_eq!(currency, "COP");
        Ok(Some(4000.5))
    });
    let results = send_rate_requests(fx, RateLimitConfig::default(), vec![("cop", peer(1))]).await;
    let (status, body) = &results[0];
    assert_eq!(*status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(body).unwrap();
    assert_eq!(parsed["base"], "USD");
    assert_eq!(parsed["currency"], "COP");
    assert_eq!(parsed["rate"], 4000.5);
}

#[actix_web::test]
async fn unsupported_currencies_are_rejected() {
    let mut fx = MockRates::new();
    fx.expect_usd_rate().returning(|_| Ok(None));
    let results = send_rate_requests(fx, RateLimitConfig::default(), vec![("ZZZ", peer(1))]).await;
    assert_eq!(results[0].0, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn requests_beyond_the_window_quota_get_a_429() {
    let mut fx = MockRates::new();
    fx.expect_usd_rate().times(2).returning(|_| Ok(Some(4000.0)));
    let limit = RateLimitConfig { max_requests: 2, ..Default::default() };
    let results =
        send_rate_requests(fx, limit, vec![("COP", peer(1)), ("COP", peer(1)), ("COP", peer(1))]).await;
    assert_eq!(results[0].0, StatusCode::OK);
    assert_eq!(results[1].0, StatusCode::OK);
    assert_eq!(results[2].0, StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn the_quota_is_tracked_per_client() {
    let mut fx = MockRates::new();
    fx.expect_usd_rate().times(2).returning(|_| Ok(Some(4000.0)));
    let limit = RateLimitConfig { max_requests: 1, ..Default::default() };
    let results = send_rate_requests(fx, limit, vec![("COP", peer(1)), ("COP", peer(2))]).await;
    assert_eq!(results[0].0, StatusCode::OK);
    assert_eq!(results[1].0, StatusCode::OK);
}
