use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use vixis_payment_engine::{events::EventProducers, InvoiceFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{
        dlocal::DlocalApi,
        event_pages::EventPageClient,
        exchange_rate::ExchangeRateApi,
        notifications::create_notification_event_handlers,
    },
    middleware::SignatureMiddlewareFactory,
    rate_limit::RateLimiter,
    routes::{extract_event, health, CreatePaymentRoute, ExchangeRateRoute, MarkInvoicePaidRoute},
    webhook_routes::DlocalWebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_notification_event_handlers(config.notifications.clone());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let dlocal_api =
        DlocalApi::new(config.dlocal.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let fx_api = ExchangeRateApi::new(config.exchange_rate_api_key.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let page_client = EventPageClient::new().map_err(|e| ServerError::InitializeError(e.to_string()))?;
    // One limiter shared across all workers; per-worker limiters would multiply the quota.
    let limiter = web::Data::new(RateLimiter::new(config.rate_limit));
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let invoices_api = InvoiceFlowApi::new(db.clone(), producers.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("vps::access_log"))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(invoices_api))
            .app_data(web::Data::new(dlocal_api.clone()))
            .app_data(web::Data::new(fx_api.clone()))
            .app_data(web::Data::new(page_client.clone()))
            .app_data(limiter.clone());
        let webhook_scope = web::scope("/webhook")
            .wrap(SignatureMiddlewareFactory::new(
                &config.dlocal.x_login,
                config.dlocal.secret_key.clone(),
                config.dlocal.signature_checks,
            ))
            .service(DlocalWebhookRoute::<SqliteDatabase>::new());
        let api_scope = web::scope("/api")
            .service(MarkInvoicePaidRoute::<SqliteDatabase>::new())
            .service(CreatePaymentRoute::<SqliteDatabase>::new())
            .service(ExchangeRateRoute::<ExchangeRateApi>::new())
            .service(extract_event);
        app.service(health).service(webhook_scope).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
