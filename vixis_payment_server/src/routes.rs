//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, http::StatusCode, post, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use vixis_payment_engine::{
    db_types::{InvoiceKey, PayerInfo, PaymentReceipt},
    helpers::{detect_platform, extract_event_data},
    traits::InvoiceStore,
    InvoiceFlowApi,
};

use crate::{
    config::ServerConfig,
    data_objects::{
        CreatePaymentRequest,
        ExchangeRateQuery,
        ExchangeRateResult,
        ExtractEventRequest,
        JsonResponse,
        MarkPaidRequest,
    },
    errors::ServerError,
    helpers::get_remote_ip,
    integrations::{dlocal::DlocalApi, event_pages::EventPageClient, exchange_rate::RateSource},
    rate_limit::{RateDecision, RateLimiter},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//------------------------------------------   Mark invoice paid  -----------------------------------------------
route!(mark_invoice_paid => Post "/invoices/mark_paid" impl InvoiceStore);
/// Manual "mark as paid" endpoint for the storefront admin.
///
/// Accepts either the internal invoice id or the invoice number, plus the transaction reference
/// to record. The idempotency contract is the same as for the webhook: marking a settled invoice
/// as paid reports success without touching the record.
pub async fn mark_invoice_paid<B: InvoiceStore>(
    body: web::Json<MarkPaidRequest>,
    api: web::Data<InvoiceFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let key = match (request.invoice_id, request.invoice_number) {
        (Some(id), _) => InvoiceKey::from(id),
        (None, Some(number)) => InvoiceKey::from(number),
        (None, None) => {
            return Err(ServerError::InvalidRequestBody("Supply either invoice_id or invoice_number.".into()));
        },
    };
    debug!("💻️ Manual mark-as-paid request for invoice {key}");
    let receipt = PaymentReceipt::new(request.transaction_id, request.paid_at);
    let outcome = api.confirm_payment(&key, receipt, PayerInfo::default()).await?;
    let message = if outcome.is_new_payment() {
        format!("Invoice {} marked as paid.", outcome.invoice().invoice_number)
    } else {
        format!("Invoice {} was already processed.", outcome.invoice().invoice_number)
    };
    Ok(HttpResponse::Ok().json(JsonResponse::success(message)))
}

//------------------------------------------   Create payment  --------------------------------------------------
route!(create_payment => Post "/payments" impl InvoiceStore);
/// Creates a dLocal payment for an existing invoice and relays the provider response, including
/// the redirect URL the storefront sends the customer to.
pub async fn create_payment<B: InvoiceStore>(
    body: web::Json<CreatePaymentRequest>,
    api: web::Data<InvoiceFlowApi<B>>,
    dlocal: web::Data<DlocalApi>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let key = InvoiceKey::from(request.invoice_number.clone());
    let invoice = api.fetch_invoice(&key).await?.ok_or_else(|| {
        debug!("💻️ Payment creation requested for unknown invoice {key}");
        ServerError::NoRecordFound(format!("No invoice matching {key}"))
    })?;
    if invoice.status.is_settled() {
        return Ok(HttpResponse::Ok()
            .json(JsonResponse::failure(format!("Invoice {} has already been paid.", invoice.invoice_number))));
    }
    let response = dlocal.create_payment(&invoice, &request.country, request.payment_method.as_deref()).await?;
    info!("💻️ dLocal payment created for invoice {}", invoice.invoice_number);
    Ok(HttpResponse::Ok().json(response))
}

//------------------------------------------   Exchange rate  ---------------------------------------------------
route!(exchange_rate => Get "/exchange_rate" impl RateSource);
/// Rate-limited proxy to the upstream exchange-rate API. Rates are quoted against USD.
pub async fn exchange_rate<B: RateSource>(
    req: HttpRequest,
    query: web::Query<ExchangeRateQuery>,
    fx: web::Data<B>,
    limiter: web::Data<RateLimiter>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let Some(ip) = get_remote_ip(&req, config.use_x_forwarded_for, config.use_forwarded) else {
        warn!("💱️ Could not determine a client address for rate limiting. Denying the request.");
        return Err(ServerError::InvalidRequestBody("Could not determine client address.".into()));
    };
    let remaining = match limiter.check(ip) {
        RateDecision::Allowed { remaining } => remaining,
        RateDecision::Limited { retry_after } => {
            let secs = retry_after.as_secs().max(1);
            debug!("💱️ Rate limit exceeded for {ip}. Retry in {secs}s.");
            return Ok(HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
                .insert_header(("Retry-After", secs.to_string()))
                .insert_header(("X-RateLimit-Limit", limiter.max_requests().to_string()))
                .insert_header(("X-RateLimit-Remaining", "0"))
                .json(JsonResponse::failure("Rate limit exceeded.")));
        },
    };
    let currency = query.into_inner().currency.trim().to_uppercase();
    let rate = fx.usd_rate(&currency).await.map_err(|e| {
        warn!("💱️ Could not fetch exchange rates. {e}");
        ServerError::UpstreamError(e.to_string())
    })?;
    let Some(rate) = rate else {
        return Err(ServerError::InvalidRequestBody(format!("Unsupported currency: {currency}")));
    };
    let result = ExchangeRateResult { base: "USD".into(), currency, rate, fetched_at: Utc::now() };
    Ok(HttpResponse::Ok()
        .insert_header(("X-RateLimit-Limit", limiter.max_requests().to_string()))
        .insert_header(("X-RateLimit-Remaining", remaining.to_string()))
        .json(result))
}

//------------------------------------------   Event extraction  ------------------------------------------------
/// Best-effort extraction of event-page data (title, date, location, etc) from a URL.
///
/// If the caller supplies the HTML, no network access happens at all. Extraction itself is pure
/// and never guesses: any field it cannot find comes back null.
#[post("/extract_event")]
pub async fn extract_event(
    body: web::Json<ExtractEventRequest>,
    pages: web::Data<EventPageClient>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let platform = detect_platform(&request.url);
    debug!("💻️ Event extraction requested for {} (platform: {})", request.url, platform.as_str());
    let html = match request.html {
        Some(html) => html,
        None => pages.fetch_html(&request.url).await?,
    };
    let data = extract_event_data(&html, &request.url);
    let response = serde_json::json!({
        "success": data.is_some(),
        "platform": platform.as_str(),
        "data": data,
    });
    Ok(HttpResponse::Ok().json(response))
}
