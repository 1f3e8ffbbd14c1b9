//! dLocal signature middleware for Actix Web.
//!
//! dLocal signs every webhook call with HMAC-SHA256 over the concatenation of the API login, the
//! `X-Date` header and the raw request body, and sends the result in the `Authorization` header
//! as `V2-HMAC-SHA256, Signature: <hex digest>`.
//!
//! Wrap the webhook scope with this middleware to verify the signature before any handler runs.
//! The body must be compared against the exact bytes received, so the middleware extracts the
//! raw payload, verifies it, and re-injects it for the downstream handler.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorUnauthorized},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use vixis_common::Secret;

use crate::helpers::calculate_signature;

pub struct SignatureMiddlewareFactory {
    x_login: String,
    key: Secret<String>,
    // If false, then the middleware will not check the signature and always allow the call
    enabled: bool,
}

impl SignatureMiddlewareFactory {
    pub fn new(x_login: &str, key: Secret<String>, enabled: bool) -> Self {
        SignatureMiddlewareFactory { x_login: x_login.into(), key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService {
            x_login: self.x_login.clone(),
            key: self.key.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct SignatureMiddlewareService<S> {
    x_login: String,
    key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.reveal().clone();
        let x_login = self.x_login.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking signature for request");
            if !enabled {
                trace!("🔐️ Signature checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let x_date = req
                .headers()
                .get("X-Date")
                .and_then(|v| v.to_str().ok())
                .map(String::from)
                .ok_or_else(|| {
                    warn!("🔐️ No X-Date header found in request.");
                    ErrorBadRequest("Missing X-Date header.")
                })?;
            let authorization =
                req.headers().get("Authorization").and_then(|v| v.to_str().ok()).map(String::from).ok_or_else(
                    || {
                        warn!("🔐️ No Authorization header found in request.");
                        ErrorBadRequest("Missing Authorization header.")
                    },
                )?;
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ErrorBadRequest("Failed to extract request data.")
            })?;
            let expected = calculate_signature(&secret, &x_login, &x_date, data.as_ref());
            if authorization == expected {
                trace!("🔐️ Signature check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid signature found in request. Denying access.");
                trace!("🔐️ Expected signature header: {expected}");
                Err(ErrorUnauthorized("Invalid signature."))
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
