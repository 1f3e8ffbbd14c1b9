//----------------------------------------------   dLocal webhook  ----------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info, trace, warn};
use vixis_payment_engine::{
    db_types::PaymentReceipt,
    helpers::extract_invoice_number,
    traits::InvoiceStore,
    InvoiceFlowApi,
    InvoiceFlowError,
    PaymentOutcome,
};

use crate::{
    data_objects::{JsonResponse, PaymentNotification},
    errors::ServerError,
    route,
};

route!(dlocal_webhook => Post "dlocal" impl InvoiceStore);
/// Handles dLocal payment-status notifications.
///
/// The signature middleware has already verified the `Authorization` header against the raw body
/// by the time this handler runs. Responses follow dLocal's retry contract: 2xx acknowledges the
/// notification; any other status causes the provider to redeliver it later.
pub async fn dlocal_webhook<B: InvoiceStore>(
    req: HttpRequest,
    body: web::Json<PaymentNotification>,
    api: web::Data<InvoiceFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("📬️ Received dLocal webhook request: {}", req.uri());
    let notification = body.into_inner();
    if !notification.is_paid() {
        info!(
            "📬️ Payment {} for reference '{}' is in status {}. Nothing to do yet.",
            notification.id, notification.order_id, notification.status
        );
        return Ok(HttpResponse::Ok()
            .json(JsonResponse::success(format!("Notification acknowledged. Status is {}.", notification.status))));
    }
    let Some(invoice_number) = extract_invoice_number(&notification.order_id) else {
        warn!("📬️ Could not find an invoice number in payment reference '{}'.", notification.order_id);
        return Err(ServerError::InvalidRequestBody(format!(
            "No invoice number found in reference '{}'.",
            notification.order_id
        )));
    };
    debug!("📬️ Payment {} references invoice {invoice_number}", notification.id);
    let receipt = PaymentReceipt::new(notification.id.clone(), notification.created_date);
    let payer = notification.payer_info();
    let outcome = api.confirm_payment(&invoice_number.clone().into(), receipt, payer).await.map_err(|e| match e {
        InvoiceFlowError::NotFound(key) => {
            warn!("📬️ Payment {} references unknown invoice {key}.", notification.id);
            ServerError::NoRecordFound(format!("No invoice matching {key}"))
        },
        InvoiceFlowError::Store(e) => {
            warn!("📬️ Could not process payment {}. {e}", notification.id);
            ServerError::BackendError(e.to_string())
        },
    })?;
    let response = match outcome {
        PaymentOutcome::Paid(invoice) => {
            info!("📬️ Invoice {} marked as paid by payment {}.", invoice.invoice_number, notification.id);
            JsonResponse::success(format!("Invoice {} marked as paid.", invoice.invoice_number))
        },
        PaymentOutcome::AlreadyPaid(invoice) => {
            info!(
                "📬️ Invoice {} was already processed. Acknowledging duplicate notification {}.",
                invoice.invoice_number, notification.id
            );
            JsonResponse::success(format!("Invoice {} was already processed.", invoice.invoice_number))
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
