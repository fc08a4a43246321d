//! actix-web adapters for Flow confirmation webhooks.
//!
//! Mount these as POST routes at the URLs registered with Flow
//! (`urlConfirmation` on orders, `urlCallBack` on refunds). All decision
//! logic lives in `flow-api`; this crate only translates outcomes into
//! empty-bodied HTTP responses.
//!
//! ```no_run
//! use actix_web::{web, App};
//! use std::sync::Arc;
//!
//! # fn demo(client: Arc<flow_api::Client>) {
//! let app = App::new().route(
//!     "/flow/confirm",
//!     web::post().to(flow_api_actix::order_confirmation(
//!         client,
//!         Arc::new(|order: flow_api::Order| {
//!             println!("order {} payed", order.commerce_order);
//!         }),
//!     )),
//! );
//! # }
//! ```

use actix_web::{web, HttpResponse};
use flow_api::{Client, ConfirmationOutcome, Order, RefundStatus};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

fn respond(outcome: ConfirmationOutcome) -> HttpResponse {
    match outcome {
        ConfirmationOutcome::Confirmed => HttpResponse::Ok().finish(),
        ConfirmationOutcome::BadRequest => HttpResponse::BadRequest().finish(),
        ConfirmationOutcome::Unqualified => HttpResponse::Unauthorized().finish(),
        ConfirmationOutcome::UpstreamError => HttpResponse::InternalServerError().finish(),
    }
}

/// Build a handler for order confirmation notifications.
///
/// The handler is invoked once per notification; each invocation re-fetches
/// the order by token and calls `on_accepted` at most once, only when the
/// authoritative status is `Payed`.
pub fn order_confirmation<F>(
    client: Arc<Client>,
    on_accepted: Arc<F>,
) -> impl Fn(web::Bytes) -> BoxFuture<'static, HttpResponse> + Clone
where
    F: Fn(Order) + Send + Sync + 'static,
{
    move |body: web::Bytes| {
        let client = Arc::clone(&client);
        let on_accepted = Arc::clone(&on_accepted);
        async move {
            let outcome = client
                .confirm_order(&body, |order| on_accepted(order))
                .await;
            respond(outcome)
        }
        .boxed()
    }
}

/// Build a handler for refund confirmation notifications.
///
/// `on_accepted` runs at most once per notification, only when the
/// authoritative refund status is `Accepted` or `Refunded`.
pub fn refund_confirmation<F>(
    client: Arc<Client>,
    on_accepted: Arc<F>,
) -> impl Fn(web::Bytes) -> BoxFuture<'static, HttpResponse> + Clone
where
    F: Fn(RefundStatus) + Send + Sync + 'static,
{
    move |body: web::Bytes| {
        let client = Arc::clone(&client);
        let on_accepted = Arc::clone(&on_accepted);
        async move {
            let outcome = client
                .confirm_refund(&body, |refund| on_accepted(refund))
                .await;
            respond(outcome)
        }
        .boxed()
    }
}
