//! Confirmation webhook decision logic.
//!
//! Flow notifies the commerce with a bare token; the token proves nothing by
//! itself. Acceptance is gated on re-fetching the resource from Flow and
//! checking its authoritative status, so an attacker posting forged
//! notifications can at worst trigger a lookup — never a confirmation.
//!
//! This module is framework-agnostic: it takes the raw notification body and
//! returns a [`ConfirmationOutcome`] the hosting HTTP layer maps to a status
//! code. The `flow-api-actix` crate provides ready-made actix-web handlers.

use crate::client::Client;
use crate::constants::TOKEN_FIELD;
use crate::error::FlowError;
use crate::order::{Order, OrderStatus};
use crate::refund::{RefundState, RefundStatus};
use std::future::Future;

/// Terminal outcome of handling one confirmation notification.
///
/// No error escapes the confirmation methods; every path maps to an outcome,
/// and the response to the notifier carries a status code only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Resolved status qualifies; the callback has run.
    Confirmed,
    /// The notification body was malformed; no lookup was attempted.
    BadRequest,
    /// Resolved status does not qualify; the callback did not run.
    /// A legitimate negative outcome, not a failure.
    Unqualified,
    /// The authoritative lookup failed.
    UpstreamError,
}

impl ConfirmationOutcome {
    /// HTTP status code to answer the notifier with.
    pub fn status_code(self) -> u16 {
        match self {
            ConfirmationOutcome::Confirmed => 200,
            ConfirmationOutcome::BadRequest => 400,
            ConfirmationOutcome::Unqualified => 401,
            ConfirmationOutcome::UpstreamError => 500,
        }
    }
}

/// Pull the token out of a form-encoded notification body.
///
/// Exactly one non-empty `token` field must be present; anything else is a
/// malformed notification.
fn extract_token(body: &[u8]) -> Option<String> {
    let mut token = None;
    for (name, value) in url::form_urlencoded::parse(body) {
        if name == TOKEN_FIELD {
            if token.is_some() {
                return None;
            }
            token = Some(value.into_owned());
        }
    }
    token.filter(|t| !t.is_empty())
}

/// Shared confirmation flow: extract the token, resolve it against Flow,
/// classify, and invoke the callback at most once.
async fn confirm<T, Fut>(
    body: &[u8],
    resolve: impl FnOnce(String) -> Fut,
    qualifies: impl FnOnce(&T) -> bool,
    on_accepted: impl FnOnce(T),
) -> ConfirmationOutcome
where
    Fut: Future<Output = Result<T, FlowError>>,
{
    let Some(token) = extract_token(body) else {
        tracing::warn!("confirmation notification without a usable token field");
        return ConfirmationOutcome::BadRequest;
    };

    let resolved = match resolve(token).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, "authoritative lookup failed during confirmation");
            return ConfirmationOutcome::UpstreamError;
        }
    };

    if qualifies(&resolved) {
        on_accepted(resolved);
        ConfirmationOutcome::Confirmed
    } else {
        ConfirmationOutcome::Unqualified
    }
}

impl Client {
    /// Handle an order confirmation notification.
    ///
    /// `body` is the raw form-encoded POST body Flow sent. The order is
    /// re-fetched by token; `on_accepted` runs exactly once, synchronously,
    /// iff the authoritative status is [`OrderStatus::Payed`], before the
    /// outcome is returned.
    pub async fn confirm_order(
        &self,
        body: &[u8],
        on_accepted: impl FnOnce(Order),
    ) -> ConfirmationOutcome {
        confirm(
            body,
            |token| async move { self.get_order(&token).await },
            |order: &Order| order.status == OrderStatus::Payed,
            on_accepted,
        )
        .await
    }

    /// Handle a refund confirmation notification.
    ///
    /// `on_accepted` runs exactly once iff the authoritative status is
    /// [`RefundState::Accepted`] or [`RefundState::Refunded`] — both mean the
    /// refund was approved, at different processing stages.
    pub async fn confirm_refund(
        &self,
        body: &[u8],
        on_accepted: impl FnOnce(RefundStatus),
    ) -> ConfirmationOutcome {
        confirm(
            body,
            |token| async move { self.get_refund_status(&token).await },
            |refund: &RefundStatus| {
                matches!(refund.status, RefundState::Accepted | RefundState::Refunded)
            },
            on_accepted,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn order_with(status: OrderStatus) -> Order {
        Order {
            status,
            ..Default::default()
        }
    }

    fn refund_with(status: RefundState) -> RefundStatus {
        RefundStatus {
            status,
            ..Default::default()
        }
    }

    fn is_payed(order: &Order) -> bool {
        order.status == OrderStatus::Payed
    }

    fn is_approved(refund: &RefundStatus) -> bool {
        matches!(refund.status, RefundState::Accepted | RefundState::Refunded)
    }

    #[test]
    fn token_extraction_requires_exactly_one_value() {
        assert_eq!(extract_token(b"token=abc").as_deref(), Some("abc"));
        assert_eq!(
            extract_token(b"other=1&token=abc&more=2").as_deref(),
            Some("abc")
        );
        assert_eq!(extract_token(b""), None);
        assert_eq!(extract_token(b"other=1"), None);
        assert_eq!(extract_token(b"token="), None);
        assert_eq!(extract_token(b"token=a&token=b"), None);
        assert_eq!(extract_token(b"token=a&token=a"), None);
    }

    #[test]
    fn outcomes_map_to_documented_status_codes() {
        assert_eq!(ConfirmationOutcome::Confirmed.status_code(), 200);
        assert_eq!(ConfirmationOutcome::BadRequest.status_code(), 400);
        assert_eq!(ConfirmationOutcome::Unqualified.status_code(), 401);
        assert_eq!(ConfirmationOutcome::UpstreamError.status_code(), 500);
    }

    #[tokio::test]
    async fn payed_order_runs_callback_exactly_once() {
        let invoked = Cell::new(0);
        let outcome = confirm(
            b"token=abc",
            |token| async move {
                assert_eq!(token, "abc");
                Ok::<_, FlowError>(order_with(OrderStatus::Payed))
            },
            is_payed,
            |order| {
                assert_eq!(order.status, OrderStatus::Payed);
                invoked.set(invoked.get() + 1);
            },
        )
        .await;

        assert_eq!(outcome, ConfirmationOutcome::Confirmed);
        assert_eq!(invoked.get(), 1);
    }

    #[tokio::test]
    async fn non_payed_orders_never_run_callback() {
        for status in [
            OrderStatus::AwaitingPayment,
            OrderStatus::Rejected,
            OrderStatus::Canceled,
            OrderStatus::Unrecognized(7),
        ] {
            let invoked = Cell::new(false);
            let outcome = confirm(
                b"token=abc",
                |_| async move { Ok::<_, FlowError>(order_with(status)) },
                is_payed,
                |_| invoked.set(true),
            )
            .await;

            assert_eq!(outcome, ConfirmationOutcome::Unqualified, "{status:?}");
            assert!(!invoked.get(), "{status:?}");
        }
    }

    #[tokio::test]
    async fn accepted_and_refunded_refunds_qualify() {
        for status in [RefundState::Accepted, RefundState::Refunded] {
            let invoked = Cell::new(0);
            let outcome = confirm(
                b"token=r-1",
                |_| async move { Ok::<_, FlowError>(refund_with(status)) },
                is_approved,
                |_| invoked.set(invoked.get() + 1),
            )
            .await;

            assert_eq!(outcome, ConfirmationOutcome::Confirmed, "{status:?}");
            assert_eq!(invoked.get(), 1, "{status:?}");
        }
    }

    #[tokio::test]
    async fn other_refund_states_do_not_qualify() {
        for status in [
            RefundState::Created,
            RefundState::Rejected,
            RefundState::Canceled,
            RefundState::Unrecognized,
        ] {
            let invoked = Cell::new(false);
            let outcome = confirm(
                b"token=r-1",
                |_| async move { Ok::<_, FlowError>(refund_with(status)) },
                is_approved,
                |_| invoked.set(true),
            )
            .await;

            assert_eq!(outcome, ConfirmationOutcome::Unqualified, "{status:?}");
            assert!(!invoked.get(), "{status:?}");
        }
    }

    #[tokio::test]
    async fn malformed_body_skips_the_lookup() {
        for body in [&b"token=a&token=b"[..], &b"other=1"[..], &b""[..]] {
            let looked_up = Cell::new(false);
            let invoked = Cell::new(false);
            let outcome = confirm(
                body,
                |_| {
                    looked_up.set(true);
                    async { Ok::<_, FlowError>(order_with(OrderStatus::Payed)) }
                },
                is_payed,
                |_| invoked.set(true),
            )
            .await;

            assert_eq!(outcome, ConfirmationOutcome::BadRequest);
            assert!(!looked_up.get());
            assert!(!invoked.get());
        }
    }

    #[tokio::test]
    async fn lookup_failure_is_an_upstream_error() {
        let invoked = Cell::new(false);
        let outcome = confirm(
            b"token=abc",
            |_| async {
                Err::<Order, _>(FlowError::Status {
                    operation: "getOrder",
                    status: 503,
                })
            },
            is_payed,
            |_| invoked.set(true),
        )
        .await;

        assert_eq!(outcome, ConfirmationOutcome::UpstreamError);
        assert!(!invoked.get());
    }
}
