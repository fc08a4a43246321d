//! Payment orders: wire model and accessors.

use crate::client::Client;
use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle states Flow reports for an order.
///
/// The wire value is a small integer. Anything outside the documented range
/// is kept as [`OrderStatus::Unrecognized`] so it can never be mistaken for
/// a paid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum OrderStatus {
    AwaitingPayment,
    Payed,
    Rejected,
    Canceled,
    Unrecognized(i64),
}

impl From<i64> for OrderStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => OrderStatus::AwaitingPayment,
            2 => OrderStatus::Payed,
            3 => OrderStatus::Rejected,
            4 => OrderStatus::Canceled,
            other => OrderStatus::Unrecognized(other),
        }
    }
}

impl From<OrderStatus> for i64 {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::AwaitingPayment => 1,
            OrderStatus::Payed => 2,
            OrderStatus::Rejected => 3,
            OrderStatus::Canceled => 4,
            OrderStatus::Unrecognized(other) => other,
        }
    }
}

impl Default for OrderStatus {
    /// A missing status is unrecognized, not "awaiting payment".
    fn default() -> Self {
        OrderStatus::Unrecognized(0)
    }
}

/// Point-in-time snapshot of a payment order as returned by the status
/// endpoints. The authoritative copy lives on Flow's side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    /// Order ID assigned by Flow.
    pub flow_order: i64,
    /// Order ID assigned by the commerce.
    pub commerce_order: String,
    /// Creation date, `yyyy-mm-dd hh:mm:ss`.
    pub request_date: String,
    pub status: OrderStatus,
    /// What the payment is for.
    pub subject: String,
    pub currency: String,
    pub amount: String,
    #[serde(rename = "payer")]
    pub payer_email: String,
    pub optional: Option<OptionalFields>,
    #[serde(rename = "pending_info")]
    pub pending_info: Option<PendingInfo>,
    pub payment_data: Option<PaymentData>,
    /// Set when a merchant acts as middleman in the payment.
    pub merchant_id: String,
}

/// Extra identifiers the commerce attached to the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionalFields {
    /// RUT (Rol Único Tributario), the Chilean national tax identifier.
    #[serde(rename = "RUT")]
    pub rut: String,
    #[serde(rename = "ID")]
    pub id: String,
}

/// Set while a payment medium is still waiting on the payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingInfo {
    pub media: String,
    /// Pending since, `yyyy-mm-dd hh:mm:ss`.
    pub date: String,
}

/// Details of a completed payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentData {
    pub date: String,
    pub media: String,
    /// Date of the currency conversion, when more than one currency was
    /// involved.
    pub conversion_date: String,
    pub conversion_rate: f64,
    pub amount: String,
    pub currency: String,
    pub fee: String,
    /// Amount minus fee.
    pub balance: i64,
    pub transfer_date: String,
}

/// Fields for creating a new payment order.
///
/// `commerce_order`, `subject`, `amount` and `payer_email` are mandatory;
/// creation fails locally (no network) when any of them is empty or zero.
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
    pub commerce_order: String,
    pub subject: String,
    pub currency: Option<String>,
    pub amount: u64,
    pub payer_email: String,
    /// Allowed payment methods. Flow defaults to 9 (all methods).
    pub payment_method: Option<u32>,
    /// Where Flow sends the confirmation webhook.
    pub confirmation_url: Option<String>,
    /// Where the payer lands after paying.
    pub return_url: Option<String>,
    /// Seconds the order stays active.
    pub timeout_seconds: Option<u64>,
    pub merchant_id: Option<String>,
    /// Forces the payer to pay in a specific currency.
    pub payment_currency: Option<String>,
}

impl OrderRequest {
    fn validate(&self, operation: &'static str) -> Result<(), FlowError> {
        if self.commerce_order.is_empty()
            || self.subject.is_empty()
            || self.amount == 0
            || self.payer_email.is_empty()
        {
            return Err(FlowError::Validation { operation });
        }
        Ok(())
    }

    fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("commerceOrder".to_string(), self.commerce_order.clone());
        params.insert("subject".to_string(), self.subject.clone());
        params.insert("amount".to_string(), self.amount.to_string());
        params.insert("email".to_string(), self.payer_email.clone());
        if let Some(currency) = &self.currency {
            params.insert("currency".to_string(), currency.clone());
        }
        if let Some(method) = self.payment_method {
            params.insert("paymentMethod".to_string(), method.to_string());
        }
        if let Some(url) = &self.confirmation_url {
            params.insert("urlConfirmation".to_string(), url.clone());
        }
        if let Some(url) = &self.return_url {
            params.insert("urlReturn".to_string(), url.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            params.insert("timeout".to_string(), timeout.to_string());
        }
        if let Some(merchant) = &self.merchant_id {
            params.insert("merchantId".to_string(), merchant.clone());
        }
        if let Some(currency) = &self.payment_currency {
            params.insert("payment_currency".to_string(), currency.clone());
        }
        params
    }
}

/// Returned when an order is created successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub flow_order: i64,
    /// Token identifying the order in later lookups and webhooks.
    pub token: String,
    /// Base payment URL; see [`OrderResponse::payment_url`].
    pub url: String,
}

impl OrderResponse {
    /// Address the payer should be redirected to.
    pub fn payment_url(&self) -> String {
        format!("{}?token={}", self.url, self.token)
    }
}

/// Returned when an email-delivered order is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailOrder {
    pub flow_order: i64,
    pub token: String,
}

impl Client {
    /// Fetch an order by the token Flow issued for it.
    pub async fn get_order(&self, token: &str) -> Result<Order, FlowError> {
        let params = BTreeMap::from([("token".to_string(), token.to_string())]);
        self.get_json("getOrder", "/payment/getStatus", params).await
    }

    /// Fetch an order by the ID the commerce assigned at creation.
    pub async fn get_order_by_commerce_id(&self, commerce_id: &str) -> Result<Order, FlowError> {
        let params = BTreeMap::from([("commerceId".to_string(), commerce_id.to_string())]);
        self.get_json(
            "getOrderByCommerceId",
            "/payment/getStatusByCommerceId",
            params,
        )
        .await
    }

    /// Fetch an order by the numeric ID Flow assigned.
    pub async fn get_order_by_flow_order(&self, flow_order: i64) -> Result<Order, FlowError> {
        let params = BTreeMap::from([("flowOrder".to_string(), flow_order.to_string())]);
        self.get_json(
            "getOrderByFlowOrder",
            "/payment/getStatusByFlowOrder",
            params,
        )
        .await
    }

    /// Create a payment order. The payer completes it at
    /// [`OrderResponse::payment_url`].
    pub async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse, FlowError> {
        request.validate("createOrder")?;
        self.post_json("createOrder", "/payment/create", request.params())
            .await
    }

    /// Create an order that Flow delivers to the payer by email.
    pub async fn create_email_order(&self, request: &OrderRequest) -> Result<EmailOrder, FlowError> {
        request.validate("createEmailOrder")?;
        self.post_json("createEmailOrder", "/payment/createEmail", request.params())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Config;

    fn valid_request() -> OrderRequest {
        OrderRequest {
            commerce_order: "order-1001".to_string(),
            subject: "Subscription".to_string(),
            amount: 12990,
            payer_email: "payer@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn status_maps_documented_codes() {
        assert_eq!(OrderStatus::from(1), OrderStatus::AwaitingPayment);
        assert_eq!(OrderStatus::from(2), OrderStatus::Payed);
        assert_eq!(OrderStatus::from(3), OrderStatus::Rejected);
        assert_eq!(OrderStatus::from(4), OrderStatus::Canceled);
    }

    #[test]
    fn unknown_status_codes_stay_unrecognized() {
        assert_eq!(OrderStatus::from(9), OrderStatus::Unrecognized(9));
        assert_eq!(OrderStatus::from(-1), OrderStatus::Unrecognized(-1));
        assert_ne!(OrderStatus::from(9), OrderStatus::Payed);
    }

    #[tokio::test]
    async fn create_order_fails_locally_on_missing_fields() {
        // Unroutable base: a network attempt would fail with Transport, so a
        // Validation error proves no request was issued.
        let client =
            Client::with_base_url(Config::new("k", "s"), "http://127.0.0.1:1/api").unwrap();

        let mut request = valid_request();
        request.commerce_order.clear();
        let err = client.create_order(&request).await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::Validation {
                operation: "createOrder"
            }
        ));

        let mut request = valid_request();
        request.amount = 0;
        let err = client.create_email_order(&request).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation { .. }));
    }

    #[test]
    fn params_stringify_and_skip_unset_optionals() {
        let mut request = valid_request();
        request.timeout_seconds = Some(3600);
        let params = request.params();

        assert_eq!(params.get("amount").map(String::as_str), Some("12990"));
        assert_eq!(params.get("timeout").map(String::as_str), Some("3600"));
        assert_eq!(
            params.get("email").map(String::as_str),
            Some("payer@example.com")
        );
        assert!(!params.contains_key("currency"));
        assert!(!params.contains_key("merchantId"));
    }

    #[test]
    fn order_decodes_from_wire_json() {
        let order: Order = serde_json::from_str(
            r#"{
                "flowOrder": 7717,
                "commerceOrder": "order-1001",
                "requestDate": "2026-08-01 10:30:00",
                "status": 2,
                "subject": "Subscription",
                "amount": "12990",
                "payer": "payer@example.com",
                "paymentData": {"media": "webpay", "amount": "12990", "balance": 12700}
            }"#,
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::Payed);
        assert_eq!(order.flow_order, 7717);
        assert_eq!(order.payer_email, "payer@example.com");
        let data = order.payment_data.unwrap();
        assert_eq!(data.media, "webpay");
        assert_eq!(data.balance, 12700);
        assert!(order.pending_info.is_none());
    }

    #[test]
    fn payment_url_appends_token() {
        let response = OrderResponse {
            flow_order: 1,
            token: "tok".to_string(),
            url: "https://sandbox.flow.cl/app/web/pay.php".to_string(),
        };
        assert_eq!(
            response.payment_url(),
            "https://sandbox.flow.cl/app/web/pay.php?token=tok"
        );
    }
}
