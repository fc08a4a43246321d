//! Refunds: wire model and accessors.

use crate::client::Client;
use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle states Flow reports for a refund.
///
/// Wire values are lowercase strings; anything unknown lands on
/// [`RefundState::Unrecognized`] and never qualifies as approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundState {
    /// Created and awaiting processing.
    Created,
    /// Accepted and ready to be transferred.
    Accepted,
    Rejected,
    /// Accepted and transferred.
    Refunded,
    Canceled,
    #[default]
    #[serde(other)]
    Unrecognized,
}

/// Fields for requesting a refund.
///
/// All four fields are mandatory; creation fails locally (no network) when
/// any of them is empty or zero.
#[derive(Debug, Clone, Default)]
pub struct RefundRequest {
    /// Commerce ID of the order being refunded.
    pub commerce_order: String,
    /// Email of the payer receiving the refund.
    pub receiver_email: String,
    pub amount: u64,
    /// Where Flow sends the refund confirmation webhook.
    pub callback_url: String,
}

impl RefundRequest {
    fn validate(&self, operation: &'static str) -> Result<(), FlowError> {
        if self.commerce_order.is_empty()
            || self.receiver_email.is_empty()
            || self.amount == 0
            || self.callback_url.is_empty()
        {
            return Err(FlowError::Validation { operation });
        }
        Ok(())
    }

    fn params(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "refundCommerceOrder".to_string(),
                self.commerce_order.clone(),
            ),
            ("receiverEmail".to_string(), self.receiver_email.clone()),
            ("amount".to_string(), self.amount.to_string()),
            ("urlCallBack".to_string(), self.callback_url.clone()),
        ])
    }
}

/// Point-in-time snapshot of a refund as returned by the refund endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefundStatus {
    /// Token identifying the refund in later lookups and webhooks.
    pub token: String,
    pub flow_refund_order: String,
    /// Creation date, `yyyy-mm-dd hh:mm:ss`.
    pub date: String,
    pub status: RefundState,
    pub amount: u64,
    pub fee: u64,
}

impl Client {
    /// Request a refund for a previously paid order.
    pub async fn create_refund(&self, request: &RefundRequest) -> Result<RefundStatus, FlowError> {
        request.validate("createRefund")?;
        self.post_json("createRefund", "/refund/create", request.params())
            .await
    }

    /// Cancel a pending refund request.
    pub async fn cancel_refund(&self, token: &str) -> Result<RefundStatus, FlowError> {
        let params = BTreeMap::from([("token".to_string(), token.to_string())]);
        self.post_json("cancelRefund", "/refund/cancel", params).await
    }

    /// Fetch the current status of a refund.
    pub async fn get_refund_status(&self, token: &str) -> Result<RefundStatus, FlowError> {
        let params = BTreeMap::from([("token".to_string(), token.to_string())]);
        self.get_json("getRefundStatus", "/refund/getStatus", params)
            .await
    }
}
