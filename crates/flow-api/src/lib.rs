//! Client for the Flow payment API (flow.cl).
//!
//! Every outbound request carries a canonical HMAC-SHA256 signature over its
//! parameters, so the remote verifier can recompute it byte-for-byte.
//! Confirmation webhooks are validated by re-fetching the referenced resource
//! from Flow — the notification body itself is never trusted.
//!
//! # Quick example
//!
//! ```no_run
//! use flow_api::{Client, Config, OrderRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), flow_api::FlowError> {
//! let client = Client::new(Config::new("your-api-key", "your-secret-key"));
//!
//! let created = client
//!     .create_order(&OrderRequest {
//!         commerce_order: "order-1001".into(),
//!         subject: "Monthly subscription".into(),
//!         amount: 12990,
//!         payer_email: "payer@example.com".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("redirect the payer to {}", created.payment_url());
//! # Ok(())
//! # }
//! ```
//!
//! For webhook handling see [`Client::confirm_order`] and
//! [`Client::confirm_refund`], or the `flow-api-actix` crate for ready-made
//! actix-web handlers.

pub mod client;
pub mod constants;
pub mod error;
pub mod order;
pub mod refund;
pub mod signature;
pub mod webhook;

pub use client::{Client, Config, Mode};
pub use constants::{PRODUCTION_URL, SANDBOX_URL};
pub use error::FlowError;
pub use order::{EmailOrder, Order, OrderRequest, OrderResponse, OrderStatus};
pub use refund::{RefundRequest, RefundState, RefundStatus};
pub use webhook::ConfirmationOutcome;
