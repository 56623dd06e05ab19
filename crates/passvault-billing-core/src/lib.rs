//! Passvault Billing Core - PayHere billing logic
//!
//! Gateway signing, the payment webhook reconciler, checkout form creation
//! and payment history.
//!
//! # Example
//!
//! ```rust,ignore
//! use passvault_billing_core::{BillingService, PayHereConfig, PayHereNotification};
//! use passvault_db::Repositories;
//!
//! let config = PayHereConfig::new("LKR").with_credentials("1211149", "secret");
//! let billing = BillingService::new(&repos, config);
//!
//! let notification = PayHereNotification::from_value(body)?;
//! let outcome = billing.process_notification(notification).await?;
//! ```

pub mod checkout;
pub mod config;
pub mod error;
pub mod notification;
pub mod order;
pub mod service;
pub mod signature;
pub mod webhook;

pub use checkout::{CheckoutForm, CheckoutRequest};
pub use config::{is_supported_currency, Credentials, PayHereConfig, SUPPORTED_CURRENCIES};
pub use error::BillingError;
pub use notification::PayHereNotification;
pub use order::OrderId;
pub use service::BillingService;
pub use webhook::{WebhookOutcome, WebhookReconciler};
