//! Passvault Types - Shared domain types
//!
//! This crate contains domain types used across passvault crates:
//! - Subscription tiers, the tier catalog and quotas
//! - Capabilities and entitlement check results
//! - Accounts, roles and derived subscription status
//! - Payment records, vault items and activity logs
//! - Teams and password shares

pub mod account;
pub mod activity;
pub mod entitlement;
pub mod payment;
pub mod subscription;
pub mod team;
pub mod tier;
pub mod vault;

pub use account::*;
pub use activity::*;
pub use entitlement::*;
pub use payment::*;
pub use subscription::*;
pub use team::*;
pub use tier::*;
pub use vault::*;
