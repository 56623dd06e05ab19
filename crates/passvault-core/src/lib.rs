//! Passvault Core - Entitlement business logic
//!
//! The entitlement gate every privileged operation consults, quota checks,
//! and the account, admin, vault item, team, sharing and activity log
//! services built on top of it.

pub mod account;
pub mod activity;
pub mod admin;
pub mod error;
pub mod gate;
pub mod share;
pub mod team;
pub mod vault;

pub use account::*;
pub use activity::*;
pub use admin::*;
pub use error::*;
pub use gate::*;
pub use share::*;
pub use team::*;
pub use vault::*;
