//! REST API handlers

pub mod account;
pub mod activity;
pub mod admin;
pub mod health;
pub mod payment;
pub mod share;
pub mod subscription;
pub mod team;
pub mod vault;

pub use account::*;
pub use activity::*;
pub use admin::*;
pub use health::*;
pub use payment::*;
pub use share::*;
pub use subscription::*;
pub use team::*;
pub use vault::*;
