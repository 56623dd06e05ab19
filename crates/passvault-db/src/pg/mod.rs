//! PostgreSQL repository implementations

mod account;
mod activity;
mod payment;
mod share;
mod team;
mod vault;

pub use account::PgAccountRepository;
pub use activity::PgActivityLogRepository;
pub use payment::PgPaymentRepository;
pub use share::PgShareRepository;
pub use team::PgTeamRepository;
pub use vault::PgVaultItemRepository;
