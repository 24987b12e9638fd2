pub mod analytics_repo;
pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod database;
pub mod error;
pub mod events;
pub mod rows;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepository;
pub use app_config::Config;
pub use booking_repo::BookingRepository;
pub use catalog_repo::CatalogRepository;
pub use database::PgClient;
pub use events::{EventProducer, EventPublisher};
pub use user_repo::UserRepository;

/// Transaction handle threaded through every mutating repository call on the
/// booking path. No repository function opens its own transaction.
pub type PgTx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
