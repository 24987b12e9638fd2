pub mod client;
pub mod clickstream_repo;
pub mod models;
pub mod review_repo;

pub use client::DocStore;
pub use clickstream_repo::ClickstreamRepository;
pub use review_repo::ReviewRepository;
