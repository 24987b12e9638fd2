pub mod booking;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod payment;
pub mod principal;
pub mod user;

pub use error::DomainError;
pub use principal::{Auth, Principal};
