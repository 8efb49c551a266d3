//! HTTP request handlers.

pub mod health;
pub mod users;

pub use health::health_handler;
pub use users::users_handler;
