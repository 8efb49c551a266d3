//! Upstream user provider integration.

mod random_user_client;

pub use random_user_client::{RandomUserClient, UPSTREAM_FIELDS};
