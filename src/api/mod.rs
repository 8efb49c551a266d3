//! HTTP layer for request/response handling.
//!
//! A thin transport over [`crate::application::services::UsersService`].
//!
//! # Modules
//!
//! - [`dto`] - Response bodies
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
