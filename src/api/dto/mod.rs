//! Data Transfer Objects for API responses.
//!
//! The dataset itself is served as the cached JSON string, so only the
//! health endpoint needs a dedicated DTO.

pub mod health;
