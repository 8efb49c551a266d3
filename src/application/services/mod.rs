//! Business logic services for the application layer.

pub mod aggregator;
pub mod users_service;

pub use aggregator::{AggregateReport, Aggregator};
pub use users_service::{CacheStatus, DatasetSettings, UsersPayload, UsersService};
