//! Core domain entities representing the user dataset.
//!
//! Two shapes exist for every user entry:
//!
//! - [`RawUser`] / [`RawPage`] - the nested shape returned by the upstream provider
//! - [`UserRecord`] - the flat canonical shape served to clients and stored in cache
//!
//! Raw entities are transient: they live only between a page fetch and its
//! normalization inside the aggregator.

pub mod raw_user;
pub mod user;

pub use raw_user::{RawLocation, RawLogin, RawName, RawPage, RawUser};
pub use user::{RecordSet, UserRecord, normalize};
