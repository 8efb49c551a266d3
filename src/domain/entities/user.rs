//! Canonical user record served by the API and stored in cache.

use serde::{Deserialize, Serialize};

use super::raw_user::RawUser;

/// A flattened, normalized user entry.
///
/// Field names are the wire names of the public API and of the cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub gender: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub uuid: String,
}

/// Records produced by one aggregation cycle.
///
/// Order reflects page completion order and carries no meaning for clients.
pub type RecordSet = Vec<UserRecord>;

/// Maps an upstream user entry into its canonical shape.
pub fn normalize(raw: RawUser) -> UserRecord {
    UserRecord {
        gender: raw.gender,
        first_name: raw.name.first,
        last_name: raw.name.last,
        email: raw.email,
        city: raw.location.city,
        country: raw.location.country,
        uuid: raw.login.uuid,
    }
}

impl From<RawUser> for UserRecord {
    fn from(raw: RawUser) -> Self {
        normalize(raw)
    }
}
