//! Upstream (provider) representation of a page of users.

use serde::{Deserialize, Deserializer};

/// Decodes an explicit `null` the same way as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of users as returned by the upstream provider.
///
/// Only the `results` array is read; any `info` block is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawUser>,
}

impl RawPage {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A single upstream user entry restricted to `gender,name,location,login` (+ email).
///
/// Absent or `null` fields decode to empty strings so a sparse entry never fails the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUser {
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: RawName,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: RawLocation,
    #[serde(deserialize_with = "null_as_default")]
    pub login: RawLogin,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawName {
    #[serde(deserialize_with = "null_as_default")]
    pub first: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last: String,
}

/// Upstream location block. Street, coordinates and timezone are not requested.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLogin {
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,
}
