//! Handler for the bulk user dataset.

use axum::{
    extract::State,
    http::{HeaderName, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Response header telling whether the dataset came from cache.
pub static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Returns every user record as a JSON array.
///
/// # Endpoint
///
/// `GET /users`
///
/// # Request Flow
///
/// 1. Read the dataset key from the cache store
/// 2. On hit, relay the cached JSON unchanged
/// 3. On miss, aggregate all upstream pages concurrently, encode, store, relay
///
/// # Response
///
/// ```json
/// [
///   {
///     "gender": "female",
///     "first_name": "Ada",
///     "last_name": "Lovelace",
///     "email": "ada@example.com",
///     "city": "London",
///     "country": "United Kingdom",
///     "uuid": "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed"
///   }
/// ]
/// ```
///
/// The `x-cache` header is `HIT` or `MISS`.
///
/// # Errors
///
/// Returns 500 Internal Server Error if the cache store fails on read or write.
pub async fn users_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let payload = state.users_service.get_users().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (X_CACHE.clone(), payload.status.as_str()),
        ],
        payload.body,
    ))
}
