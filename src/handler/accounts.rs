//! Account create, read and delete handlers
//!
//! Each handler works on an already-extracted `account_id` and the shared
//! store. The identifier always comes from the query string.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};

use super::error::ApiError;
use crate::account::AccountData;
use crate::config::AppState;
use crate::http;

pub const ACCOUNT_ID_PARAM: &str = "account_id";

/// Extract a non-empty `account_id` from the query string
pub fn account_id_param<B>(req: &Request<B>) -> Result<String, ApiError> {
    http::query::first_value(req.uri().query(), ACCOUNT_ID_PARAM)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingParameter)
}

/// Decode the body and store it under `account_id`, replacing any record
/// already there. The body's own `id` must match exactly.
pub async fn create_account<B>(
    account_id: String,
    body: B,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_size = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);
    let payload =
        http::read_body(body, max_size, state.config.http.body_read_timeout_ms).await?;

    let account = AccountData::from_json(&payload)?;
    if account.id != account_id {
        return Err(ApiError::IdMismatch {
            query: account_id,
            body: account.id,
        });
    }

    let response = http::build_json_response(StatusCode::CREATED, &account);
    state.store.put(account_id, account).await;
    Ok(response)
}

pub async fn fetch_account(
    account_id: String,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ApiError> {
    match state.store.get(&account_id).await {
        Some(account) => Ok(http::build_json_response(StatusCode::OK, &account)),
        None => Err(ApiError::NotFound(account_id)),
    }
}

/// Remove the record and echo it back. Answers 201, not 200.
pub async fn delete_account(
    account_id: String,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ApiError> {
    match state.store.remove(&account_id).await {
        Some(account) => Ok(http::build_json_response(StatusCode::CREATED, &account)),
        None => Err(ApiError::NotFound(account_id)),
    }
}
