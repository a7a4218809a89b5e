//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path check, method dispatch,
//! error mapping and access logging.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};

use super::accounts;
use super::error::ApiError;
use crate::config::AppState;
use crate::http::{self, BodyError};
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| new_access_entry(&req, remote_addr));

    let mut response = if matches_collection_path(req.uri().path(), &state.config.api.base_path) {
        serve_collection(req, &state).await
    } else {
        // Unrouted paths never reach the account handlers
        let err = ApiError::UnknownPath(req.uri().path().to_string());
        logger::log_debug(&err.to_string());
        err.to_response(state.config.api.silent_missing_param)
    };
    http::set_server_header(&mut response, &state.config.http.server_name);

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Serve a request on the accounts collection, logging its method and status
async fn serve_collection<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    logger::log_request_method(req.method());

    let silent_missing_param = state.config.api.silent_missing_param;
    let response = match route_request(req, state).await {
        Ok(response) => response,
        Err(err) => {
            logger::log_warning(&format!(
                "{err} (status {})",
                err.status(silent_missing_param).as_u16()
            ));
            err.to_response(silent_missing_param)
        }
    };
    logger::log_response_status(response.status().as_u16());
    response
}

/// Route a collection request by method
async fn route_request<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    match method {
        Method::GET => {
            let account_id = accounts::account_id_param(&req)?;
            accounts::fetch_account(account_id, state).await
        }
        Method::POST => {
            let account_id = accounts::account_id_param(&req)?;
            check_declared_length(&req, state.config.http.max_body_size)?;
            accounts::create_account(account_id, req.into_body(), state).await
        }
        Method::DELETE => {
            let account_id = accounts::account_id_param(&req)?;
            accounts::delete_account(account_id, state).await
        }
        other => Err(ApiError::MethodNotAllowed(other)),
    }
}

/// Accept the collection path itself or exactly one segment below it.
///
/// The segment is not used; the identifier comes from the query string.
fn matches_collection_path(path: &str, base_path: &str) -> bool {
    let base = base_path.trim_end_matches('/');
    match path.strip_prefix(base) {
        Some("" | "/") => true,
        Some(rest) => rest
            .strip_prefix('/')
            .is_some_and(|segment| !segment.contains('/')),
        None => false,
    }
}

/// Reject a declared `Content-Length` above the limit before reading anything
fn check_declared_length<B>(req: &Request<B>, max_body_size: u64) -> Result<(), ApiError> {
    let Some(content_length) = req.headers().get(CONTENT_LENGTH) else {
        return Ok(());
    };
    match content_length.to_str().map(str::parse::<u64>) {
        Ok(Ok(size)) if size > max_body_size => {
            let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
            Err(BodyError::TooLarge(limit).into())
        }
        Ok(Ok(_)) => Ok(()),
        _ => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            Ok(())
        }
    }
}

fn new_access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    let header = |name: hyper::header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
