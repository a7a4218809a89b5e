//! HTTP response building module
//!
//! Builders for the handful of responses the accounts API emits. Error bodies
//! are short plain-text strings; success bodies are compact JSON.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::logger;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Build a JSON response with the given status.
///
/// Falls back to a 500 when the value cannot be serialized.
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(Full::new(Bytes::from(json)))
            .unwrap_or_else(|e| {
                log_build_error(status.as_str(), &e);
                Response::new(Full::new(Bytes::new()))
            }),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// Build a plain-text response
pub fn build_text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(body.as_bytes())))
        })
}

/// 200 with no body, used for the legacy missing-parameter behaviour
pub fn build_empty_response() -> Response<Full<Bytes>> {
    Response::new(Full::new(Bytes::new()))
}

pub fn build_400_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, "Bad Request")
}

pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 page not found\n")
}

pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = build_text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    response
        .headers_mut()
        .insert("Allow", HeaderValue::from_static("GET, POST, DELETE"));
    response
}

pub fn build_408_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::REQUEST_TIMEOUT, "Request Timeout")
}

pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Stamp the `Server` header; invalid names are skipped
pub fn set_server_header(response: &mut Response<Full<Bytes>>, server_name: &str) {
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(SERVER, value);
    }
}

fn log_build_error(status: &str, err: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {err}"));
}
