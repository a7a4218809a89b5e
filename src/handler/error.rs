//! Request-level errors and their HTTP mapping
//!
//! Every failure is answered inside the request that caused it. The detail in
//! the `Display` text goes to the log; the client only gets the short body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use thiserror::Error;

use crate::http::{self, BodyError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("url param 'account_id' is missing")]
    MissingParameter,
    #[error("malformed account body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("body id '{body}' does not match account_id '{query}'")]
    IdMismatch { query: String, body: String },
    #[error("account '{0}' not found")]
    NotFound(String),
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
    #[error("no route for path {0}")]
    UnknownPath(String),
    #[error(transparent)]
    Body(#[from] BodyError),
}

impl ApiError {
    /// Status code the client will see.
    ///
    /// A missing parameter is 200 only in legacy mode, where the response is
    /// also empty.
    pub fn status(&self, silent_missing_param: bool) -> StatusCode {
        match self {
            Self::MissingParameter if silent_missing_param => StatusCode::OK,
            Self::MissingParameter
            | Self::MalformedBody(_)
            | Self::IdMismatch { .. }
            | Self::NotFound(_)
            | Self::Body(BodyError::Read(_)) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnknownPath(_) => StatusCode::NOT_FOUND,
            Self::Body(BodyError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Body(BodyError::Timeout(_)) => StatusCode::REQUEST_TIMEOUT,
        }
    }

    pub fn to_response(&self, silent_missing_param: bool) -> Response<Full<Bytes>> {
        match self {
            Self::MissingParameter if silent_missing_param => http::build_empty_response(),
            Self::UnknownPath(_) => http::build_404_response(),
            Self::MethodNotAllowed(_) => http::build_405_response(),
            Self::Body(BodyError::TooLarge(_)) => http::build_413_response(),
            Self::Body(BodyError::Timeout(_)) => http::build_408_response(),
            _ => http::build_400_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss_is_400_not_404() {
        let err = ApiError::NotFound("acc-1".to_string());
        assert_eq!(err.status(false), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "account 'acc-1' not found");
    }

    #[test]
    fn test_missing_parameter_modes() {
        assert_eq!(ApiError::MissingParameter.status(false), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingParameter.status(true), StatusCode::OK);
    }

    #[test]
    fn test_silent_mode_only_affects_missing_parameter() {
        let err = ApiError::IdMismatch {
            query: "a".to_string(),
            body: "b".to_string(),
        };
        assert_eq!(err.status(true), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MethodNotAllowed(Method::PUT).status(true),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_body_errors() {
        assert_eq!(
            ApiError::from(BodyError::TooLarge(10)).status(false),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(BodyError::Timeout(5)).status(false),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ApiError::from(BodyError::Read("reset".to_string())).status(false),
            StatusCode::BAD_REQUEST
        );
    }
}
