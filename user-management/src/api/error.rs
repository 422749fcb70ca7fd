//! Error types for the admin REST client

use std::fmt;

use reqwest::Method;
use serde::Deserialize;
use thiserror::Error;

use crate::model::Headers;

/// The request a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API base, e.g. `api/admin/users`
    pub path: String,
    /// Absolute URL the request was sent to
    pub url: String,
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A validation error on a single field of a submitted entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub object_name: String,
    pub field: String,
    pub message: String,
}

/// Problem document returned by the backend on failures.
///
/// Every member is optional; bodies that are not problem documents simply
/// do not parse.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub field_errors: Option<Vec<FieldError>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// A non-2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub headers: Headers,
    /// Raw response body
    pub body: String,
    /// The body, if it parsed as a problem document
    pub problem: Option<Problem>,
}

impl ErrorResponse {
    pub fn new(status: u16, headers: Headers, body: impl Into<String>) -> Self {
        let body = body.into();
        let problem = serde_json::from_str(&body).ok();
        Self {
            status,
            headers,
            body,
            problem,
        }
    }
}

/// Errors from a single REST call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// The connection could not be established (treated as status 0)
    #[error("Network Error: {message}")]
    Unreachable { request: RequestInfo, message: String },

    /// The server answered with a non-2xx status
    #[error("Request failed with status code {}", .response.status)]
    Status {
        request: RequestInfo,
        response: ErrorResponse,
    },

    /// The request produced no usable response: timeout, undecodable body,
    /// or missing protocol headers
    #[error("{message}")]
    NoResponse { request: RequestInfo, message: String },
}

impl RequestError {
    /// The request that failed.
    pub fn request(&self) -> &RequestInfo {
        match self {
            RequestError::Unreachable { request, .. }
            | RequestError::Status { request, .. }
            | RequestError::NoResponse { request, .. } => request,
        }
    }

    /// HTTP status; `0` when the server was not reachable, `None` when no
    /// response arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Unreachable { .. } => Some(0),
            RequestError::Status { response, .. } => Some(response.status),
            RequestError::NoResponse { .. } => None,
        }
    }

    /// The error response, if the server sent one.
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            RequestError::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    pub(crate) fn no_response(request: &RequestInfo, message: impl Into<String>) -> Self {
        RequestError::NoResponse {
            request: request.clone(),
            message: message.into(),
        }
    }

    /// Classify a transport error from reqwest.
    pub(crate) fn from_transport(request: &RequestInfo, error: reqwest::Error) -> Self {
        if error.is_connect() {
            RequestError::Unreachable {
                request: request.clone(),
                message: error.to_string(),
            }
        } else if error.is_timeout() {
            Self::no_response(request, format!("timeout exceeded: {request}"))
        } else if error.is_decode() {
            Self::no_response(request, format!("invalid response body: {error}"))
        } else {
            Self::no_response(request, error.to_string())
        }
    }
}
