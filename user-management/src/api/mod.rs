//! REST client for the user administration API
//!
//! Every endpoint is one [`Call`]. Successful calls decode into a
//! [`Response`]; failures are classified into [`RequestError`] so the
//! notification pipeline can tell unreachable servers, error statuses and
//! missing responses apart.

mod client;
mod error;

pub use client::{AdminClient, Backend, Call, ClientConfig, Data, Response, DEFAULT_TIMEOUT};
pub use error::{ErrorResponse, FieldError, Problem, RequestError, RequestInfo};
