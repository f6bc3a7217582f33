use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::state::AppState;

pub fn util_routes() -> Router<AppState> {
    Router::new().route("/echo", post(echo))
}

/// POST /echo — returns the raw request body verbatim as text/plain.
/// Bodies that are not valid UTF-8 are a server error, matching the system
/// this demo reproduces.
#[instrument(skip(body))]
pub async fn echo(body: Bytes) -> Result<impl IntoResponse, (StatusCode, String)> {
    let text = String::from_utf8(body.to_vec()).map_err(|e| {
        warn!(error = %e, "echo body is not valid UTF-8");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

pub const TYPES_OK: &str = "all types check out";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("parameter `{parameter}` is not of type {expected}")]
pub struct TypeCheckError {
    pub parameter: &'static str,
    pub expected: &'static str,
}

/// Checks that the four values are a string, an integer, a float and a
/// boolean, in that order, reporting the first mismatch. Integers do not
/// pass as floats and vice versa.
pub fn check_types(a: &Value, b: &Value, c: &Value, d: &Value) -> Result<&'static str, TypeCheckError> {
    if !a.is_string() {
        return Err(TypeCheckError { parameter: "a", expected: "string" });
    }
    if !(b.is_i64() || b.is_u64()) {
        return Err(TypeCheckError { parameter: "b", expected: "integer" });
    }
    if !c.is_f64() {
        return Err(TypeCheckError { parameter: "c", expected: "float" });
    }
    if !d.is_boolean() {
        return Err(TypeCheckError { parameter: "d", expected: "boolean" });
    }
    Ok(TYPES_OK)
}
