//! HTTP helpers for the feedback function.

use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, VARY,
};
use lambda_http::http::response::Builder;
use lambda_http::{Body, Response};
use serde::Serialize;

use crate::Error;

/// Methods advertised to browsers on preflight.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
/// Request headers advertised to browsers on preflight.
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Attach CORS headers for an already-validated origin.
///
/// `None` leaves the builder untouched, so the browser refuses to expose the response.
pub fn with_cors(builder: Builder, origin: Option<&str>) -> Builder {
    match origin {
        Some(origin) => builder
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, origin)
            .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
            .header(ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS)
            .header(VARY, "Origin"),
        None => builder,
    }
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
    cors: Option<&str>,
) -> Result<Response<Body>, lambda_http::Error> {
    let body = serde_json::to_string(data)?;
    Ok(with_cors(Response::builder().status(status), cors)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))?)
}

/// Create a response without a body.
pub fn empty_response(status: u16, cors: Option<&str>) -> Result<Response<Body>, lambda_http::Error> {
    Ok(with_cors(Response::builder().status(status), cors).body(Body::Empty)?)
}

/// Create a plain text response. Never carries CORS headers.
pub fn text_response(status: u16, text: &str) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(text.to_string()))?)
}

/// Turn a request error into its HTTP response.
///
/// Method errors are plain text; everything else is a JSON object with an `error` field.
pub fn error_response(err: &Error, cors: Option<&str>) -> Result<Response<Body>, lambda_http::Error> {
    match err {
        Error::MethodNotAllowed => text_response(err.status_code(), "Method Not Allowed"),
        _ => json_response(err.status_code(), &err.body(), cors),
    }
}
