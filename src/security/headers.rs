//! CORS response headers.
//!
//! Every response carries `Access-Control-Allow-Origin: *`. Preflight
//! (`OPTIONS`) responses additionally advertise the allowed method and headers.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Layer that stamps `Access-Control-Allow-Origin: *` on every response.
pub fn allow_any_origin() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"))
}

/// Headers for a CORS preflight answer.
pub fn preflight_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers
}
