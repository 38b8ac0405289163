//! Response building and error-to-status mapping.
//!
//! Only a handful of outcomes are visible to clients: the image itself,
//! 400 for a bad identifier, 404 when no candidate produced an image,
//! 405 for unsupported methods and the 200 preflight answer.

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::fetch::{FetchedImage, NoCandidateFound};
use crate::security::headers::preflight_headers;
use crate::security::InvalidIdentifier;

/// Errors that end a request early.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid ID")]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("Image not found")]
    NotFound(#[from] NoCandidateFound),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// 200 with the image body and caching headers.
pub fn image_response(image: FetchedImage, cache_control: &str) -> Response {
    let mut response = Response::new(Body::from(image.bytes));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, image.content_type);
    if let Ok(value) = HeaderValue::from_str(cache_control) {
        headers.insert(CACHE_CONTROL, value);
    }
    response
}

/// 200 CORS preflight answer with no body.
pub fn preflight_response() -> Response {
    (StatusCode::OK, preflight_headers()).into_response()
}
