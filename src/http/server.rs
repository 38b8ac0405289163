//! HTTP server setup and the image handler.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all image handler
//! - Wire up middleware (request ID, tracing, timeout, CORS)
//! - Validate identifiers and hand them to the race fetcher
//! - Serve with graceful shutdown

use axum::{
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::fetch::RaceFetcher;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::http::response::{image_response, preflight_response, ProxyError};
use crate::observability::metrics;
use crate::security::{headers, Identifier};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<RaceFetcher>,
    pub max_id_length: usize,
    pub cache_control: Arc<str>,
}

/// HTTP server for the image proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let fetcher = Arc::new(RaceFetcher::new(config.upstream.clone())?);

        let state = AppState {
            fetcher,
            max_id_length: config.identifier.max_length,
            cache_control: config.response.cache_control().into(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(image_handler))
            .route("/", any(image_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(headers::allow_any_origin())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            extensions = ?self.config.upstream.extensions,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: `/{id}` resolves to an image on the upstream store.
async fn image_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    request_headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_headers.request_id().to_string();

    let response = match serve_image(&state, &request_id, &method, uri.path()).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn serve_image(
    state: &AppState,
    request_id: &str,
    method: &Method,
    path: &str,
) -> Result<Response, ProxyError> {
    if method == Method::OPTIONS {
        return Ok(preflight_response());
    }
    if method != Method::GET {
        return Err(ProxyError::MethodNotAllowed);
    }

    let raw_id = path.strip_prefix('/').unwrap_or(path);
    let id = Identifier::parse(raw_id, state.max_id_length).inspect_err(|_| {
        tracing::warn!(request_id = %request_id, path = %path, "Rejected invalid image ID");
    })?;

    tracing::debug!(request_id = %request_id, id = %id, "Request for image");

    match state.fetcher.fetch_first(&id).await {
        Ok(hit) => {
            tracing::info!(
                request_id = %request_id,
                id = %id,
                extension = %hit.extension,
                content_type = %hit.image.content_type_lossy(),
                bytes = hit.image.bytes.len(),
                "Served image"
            );
            Ok(image_response(hit.image, &state.cache_control))
        }
        Err(miss) => {
            tracing::info!(
                request_id = %request_id,
                id = %id,
                reasons = %miss.summary(),
                "Image not found"
            );
            Err(miss.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "http://127.0.0.1:9/u/".into();
        config.upstream.race_timeout_ms = 1_000;
        HttpServer::new(config).unwrap().router()
    }

    async fn send(method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn preflight_answers_with_cors() {
        let response = send(Method::OPTIONS, "/abc").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-allow-methods"], "GET");
        assert_eq!(response.headers()["access-control-allow-headers"], "*");
    }

    #[tokio::test]
    async fn other_methods_rejected() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let response = send(method.clone(), "/abc").await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(response.headers()["access-control-allow-origin"], "*");
        }
    }

    #[tokio::test]
    async fn invalid_ids_rejected() {
        for uri in ["/", "/a.b", "/a/b", "/a%2Fb", "/..", "/../etc/passwd"] {
            let response = send(Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(response.headers()["access-control-allow-origin"], "*");
        }

        let too_long = format!("/{}", "a".repeat(101));
        assert_eq!(send(Method::GET, &too_long).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let response = send(Method::OPTIONS, "/abc").await;
        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }
}
