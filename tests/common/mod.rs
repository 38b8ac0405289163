//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use image_proxy::config::ProxyConfig;
use image_proxy::{HttpServer, Shutdown};

/// How the mock upstream answers one path.
#[derive(Clone)]
pub enum Reply {
    /// Status, optional content type, body, delay before answering.
    Respond {
        status: u16,
        content_type: Option<&'static str>,
        body: Vec<u8>,
        delay: Duration,
    },
    /// 302 to another location.
    Redirect(&'static str),
    /// Accept the connection and never answer.
    Hang,
}

impl Reply {
    pub fn image(content_type: &'static str, body: &[u8]) -> Self {
        Reply::Respond {
            status: 200,
            content_type: Some(content_type),
            body: body.to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Reply::Respond {
            status,
            content_type: Some("text/plain"),
            body: b"nope".to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(self, by: Duration) -> Self {
        match self {
            Reply::Respond { status, content_type, body, .. } => Reply::Respond {
                status,
                content_type,
                body,
                delay: by,
            },
            other => other,
        }
    }
}

/// A mock upstream store serving canned replies per path; unknown paths 404.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<String, Reply>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
        );
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let head = String::from_utf8_lossy(&buf[..n]);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    counter.fetch_add(1, Ordering::SeqCst);

                    let reply = routes.get(&path).cloned().unwrap_or(Reply::status(404));
                    match reply {
                        Reply::Hang => {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                        }
                        Reply::Redirect(location) => {
                            let head = format!(
                                "HTTP/1.1 302 Found\r\nLocation: {}\r\n\
                                 Content-Length: 0\r\nConnection: close\r\n\r\n",
                                location
                            );
                            let _ = socket.write_all(head.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        Reply::Respond { status, content_type, body, delay } => {
                            tokio::time::sleep(delay).await;
                            let mut head = format!(
                                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                                status,
                                reason(status),
                                body.len()
                            );
                            if let Some(ct) = content_type {
                                head.push_str(&format!("Content-Type: {}\r\n", ct));
                            }
                            head.push_str("\r\n");
                            let _ = socket.write_all(head.as_bytes()).await;
                            let _ = socket.write_all(&body).await;
                            let _ = socket.shutdown().await;
                        }
                    }
                });
            }
        });

        Self { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/u/", self.addr)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Proxy config pointed at `upstream` with a short race deadline.
pub fn config_for(upstream: &MockUpstream, race_timeout_ms: u64) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = upstream.base_url();
    config.upstream.race_timeout_ms = race_timeout_ms;
    config
}

/// Start the proxy on an ephemeral port. Returns its address and the shutdown handle.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
