//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use mymovierate_gateway::{GatewayConfig, HttpServer, Shutdown};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// A request as seen by a stub upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct StubState {
    name: &'static str,
    status: StatusCode,
    received: Arc<Mutex<Vec<Recorded>>>,
}

/// A stub upstream that records every request and answers
/// `{"service": <name>, "path": <path>}` with a fixed status.
pub struct StubUpstream {
    pub name: &'static str,
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Recorded>>>,
}

impl StubUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<Recorded> {
        self.received.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.received().into_iter().map(|r| r.path_and_query).collect()
    }
}

async fn record(State(state): State<StubState>, request: Request<Body>) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    state.received.lock().unwrap().push(Recorded {
        method: parts.method.to_string(),
        path_and_query: path.clone(),
        headers: parts.headers,
        body: body.to_vec(),
    });

    (
        state.status,
        [("x-upstream", state.name)],
        Json(json!({ "service": state.name, "path": path })),
    )
}

/// Start a recording stub on an ephemeral port.
pub async fn start_stub_upstream(name: &'static str, status: StatusCode) -> StubUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new().fallback(record).with_state(StubState {
        name,
        status,
        received: received.clone(),
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubUpstream {
        name,
        addr,
        received,
    }
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// A silent upstream that reports when a forwarded request arrives and
/// when the gateway closes the connection carrying it.
pub struct WatchedUpstream {
    pub addr: SocketAddr,
    pub request_arrived: oneshot::Receiver<()>,
    pub connection_closed: oneshot::Receiver<()>,
}

pub async fn start_watched_upstream() -> WatchedUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (arrived_tx, request_arrived) = oneshot::channel();
    let (closed_tx, connection_closed) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut arrived_tx = Some(arrived_tx);
        let mut buf = [0u8; 1024];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if let Some(tx) = arrived_tx.take() {
                        let _ = tx.send(());
                    }
                }
            }
        }
        let _ = closed_tx.send(());
    });

    WatchedUpstream {
        addr,
        request_arrived,
        connection_closed,
    }
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// One stub per upstream service, all answering 200.
pub struct Stubs {
    pub auth: StubUpstream,
    pub film: StubUpstream,
    pub actor: StubUpstream,
    pub review: StubUpstream,
    pub user: StubUpstream,
    pub bot: StubUpstream,
}

impl Stubs {
    pub async fn start() -> Self {
        Self {
            auth: start_stub_upstream("auth", StatusCode::OK).await,
            film: start_stub_upstream("film", StatusCode::OK).await,
            actor: start_stub_upstream("actor", StatusCode::OK).await,
            review: start_stub_upstream("review", StatusCode::OK).await,
            user: start_stub_upstream("user", StatusCode::OK).await,
            bot: start_stub_upstream("bot", StatusCode::OK).await,
        }
    }

    pub fn all(&self) -> [&StubUpstream; 6] {
        [&self.auth, &self.film, &self.actor, &self.review, &self.user, &self.bot]
    }

    pub fn total_received(&self) -> usize {
        self.all().iter().map(|s| s.received().len()).sum()
    }

    pub fn config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.upstreams.auth = Some(self.auth.url());
        config.upstreams.film = Some(self.film.url());
        config.upstreams.actor = Some(self.actor.url());
        config.upstreams.review = Some(self.review.url());
        config.upstreams.user = Some(self.user.url());
        config.upstreams.bot = Some(self.bot.url());
        config
    }
}

/// A gateway running on an ephemeral port; stops when dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub async fn start(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HttpServer::new(config).expect("valid gateway config");

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self { addr, shutdown }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Send a request verbatim, bypassing client-side URL normalization.
    pub async fn raw_request(&self, request_line: &str) -> String {
        let request = format!(
            "{}\r\nHost: gateway.test\r\nConnection: close\r\n\r\n",
            request_line
        );
        self.send_raw(request.as_bytes()).await
    }

    /// Write `bytes` on a fresh connection and read until the gateway closes it.
    pub async fn send_raw(&self, bytes: &[u8]) -> String {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream.write_all(bytes).await.unwrap();

        let read_all = async {
            let mut response = Vec::new();
            let mut buf = [0u8; 4096];
            // A reset after the response still leaves the response readable.
            while let Ok(n) = stream.read(&mut buf).await {
                if n == 0 {
                    break;
                }
                response.extend_from_slice(&buf[..n]);
            }
            response
        };
        let response = tokio::time::timeout(Duration::from_secs(5), read_all)
            .await
            .expect("gateway answered");
        String::from_utf8_lossy(&response).into_owned()
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
