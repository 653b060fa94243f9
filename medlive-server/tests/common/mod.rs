//! Shared fixtures for session-level tests
//!
//! Connections run over in-memory duplex pipes with a plain WebSocket
//! upgrade, so no certificates or ports are needed.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use medlive_broadcaster::Broadcaster;
use medlive_engine::{PromptCell, WorkerState, WorkerStatus};
use medlive_server::config::ServerConfig;
use medlive_server::context::AppContext;
use medlive_server::listener::serve_connection;
use serde_json::Value;
use tokio::io::DuplexStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

pub type Client = WebSocketStream<DuplexStream>;

/// Long enough for any in-process delivery
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Context with a running broadcaster loop and the given worker state
pub fn start_context(worker: WorkerState) -> AppContext {
    start_context_with(ServerConfig::default(), worker)
}

pub fn start_context_with(config: ServerConfig, worker: WorkerState) -> AppContext {
    let (broadcaster, handle) = Broadcaster::new();
    tokio::spawn(broadcaster.run());

    let status = WorkerStatus::new();
    if worker != WorkerState::Starting {
        status.transition(WorkerState::Running);
        status.transition(worker);
    }
    AppContext::new(&config, PromptCell::new(), status, handle)
}

/// Open a client connection served by `ctx`
pub async fn connect(ctx: &AppContext, port: u16) -> Client {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let peer: SocketAddr = format!("10.0.0.5:{port}").parse().unwrap();
    tokio::spawn(serve_connection(ctx.clone(), server_io, peer));

    let (ws, _response) = tokio_tungstenite::client_async("ws://localhost/", client_io)
        .await
        .expect("client handshake");
    ws
}

/// Wait until the registry holds exactly `expected` sessions
pub async fn wait_for_sessions(ctx: &AppContext, expected: usize) {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    loop {
        let count = ctx.broadcaster.session_count().await.unwrap();
        if count == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {expected} sessions, registry holds {count}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Next text frame parsed as JSON
pub async fn recv_json(ws: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .expect("read failed");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("frame is JSON");
        }
    }
}

/// Assert nothing arrives within `window`
pub async fn assert_silent(ws: &mut Client, window: Duration) {
    if let Ok(Some(Ok(frame))) = tokio::time::timeout(window, ws.next()).await {
        panic!("unexpected frame: {frame:?}");
    }
}

pub async fn send_text(ws: &mut Client, text: &str) {
    ws.send(Message::text(text.to_string())).await.expect("send failed");
}

/// Write a self-signed `localhost` certificate and key into `dir`
pub fn write_identity(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let identity = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_path = dir.join("server.crt");
    let key_path = dir.join("server.key");
    std::fs::write(&cert_path, identity.cert.pem()).unwrap();
    std::fs::write(&key_path, identity.key_pair.serialize_pem()).unwrap();
    (cert_path, key_path)
}
