//! TLS WebSocket listener and per-connection driver

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use medlive_broadcaster::Session;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::protocol::ProtocolHandler;

/// How long a finished connection waits for queued frames to flush
const WRITER_DRAIN: Duration = Duration::from_secs(2);

/// Accepts encrypted WebSocket connections
pub struct TranscriptListener {
    listener: TcpListener,
    acceptor: TlsAcceptor,
    ctx: AppContext,
}

impl TranscriptListener {
    pub async fn bind(address: &str, acceptor: TlsAcceptor, ctx: AppContext) -> Result<Self> {
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;

        info!("Listening on wss://{}", listener.local_addr()?);
        Ok(Self {
            listener,
            acceptor,
            ctx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per client
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "TCP connection accepted");
                    let acceptor = self.acceptor.clone();
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        let handshake = async {
                            let tls = acceptor.accept(stream).await.context("TLS handshake failed")?;
                            tokio_tungstenite::accept_async(tls)
                                .await
                                .context("WebSocket handshake failed")
                        };

                        match tokio::time::timeout(ctx.handshake_timeout, handshake).await {
                            Ok(Ok(ws)) => serve_session(ctx, ws, peer).await,
                            Ok(Err(e)) => warn!(%peer, "Rejected connection: {:#}", e),
                            Err(_) => warn!(%peer, "Handshake timed out"),
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept client: {}", e);
                }
            }
        }
    }
}

/// Upgrade a raw byte stream and serve it (no TLS; used behind other transports and in tests)
pub async fn serve_connection<S>(ctx: AppContext, stream: S, peer: SocketAddr) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let ws = tokio_tungstenite::accept_async(stream)
        .await
        .context("WebSocket handshake failed")?;
    serve_session(ctx, ws, peer).await;
    Ok(())
}

/// Drive one session from registration to unregistration
pub async fn serve_session<S>(ctx: AppContext, ws: WebSocketStream<S>, peer: SocketAddr)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (session, endpoint) = Session::open(peer, ctx.outbound_queue);
    let id = session.id();
    if ctx.broadcaster.register(session).is_err() {
        warn!(%peer, "Broadcaster is gone, refusing client");
        return;
    }
    info!(session_id = %id, %peer, "Client connected");

    let evicted = endpoint.closed();
    let (replies, mut frames) = endpoint.split();
    let (mut sink, mut inbound) = ws.split();

    // Sole writer for this socket
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if let Err(e) = sink.send(Message::text(frame.to_string())).await {
                debug!(session_id = %id, "Write failed: {}", e);
                return;
            }
        }
        let _ = sink.close().await;
    });

    let mut handler = ProtocolHandler::new(ctx.clone(), replies);
    loop {
        tokio::select! {
            _ = evicted.cancelled() => {
                info!(session_id = %id, "Session evicted after failed delivery");
                break;
            }
            message = inbound.next() => match message {
                Some(Ok(Message::Text(text))) => handler.on_text(text.as_str()),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(session_id = %id, "Read failed: {}", e);
                    break;
                }
            },
        }
    }

    handler.close();
    drop(handler);
    let _ = ctx.broadcaster.unregister(id);
    info!(session_id = %id, %peer, "Client disconnected");

    if tokio::time::timeout(WRITER_DRAIN, &mut writer).await.is_err() {
        writer.abort();
    }
}
