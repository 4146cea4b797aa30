//! WebSocket transport for the signaling relay.
//!
//! Clients connect with `ws://host/?tenant=<tenant>&user=<handle>`; those
//! query values are the session context for every signal sent on the
//! connection. Each text frame is one signal.

use crate::calls::{SessionContext, SignalRouter};
use crate::directory::ChannelDirectory;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// Accepts WebSocket sessions and feeds their frames to the router.
pub struct RelayServer {
    router: Arc<SignalRouter>,
    directory: Arc<ChannelDirectory>,
}

impl RelayServer {
    pub fn new(router: Arc<SignalRouter>, directory: Arc<ChannelDirectory>) -> Arc<Self> {
        Arc::new(Self { router, directory })
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> anyhow::Result<()> {
        info!("Listening for signaling sessions on {}", listener.local_addr()?);
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = self.clone();
            tokio::spawn(async move {
                if let Err(e) = server.handle_connection(stream, peer).await {
                    debug!("Session from {peer} ended with error: {e}");
                }
            });
        }
    }

    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) -> anyhow::Result<()> {
        let mut ctx = SessionContext::default();
        let ws = accept_hdr_async(
            stream,
            |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                ctx = session_context_from_query(req.uri().query());
                Ok(resp)
            },
        )
        .await?;
        let (mut sink, mut frames) = ws.split();

        // Sessions without an identity can still send; the router drops
        // their signals. They are never reachable.
        let registration = match ctx.resolve() {
            Ok((tenant, handle)) => {
                let (session, rx) = self.directory.register(tenant, handle);
                info!("Session opened for {handle} in tenant {tenant} ({peer})");
                Some((tenant.to_string(), handle.to_string(), session, rx))
            }
            Err(_) => {
                warn!("Session from {peer} has no tenant or user; it will not receive signals");
                None
            }
        };

        let (registration, write_pump) = match registration {
            Some((tenant, handle, session, mut rx)) => {
                let pump = tokio::spawn(async move {
                    while let Some(payload) = rx.recv().await {
                        if let Err(e) = sink.send(Message::text(payload)).await {
                            debug!("Write to session failed: {e}");
                            break;
                        }
                    }
                });
                (Some((tenant, handle, session)), Some(pump))
            }
            None => (None, None),
        };

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    self.router.submit(ctx.clone(), text.to_string());
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Binary(data)) => {
                    debug!("Ignoring {} byte binary frame from {peer}", data.len());
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Read from {peer} failed: {e}");
                    break;
                }
            }
        }

        if let Some((tenant, handle, session)) = registration {
            self.directory.unregister(&tenant, &handle, session);
            info!("Session closed for {handle} in tenant {tenant}");
        }
        if let Some(pump) = write_pump {
            pump.abort();
        }
        Ok(())
    }
}

/// Read `tenant` and `user` from a percent-encoded query string.
pub fn session_context_from_query(query: Option<&str>) -> SessionContext {
    let mut ctx = SessionContext::default();
    for pair in query.unwrap_or_default().split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let Ok(value) = urlencoding::decode(&value.replace('+', " ")).map(|v| v.into_owned())
        else {
            continue;
        };
        match key {
            "tenant" => ctx.tenant_id = Some(value),
            "user" => ctx.sender_handle = Some(value),
            _ => {}
        }
    }
    ctx
}
