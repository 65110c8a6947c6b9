//! # Telemetry Ingestion Module
//!
//! WebSocket listener that receives telemetry from the simulator.
//!
//! This module handles:
//! - Listening on the configured host/port
//! - Serving one simulator connection at a time
//! - Decoding each message and replacing the stored snapshot
//! - Discarding malformed messages without touching the store
//! - Returning to listening when the simulator disconnects
//! - Pinging a silent simulator and dropping it when nothing comes back
//! - Stopping within one poll interval once shutdown is requested
//!
//! Further connection attempts wait in the listen backlog while a simulator
//! is connected.

use futures::{Sink, SinkExt, Stream, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, trace, warn};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::shutdown::ShutdownSignal;
use crate::telemetry::snapshot::{decode_snapshot, decode_snapshot_bytes};
use crate::telemetry::StateStore;

/// What happened to a single inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// Decoded and written to the store
    Applied,
    /// Not a telemetry record; store untouched
    Discarded,
    /// Control frame with no telemetry content
    Ignored,
    /// Peer is closing the connection
    Close,
}

/// Why a connection stopped being served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEnd {
    /// Peer closed or the transport failed
    Closed,
    /// Shutdown was requested
    Shutdown,
}

/// Per-connection message counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub applied: u64,
    pub discarded: u64,
}

/// Telemetry WebSocket server
///
/// # Examples
///
/// ```no_run
/// use terradrive_dash::config::ServerConfig;
/// use terradrive_dash::server::TelemetryServer;
/// use terradrive_dash::shutdown::ShutdownSignal;
/// use terradrive_dash::telemetry::StateStore;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let store = StateStore::new();
///     let shutdown = ShutdownSignal::new();
///     let server = TelemetryServer::bind(&ServerConfig::default(), store, shutdown).await?;
///     server.run().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TelemetryServer {
    listener: TcpListener,
    store: StateStore,
    shutdown: ShutdownSignal,
    poll_interval: Duration,
    handshake_timeout: Duration,
    keepalive: Duration,
}

impl TelemetryServer {
    /// Bind the listening socket
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be resolved or bound
    pub async fn bind(config: &ServerConfig, store: StateStore, shutdown: ShutdownSignal) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

        Ok(Self {
            listener,
            store,
            shutdown,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            handshake_timeout: Duration::from_millis(config.handshake_timeout_ms),
            keepalive: Duration::from_millis(config.keepalive_ms),
        })
    }

    /// Address actually bound (useful when the configured port is 0)
    ///
    /// # Errors
    ///
    /// Returns error if the socket address cannot be queried
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve simulator connections until shutdown.
    ///
    /// Connection failures are logged and never end the loop.
    pub async fn run(self) {
        match self.listener.local_addr() {
            Ok(addr) => info!("Listening for simulator telemetry on ws://{}", addr),
            Err(e) => warn!("Listening for simulator telemetry (address unavailable: {})", e),
        }

        loop {
            let (stream, peer) = match self
                .shutdown
                .until_triggered(self.listener.accept(), self.poll_interval)
                .await
            {
                None => break,
                Some(Ok(accepted)) => accepted,
                Some(Err(e)) => {
                    warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(self.poll_interval).await;
                    continue;
                }
            };

            debug!("TCP connection from {}, performing WebSocket handshake", peer);

            let handshake = tokio::time::timeout(
                self.handshake_timeout,
                tokio_tungstenite::accept_async(stream),
            );
            let websocket = match self.shutdown.until_triggered(handshake, self.poll_interval).await {
                None => break,
                Some(Ok(Ok(websocket))) => websocket,
                Some(Ok(Err(e))) => {
                    warn!("WebSocket handshake with {} failed: {}", peer, e);
                    continue;
                }
                Some(Err(_)) => {
                    warn!("WebSocket handshake with {} timed out", peer);
                    continue;
                }
            };

            info!("Simulator connected from {}", peer);

            let (pings, messages) = websocket.split();
            let (end, stats) = serve_connection(
                messages,
                pings,
                &self.store,
                &self.shutdown,
                self.poll_interval,
                self.keepalive,
            )
            .await;

            info!(
                "Simulator {} disconnected ({} snapshots applied, {} discarded)",
                peer, stats.applied, stats.discarded
            );

            if end == ConnectionEnd::Shutdown {
                break;
            }
        }

        info!("Telemetry listener stopped");
    }
}

/// Serve one connection's message stream until it ends or shutdown wins.
///
/// After `keepalive` without any inbound frame a ping goes out on `pings`;
/// if the peer stays silent for another `keepalive` it is treated as gone.
/// A transport error ends the connection like a close does; the store keeps
/// whatever it last held.
pub async fn serve_connection<S, P>(
    mut messages: S,
    mut pings: P,
    store: &StateStore,
    shutdown: &ShutdownSignal,
    poll_interval: Duration,
    keepalive: Duration,
) -> (ConnectionEnd, ConnectionStats)
where
    S: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
    P: Sink<Message, Error = WsError> + Unpin,
{
    let mut stats = ConnectionStats::default();
    let mut deadline = Instant::now() + keepalive;
    let mut ping_pending = false;

    loop {
        let next = tokio::time::timeout_at(deadline, messages.next());
        let message = match shutdown.until_triggered(next, poll_interval).await {
            None => return (ConnectionEnd::Shutdown, stats),
            Some(Err(_)) if ping_pending => {
                warn!(
                    "Simulator silent for {:?} after keepalive ping, dropping connection",
                    keepalive
                );
                return (ConnectionEnd::Closed, stats);
            }
            Some(Err(_)) => {
                debug!("No telemetry for {:?}, sending keepalive ping", keepalive);
                let ping = tokio::time::timeout(keepalive, pings.send(Message::Ping(Vec::new())));
                match shutdown.until_triggered(ping, poll_interval).await {
                    None => return (ConnectionEnd::Shutdown, stats),
                    Some(Ok(Ok(()))) => {}
                    Some(Ok(Err(e))) => {
                        warn!("Keepalive ping failed: {}", e);
                        return (ConnectionEnd::Closed, stats);
                    }
                    Some(Err(_)) => {
                        warn!("Keepalive ping could not be sent within {:?}", keepalive);
                        return (ConnectionEnd::Closed, stats);
                    }
                }
                ping_pending = true;
                deadline = Instant::now() + keepalive;
                continue;
            }
            Some(Ok(None)) => return (ConnectionEnd::Closed, stats),
            Some(Ok(Some(Ok(message)))) => message,
            Some(Ok(Some(Err(e)))) => {
                warn!("Telemetry connection error: {}", e);
                return (ConnectionEnd::Closed, stats);
            }
        };

        // Any frame, pong included, proves the peer is alive
        ping_pending = false;
        deadline = Instant::now() + keepalive;

        match ingest_message(store, message) {
            Ingest::Applied => stats.applied += 1,
            Ingest::Discarded => stats.discarded += 1,
            Ingest::Ignored => {}
            Ingest::Close => return (ConnectionEnd::Closed, stats),
        }
    }
}

/// Decode one frame and, if it is a valid snapshot, store it.
pub fn ingest_message(store: &StateStore, message: Message) -> Ingest {
    let decoded = match message {
        Message::Text(text) => decode_snapshot(&text),
        Message::Binary(bytes) => decode_snapshot_bytes(&bytes),
        Message::Close(frame) => {
            debug!("Close frame received: {:?}", frame);
            return Ingest::Close;
        }
        _ => return Ingest::Ignored,
    };

    match decoded {
        Ok(snapshot) => {
            trace!("Snapshot: {:?}", snapshot);
            store.write(snapshot);
            Ingest::Applied
        }
        Err(e) => {
            warn!("Discarding telemetry message: {}", e);
            Ingest::Discarded
        }
    }
}
