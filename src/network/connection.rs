//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!  FramedRead<IrcCodec> ──▶ Registry::dispatch ──▶ direct replies ─┐
//!                                                                  ▼
//!  mpsc::Receiver (messages from other sessions) ─────────▶ FramedWrite<IrcCodec>
//!  watch::Receiver (server shutdown) ──▶ ERROR, close              ▲
//!  keepalive interval ──▶ PING ────────────────────────────────────┘
//! ```
//!
//! Replies to the client's own commands are written directly rather than
//! through its queue, so a session never waits on itself.

use crate::config::Config;
use crate::handlers::{Context, HandlerError, Registry};
use crate::replies::Replies;
use crate::state::{Matrix, Session, Uid, normalize_host};
use futures_util::{SinkExt, StreamExt};
use minirc_proto::{IrcCodec, Message, ProtocolError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument, warn};

/// Per-connection limits taken from the configuration.
#[derive(Clone, Debug)]
pub struct ConnectionSettings {
    /// Outbound queue capacity.
    pub send_queue: usize,
    pub max_line_len: usize,
    /// Keepalive PING period; `None` disables keepalive.
    pub ping_interval: Option<Duration>,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            send_queue: config.limits.send_queue.max(1),
            max_line_len: config.limits.max_line_len,
            ping_interval: config.server.ping_interval(),
        }
    }
}

type Writer = FramedWrite<OwnedWriteHalf, IrcCodec>;

/// A client connection handler.
pub struct Connection {
    uid: Uid,
    addr: SocketAddr,
    stream: TcpStream,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
    settings: ConnectionSettings,
    shutdown: watch::Receiver<bool>,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        uid: Uid,
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
        settings: ConnectionSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            uid,
            addr,
            stream,
            matrix,
            registry,
            settings,
            shutdown,
        }
    }

    /// Run the connection until the client leaves, the socket fails, or the
    /// server shuts down. The session is always removed on the way out.
    #[instrument(skip(self), fields(uid = %self.uid, addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            uid,
            addr,
            stream,
            matrix,
            registry,
            settings,
            mut shutdown,
        } = self;

        let (tx, mut outgoing) = mpsc::channel::<Message>(settings.send_queue);
        matrix.register_session(Session::new(uid, normalize_host(addr.ip()), tx));
        info!(server = %matrix.server_info.name, "Client connected");

        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, IrcCodec::with_max_len(settings.max_line_len));
        let mut writer = FramedWrite::new(write_half, IrcCodec::with_max_len(settings.max_line_len));

        let mut keepalive = settings.ping_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        let outcome: Result<String, ProtocolError> = loop {
            tokio::select! {
                frame = reader.next() => match frame {
                    Some(Ok(msg)) => {
                        debug!(command = %msg.command, "Received message");
                        let mut ctx = Context {
                            uid,
                            matrix: &matrix,
                        };
                        match registry.dispatch(&mut ctx, &msg).await {
                            Ok(replies) => {
                                if let Err(e) = write_all(&mut writer, replies).await {
                                    break Err(e);
                                }
                            }
                            Err(HandlerError::Quit(reason)) => {
                                let goodbye = closing_link(&matrix, uid, &reason);
                                let _ = write_all(&mut writer, goodbye).await;
                                break Ok(reason);
                            }
                            Err(e) => break Ok(e.to_string()),
                        }
                    }
                    Some(Err(e)) => break Err(e),
                    None => break Ok("Connection closed".to_string()),
                },

                queued = outgoing.recv() => match queued {
                    Some(msg) => {
                        if let Err(e) = write_all(&mut writer, Some(msg)).await {
                            break Err(e);
                        }
                    }
                    None => break Ok("Session removed".to_string()),
                },

                _ = shutdown.changed() => {
                    let reason = "Server shutting down";
                    let goodbye = closing_link(&matrix, uid, reason);
                    let _ = write_all(&mut writer, goodbye).await;
                    break Ok(reason.to_string());
                }

                _ = tick(&mut keepalive) => {
                    let ping = matrix
                        .session(uid)
                        .map(|s| Replies::new(&matrix.server_info, &s).ping());
                    if let Err(e) = write_all(&mut writer, ping).await {
                        break Err(e);
                    }
                }
            }
        };

        let reason = match &outcome {
            Ok(reason) => reason.as_str(),
            Err(_) => "Connection error",
        };
        matrix.disconnect(uid, reason).await;
        info!(%reason, "Client disconnected");

        let _ = writer.close().await;
        match outcome {
            Ok(_) => Ok(()),
            Err(ProtocolError::Io(e)) if is_disconnect(&e) => {
                debug!(error = %e, "Peer reset connection");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Connection failed");
                Err(e.into())
            }
        }
    }
}

/// Write and flush a batch of messages.
async fn write_all(
    writer: &mut Writer,
    messages: impl IntoIterator<Item = Message>,
) -> Result<(), ProtocolError> {
    for msg in messages {
        writer.feed(msg).await?;
    }
    writer.flush().await
}

/// `ERROR :Closing Link` for the session, if it still exists.
fn closing_link(matrix: &Matrix, uid: Uid, reason: &str) -> Option<Message> {
    matrix
        .session(uid)
        .map(|s| Replies::new(&matrix.server_info, &s).closing_link(reason))
}

/// Completes on the next keepalive tick; never completes when disabled.
async fn tick(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn is_disconnect(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::ConnectionAborted
    )
}
