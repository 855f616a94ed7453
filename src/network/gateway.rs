//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listening socket and spawns a Connection task for
//! each incoming client. Ctrl-C stops accepting and tells every connection
//! to close.

use crate::config::Config;
use crate::handlers::Registry;
use crate::network::{Connection, ConnectionSettings};
use crate::state::Matrix;
use minirc_proto::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

/// How long shutdown waits for connections to say goodbye.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
    settings: ConnectionSettings,
}

impl Gateway {
    /// Bind the gateway to the configured listen address.
    pub async fn bind(
        config: &Config,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.listen.address).await?;
        info!(address = %config.listen.address, "Listener bound");

        Ok(Self {
            listener,
            matrix,
            registry,
            settings: ConnectionSettings::from_config(config),
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway until Ctrl-C.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let uid = self.matrix.uid_gen.next();
                        info!(%uid, %addr, "Connection accepted");

                        let connection = Connection::new(
                            uid,
                            stream,
                            addr,
                            Arc::clone(&self.matrix),
                            Arc::clone(&self.registry),
                            self.settings.clone(),
                            shutdown_rx.clone(),
                        );
                        connections.spawn(async move {
                            if let Err(e) = connection.run().await {
                                error!(%uid, %addr, error = %e, "Connection error");
                            }
                            info!(%uid, %addr, "Connection closed");
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },
                // Reap finished connection tasks.
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        error!(error = %e, "Failed to listen for shutdown signal");
                    }
                    break;
                }
            }
        }

        info!(connections = connections.len(), "Shutting down");
        let notice = Message::new("NOTICE")
            .with_prefix(self.matrix.server_info.name.clone())
            .with_arg("*")
            .with_trailing("Server is shutting down");
        let notified = self.matrix.broadcast_all(&notice).await;
        info!(notified, "Shutdown notice sent");
        let _ = shutdown_tx.send(true);

        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(remaining = connections.len(), "Aborting connections after grace period");
            connections.shutdown().await;
        }

        Ok(())
    }
}
