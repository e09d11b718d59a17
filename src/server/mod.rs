//! HTTP/1.1 server hosting the diagnostics API.
//!
//! ```text
//! TcpListener ──accept──▶ connection task (one per socket)
//!                              │
//!                              ▼
//!                  MiddlewareChain (access log, CORS)
//!                              │
//!                              ▼
//!                  Diagnostics router ──▶ adapters
//! ```
//!
//! # Graceful Shutdown
//!
//! [`Server::trigger_shutdown`] stops the accept loop and asks every open
//! connection to close after its in-flight request;
//! [`Server::wait_for_drain`] then waits for them to finish.
//!
//! ```rust,ignore
//! let server = Arc::new(Server::bind(addr, diagnostics, chain).await?);
//! let accept_loop = tokio::spawn({
//!     let server = Arc::clone(&server);
//!     async move { server.run().await }
//! });
//!
//! tokio::signal::ctrl_c().await?;
//! server.shutdown(accept_loop, Duration::from_secs(10)).await;
//! ```

mod connection;

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::Diagnostics;
use crate::middleware::MiddlewareChain;
use connection::ConnectionContext;

/// Diagnostics HTTP server bound to a listening socket.
pub struct Server {
    listener: TcpListener,
    ctx: Arc<ConnectionContext>,
    active_connections: Arc<AtomicUsize>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    shutdown_initiated: AtomicBool,
}

impl Server {
    /// Bind `addr` and prepare to serve.
    pub async fn bind(
        addr: SocketAddr,
        diagnostics: Diagnostics,
        chain: MiddlewareChain,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::from_listener(listener, diagnostics, chain))
    }

    /// Serve on an already bound listener.
    pub fn from_listener(
        listener: TcpListener,
        diagnostics: Diagnostics,
        chain: MiddlewareChain,
    ) -> Self {
        let active_connections = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let ctx = Arc::new(ConnectionContext {
            diagnostics,
            chain,
            active_connections: Arc::clone(&active_connections),
        });

        Self {
            listener,
            ctx,
            active_connections,
            shutdown_tx,
            shutdown_rx,
            shutdown_initiated: AtomicBool::new(false),
        }
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of connections currently open.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Accept connections until [`trigger_shutdown`](Self::trigger_shutdown) is called.
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        if *shutdown_rx.borrow() {
            return;
        }

        if let Ok(addr) = self.local_addr() {
            info!("Listening on http://{}", addr);
        }

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, remote_addr) = match result {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Accept error: {}", e);
                            continue;
                        }
                    };

                    let ctx = Arc::clone(&self.ctx);
                    let conn_shutdown = self.shutdown_rx.clone();
                    tokio::spawn(async move {
                        ctx.handle_connection(stream, remote_addr, conn_shutdown).await;
                    });
                }
                _ = shutdown_rx.changed() => {
                    debug!("Shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }
    }

    /// Stop accepting and ask open connections to close.
    pub fn trigger_shutdown(&self) {
        if self.shutdown_initiated.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait until every connection has closed or `timeout` elapses.
    ///
    /// Returns `true` when all connections drained in time.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        let check_interval = Duration::from_millis(50);

        loop {
            let active = self.active_connections();
            if active == 0 {
                return true;
            }

            if start.elapsed() >= timeout {
                warn!("Drain timeout reached with {} active connections", active);
                return false;
            }

            debug!("Waiting for {} connections to drain...", active);
            tokio::time::sleep(check_interval).await;
        }
    }

    /// Stop accepting, wait for the spawned accept loop, then drain.
    ///
    /// A panicked or cancelled accept loop is logged and does not stop the
    /// drain. Returns the result of [`Server::wait_for_drain`].
    pub async fn shutdown(&self, accept_loop: JoinHandle<()>, drain_timeout: Duration) -> bool {
        self.trigger_shutdown();

        if let Err(e) = accept_loop.await {
            error!(error = %e, panicked = e.is_panic(), "Accept loop ended abnormally");
        }

        self.wait_for_drain(drain_timeout).await
    }
}
