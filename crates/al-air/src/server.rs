//! TCP command server
//!
//! Accepts connections, reads exactly one request line per connection,
//! writes exactly one response line, and closes. No session state survives
//! a connection. Concurrency is bounded by a semaphore rather than being
//! one-task-per-connection without limit.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

use al_protocol::{Command, LineCodec, Response};

use crate::coordinator::{ConfirmOutcome, ProposeOutcome};
use crate::state::AirState;

/// Command server for the air daemon
pub struct CommandServer {
    /// Shared daemon state
    state: Arc<AirState>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
}

impl CommandServer {
    /// Create a new command server
    pub fn new(state: Arc<AirState>, cancel: CancellationToken) -> Self {
        Self { state, cancel }
    }

    /// Run the accept loop until cancelled
    pub async fn run(&self, bind_addr: &str) -> Result<()> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("Failed to bind to {}", bind_addr))?;

        let local_addr = listener.local_addr()?;
        tracing::info!("Command server listening on {}", local_addr);

        let limiter = Arc::new(Semaphore::new(self.state.config.max_inflight));

        loop {
            // Taking the permit before accept() applies backpressure at the
            // listener instead of queueing unbounded handler tasks.
            let permit = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Command server shutting down");
                    break;
                }
                permit = Arc::clone(&limiter).acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break,
                }
            };

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Command server shutting down");
                    break;
                }
                result = listener.accept() => {
                    match result {
                        Ok((socket, peer_addr)) => {
                            tracing::debug!("Connection from {}", peer_addr);
                            let state = Arc::clone(&self.state);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(socket, &state).await {
                                    tracing::warn!(
                                        "Connection from {} closed with error: {}",
                                        peer_addr,
                                        e
                                    );
                                }
                                drop(permit);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// One request line in, one response line out, then close.
///
/// Transport-level failures (timeout, oversized line, broken UTF-8) close
/// the connection without a protocol response; the peer observes connection
/// failure rather than a reply.
async fn handle_connection(socket: TcpStream, state: &AirState) -> Result<()> {
    let mut framed = Framed::new(socket, LineCodec::new());

    let line = match timeout(state.config.read_timeout, framed.next()).await {
        Err(_) => {
            tracing::debug!("Request read timed out");
            return Ok(());
        }
        Ok(None) => return Ok(()), // peer closed without sending a request
        Ok(Some(line)) => line?,
    };

    tracing::debug!("Received: {}", line);
    let response = dispatch(&line, state).await;
    tracing::debug!("Responding: {}", response);

    framed.send(response.to_string()).await?;
    Ok(())
}

/// Map one request line to its response
pub async fn dispatch(line: &str, state: &AirState) -> Response {
    match Command::parse(line) {
        Ok(Command::ProposeChannel(channel)) => match state.coordinator.propose(channel).await {
            ProposeOutcome::Accepted { channel } => Response::ChannelAccepted { channel },
            ProposeOutcome::AlreadyPending { proposed } => Response::ChannelRejected {
                reason: format!("change to {} already pending", proposed),
            },
            ProposeOutcome::ActuatorFailed { reason } => Response::ChannelRejected { reason },
        },

        Ok(Command::ConfirmChannel) => match state.coordinator.confirm().await {
            ConfirmOutcome::Committed(channel) => Response::ChannelCommitted { channel },
            ConfirmOutcome::NoPendingChange => Response::NoPendingChange,
        },

        Ok(Command::Status) => {
            let status = state.coordinator.status().await;
            Response::StatusReport {
                committed: status.committed,
                pending: status.pending,
            }
        }

        Err(e) => Response::InvalidCommand {
            reason: e.to_string(),
        },
    }
}
