//! One-shot line client for the air daemon
//!
//! The wire contract is one request line per connection, one response line
//! back, then the air side closes. The client mirrors that: every exchange
//! opens a fresh connection.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use al_core::config::GroundConfig;
use al_core::TransportError;
use al_protocol::Command;

/// What came back from one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The peer answered with a response line
    Line(String),
    /// The peer accepted the connection but closed without answering
    NoResponse,
}

/// Connects, sends one command line, reads one reply line
pub struct AirClient {
    address: String,
    connect_timeout: Duration,
    connect_attempts: u32,
    retry_delay: Duration,
    receive_timeout: Duration,
}

impl AirClient {
    /// Build a client from the driver configuration
    pub fn from_config(config: &GroundConfig) -> Self {
        Self {
            address: config.peer_address.clone(),
            connect_timeout: config.connect_timeout,
            connect_attempts: config.connect_attempts,
            retry_delay: config.retry_delay,
            receive_timeout: config.receive_timeout,
        }
    }

    /// Peer address this client talks to
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn connect_once(&self) -> Result<TcpStream, TransportError> {
        match timeout(self.connect_timeout, TcpStream::connect(&self.address)).await {
            Err(_) => Err(TransportError::ConnectTimeout(self.address.clone())),
            Ok(Err(e)) => Err(TransportError::Connect {
                addr: self.address.clone(),
                source: e,
            }),
            Ok(Ok(stream)) => Ok(stream),
        }
    }

    /// Connect with a bounded number of attempts and a fixed delay between
    /// them. The command is sent only once a connection is up, so retrying
    /// here never duplicates a request.
    async fn connect(&self) -> Result<TcpStream, TransportError> {
        for attempt in 1..=self.connect_attempts {
            match self.connect_once().await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::warn!(
                        "Connect attempt {}/{} failed: {}",
                        attempt,
                        self.connect_attempts,
                        e
                    );
                    if attempt < self.connect_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        Err(TransportError::AttemptsExhausted {
            attempts: self.connect_attempts,
        })
    }

    /// Send one raw line and read the single reply line.
    ///
    /// A clean close before any reply is `Reply::NoResponse`, not an error;
    /// the driver decides what silence means for each handshake step.
    pub async fn exchange_raw(&self, line: &str) -> Result<Reply, TransportError> {
        let stream = self.connect().await?;
        let (read_half, mut write_half) = stream.into_split();

        write_half
            .write_all(format!("{}\n", line).as_bytes())
            .await?;
        write_half.flush().await?;

        let mut reader = BufReader::new(read_half);
        let mut reply = String::new();
        match timeout(self.receive_timeout, reader.read_line(&mut reply)).await {
            Err(_) => Err(TransportError::ReceiveTimeout),
            Ok(Err(e)) => Err(TransportError::Io(e)),
            Ok(Ok(0)) => Ok(Reply::NoResponse),
            Ok(Ok(_)) => Ok(Reply::Line(reply.trim_end().to_string())),
        }
    }

    /// Send one command and read the reply
    pub async fn exchange(&self, command: &Command) -> Result<Reply, TransportError> {
        tracing::debug!("Sending: {}", command);
        let reply = self.exchange_raw(&command.to_string()).await?;
        if let Reply::Line(line) = &reply {
            tracing::debug!("Received: {}", line);
        }
        Ok(reply)
    }
}
