//! Client connection management

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Instant;
use tagwire_codec::DelimitedCodec;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Connected,
    /// A transport error or timeout left the stream in an unknown position
    Broken,
    Closed,
}

/// A framed TCP connection carrying length-delimited messages
pub struct ClientConnection {
    framed: Framed<TcpStream, DelimitedCodec>,
    server_addr: SocketAddr,
    connected_at: Instant,
    state: ClientState,
}

impl ClientConnection {
    /// Connect to server
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        // Connect with timeout
        let stream = tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect(config.server_addr.as_str()),
        )
        .await
        .map_err(|_| ClientError::Timeout("Connection timed out".to_string()))?
        .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

        let server_addr = stream.peer_addr().map_err(|e| {
            ClientError::ConnectionFailed(format!("Failed to get peer address: {}", e))
        })?;
        debug!(%server_addr, "Connected");

        let codec = DelimitedCodec::with_max_frame_size(config.max_frame_size);
        Ok(Self {
            framed: Framed::new(stream, codec),
            server_addr,
            connected_at: Instant::now(),
            state: ClientState::Connected,
        })
    }

    /// Write several frames and flush once
    pub async fn send_frames<I>(&mut self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = Bytes>,
    {
        self.ensure_connected()?;
        for frame in frames {
            if let Err(e) = self.framed.feed(frame).await {
                self.state = ClientState::Broken;
                return Err(ClientError::SendFailed(e.to_string()));
            }
        }
        if let Err(e) = self.framed.flush().await {
            self.state = ClientState::Broken;
            return Err(ClientError::SendFailed(e.to_string()));
        }
        Ok(())
    }

    /// Receive next frame
    pub async fn recv_frame(&mut self) -> Result<Bytes> {
        self.ensure_connected()?;
        match self.framed.next().await {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(e)) => {
                self.state = ClientState::Broken;
                Err(ClientError::ReceiveFailed(e.to_string()))
            }
            None => {
                self.state = ClientState::Closed;
                Err(ClientError::ReceiveFailed("Connection closed".to_string()))
            }
        }
    }

    /// Mark the stream unusable, e.g. after a timed-out exchange
    pub fn mark_broken(&mut self) {
        self.state = ClientState::Broken;
    }

    /// Get connection state
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.state == ClientState::Connected
    }

    /// Get server address
    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Get connected time
    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// Close connection
    pub async fn close(mut self) -> Result<()> {
        self.state = ClientState::Closed;
        self.framed
            .close()
            .await
            .map_err(|e| ClientError::SendFailed(e.to_string()))
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state != ClientState::Connected {
            return Err(ClientError::NotConnected);
        }
        Ok(())
    }
}
