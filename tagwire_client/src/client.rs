//! Request/response RPC client
//!
//! A call writes two frames, an [`RpcHeader`] and the request payload, then
//! reads two frames back: the response header and the response payload.

use crate::config::ClientConfig;
use crate::connection::{ClientConnection, ClientState};
use crate::error::{ClientError, Result};
use std::net::SocketAddr;
use tagwire_codec::{
    DecodeOptions, Message, MessageType, RpcHeader, decode_with, encode, rpc_header_type,
};
use tracing::{debug, warn};

/// RPC client with one outstanding request at a time
pub struct RpcClient {
    connection: ClientConnection,
    config: ClientConfig,
    decode_options: DecodeOptions,
    next_seq: u64,
}

impl RpcClient {
    /// Connect to server
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        Self::connect_with_config(ClientConfig::new(addr)).await
    }

    /// Connect with custom configuration
    pub async fn connect_with_config(config: ClientConfig) -> Result<Self> {
        let connection = ClientConnection::connect(&config).await?;
        Ok(Self {
            connection,
            decode_options: config.decode_options(),
            config,
            next_seq: 0,
        })
    }

    /// Invoke `service_method` and decode the reply as `returns`
    ///
    /// A response header with a non-empty `error` becomes
    /// [`ClientError::Remote`]. Transport errors and timeouts leave the
    /// connection unusable.
    pub async fn call(
        &mut self,
        service_method: &str,
        request: &Message,
        returns: &MessageType,
    ) -> Result<Message> {
        let seq = self.next_seq;
        let header = RpcHeader::request(service_method, seq).to_message()?;
        let frames = [encode(&header)?, encode(request)?];
        self.next_seq += 1;

        debug!(method = service_method, seq, "Sending request");

        let connection = &mut self.connection;
        let exchange = async {
            connection.send_frames(frames).await?;
            let header = connection.recv_frame().await?;
            let payload = connection.recv_frame().await?;
            Ok::<_, ClientError>((header, payload))
        };

        let outcome = tokio::time::timeout(self.config.io_timeout, exchange).await;
        let (header_frame, payload) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                self.connection.mark_broken();
                return Err(ClientError::Timeout(format!(
                    "{} (seq {}) got no reply within {:?}",
                    service_method, seq, self.config.io_timeout
                )));
            }
        };

        let header = decode_with(rpc_header_type(), header_frame, &self.decode_options)?;
        let response = RpcHeader::from_message(&header)?;
        if response.seq != seq {
            warn!(expected = seq, actual = response.seq, "Response sequence mismatch");
        }
        if let Some(message) = response.remote_error() {
            warn!(method = service_method, seq, error = message, "Remote error");
            return Err(ClientError::Remote {
                method: service_method.to_string(),
                seq,
                message: message.to_string(),
            });
        }

        Ok(decode_with(returns, payload, &self.decode_options)?)
    }

    /// Sequence number the next call will use
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Get connection state
    pub fn state(&self) -> ClientState {
        self.connection.state()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Get server address
    pub fn server_addr(&self) -> SocketAddr {
        self.connection.server_addr()
    }

    /// Get client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Close connection
    pub async fn close(self) -> Result<()> {
        self.connection.close().await
    }
}
