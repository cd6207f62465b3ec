//! # tagwire Client
//!
//! Async request/response client for tagwire messages.
//!
//! Every request is two length-delimited frames, an `RpcHeader` carrying the
//! method name and a sequence number followed by the encoded request. The
//! server answers with a header frame and a payload frame.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tagwire_client::RpcClient;
//! use tagwire_codec::{Message, ScalarKind, SchemaBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut args = SchemaBuilder::new("Args");
//!     args.required("a", ScalarKind::Int64, 1)?
//!         .required("b", ScalarKind::Int64, 2)?;
//!     let args = args.build()?;
//!
//!     let mut reply = SchemaBuilder::new("Reply");
//!     reply.required("sum", ScalarKind::Int64, 1)?;
//!     let reply = reply.build()?;
//!
//!     let mut client = RpcClient::connect("127.0.0.1:4700").await?;
//!     let request = Message::new(&args).with("a", 2i64)?.with("b", 3i64)?;
//!     let response = client.call("Arith.Add", &request, &reply).await?;
//!     println!("{}", response);
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;

// Re-export main types
pub use crate::client::RpcClient;
pub use crate::config::ClientConfig;
pub use crate::connection::{ClientConnection, ClientState};
pub use crate::error::{ClientError, Result};

// Prelude module for common imports
pub mod prelude {
    pub use crate::client::RpcClient;
    pub use crate::config::ClientConfig;
    pub use crate::connection::ClientState;
    pub use crate::error::{ClientError, Result};
}
