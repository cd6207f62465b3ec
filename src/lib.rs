//! # tagwire - 基于 Schema 驱动的 Protobuf 风格二进制编解码器
//!
//! 消息通过字段 Schema（规则、名称、类型、字段编号、选项）声明，
//! 同一份 Schema 同时驱动编码与解码，支持嵌套消息、枚举和 packed 重复字段。
//!
//! ## 特性
//!
//! - Protobuf 兼容的线路格式（varint、定长、长度前缀）
//! - 运行期注册的消息 Schema，支持自引用类型
//! - 未知字段跳过、默认值填充、必填字段校验
//! - 长度前缀分帧与 `tokio_util` 流式编解码器
//! - 基于 Tokio 的请求/响应 RPC 客户端
//!
//! ## 快速开始
//!
//! ```rust
//! use tagwire::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut builder = SchemaBuilder::new("Point");
//!     builder
//!         .required("x", ScalarKind::SInt32, 1)?
//!         .required("y", ScalarKind::SInt32, 2)?;
//!     let point = builder.build()?;
//!
//!     let msg = Message::new(&point).with("x", 3)?.with("y", -4)?;
//!     let bytes = encode(&msg)?;
//!     assert_eq!(decode(&point, bytes)?, msg);
//!     Ok(())
//! }
//! ```
//!
//! ## 模块组织
//!
//! ### 配置模块
//! - TagwireConfig - 顶层配置（编解码限制、客户端端点）
//!
//! ### 编解码模块
//! - SchemaBuilder / MessageType - Schema 注册
//! - Message / Value - 消息实例
//! - encode / decode - 编解码
//! - DelimitedCodec - 流式分帧
//!
//! ### 客户端模块
//! - RpcClient - RPC 客户端

// ============================================================================
// Crate Re-exports
// ============================================================================

pub use tagwire_codec;
pub use tagwire_config;

pub use bytes::{Bytes, BytesMut};

#[cfg(feature = "client")]
pub use tagwire_client;

pub use tagwire_codec::{
    CodecError, DecodeOptions, DelimitedCodec, EnumType, FieldOptions, Message, MessageType,
    RpcHeader, Rule, ScalarKind, SchemaBuilder, TypeRegistry, Value, decode, encode,
    read_delimited, write_delimited,
};
pub use tagwire_config::{ConfigError, TagwireConfig};

#[cfg(feature = "client")]
pub use tagwire_client::{ClientConfig, ClientError, RpcClient};

// ============================================================================
// Prelude Module
// ============================================================================

/// 预导出常用类型
///
/// 通过 `use tagwire::prelude::*;` 导入所有常用类型
pub mod prelude {
    // Common types
    pub use std::result::Result as StdResult;

    pub use crate::{Error, Result};

    pub use tagwire_codec::prelude::{
        CodecError, DecodeOptions, DelimitedCodec, EnumType, FieldOptions, Message, MessageType,
        Rule, ScalarKind, SchemaBuilder, Value, decode, encode, read_delimited, write_delimited,
    };
    pub use tagwire_config::{CodecConfig, ConfigError, EndpointConfig, TagwireConfig};

    #[cfg(feature = "client")]
    pub use tagwire_client::prelude::{ClientConfig, ClientError, ClientState, RpcClient};
}

// ============================================================================
// Error Types
// ============================================================================

/// tagwire 统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// tagwire 统一错误枚举
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 编解码错误
    #[error(transparent)]
    Codec(#[from] tagwire_codec::CodecError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] tagwire_config::ConfigError),

    /// 客户端错误
    #[cfg(feature = "client")]
    #[error(transparent)]
    Client(#[from] tagwire_client::ClientError),

    /// IO 错误
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 自定义错误
    #[error("{0}")]
    Custom(String),
}

// ============================================================================
// Version Information
// ============================================================================

/// tagwire 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// tagwire 包名
pub const NAME: &str = env!("CARGO_PKG_NAME");
