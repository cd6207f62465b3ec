//! tagwire 编解码核心
//!
//! 基于字段 Schema 的 Protobuf 风格二进制编解码：
//! 线路格式基础、Schema 注册、消息实例、编码器、解码器、长度前缀分帧，
//! 以及供 `tokio_util::codec::Framed` 使用的流式编解码器。

pub mod codec;
pub mod decode;
pub mod delimited;
pub mod encode;
pub mod error;
pub mod message;
pub mod rpc;
pub mod schema;
pub mod wire;

// 导出主要类型到 crate root
pub use crate::codec::DelimitedCodec;
pub use crate::decode::{DecodeOptions, decode, decode_into, decode_into_with, decode_with};
pub use crate::delimited::{read_delimited, read_delimited_with, write_delimited, write_delimited_to};
pub use crate::encode::{encode, encode_to, encoded_len};
pub use crate::error::{CodecError, CodecErrorKind, Result};
pub use crate::message::{FieldValue, Message, Value};
pub use crate::rpc::{RpcHeader, rpc_header_type};
pub use crate::schema::{
    EnumType, FieldDescriptor, FieldKind, FieldOptions, MessageSchema, MessageType, Rule,
    ScalarKind, SchemaBuilder, TypeRegistry,
};
pub use crate::wire::WireType;

// 预导出
pub mod prelude {
    pub use crate::codec::DelimitedCodec;
    pub use crate::decode::{DecodeOptions, decode};
    pub use crate::delimited::{read_delimited, write_delimited};
    pub use crate::encode::encode;
    pub use crate::error::{CodecError, Result};
    pub use crate::message::{Message, Value};
    pub use crate::schema::{
        EnumType, FieldOptions, MessageType, Rule, ScalarKind, SchemaBuilder,
    };
}
