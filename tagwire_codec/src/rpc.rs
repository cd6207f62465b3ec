//! RPC 帧头
//!
//! 请求与响应都由两帧组成：帧头 + 负载。
//!
//! ```text
//! message RpcHeader {
//!   optional string service_method = 1;
//!   optional uint64 seq            = 2;
//!   optional string error          = 3;
//! }
//! ```

use crate::error::{CodecError, Result};
use crate::message::{Message, Value};
use crate::schema::{MessageType, ScalarKind, SchemaBuilder};
use std::sync::LazyLock;

static RPC_HEADER: LazyLock<MessageType> = LazyLock::new(|| {
    let mut builder = SchemaBuilder::new("RpcHeader");
    builder
        .optional("service_method", ScalarKind::String, 1)
        .and_then(|b| b.optional("seq", ScalarKind::UInt64, 2))
        .and_then(|b| b.optional("error", ScalarKind::String, 3))
        .expect("RpcHeader 字段定义有效");
    builder.build().expect("RpcHeader 只定义一次")
});

/// `RpcHeader` 消息类型
pub fn rpc_header_type() -> &'static MessageType {
    &RPC_HEADER
}

/// RPC 帧头
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RpcHeader {
    /// 服务方法名，例如 `Arith.Add`
    pub service_method: String,
    /// 请求序号，响应中原样返回
    pub seq: u64,
    /// 远端错误信息，空字符串视为无错误
    pub error: Option<String>,
}

impl RpcHeader {
    /// 创建请求帧头
    pub fn request(service_method: impl Into<String>, seq: u64) -> Self {
        Self {
            service_method: service_method.into(),
            seq,
            error: None,
        }
    }

    /// 远端返回的错误信息
    pub fn remote_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// 转换为消息实例
    pub fn to_message(&self) -> Result<Message> {
        let mut msg = Message::new(rpc_header_type())
            .with("service_method", self.service_method.as_str())?
            .with("seq", self.seq)?;
        if let Some(error) = &self.error {
            msg.set("error", error.as_str())?;
        }
        Ok(msg)
    }

    /// 从消息实例读取
    pub fn from_message(msg: &Message) -> Result<Self> {
        if msg.message_type() != rpc_header_type() {
            return Err(CodecError::type_mismatch(
                msg.message_type().name(),
                "message RpcHeader",
            ));
        }
        Ok(Self {
            service_method: msg
                .get("service_method")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            seq: msg.get("seq").and_then(Value::as_u64).unwrap_or_default(),
            error: msg.get("error").and_then(Value::as_str).map(str::to_string),
        })
    }
}
