//! 解码器
//!
//! 按 Schema 消费字节：
//!
//! - 未知字段编号直接跳过（向前兼容）
//! - 线路类型与声明不符返回 [`CodecError::WrongType`]
//! - 单值字段以最后一次出现为准，重复字段依次追加
//! - 读完后为未设置字段填充默认值，再校验必填字段
//!
//! 枚举值在解码时不做成员校验。

use crate::error::{CodecError, Result};
use crate::message::{Message, Value};
use crate::schema::{FieldDescriptor, FieldKind, MessageType, ScalarKind};
use crate::wire::{WireReader, zigzag_decode_32, zigzag_decode_64};
use bytes::Bytes;
use tagwire_config::CodecConfig;
use tracing::trace;

/// 默认嵌套深度限制
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// 解码选项
///
/// 编码不限制嵌套深度。嵌套超过 `recursion_limit` 的实例可以编码，
/// 但需要用更大的限制解码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// 嵌套消息的最大深度
    pub recursion_limit: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl DecodeOptions {
    /// 创建默认选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置嵌套深度限制
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

impl From<&CodecConfig> for DecodeOptions {
    fn from(config: &CodecConfig) -> Self {
        Self {
            recursion_limit: config.recursion_limit,
        }
    }
}

/// 解码消息
pub fn decode(ty: &MessageType, data: impl Into<Bytes>) -> Result<Message> {
    decode_with(ty, data, &DecodeOptions::default())
}

/// 使用指定选项解码消息
pub fn decode_with(
    ty: &MessageType,
    data: impl Into<Bytes>,
    options: &DecodeOptions,
) -> Result<Message> {
    let mut msg = Message::new(ty);
    read_message(&mut WireReader::new(data), &mut msg, 0, options)?;
    Ok(msg)
}

/// 把字节合并到已有实例
///
/// 单值字段被覆盖，重复字段追加。失败时 `msg` 保持不变。
pub fn decode_into(data: impl Into<Bytes>, msg: &mut Message) -> Result<()> {
    decode_into_with(data, msg, &DecodeOptions::default())
}

/// 使用指定选项合并解码
pub fn decode_into_with(
    data: impl Into<Bytes>,
    msg: &mut Message,
    options: &DecodeOptions,
) -> Result<()> {
    let mut target = msg.clone();
    read_message(&mut WireReader::new(data), &mut target, 0, options)?;
    *msg = target;
    Ok(())
}

impl MessageType {
    /// 解码该类型的消息，见 [`decode`]
    pub fn decode(&self, data: impl Into<Bytes>) -> Result<Message> {
        decode(self, data)
    }
}

fn read_message(
    reader: &mut WireReader,
    msg: &mut Message,
    depth: usize,
    options: &DecodeOptions,
) -> Result<()> {
    let ty = msg.message_type().clone();
    let schema = ty.schema()?;

    while !reader.is_empty() {
        let (number, wire_type) = reader.read_info()?;

        let Some(field) = schema.field(number) else {
            trace!(
                message = schema.name(),
                field = number,
                wire_type = %wire_type,
                "跳过未知字段"
            );
            reader.skip(wire_type)?;
            continue;
        };

        if wire_type != field.wire_type() {
            return Err(CodecError::WrongType {
                field: field.name().to_string(),
                expected: field.wire_type(),
                actual: wire_type,
            });
        }

        if field.is_packed() {
            let mut block = WireReader::new(reader.read_length_delimited()?);
            msg.ensure_repeated(number);
            while !block.is_empty() {
                let value = read_value(&mut block, field, depth, options)?;
                msg.push_decoded(number, value);
            }
        } else if field.is_repeated() {
            let value = read_value(reader, field, depth, options)?;
            msg.push_decoded(number, value);
        } else {
            let value = read_value(reader, field, depth, options)?;
            msg.put_decoded(number, value);
        }
    }

    for field in schema.fields() {
        if let Some(default) = field.default_value() {
            if msg.is_unset(field.number()) {
                trace!(message = schema.name(), field = field.name(), "填充默认值");
                msg.put_decoded(field.number(), default.clone());
            }
        }
    }

    msg.validate()
}

fn read_value(
    reader: &mut WireReader,
    field: &FieldDescriptor,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Value> {
    match field.kind() {
        FieldKind::Scalar(kind) => read_scalar(reader, *kind),
        // 与 int32 相同，截断为低 32 位
        FieldKind::Enum(_) => Ok(Value::Enum(reader.read_varint()? as i32)),
        FieldKind::Message(ty) => {
            if depth >= options.recursion_limit {
                return Err(CodecError::RecursionLimitExceeded(options.recursion_limit));
            }
            let mut nested = Message::new(ty);
            let mut block = WireReader::new(reader.read_length_delimited()?);
            read_message(&mut block, &mut nested, depth + 1, options)?;
            Ok(Value::Message(Box::new(nested)))
        }
    }
}

fn read_scalar(reader: &mut WireReader, kind: ScalarKind) -> Result<Value> {
    let value = match kind {
        ScalarKind::Int32 => Value::I32(reader.read_varint()? as i32),
        ScalarKind::Int64 => Value::I64(reader.read_varint()? as i64),
        ScalarKind::UInt32 => Value::U32(reader.read_varint()? as u32),
        ScalarKind::UInt64 => Value::U64(reader.read_varint()?),
        ScalarKind::SInt32 => Value::I32(zigzag_decode_32(reader.read_varint()? as u32)),
        ScalarKind::SInt64 => Value::I64(zigzag_decode_64(reader.read_varint()?)),
        ScalarKind::Bool => Value::Bool(reader.read_varint()? != 0),
        ScalarKind::Fixed32 => Value::U32(reader.read_fixed32()?),
        ScalarKind::SFixed32 => Value::I32(reader.read_fixed32()? as i32),
        ScalarKind::Float => Value::F32(f32::from_bits(reader.read_fixed32()?)),
        ScalarKind::Fixed64 => Value::U64(reader.read_fixed64()?),
        ScalarKind::SFixed64 => Value::I64(reader.read_fixed64()? as i64),
        ScalarKind::Double => Value::F64(f64::from_bits(reader.read_fixed64()?)),
        ScalarKind::String => {
            let raw = reader.read_length_delimited()?;
            let text = std::str::from_utf8(&raw)
                .map_err(|e| CodecError::malformed(format!("字符串不是有效的 UTF-8: {}", e)))?;
            Value::String(text.to_string())
        }
        ScalarKind::Bytes => Value::Bytes(reader.read_length_delimited()?),
    };
    Ok(value)
}
