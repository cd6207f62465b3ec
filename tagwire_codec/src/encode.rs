//! 编码器
//!
//! 按字段编号升序遍历 Schema，把消息实例写成字节。
//! 编码前先校验必填字段；任何错误都不会产生部分输出。

use crate::error::{CodecError, Result};
use crate::message::{Message, Slot, Value};
use crate::schema::{EnumType, FieldDescriptor, FieldKind, ScalarKind};
use crate::wire::{WireWriter, make_tag, varint_len, zigzag_encode_32, zigzag_encode_64};
use bytes::{Bytes, BytesMut};

/// 编码消息
pub fn encode(msg: &Message) -> Result<Bytes> {
    let mut writer = WireWriter::new();
    write_message(msg, &mut writer)?;
    Ok(writer.into_bytes())
}

/// 编码消息并追加到调用方缓冲区
///
/// 编码失败时 `buf` 保持不变。
pub fn encode_to(msg: &Message, buf: &mut BytesMut) -> Result<()> {
    let encoded = encode(msg)?;
    buf.extend_from_slice(&encoded);
    Ok(())
}

/// 编码后的字节数
///
/// 只计算长度，不写出字节；校验规则与 [`encode`] 相同。
pub fn encoded_len(msg: &Message) -> Result<usize> {
    message_len(msg)
}

impl Message {
    /// 编码为字节，见 [`encode`]
    pub fn encode(&self) -> Result<Bytes> {
        encode(self)
    }

    /// 编码后的字节数
    pub fn encoded_len(&self) -> Result<usize> {
        encoded_len(self)
    }
}

pub(crate) fn write_message(msg: &Message, writer: &mut WireWriter) -> Result<()> {
    msg.validate()?;
    let schema = msg.schema()?;

    for field in schema.fields() {
        match msg.slot(field.number()) {
            None => {}
            Some(Slot::Single(value)) => write_field(field, value, writer)?,
            Some(Slot::Repeated(values)) if field.is_packed() => {
                write_packed(field, values, writer)?
            }
            Some(Slot::Repeated(values)) => {
                for value in values {
                    write_field(field, value, writer)?;
                }
            }
        }
    }
    Ok(())
}

fn write_field(field: &FieldDescriptor, value: &Value, writer: &mut WireWriter) -> Result<()> {
    writer.append_info(field.number(), field.wire_type());
    write_value(field, value, writer)
}

// packed 头部使用元素的线路类型，长度前缀之后是不带标签的元素序列
fn write_packed(field: &FieldDescriptor, values: &[Value], writer: &mut WireWriter) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }

    let mut scratch = WireWriter::new();
    for value in values {
        write_value(field, value, &mut scratch)?;
    }
    writer.append_info(field.number(), field.wire_type());
    writer.append_bytes(scratch.as_slice());
    Ok(())
}

fn write_value(field: &FieldDescriptor, value: &Value, writer: &mut WireWriter) -> Result<()> {
    match (field.kind(), value) {
        (FieldKind::Scalar(kind), value) => write_scalar(field, *kind, value, writer),
        (FieldKind::Enum(ty), Value::Enum(number)) => {
            check_enum(field, ty, *number)?;
            writer.append_varint(i64::from(*number) as u64);
            Ok(())
        }
        (FieldKind::Message(_), Value::Message(nested)) => {
            let mut inner = WireWriter::new();
            write_message(nested, &mut inner)?;
            writer.append_bytes(inner.as_slice());
            Ok(())
        }
        (kind, _) => Err(CodecError::type_mismatch(field.name(), kind)),
    }
}

fn write_scalar(
    field: &FieldDescriptor,
    kind: ScalarKind,
    value: &Value,
    writer: &mut WireWriter,
) -> Result<()> {
    match (kind, value) {
        // int32 按 64 位符号扩展，负数固定 10 字节
        (ScalarKind::Int32, Value::I32(v)) => writer.append_varint(i64::from(*v) as u64),
        (ScalarKind::SInt32, Value::I32(v)) => writer.append_varint(u64::from(zigzag_encode_32(*v))),
        (ScalarKind::SFixed32, Value::I32(v)) => writer.append_fixed32(*v as u32),
        (ScalarKind::Int64, Value::I64(v)) => writer.append_varint(*v as u64),
        (ScalarKind::SInt64, Value::I64(v)) => writer.append_varint(zigzag_encode_64(*v)),
        (ScalarKind::SFixed64, Value::I64(v)) => writer.append_fixed64(*v as u64),
        (ScalarKind::UInt32, Value::U32(v)) => writer.append_varint(u64::from(*v)),
        (ScalarKind::Fixed32, Value::U32(v)) => writer.append_fixed32(*v),
        (ScalarKind::UInt64, Value::U64(v)) => writer.append_varint(*v),
        (ScalarKind::Fixed64, Value::U64(v)) => writer.append_fixed64(*v),
        (ScalarKind::Float, Value::F32(v)) => writer.append_fixed32(v.to_bits()),
        (ScalarKind::Double, Value::F64(v)) => writer.append_fixed64(v.to_bits()),
        (ScalarKind::Bool, Value::Bool(v)) => writer.append_varint(u64::from(*v)),
        (ScalarKind::String, Value::String(v)) => writer.append_bytes(v.as_bytes()),
        (ScalarKind::Bytes, Value::Bytes(v)) => writer.append_bytes(v),
        _ => return Err(CodecError::type_mismatch(field.name(), kind)),
    }
    Ok(())
}

fn check_enum(field: &FieldDescriptor, ty: &EnumType, number: i32) -> Result<()> {
    if !ty.contains(number) {
        return Err(CodecError::InvalidValue {
            field: field.name().to_string(),
            value: number,
        });
    }
    Ok(())
}

fn message_len(msg: &Message) -> Result<usize> {
    msg.validate()?;
    let schema = msg.schema()?;

    let mut len = 0;
    for field in schema.fields() {
        let tag_len = varint_len(make_tag(field.number(), field.wire_type()));
        match msg.slot(field.number()) {
            None => {}
            Some(Slot::Single(value)) => len += tag_len + value_len(field, value)?,
            Some(Slot::Repeated(values)) if field.is_packed() => {
                if !values.is_empty() {
                    let body = values
                        .iter()
                        .map(|value| value_len(field, value))
                        .sum::<Result<usize>>()?;
                    len += tag_len + varint_len(body as u64) + body;
                }
            }
            Some(Slot::Repeated(values)) => {
                for value in values {
                    len += tag_len + value_len(field, value)?;
                }
            }
        }
    }
    Ok(len)
}

fn value_len(field: &FieldDescriptor, value: &Value) -> Result<usize> {
    match (field.kind(), value) {
        (FieldKind::Scalar(kind), value) => scalar_len(field, *kind, value),
        (FieldKind::Enum(ty), Value::Enum(number)) => {
            check_enum(field, ty, *number)?;
            Ok(varint_len(i64::from(*number) as u64))
        }
        (FieldKind::Message(_), Value::Message(nested)) => {
            let inner = message_len(nested)?;
            Ok(varint_len(inner as u64) + inner)
        }
        (kind, _) => Err(CodecError::type_mismatch(field.name(), kind)),
    }
}

fn scalar_len(field: &FieldDescriptor, kind: ScalarKind, value: &Value) -> Result<usize> {
    let len = match (kind, value) {
        (ScalarKind::Int32, Value::I32(v)) => varint_len(i64::from(*v) as u64),
        (ScalarKind::SInt32, Value::I32(v)) => varint_len(u64::from(zigzag_encode_32(*v))),
        (ScalarKind::Int64, Value::I64(v)) => varint_len(*v as u64),
        (ScalarKind::SInt64, Value::I64(v)) => varint_len(zigzag_encode_64(*v)),
        (ScalarKind::UInt32, Value::U32(v)) => varint_len(u64::from(*v)),
        (ScalarKind::UInt64, Value::U64(v)) => varint_len(*v),
        (ScalarKind::Bool, Value::Bool(_)) => 1,
        (ScalarKind::SFixed32, Value::I32(_))
        | (ScalarKind::Fixed32, Value::U32(_))
        | (ScalarKind::Float, Value::F32(_)) => 4,
        (ScalarKind::SFixed64, Value::I64(_))
        | (ScalarKind::Fixed64, Value::U64(_))
        | (ScalarKind::Double, Value::F64(_)) => 8,
        (ScalarKind::String, Value::String(v)) => varint_len(v.len() as u64) + v.len(),
        (ScalarKind::Bytes, Value::Bytes(v)) => varint_len(v.len() as u64) + v.len(),
        _ => return Err(CodecError::type_mismatch(field.name(), kind)),
    };
    Ok(len)
}
