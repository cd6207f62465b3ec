//! 长度前缀分帧
//!
//! 每帧为 varint 长度加一条编码后的消息，可以在同一缓冲区中连续存放。

use crate::decode::{DecodeOptions, decode_with};
use crate::encode::write_message;
use crate::error::{CodecError, Result};
use crate::message::Message;
use crate::schema::MessageType;
use crate::wire::{WireReader, WireWriter, varint_len};
use bytes::{Buf, Bytes, BytesMut};

/// 编码消息并加上长度前缀
pub fn write_delimited(msg: &Message) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    write_delimited_to(msg, &mut buf)?;
    Ok(buf.freeze())
}

/// 编码带长度前缀的消息并追加到 `buf`
///
/// 失败时 `buf` 保持不变。
pub fn write_delimited_to(msg: &Message, buf: &mut BytesMut) -> Result<()> {
    let mut body = WireWriter::new();
    write_message(msg, &mut body)?;

    let mut frame = WireWriter::with_capacity(varint_len(body.len() as u64) + body.len());
    frame.append_bytes(body.as_slice());
    buf.extend_from_slice(frame.as_slice());
    Ok(())
}

/// 从 `input` 开头读取一帧
///
/// 输入为空时返回 `Ok(None)`；成功时 `input` 前进到下一帧，
/// 失败时 `input` 保持不变。
pub fn read_delimited(ty: &MessageType, input: &mut Bytes) -> Result<Option<Message>> {
    read_delimited_with(ty, input, &DecodeOptions::default())
}

/// 使用指定解码选项读取一帧
pub fn read_delimited_with(
    ty: &MessageType,
    input: &mut Bytes,
    options: &DecodeOptions,
) -> Result<Option<Message>> {
    if input.is_empty() {
        return Ok(None);
    }

    let mut reader = WireReader::new(input.clone());
    let len = reader.read_length()?;
    if reader.remaining() < len {
        return Err(CodecError::malformed(format!(
            "帧数据不完整: 需要 {} 字节, 剩余 {} 字节",
            len,
            reader.remaining()
        )));
    }
    let header_len = input.len() - reader.remaining();
    let body = reader.read_slice(len)?;

    let msg = decode_with(ty, body, options)?;
    input.advance(header_len + len);
    Ok(Some(msg))
}

impl Message {
    /// 编码为带长度前缀的帧
    pub fn write_delimited(&self) -> Result<Bytes> {
        write_delimited(self)
    }
}

impl MessageType {
    /// 从 `input` 读取一帧该类型的消息，见 [`read_delimited`]
    pub fn read_delimited(&self, input: &mut Bytes) -> Result<Option<Message>> {
        read_delimited(self, input)
    }
}
