//! 流式分帧编解码器
//!
//! 为 `tokio_util::codec::Framed` 提供 varint 长度前缀分帧。
//! 帧内容是一条已编码的消息，由调用方按类型解码。

use crate::error::CodecError;
use crate::wire::{MAX_VARINT_LEN, WireWriter, varint_len};
use crate::wire::buffer::peek_varint;
use bytes::{Buf, Bytes, BytesMut};
use tagwire_config::CodecConfig;
use tokio_util::codec::{Decoder, Encoder};

/// 默认最大帧大小（16MB）
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// 长度前缀分帧编解码器
#[derive(Debug, Clone)]
pub struct DelimitedCodec {
    max_frame_size: usize,
}

impl Default for DelimitedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimitedCodec {
    /// 创建使用默认帧大小限制的编解码器
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// 指定最大帧大小
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// 从配置创建
    pub fn from_config(config: &CodecConfig) -> Self {
        Self::with_max_frame_size(config.max_frame_size)
    }

    /// 最大帧大小
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Encoder<Bytes> for DelimitedCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_size {
            return Err(CodecError::FrameTooLarge(item.len()));
        }

        let mut header = WireWriter::with_capacity(MAX_VARINT_LEN);
        header.append_varint(item.len() as u64);
        dst.reserve(varint_len(item.len() as u64) + item.len());
        dst.extend_from_slice(header.as_slice());
        dst.extend_from_slice(&item);
        Ok(())
    }
}

impl Decoder for DelimitedCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // 长度前缀不完整
        let Some((len, header_len)) = peek_varint(src)? else {
            return Ok(None);
        };

        let len = usize::try_from(len).map_err(|_| CodecError::FrameTooLarge(usize::MAX))?;
        if len > self.max_frame_size {
            return Err(CodecError::FrameTooLarge(len));
        }

        if src.len() < header_len + len {
            src.reserve(header_len + len - src.len());
            return Ok(None);
        }

        src.advance(header_len);
        Ok(Some(src.split_to(len).freeze()))
    }
}
