//! 线路缓冲区
//!
//! `WireWriter` 只追加写入，`WireReader` 带读游标顺序消费。
//! 两者都只服务于单次编码或解码调用。

use super::{MAX_VARINT_LEN, WireType, make_tag};
use crate::error::{CodecError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// 追加写入缓冲区
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    /// 创建空的写缓冲区
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// 按预估容量创建
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// 写入标签（不含负载）
    pub fn append_info(&mut self, field_number: u32, wire_type: WireType) {
        self.append_varint(make_tag(field_number, wire_type));
    }

    /// 写入裸 varint（不含标签）
    pub fn append_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.put_u8((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }

    /// 写入 32 位定长值（小端序）
    pub fn append_fixed32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// 写入 64 位定长值（小端序）
    pub fn append_fixed64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    /// 写入长度前缀块：varint 长度 + 原始字节
    pub fn append_bytes(&mut self, data: &[u8]) {
        self.append_varint(data.len() as u64);
        self.buf.put_slice(data);
    }

    /// 已写入字节数
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 已写入内容
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// 冻结为不可变字节
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// 顺序读取缓冲区
#[derive(Debug, Clone, Default)]
pub struct WireReader {
    buf: Bytes,
}

impl WireReader {
    /// 包装待读取的字节
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// 剩余未读字节数
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// 是否已读完
    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    /// 读取裸 varint
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            if !self.buf.has_remaining() {
                return Err(CodecError::malformed("读取 varint 时数据耗尽"));
            }
            let byte = self.buf.get_u8();
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::malformed("varint 超过 10 字节"))
    }

    /// 读取标签，返回 (字段编号, 线路类型)
    pub fn read_info(&mut self) -> Result<(u32, WireType)> {
        let tag = self.read_varint()?;
        let wire = WireType::from_u8((tag & 0x07) as u8)
            .ok_or_else(|| CodecError::malformed(format!("不支持的线路类型: {}", tag & 0x07)))?;
        let number = u32::try_from(tag >> 3)
            .map_err(|_| CodecError::malformed(format!("字段编号溢出: {}", tag >> 3)))?;
        Ok((number, wire))
    }

    /// 读取 32 位定长值
    pub fn read_fixed32(&mut self) -> Result<u32> {
        self.ensure(4, "fixed32")?;
        Ok(self.buf.get_u32_le())
    }

    /// 读取 64 位定长值
    pub fn read_fixed64(&mut self) -> Result<u64> {
        self.ensure(8, "fixed64")?;
        Ok(self.buf.get_u64_le())
    }

    /// 切出指定长度的字节（零拷贝）
    pub fn read_slice(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len, "长度前缀块")?;
        Ok(self.buf.split_to(len))
    }

    /// 读取长度前缀块
    pub fn read_length_delimited(&mut self) -> Result<Bytes> {
        let len = self.read_length()?;
        self.read_slice(len)
    }

    /// 读取 varint 长度并转换为 usize
    pub fn read_length(&mut self) -> Result<usize> {
        let len = self.read_varint()?;
        usize::try_from(len).map_err(|_| CodecError::malformed(format!("长度溢出: {}", len)))
    }

    /// 跳过一个指定线路类型的值
    pub fn skip(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.ensure(8, "fixed64")?;
                self.buf.advance(8);
            }
            WireType::LengthDelimited => {
                let len = self.read_length()?;
                self.ensure(len, "长度前缀块")?;
                self.buf.advance(len);
            }
            WireType::Fixed32 => {
                self.ensure(4, "fixed32")?;
                self.buf.advance(4);
            }
        }
        Ok(())
    }

    fn ensure(&self, len: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < len {
            return Err(CodecError::malformed(format!(
                "读取{}时数据不足: 需要 {} 字节, 剩余 {} 字节",
                what,
                len,
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}

/// 在不消费数据的情况下解析开头的 varint
///
/// 返回 `Ok(None)` 表示数据尚不完整，`Ok(Some((value, header_len)))` 表示解析成功。
pub(crate) fn peek_varint(data: &[u8]) -> Result<Option<(u64, usize)>> {
    let mut value = 0u64;
    for (i, byte) in data.iter().take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
    }
    if data.len() >= MAX_VARINT_LEN {
        return Err(CodecError::malformed("varint 超过 10 字节"));
    }
    Ok(None)
}
