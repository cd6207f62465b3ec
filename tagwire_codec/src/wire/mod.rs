//! 线路格式基础
//!
//! 标签、线路类型、varint 与定长值的读写。
//!
//! ```text
//! tag = field_number << 3 | wire_type        (varint)
//!
//! 0 varint            bool / int32 / int64 / uint32 / uint64 / sint32 / sint64 / enum
//! 1 64 位定长         fixed64 / sfixed64 / double
//! 2 长度前缀          string / bytes / 嵌套消息
//! 5 32 位定长         fixed32 / sfixed32 / float
//! ```

pub mod buffer;

pub use buffer::{WireReader, WireWriter};

use std::fmt;

/// varint 最大字节数
pub const MAX_VARINT_LEN: usize = 10;

/// 允许的最大字段编号
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// 线路类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// 变长整数
    Varint = 0,
    /// 64 位定长
    Fixed64 = 1,
    /// 长度前缀
    LengthDelimited = 2,
    /// 32 位定长
    Fixed32 = 5,
}

impl WireType {
    /// 从标签低 3 位解析线路类型
    ///
    /// 3、4（分组）以及 6、7 不受支持，返回 `None`。
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// 线路类型的数值
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::Fixed32 => "fixed32",
        };
        write!(f, "{}({})", name, self.as_u8())
    }
}

/// 计算标签值
pub fn make_tag(field_number: u32, wire_type: WireType) -> u64 {
    (u64::from(field_number) << 3) | u64::from(wire_type.as_u8())
}

/// zigzag 编码（32 位）
pub fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// zigzag 解码（32 位）
pub fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// zigzag 编码（64 位）
pub fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// zigzag 解码（64 位）
pub fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// varint 编码后的字节数
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type_from_u8() {
        assert_eq!(WireType::from_u8(0), Some(WireType::Varint));
        assert_eq!(WireType::from_u8(1), Some(WireType::Fixed64));
        assert_eq!(WireType::from_u8(2), Some(WireType::LengthDelimited));
        assert_eq!(WireType::from_u8(5), Some(WireType::Fixed32));
        assert_eq!(WireType::from_u8(3), None);
        assert_eq!(WireType::from_u8(4), None);
        assert_eq!(WireType::from_u8(7), None);
    }

    #[test]
    fn test_make_tag() {
        assert_eq!(make_tag(1, WireType::Varint), 0x08);
        assert_eq!(make_tag(2, WireType::LengthDelimited), 0x12);
        assert_eq!(make_tag(15, WireType::Fixed32), 0x7D);
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_encode_32(0), 0);
        assert_eq!(zigzag_encode_32(-1), 1);
        assert_eq!(zigzag_encode_32(1), 2);
        assert_eq!(zigzag_encode_32(-2), 3);
        assert_eq!(zigzag_encode_32(i32::MAX), u32::MAX - 1);
        assert_eq!(zigzag_encode_32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_decode_32(u32::MAX), i32::MIN);
        assert_eq!(zigzag_encode_64(-1), 1);
        assert_eq!(zigzag_encode_64(i64::MIN), u64::MAX);
        assert_eq!(zigzag_decode_64(3), -2);
        assert_eq!(zigzag_decode_64(u64::MAX), i64::MIN);
    }

    #[test]
    fn test_varint_len() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(300), 2);
        assert_eq!(varint_len(u64::MAX), 10);
    }

    #[test]
    fn test_wire_type_display() {
        assert_eq!(WireType::LengthDelimited.to_string(), "length-delimited(2)");
    }
}
