//! 编解码错误类型
//!
//! Schema 注册、编码、解码和分帧过程中的所有错误。

use crate::wire::WireType;
use std::io;
use thiserror::Error;

/// 编解码错误
#[derive(Error, Debug)]
pub enum CodecError {
    /// 解码时线路类型与字段声明的类型不符
    #[error("字段 {field} 线路类型错误: 期望 {expected}, 实际 {actual}")]
    WrongType {
        field: String,
        expected: WireType,
        actual: WireType,
    },

    /// 枚举值不在枚举定义中
    #[error("字段 {field} 的值无效: {value}")]
    InvalidValue { field: String, value: i32 },

    /// 必填字段未设置
    #[error("必填字段未设置: {0}")]
    RequiredFieldNotSet(String),

    /// 字段编号重复
    #[error("字段编号 {number} ({field}) 已被使用")]
    DuplicateFieldNumber { number: u32, field: String },

    /// 字段名重复
    #[error("字段名已被使用: {0}")]
    DuplicateFieldName(String),

    /// Schema 定义无效
    #[error("无效的 Schema 定义: {0}")]
    InvalidSchema(String),

    /// 消息类型已定义
    #[error("消息类型已定义: {0}")]
    SchemaAlreadyDefined(String),

    /// 消息类型仅声明、未定义
    #[error("消息类型尚未定义: {0}")]
    UndefinedSchema(String),

    /// 消息中不存在该字段
    #[error("消息 {message} 中不存在字段 {field}")]
    UnknownField { message: String, field: String },

    /// 值与字段类型不匹配
    #[error("字段 {field} 类型不匹配: 期望 {expected}")]
    TypeMismatch { field: String, expected: String },

    /// 输入数据格式错误或数据不完整
    #[error("输入数据格式错误: {0}")]
    MalformedInput(String),

    /// 嵌套消息超过解码深度限制
    #[error("嵌套深度超过限制: {0}")]
    RecursionLimitExceeded(usize),

    /// 帧过大
    #[error("帧过大: {0} 字节")]
    FrameTooLarge(usize),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// 获取错误类型
    pub fn kind(&self) -> CodecErrorKind {
        match self {
            CodecError::WrongType { .. } => CodecErrorKind::WrongType,
            CodecError::InvalidValue { .. } => CodecErrorKind::InvalidValue,
            CodecError::RequiredFieldNotSet(_) => CodecErrorKind::RequiredFieldNotSet,
            CodecError::DuplicateFieldNumber { .. } => CodecErrorKind::DuplicateFieldNumber,
            CodecError::DuplicateFieldName(_)
            | CodecError::InvalidSchema(_)
            | CodecError::SchemaAlreadyDefined(_)
            | CodecError::UndefinedSchema(_) => CodecErrorKind::Schema,
            CodecError::UnknownField { .. } | CodecError::TypeMismatch { .. } => {
                CodecErrorKind::Access
            }
            CodecError::MalformedInput(_) | CodecError::RecursionLimitExceeded(_) => {
                CodecErrorKind::MalformedInput
            }
            CodecError::FrameTooLarge(_) => CodecErrorKind::Frame,
            CodecError::Io(_) => CodecErrorKind::Io,
        }
    }

    /// 创建格式错误
    pub fn malformed(msg: impl Into<String>) -> Self {
        CodecError::MalformedInput(msg.into())
    }

    /// 创建 Schema 错误
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        CodecError::InvalidSchema(msg.into())
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch(field: impl Into<String>, expected: impl ToString) -> Self {
        CodecError::TypeMismatch {
            field: field.into(),
            expected: expected.to_string(),
        }
    }
}

/// 错误类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecErrorKind {
    /// 线路类型错误
    WrongType,
    /// 枚举值无效
    InvalidValue,
    /// 必填字段未设置
    RequiredFieldNotSet,
    /// 字段编号重复
    DuplicateFieldNumber,
    /// 其他 Schema 定义错误
    Schema,
    /// 字段访问错误
    Access,
    /// 输入数据错误
    MalformedInput,
    /// 分帧错误
    Frame,
    /// IO 错误
    Io,
}

/// 编解码 Result 类型
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CodecError::malformed("eof").kind(),
            CodecErrorKind::MalformedInput
        );
        assert_eq!(
            CodecError::RequiredFieldNotSet("name".into()).kind(),
            CodecErrorKind::RequiredFieldNotSet
        );
        assert_eq!(
            CodecError::SchemaAlreadyDefined("Person".into()).kind(),
            CodecErrorKind::Schema
        );
        assert_eq!(CodecError::FrameTooLarge(10).kind(), CodecErrorKind::Frame);
    }

    #[test]
    fn test_error_display() {
        let err = CodecError::DuplicateFieldNumber {
            number: 3,
            field: "email".into(),
        };
        assert_eq!(err.to_string(), "字段编号 3 (email) 已被使用");

        let err = CodecError::WrongType {
            field: "id".into(),
            expected: WireType::Varint,
            actual: WireType::LengthDelimited,
        };
        assert!(err.to_string().contains("id"));
        assert!(err.to_string().contains("varint"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err: CodecError = io_err.into();
        assert_eq!(err.kind(), CodecErrorKind::Io);
    }
}
