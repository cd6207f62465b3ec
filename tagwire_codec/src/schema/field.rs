//! 字段描述
//!
//! 字段规则、类型分类与字段选项。

use super::{EnumType, MessageType};
use crate::error::CodecError;
use crate::message::Value;
use crate::wire::WireType;
use std::fmt;
use std::str::FromStr;

/// 字段规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// 必填
    Required,
    /// 可选
    Optional,
    /// 重复
    Repeated,
}

impl Rule {
    /// 规则名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Optional => "optional",
            Rule::Repeated => "repeated",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rule {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Rule::Required),
            "optional" => Ok(Rule::Optional),
            "repeated" => Ok(Rule::Repeated),
            other => Err(CodecError::invalid_schema(format!("未知的字段规则: {}", other))),
        }
    }
}

/// 标量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Double,
    Float,
    /// 非 zigzag，负数占 10 字节
    Int32,
    /// 非 zigzag，负数占 10 字节
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarKind {
    /// 所有标量类型
    pub const ALL: [ScalarKind; 15] = [
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::UInt32,
        ScalarKind::UInt64,
        ScalarKind::SInt32,
        ScalarKind::SInt64,
        ScalarKind::Fixed32,
        ScalarKind::Fixed64,
        ScalarKind::SFixed32,
        ScalarKind::SFixed64,
        ScalarKind::Bool,
        ScalarKind::String,
        ScalarKind::Bytes,
    ];

    /// 该类型在线路上的编码方式
    pub fn wire_type(&self) -> WireType {
        match self {
            ScalarKind::Int32
            | ScalarKind::Int64
            | ScalarKind::UInt32
            | ScalarKind::UInt64
            | ScalarKind::SInt32
            | ScalarKind::SInt64
            | ScalarKind::Bool => WireType::Varint,
            ScalarKind::Fixed64 | ScalarKind::SFixed64 | ScalarKind::Double => WireType::Fixed64,
            ScalarKind::Fixed32 | ScalarKind::SFixed32 | ScalarKind::Float => WireType::Fixed32,
            ScalarKind::String | ScalarKind::Bytes => WireType::LengthDelimited,
        }
    }

    /// 类型名称（小写，与 .proto 一致）
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::SInt32 => "sint32",
            ScalarKind::SInt64 => "sint64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::SFixed32 => "sfixed32",
            ScalarKind::SFixed64 => "sfixed64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }

    /// 是否允许 packed 编码
    pub fn is_packable(&self) -> bool {
        self.wire_type() != WireType::LengthDelimited
    }

    /// 值是否属于该类型
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarKind::Bool, Value::Bool(_))
                | (
                    ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32,
                    Value::I32(_)
                )
                | (
                    ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64,
                    Value::I64(_)
                )
                | (ScalarKind::UInt32 | ScalarKind::Fixed32, Value::U32(_))
                | (ScalarKind::UInt64 | ScalarKind::Fixed64, Value::U64(_))
                | (ScalarKind::Float, Value::F32(_))
                | (ScalarKind::Double, Value::F64(_))
                | (ScalarKind::String, Value::String(_))
                | (ScalarKind::Bytes, Value::Bytes(_))
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CodecError::invalid_schema(format!("未知的标量类型: {}", s)))
    }
}

/// 字段类型：标量、枚举或嵌套消息
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Enum(EnumType),
    Message(MessageType),
}

impl FieldKind {
    /// 字段在线路上的编码方式
    ///
    /// 枚举按 int32 编码，嵌套消息按长度前缀编码。
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Scalar(kind) => kind.wire_type(),
            FieldKind::Enum(_) => WireType::Varint,
            FieldKind::Message(_) => WireType::LengthDelimited,
        }
    }

    /// 是否允许 packed 编码
    pub fn is_packable(&self) -> bool {
        match self {
            FieldKind::Scalar(kind) => kind.is_packable(),
            FieldKind::Enum(_) => true,
            FieldKind::Message(_) => false,
        }
    }

    /// 值是否属于该类型
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Scalar(kind), value) => kind.accepts(value),
            (FieldKind::Enum(_), Value::Enum(_)) => true,
            (FieldKind::Message(ty), Value::Message(msg)) => msg.message_type() == ty,
            _ => false,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(kind) => write!(f, "{}", kind),
            FieldKind::Enum(ty) => write!(f, "enum {}", ty.name()),
            FieldKind::Message(ty) => write!(f, "message {}", ty.name()),
        }
    }
}

impl From<ScalarKind> for FieldKind {
    fn from(kind: ScalarKind) -> Self {
        FieldKind::Scalar(kind)
    }
}

impl From<EnumType> for FieldKind {
    fn from(ty: EnumType) -> Self {
        FieldKind::Enum(ty)
    }
}

impl From<&EnumType> for FieldKind {
    fn from(ty: &EnumType) -> Self {
        FieldKind::Enum(ty.clone())
    }
}

impl From<MessageType> for FieldKind {
    fn from(ty: MessageType) -> Self {
        FieldKind::Message(ty)
    }
}

impl From<&MessageType> for FieldKind {
    fn from(ty: &MessageType) -> Self {
        FieldKind::Message(ty.clone())
    }
}

/// 字段选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// 解码后字段仍未设置时使用的默认值
    pub default: Option<Value>,
    /// 是否 packed 编码
    pub packed: bool,
}

impl FieldOptions {
    /// 创建空选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置默认值
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// 启用 packed 编码
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }
}

/// 字段描述
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    rule: Rule,
    name: String,
    kind: FieldKind,
    number: u32,
    options: FieldOptions,
}

impl FieldDescriptor {
    pub(crate) fn new(
        rule: Rule,
        name: String,
        kind: FieldKind,
        number: u32,
        options: FieldOptions,
    ) -> Self {
        Self {
            rule,
            name,
            kind,
            number,
            options,
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.options.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.rule == Rule::Required
    }

    pub fn is_repeated(&self) -> bool {
        self.rule == Rule::Repeated
    }

    /// 是否按 packed 方式编解码
    pub fn is_packed(&self) -> bool {
        self.is_repeated() && self.options.packed
    }

    /// 期望的线路类型
    ///
    /// packed 字段同样使用元素类型的线路类型，而不是长度前缀类型。
    pub fn wire_type(&self) -> WireType {
        self.kind.wire_type()
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} = {}", self.rule, self.kind, self.name, self.number)?;
        if self.options.packed {
            f.write_str(" [packed]")?;
        }
        if let Some(default) = &self.options.default {
            write!(f, " [default = {}]", default)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_wire_types() {
        assert_eq!(ScalarKind::Bool.wire_type(), WireType::Varint);
        assert_eq!(ScalarKind::SInt64.wire_type(), WireType::Varint);
        assert_eq!(ScalarKind::Double.wire_type(), WireType::Fixed64);
        assert_eq!(ScalarKind::SFixed32.wire_type(), WireType::Fixed32);
        assert_eq!(ScalarKind::Bytes.wire_type(), WireType::LengthDelimited);
    }

    #[test]
    fn test_scalar_name_round_trip() {
        for kind in ScalarKind::ALL {
            assert_eq!(kind.name().parse::<ScalarKind>().unwrap(), kind);
        }
        assert!("group".parse::<ScalarKind>().is_err());
    }

    #[test]
    fn test_rule_parse() {
        assert_eq!("repeated".parse::<Rule>().unwrap(), Rule::Repeated);
        assert!("many".parse::<Rule>().is_err());
    }

    #[test]
    fn test_accepts() {
        assert!(ScalarKind::SInt32.accepts(&Value::I32(-3)));
        assert!(!ScalarKind::UInt32.accepts(&Value::I32(3)));
        assert!(ScalarKind::Fixed64.accepts(&Value::U64(3)));
        assert!(!ScalarKind::String.accepts(&Value::Bytes(bytes::Bytes::new())));
    }

    #[test]
    fn test_packable() {
        assert!(FieldKind::Scalar(ScalarKind::UInt32).is_packable());
        assert!(!FieldKind::Scalar(ScalarKind::String).is_packable());
        let color = EnumType::new("Color", [("RED", 1)]).unwrap();
        assert!(FieldKind::from(&color).is_packable());
    }

    #[test]
    fn test_descriptor_display() {
        let field = FieldDescriptor::new(
            Rule::Repeated,
            "ids".to_string(),
            ScalarKind::UInt32.into(),
            4,
            FieldOptions::new().packed(),
        );
        assert_eq!(field.to_string(), "repeated uint32 ids = 4 [packed]");
        assert!(field.is_packed());
    }
}
