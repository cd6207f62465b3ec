//! 消息实例
//!
//! 以字段编号为键的值表，所有访问都经过 Schema 校验。
//! 未设置与布尔 `false` 是不同的状态；空序列在相等比较中视为未设置。

use crate::error::{CodecError, Result};
use crate::schema::{FieldDescriptor, FieldKind, MessageSchema, MessageType};
use bytes::Bytes;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 字段值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// int32 / sint32 / sfixed32
    I32(i32),
    /// int64 / sint64 / sfixed64
    I64(i64),
    /// uint32 / fixed32
    U32(u32),
    /// uint64 / fixed64
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Bytes),
    /// 枚举的整数值
    Enum(i32),
    Message(Box<Message>),
}

impl Value {
    /// 值类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<i32> {
        match self {
            Value::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(v) => Some(v),
            _ => None,
        }
    }

    /// 按字段类型做最小转换：枚举字段接受 `I32`
    pub(crate) fn coerce_for(self, kind: &FieldKind) -> Value {
        match (kind, self) {
            (FieldKind::Enum(_), Value::I32(v)) => Value::Enum(v),
            (_, value) => value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) | Value::Enum(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Bytes(v) => write!(f, "{:?}", v),
            Value::Message(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Value::Message(Box::new(v))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I32(v) | Value::Enum(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Bytes(v) => serializer.serialize_bytes(v),
            Value::Message(v) => v.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Single(Value),
    Repeated(Vec<Value>),
}

/// 已设置字段的值视图
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Single(&'a Value),
    Repeated(&'a [Value]),
}

/// 消息实例
///
/// 相等性按类型和已设置字段比较，空的重复字段视为未设置。
#[derive(Debug, Clone)]
pub struct Message {
    ty: MessageType,
    slots: BTreeMap<u32, Slot>,
}

impl Message {
    /// 创建所有字段均未设置的实例
    pub fn new(ty: &MessageType) -> Self {
        Self {
            ty: ty.clone(),
            slots: BTreeMap::new(),
        }
    }

    /// 消息类型
    pub fn message_type(&self) -> &MessageType {
        &self.ty
    }

    /// 消息 Schema
    pub fn schema(&self) -> Result<&MessageSchema> {
        self.ty.schema()
    }

    /// 设置单值字段并返回自身，便于链式构造
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// 设置重复字段并返回自身
    pub fn with_repeated<I, V>(mut self, name: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.set_repeated(name, values)?;
        Ok(self)
    }

    /// 设置单值字段（required / optional）
    ///
    /// 枚举字段不在此处校验取值，非法值会在编码时报错。
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let field = lookup(&self.ty, name)?;
        if field.is_repeated() {
            return Err(CodecError::type_mismatch(
                name,
                format!("repeated {}", field.kind()),
            ));
        }
        let value = checked(field, value.into())?;
        self.slots.insert(field.number(), Slot::Single(value));
        Ok(())
    }

    /// 整体替换重复字段
    pub fn set_repeated<I, V>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = repeated_lookup(&self.ty, name)?;
        let values = values
            .into_iter()
            .map(|value| checked(field, value.into()))
            .collect::<Result<Vec<_>>>()?;
        self.slots.insert(field.number(), Slot::Repeated(values));
        Ok(())
    }

    /// 向重复字段追加一个值
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let field = repeated_lookup(&self.ty, name)?;
        let value = checked(field, value.into())?;
        push_slot(&mut self.slots, field.number(), value);
        Ok(())
    }

    /// 清除字段，恢复为未设置
    pub fn clear(&mut self, name: &str) -> Result<()> {
        let field = lookup(&self.ty, name)?;
        self.slots.remove(&field.number());
        Ok(())
    }

    /// 读取单值字段；未设置或字段不存在时返回 `None`
    pub fn get(&self, name: &str) -> Option<&Value> {
        let number = self.ty.schema().ok()?.field_by_name(name)?.number();
        self.get_by_number(number)
    }

    /// 按编号读取单值字段
    pub fn get_by_number(&self, number: u32) -> Option<&Value> {
        match self.slots.get(&number)? {
            Slot::Single(value) => Some(value),
            Slot::Repeated(_) => None,
        }
    }

    /// 读取重复字段
    pub fn get_repeated(&self, name: &str) -> Option<&[Value]> {
        let number = self.ty.schema().ok()?.field_by_name(name)?.number();
        match self.slots.get(&number)? {
            Slot::Repeated(values) => Some(values),
            Slot::Single(_) => None,
        }
    }

    /// 字段是否已设置
    pub fn is_set(&self, name: &str) -> bool {
        self.ty
            .schema()
            .ok()
            .and_then(|schema| schema.field_by_name(name))
            .is_some_and(|field| self.slots.contains_key(&field.number()))
    }

    /// 已设置字段数量
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 是否没有任何字段被设置
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 按字段编号升序遍历已设置的字段
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, FieldValue<'_>)> {
        let schema = self.ty.schema().ok();
        self.slots.iter().filter_map(move |(number, slot)| {
            let field = schema?.field(*number)?;
            let value = match slot {
                Slot::Single(value) => FieldValue::Single(value),
                Slot::Repeated(values) => FieldValue::Repeated(values),
            };
            Some((field, value))
        })
    }

    /// 校验所有必填字段均已设置
    pub fn validate(&self) -> Result<()> {
        let schema = self.ty.schema()?;
        for field in schema.required_fields() {
            if !self.slots.contains_key(&field.number()) {
                return Err(CodecError::RequiredFieldNotSet(field.name().to_string()));
            }
        }
        Ok(())
    }

    // 参与比较的字段，跳过空的重复字段
    fn populated(&self) -> impl Iterator<Item = (&u32, &Slot)> {
        self.slots
            .iter()
            .filter(|(_, slot)| !matches!(slot, Slot::Repeated(values) if values.is_empty()))
    }

    pub(crate) fn slot(&self, number: u32) -> Option<&Slot> {
        self.slots.get(&number)
    }

    pub(crate) fn is_unset(&self, number: u32) -> bool {
        !self.slots.contains_key(&number)
    }

    /// 解码路径：值已按字段类型读出，无需再次校验
    pub(crate) fn put_decoded(&mut self, number: u32, value: Value) {
        self.slots.insert(number, Slot::Single(value));
    }

    pub(crate) fn push_decoded(&mut self, number: u32, value: Value) {
        push_slot(&mut self.slots, number, value);
    }

    pub(crate) fn ensure_repeated(&mut self, number: u32) {
        self.slots
            .entry(number)
            .or_insert_with(|| Slot::Repeated(Vec::new()));
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.populated().eq(other.populated())
    }
}

fn lookup<'a>(ty: &'a MessageType, name: &str) -> Result<&'a FieldDescriptor> {
    ty.schema()?
        .field_by_name(name)
        .ok_or_else(|| CodecError::UnknownField {
            message: ty.name().to_string(),
            field: name.to_string(),
        })
}

fn repeated_lookup<'a>(ty: &'a MessageType, name: &str) -> Result<&'a FieldDescriptor> {
    let field = lookup(ty, name)?;
    if !field.is_repeated() {
        return Err(CodecError::type_mismatch(name, field.kind()));
    }
    Ok(field)
}

fn checked(field: &FieldDescriptor, value: Value) -> Result<Value> {
    let value = value.coerce_for(field.kind());
    if field.kind().accepts(&value) {
        Ok(value)
    } else {
        Err(CodecError::type_mismatch(field.name(), field.kind()))
    }
}

fn push_slot(slots: &mut BTreeMap<u32, Slot>, number: u32, value: Value) {
    let slot = slots
        .entry(number)
        .or_insert_with(|| Slot::Repeated(Vec::new()));
    match slot {
        Slot::Repeated(values) => values.push(value),
        Slot::Single(_) => *slot = Slot::Repeated(vec![value]),
    }
}

fn fmt_value(f: &mut fmt::Formatter<'_>, kind: &FieldKind, value: &Value) -> fmt::Result {
    match (kind, value) {
        (FieldKind::Enum(ty), Value::Enum(number)) => {
            write!(f, "{}({})", ty.name_for(*number).unwrap_or("-NA-"), number)
        }
        _ => write!(f, "{}", value),
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.ty.name())?;
        for (i, (field, value)) in self.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{}: ", field.name())?;
            match value {
                FieldValue::Single(value) => fmt_value(f, field.kind(), value)?,
                FieldValue::Repeated(values) => {
                    f.write_str("[")?;
                    for (j, value) in values.iter().enumerate() {
                        if j > 0 {
                            f.write_str(", ")?;
                        }
                        fmt_value(f, field.kind(), value)?;
                    }
                    f.write_str("]")?;
                }
            }
        }
        f.write_str(">")
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.ty.schema().map_err(S::Error::custom)?;
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (field, value) in self.iter() {
            match value {
                FieldValue::Single(value) => map.serialize_entry(field.name(), value)?,
                FieldValue::Repeated(values) => map.serialize_entry(field.name(), values)?,
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecErrorKind;
    use crate::schema::{EnumType, FieldOptions, Rule, ScalarKind, SchemaBuilder};

    fn person_type() -> (MessageType, EnumType) {
        let kind = EnumType::new("Kind", [("A", 1), ("B", 2)]).unwrap();
        let mut builder = SchemaBuilder::new("Person");
        builder
            .required("name", ScalarKind::String, 1)
            .unwrap()
            .optional("active", ScalarKind::Bool, 2)
            .unwrap()
            .optional("kind", &kind, 3)
            .unwrap()
            .declare_field(
                Rule::Repeated,
                "scores",
                ScalarKind::UInt32,
                4,
                FieldOptions::new().packed(),
            )
            .unwrap();
        (builder.build().unwrap(), kind)
    }

    #[test]
    fn test_set_and_get() {
        let (person, _) = person_type();
        let mut msg = Message::new(&person);
        assert!(msg.is_empty());

        msg.set("name", "ada").unwrap();
        msg.set("active", false).unwrap();
        assert_eq!(msg.get("name").and_then(Value::as_str), Some("ada"));
        assert_eq!(msg.get("active"), Some(&Value::Bool(false)));
        assert!(msg.is_set("active"));
        assert!(!msg.is_set("kind"));
        assert_eq!(msg.len(), 2);
    }

    #[test]
    fn test_enum_accepts_i32() {
        let (person, _) = person_type();
        let msg = Message::new(&person).with("kind", 2).unwrap();
        assert_eq!(msg.get("kind"), Some(&Value::Enum(2)));
    }

    #[test]
    fn test_type_mismatch() {
        let (person, _) = person_type();
        let mut msg = Message::new(&person);
        let err = msg.set("name", 5u32).unwrap_err();
        assert_eq!(err.kind(), CodecErrorKind::Access);
        assert!(msg.set("scores", 5u32).is_err());
        assert!(msg.push("name", "x").is_err());
    }

    #[test]
    fn test_unknown_field() {
        let (person, _) = person_type();
        let mut msg = Message::new(&person);
        let err = msg.set("missing", 1).unwrap_err();
        assert!(matches!(err, CodecError::UnknownField { .. }));
        assert_eq!(msg.get("missing"), None);
    }

    #[test]
    fn test_repeated_access() {
        let (person, _) = person_type();
        let mut msg = Message::new(&person);
        assert_eq!(msg.get_repeated("scores"), None);

        msg.set_repeated("scores", Vec::<u32>::new()).unwrap();
        assert_eq!(msg.get_repeated("scores"), Some(&[][..]));

        msg.push("scores", 7u32).unwrap();
        msg.push("scores", 9u32).unwrap();
        assert_eq!(
            msg.get_repeated("scores"),
            Some(&[Value::U32(7), Value::U32(9)][..])
        );

        msg.clear("scores").unwrap();
        assert!(!msg.is_set("scores"));
    }

    #[test]
    fn test_validate_required() {
        let (person, _) = person_type();
        let msg = Message::new(&person);
        assert!(matches!(
            msg.validate(),
            Err(CodecError::RequiredFieldNotSet(name)) if name == "name"
        ));
        assert!(msg.with("name", "x").unwrap().validate().is_ok());
    }

    #[test]
    fn test_equality() {
        let (person, _) = person_type();
        let a = Message::new(&person).with("name", "x").unwrap();
        let b = Message::new(&person).with("name", "x").unwrap();
        let c = Message::new(&person).with("name", "y").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let (other, _) = person_type();
        let d = Message::new(&other).with("name", "x").unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn test_empty_repeated_equals_unset() {
        let (person, _) = person_type();
        let unset = Message::new(&person).with("name", "x").unwrap();
        let empty = unset
            .clone()
            .with_repeated("scores", Vec::<u32>::new())
            .unwrap();

        assert_eq!(empty, unset);
        assert!(empty.is_set("scores"));
        assert_eq!(empty.get_repeated("scores"), Some(&[][..]));

        let filled = unset.clone().with_repeated("scores", [1u32]).unwrap();
        assert_ne!(filled, unset);
    }

    #[test]
    fn test_display() {
        let (person, _) = person_type();
        let msg = Message::new(&person)
            .with("name", "ada")
            .unwrap()
            .with("kind", 2)
            .unwrap()
            .with_repeated("scores", [1u32, 2])
            .unwrap();
        assert_eq!(msg.to_string(), r#"<Person name: "ada", kind: B(2), scores: [1, 2]>"#);

        let unknown = Message::new(&person).with("kind", 7).unwrap();
        assert_eq!(unknown.to_string(), "<Person kind: -NA-(7)>");
    }

    #[test]
    fn test_serialize_set_fields() {
        let (person, _) = person_type();
        let msg = Message::new(&person)
            .with("name", "ada")
            .unwrap()
            .with("active", false)
            .unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "ada", "active": false }));
    }
}
