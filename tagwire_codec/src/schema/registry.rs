//! 消息 Schema 注册
//!
//! 字段在定义期通过 [`SchemaBuilder`] 注册，构建完成后得到不可变的
//! [`MessageSchema`]，由可克隆的 [`MessageType`] 句柄共享。
//!
//! 自引用或相互引用的消息先用 [`MessageType::declare`] 前置声明，
//! 再用 [`SchemaBuilder::for_type`] 补全定义。

use super::field::{FieldDescriptor, FieldKind, FieldOptions, Rule};
use super::EnumType;
use crate::error::{CodecError, Result};
use crate::message::Value;
use crate::wire::MAX_FIELD_NUMBER;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// 消息类型句柄
///
/// 克隆开销为一次引用计数。相等性按同一声明判断，而不是按名称。
#[derive(Clone)]
pub struct MessageType {
    inner: Arc<TypeSlot>,
}

struct TypeSlot {
    name: String,
    schema: OnceLock<MessageSchema>,
}

impl MessageType {
    /// 前置声明一个尚未定义字段的消息类型
    pub fn declare(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TypeSlot {
                name: name.into(),
                schema: OnceLock::new(),
            }),
        }
    }

    /// 消息类型名称
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 是否已定义
    pub fn is_defined(&self) -> bool {
        self.inner.schema.get().is_some()
    }

    /// 获取 Schema
    pub fn schema(&self) -> Result<&MessageSchema> {
        self.inner
            .schema
            .get()
            .ok_or_else(|| CodecError::UndefinedSchema(self.inner.name.clone()))
    }

    fn define(&self, schema: MessageSchema) -> Result<()> {
        self.inner
            .schema
            .set(schema)
            .map_err(|_| CodecError::SchemaAlreadyDefined(self.inner.name.clone()))
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// 自引用类型会形成环，Debug 只输出名称
impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageType").field(&self.inner.name).finish()
    }
}

/// 一个消息类型的字段表
///
/// 按字段编号升序保存，编码顺序与注册顺序无关。
#[derive(Debug)]
pub struct MessageSchema {
    name: String,
    fields: BTreeMap<u32, FieldDescriptor>,
    names: HashMap<String, u32>,
}

impl MessageSchema {
    /// 消息名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 按字段编号升序遍历字段
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// 按编号查找字段
    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.get(&number)
    }

    /// 按名称查找字段
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.names.get(name).and_then(|number| self.fields.get(number))
    }

    /// 是否包含该字段编号
    pub fn contains(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// 所有必填字段
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields().filter(|field| field.is_required())
    }

    /// 字段数量
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for MessageSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message {} {{", self.name)?;
        for field in self.fields() {
            writeln!(f, "  {};", field)?;
        }
        f.write_str("}")
    }
}

/// Schema 构建器
#[derive(Debug)]
pub struct SchemaBuilder {
    target: MessageType,
    fields: BTreeMap<u32, FieldDescriptor>,
    names: HashMap<String, u32>,
}

impl SchemaBuilder {
    /// 为新的消息类型创建构建器
    pub fn new(name: impl Into<String>) -> Self {
        Self::for_type(&MessageType::declare(name))
    }

    /// 为已前置声明的消息类型创建构建器
    pub fn for_type(ty: &MessageType) -> Self {
        Self {
            target: ty.clone(),
            fields: BTreeMap::new(),
            names: HashMap::new(),
        }
    }

    /// 目标消息类型，可用于声明自引用字段
    pub fn message_type(&self) -> &MessageType {
        &self.target
    }

    /// 注册字段
    pub fn declare_field(
        &mut self,
        rule: Rule,
        name: impl Into<String>,
        kind: impl Into<FieldKind>,
        number: u32,
        mut options: FieldOptions,
    ) -> Result<&mut Self> {
        let name = name.into();
        let kind = kind.into();
        options.default = options.default.map(|value| value.coerce_for(&kind));

        if let Some(existing) = self.fields.get(&number) {
            return Err(CodecError::DuplicateFieldNumber {
                number,
                field: existing.name().to_string(),
            });
        }
        if self.names.contains_key(&name) {
            return Err(CodecError::DuplicateFieldName(name));
        }
        self.check_field(rule, &name, &kind, number, &options)?;

        self.names.insert(name.clone(), number);
        self.fields
            .insert(number, FieldDescriptor::new(rule, name, kind, number, options));
        Ok(self)
    }

    /// 注册必填字段
    pub fn required(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<FieldKind>,
        number: u32,
    ) -> Result<&mut Self> {
        self.declare_field(Rule::Required, name, kind, number, FieldOptions::default())
    }

    /// 注册可选字段
    pub fn optional(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<FieldKind>,
        number: u32,
    ) -> Result<&mut Self> {
        self.declare_field(Rule::Optional, name, kind, number, FieldOptions::default())
    }

    /// 注册重复字段
    pub fn repeated(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<FieldKind>,
        number: u32,
    ) -> Result<&mut Self> {
        self.declare_field(Rule::Repeated, name, kind, number, FieldOptions::default())
    }

    /// 完成定义，返回不可变的消息类型
    pub fn build(self) -> Result<MessageType> {
        let schema = MessageSchema {
            name: self.target.name().to_string(),
            fields: self.fields,
            names: self.names,
        };
        self.target.define(schema)?;
        Ok(self.target)
    }

    fn check_field(
        &self,
        rule: Rule,
        name: &str,
        kind: &FieldKind,
        number: u32,
        options: &FieldOptions,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(CodecError::invalid_schema("字段名不能为空"));
        }
        if number == 0 || number > MAX_FIELD_NUMBER {
            return Err(CodecError::invalid_schema(format!(
                "字段 {} 的编号 {} 超出范围 1..={}",
                name, number, MAX_FIELD_NUMBER
            )));
        }
        if options.packed && (rule != Rule::Repeated || !kind.is_packable()) {
            return Err(CodecError::invalid_schema(format!(
                "字段 {} 不能使用 packed: 仅支持重复的数值或枚举字段",
                name
            )));
        }
        if let Some(default) = &options.default {
            if rule == Rule::Repeated || matches!(kind, FieldKind::Message(_)) {
                return Err(CodecError::invalid_schema(format!(
                    "字段 {} 不支持默认值",
                    name
                )));
            }
            if !kind.accepts(default) {
                return Err(CodecError::invalid_schema(format!(
                    "字段 {} 的默认值类型应为 {}",
                    name, kind
                )));
            }
            if let (FieldKind::Enum(ty), Value::Enum(value)) = (kind, default) {
                if !ty.contains(*value) {
                    return Err(CodecError::invalid_schema(format!(
                        "字段 {} 的默认值 {} 不是枚举 {} 的成员",
                        name,
                        value,
                        ty.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// 类型注册表
///
/// 按名称登记消息与枚举类型，供代码生成器解析类型引用。
#[derive(Debug, Default)]
pub struct TypeRegistry {
    messages: HashMap<String, MessageType>,
    enums: HashMap<String, EnumType>,
}

impl TypeRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册消息类型
    pub fn register_message(&mut self, ty: &MessageType) -> Result<()> {
        if self.contains(ty.name()) {
            return Err(CodecError::invalid_schema(format!("类型已注册: {}", ty.name())));
        }
        self.messages.insert(ty.name().to_string(), ty.clone());
        Ok(())
    }

    /// 注册枚举类型
    pub fn register_enum(&mut self, ty: &EnumType) -> Result<()> {
        if self.contains(ty.name()) {
            return Err(CodecError::invalid_schema(format!("类型已注册: {}", ty.name())));
        }
        self.enums.insert(ty.name().to_string(), ty.clone());
        Ok(())
    }

    /// 按名称获取消息类型
    pub fn message(&self, name: &str) -> Option<&MessageType> {
        self.messages.get(name)
    }

    /// 按名称获取枚举类型
    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    /// 按名称解析为字段类型
    pub fn resolve(&self, name: &str) -> Option<FieldKind> {
        self.message(name)
            .map(FieldKind::from)
            .or_else(|| self.enum_type(name).map(FieldKind::from))
    }

    /// 名称是否已注册
    pub fn contains(&self, name: &str) -> bool {
        self.messages.contains_key(name) || self.enums.contains_key(name)
    }

    /// 已注册类型数量
    pub fn count(&self) -> usize {
        self.messages.len() + self.enums.len()
    }

    /// 列出所有已注册的类型名称（已排序）
    pub fn list_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .messages
            .keys()
            .chain(self.enums.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecErrorKind;
    use crate::schema::ScalarKind;

    #[test]
    fn test_fields_sorted_by_number() {
        let mut builder = SchemaBuilder::new("Person");
        builder
            .optional("email", ScalarKind::String, 3)
            .unwrap()
            .required("name", ScalarKind::String, 1)
            .unwrap()
            .optional("id", ScalarKind::Int32, 2)
            .unwrap();
        let person = builder.build().unwrap();

        let schema = person.schema().unwrap();
        let numbers: Vec<u32> = schema.fields().map(|f| f.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(schema.field_by_name("id").unwrap().number(), 2);
        assert_eq!(schema.required_fields().count(), 1);
        assert!(schema.contains(3));
        assert!(!schema.contains(4));
    }

    #[test]
    fn test_duplicate_field_number() {
        let mut builder = SchemaBuilder::new("Dup");
        builder.optional("a", ScalarKind::Int32, 1).unwrap();
        let err = builder.optional("b", ScalarKind::Int32, 1).unwrap_err();
        assert_eq!(err.kind(), CodecErrorKind::DuplicateFieldNumber);
    }

    #[test]
    fn test_duplicate_field_name() {
        let mut builder = SchemaBuilder::new("Dup");
        builder.optional("a", ScalarKind::Int32, 1).unwrap();
        let err = builder.optional("a", ScalarKind::Int32, 2).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateFieldName(_)));
    }

    #[test]
    fn test_field_number_range() {
        let mut builder = SchemaBuilder::new("Range");
        assert!(builder.optional("zero", ScalarKind::Int32, 0).is_err());
        assert!(builder.optional("big", ScalarKind::Int32, MAX_FIELD_NUMBER + 1).is_err());
        assert!(builder.optional("max", ScalarKind::Int32, MAX_FIELD_NUMBER).is_ok());
    }

    #[test]
    fn test_packed_validation() {
        let mut builder = SchemaBuilder::new("Packed");
        let packed = FieldOptions::new().packed();
        assert!(
            builder
                .declare_field(Rule::Optional, "one", ScalarKind::UInt32, 1, packed.clone())
                .is_err()
        );
        assert!(
            builder
                .declare_field(Rule::Repeated, "names", ScalarKind::String, 2, packed.clone())
                .is_err()
        );
        assert!(
            builder
                .declare_field(Rule::Repeated, "ids", ScalarKind::UInt32, 3, packed)
                .is_ok()
        );
    }

    #[test]
    fn test_default_validation() {
        let mut builder = SchemaBuilder::new("Defaults");
        assert!(
            builder
                .declare_field(
                    Rule::Optional,
                    "count",
                    ScalarKind::UInt32,
                    1,
                    FieldOptions::new().with_default("ten"),
                )
                .is_err()
        );
        assert!(
            builder
                .declare_field(
                    Rule::Repeated,
                    "counts",
                    ScalarKind::UInt32,
                    2,
                    FieldOptions::new().with_default(10u32),
                )
                .is_err()
        );
        assert!(
            builder
                .declare_field(
                    Rule::Optional,
                    "limit",
                    ScalarKind::UInt32,
                    3,
                    FieldOptions::new().with_default(10u32),
                )
                .is_ok()
        );
    }

    #[test]
    fn test_forward_declared_recursion() {
        let node = MessageType::declare("Node");
        assert!(!node.is_defined());
        assert!(matches!(node.schema(), Err(CodecError::UndefinedSchema(_))));

        let mut builder = SchemaBuilder::for_type(&node);
        builder
            .required("value", ScalarKind::Int32, 1)
            .unwrap()
            .optional("next", &node, 2)
            .unwrap();
        let built = builder.build().unwrap();

        assert_eq!(built, node);
        assert!(node.is_defined());
        let next = node.schema().unwrap().field(2).unwrap();
        assert_eq!(next.kind(), &FieldKind::Message(node.clone()));
    }

    #[test]
    fn test_define_twice() {
        let ty = SchemaBuilder::new("Once").build().unwrap();
        let err = SchemaBuilder::for_type(&ty).build().unwrap_err();
        assert!(matches!(err, CodecError::SchemaAlreadyDefined(_)));
    }

    #[test]
    fn test_schema_display() {
        let mut builder = SchemaBuilder::new("Point");
        builder
            .required("x", ScalarKind::SInt32, 1)
            .unwrap()
            .required("y", ScalarKind::SInt32, 2)
            .unwrap();
        let point = builder.build().unwrap();
        let text = point.schema().unwrap().to_string();
        assert!(text.starts_with("message Point {"));
        assert!(text.contains("required sint32 x = 1;"));
    }

    #[test]
    fn test_type_registry() {
        let mut registry = TypeRegistry::new();
        let point = SchemaBuilder::new("Point").build().unwrap();
        let color = EnumType::new("Color", [("RED", 0)]).unwrap();
        registry.register_message(&point).unwrap();
        registry.register_enum(&color).unwrap();

        assert_eq!(registry.count(), 2);
        assert_eq!(registry.list_names(), vec!["Color", "Point"]);
        assert_eq!(registry.resolve("Point"), Some(FieldKind::Message(point.clone())));
        assert_eq!(registry.resolve("Color"), Some(FieldKind::Enum(color)));
        assert!(registry.resolve("Missing").is_none());
        assert!(registry.register_message(&point).is_err());
    }
}
