//! Schema 模块
//!
//! 字段描述、枚举与消息类型的定义和注册。

pub mod enums;
pub mod field;
pub mod registry;

// 重新导出主要类型
pub use enums::EnumType;
pub use field::{FieldDescriptor, FieldKind, FieldOptions, Rule, ScalarKind};
pub use registry::{MessageSchema, MessageType, SchemaBuilder, TypeRegistry};
