//! 枚举类型定义

use crate::error::{CodecError, Result};
use std::fmt;
use std::sync::Arc;

/// 枚举类型
///
/// 名称到 i32 常量的映射，只用于成员校验和符号化显示；
/// 消息中保存的始终是整数值。
#[derive(Clone)]
pub struct EnumType {
    inner: Arc<EnumSchema>,
}

struct EnumSchema {
    name: String,
    values: Vec<(String, i32)>,
}

impl EnumType {
    /// 创建枚举类型
    ///
    /// 常量名不允许重复；多个名称可以对应同一个值（别名）。
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        let name = name.into();
        let mut entries: Vec<(String, i32)> = Vec::new();
        for (value_name, number) in values {
            let value_name = value_name.into();
            if entries.iter().any(|(existing, _)| *existing == value_name) {
                return Err(CodecError::invalid_schema(format!(
                    "枚举 {} 中常量名重复: {}",
                    name, value_name
                )));
            }
            entries.push((value_name, number));
        }

        Ok(Self {
            inner: Arc::new(EnumSchema {
                name,
                values: entries,
            }),
        })
    }

    /// 枚举名称
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 值是否为已定义常量
    pub fn contains(&self, value: i32) -> bool {
        self.inner.values.iter().any(|(_, number)| *number == value)
    }

    /// 值对应的常量名（有别名时返回第一个）
    pub fn name_for(&self, value: i32) -> Option<&str> {
        self.inner
            .values
            .iter()
            .find(|(_, number)| *number == value)
            .map(|(name, _)| name.as_str())
    }

    /// 常量名对应的值
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.inner
            .values
            .iter()
            .find(|(value_name, _)| value_name == name)
            .map(|(_, number)| *number)
    }

    /// 按声明顺序遍历所有常量
    pub fn values(&self) -> impl Iterator<Item = (&str, i32)> {
        self.inner
            .values
            .iter()
            .map(|(name, number)| (name.as_str(), *number))
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumType").field(&self.inner.name).finish()
    }
}
