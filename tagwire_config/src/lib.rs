//! 配置管理系统
//!
//! 提供编解码限制和 RPC 端点配置，支持 TOML 文件与环境变量覆盖。

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析配置文件失败: {0}")]
    Parse(String),

    /// 验证错误
    #[error("配置验证失败: {0}")]
    Validation(String),

    /// 环境变量错误
    #[error("环境变量解析失败: {0}")]
    EnvVar(String),
}

/// 配置 Result 类型
pub type Result<T> = std::result::Result<T, ConfigError>;

/// 编解码配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// 单个分隔帧允许的最大字节数
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,

    /// 嵌套消息的最大解码深度
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: usize,
}

/// RPC 端点配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// 服务器主机名或地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 服务器端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// 单次请求读写超时（秒）
    #[serde(default = "default_io_timeout")]
    pub io_timeout_secs: u64,
}

/// 顶层配置
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagwireConfig {
    /// 编解码配置
    #[serde(default)]
    pub codec: CodecConfig,

    /// 端点配置
    #[serde(default)]
    pub client: EndpointConfig,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_frame_size: default_max_frame_size(),
            recursion_limit: default_recursion_limit(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            io_timeout_secs: default_io_timeout(),
        }
    }
}

impl CodecConfig {
    /// 验证编解码配置
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size == 0 {
            return Err(ConfigError::Validation("最大帧大小不能为 0".to_string()));
        }
        if self.recursion_limit == 0 {
            return Err(ConfigError::Validation("递归深度限制不能为 0".to_string()));
        }
        Ok(())
    }
}

impl EndpointConfig {
    /// 验证端点配置
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(ConfigError::Validation("主机地址不能为空".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation("端口不能为 0".to_string()));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation("连接超时不能为 0".to_string()));
        }
        if self.io_timeout_secs == 0 {
            return Err(ConfigError::Validation("读写超时不能为 0".to_string()));
        }
        Ok(())
    }

    /// 获取 `host:port` 形式的地址字符串
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TagwireConfig {
    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从环境变量加载配置并覆盖
    ///
    /// 支持的环境变量：
    /// - TAGWIRE_HOST: 服务器地址
    /// - TAGWIRE_PORT: 端口
    /// - TAGWIRE_CONNECT_TIMEOUT_SECS: 连接超时
    /// - TAGWIRE_IO_TIMEOUT_SECS: 读写超时
    /// - TAGWIRE_MAX_FRAME_SIZE: 最大帧大小
    /// - TAGWIRE_RECURSION_LIMIT: 嵌套解码深度
    pub fn load_with_env_override(mut self) -> Result<Self> {
        if let Ok(host) = std::env::var("TAGWIRE_HOST") {
            self.client.host = host;
        }

        if let Ok(port) = std::env::var("TAGWIRE_PORT") {
            self.client.port = port
                .parse()
                .map_err(|_| ConfigError::EnvVar("TAGWIRE_PORT 必须是有效的 u16 数字".to_string()))?;
        }

        if let Ok(secs) = std::env::var("TAGWIRE_CONNECT_TIMEOUT_SECS") {
            self.client.connect_timeout_secs = secs.parse().map_err(|_| {
                ConfigError::EnvVar("TAGWIRE_CONNECT_TIMEOUT_SECS 必须是有效的 u64 数字".to_string())
            })?;
        }

        if let Ok(secs) = std::env::var("TAGWIRE_IO_TIMEOUT_SECS") {
            self.client.io_timeout_secs = secs.parse().map_err(|_| {
                ConfigError::EnvVar("TAGWIRE_IO_TIMEOUT_SECS 必须是有效的 u64 数字".to_string())
            })?;
        }

        if let Ok(size) = std::env::var("TAGWIRE_MAX_FRAME_SIZE") {
            self.codec.max_frame_size = size.parse().map_err(|_| {
                ConfigError::EnvVar("TAGWIRE_MAX_FRAME_SIZE 必须是有效的 usize 数字".to_string())
            })?;
        }

        if let Ok(limit) = std::env::var("TAGWIRE_RECURSION_LIMIT") {
            self.codec.recursion_limit = limit.parse().map_err(|_| {
                ConfigError::EnvVar("TAGWIRE_RECURSION_LIMIT 必须是有效的 usize 数字".to_string())
            })?;
        }

        Ok(self)
    }

    /// 从文件加载并应用环境变量覆盖
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file(path)?.load_with_env_override()
    }

    /// 验证配置是否有效
    pub fn validate(&self) -> Result<()> {
        self.codec.validate()?;
        self.client.validate()
    }

    /// 获取配置摘要信息
    pub fn summary(&self) -> String {
        format!(
            "tagwire 配置:\n  端点: {}\n  连接超时: {}s\n  读写超时: {}s\n  最大帧: {} 字节\n  递归深度: {}",
            self.client.addr(),
            self.client.connect_timeout_secs,
            self.client.io_timeout_secs,
            self.codec.max_frame_size,
            self.codec.recursion_limit
        )
    }
}

// 默认值函数
fn default_max_frame_size() -> usize {
    16 * 1024 * 1024
}

fn default_recursion_limit() -> usize {
    100
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4700
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_io_timeout() -> u64 {
    5
}
