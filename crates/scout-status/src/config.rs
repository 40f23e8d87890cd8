//! 配置存储
//!
//! 轮询频率需要跨进程重启保留。这里定义最小的键值存储接口，以及
//! 一个 TOML 文件实现和一个内存实现（测试用）。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 轮询频率的持久化键
pub const FREQUENCY_KEY: &str = "status_checking_frequency";

/// 键值配置存储接口
///
/// 轮询子系统只需要两个操作：按键读取（缺失给默认值）和写入。
/// 值统一为字符串，类型解释由调用方负责。
pub trait ConfigStore: Send {
    /// 读取配置项，缺失时返回默认值
    fn get_value(&self, key: &str, default: &str) -> String;

    /// 写入配置项并持久化
    fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigValues {
    #[serde(flatten)]
    entries: BTreeMap<String, String>,
}

/// TOML 文件存储
///
/// 配置项平铺为字符串键值对，每次写入立即落盘。
#[derive(Debug)]
pub struct TomlConfigStore {
    path: PathBuf,
    values: ConfigValues,
}

impl TomlConfigStore {
    /// 打开配置文件；不存在时从空配置开始
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            ConfigValues::default()
        };
        Ok(Self { path, values })
    }

    /// 配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl ConfigStore for TomlConfigStore {
    fn get_value(&self, key: &str, default: &str) -> String {
        self.values
            .entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values
            .entries
            .insert(key.to_string(), value.to_string());
        self.persist()
    }
}

/// 内存存储（测试用，不持久化）
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: BTreeMap<String, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置轮询频率的便捷构造
    pub fn with_frequency(frequency: u32) -> Self {
        let mut store = Self::default();
        store
            .entries
            .insert(FREQUENCY_KEY.to_string(), frequency.to_string());
        store
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_value(&self, key: &str, default: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
