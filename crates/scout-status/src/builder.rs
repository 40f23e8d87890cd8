//! 轮询器构建器

use crate::config::{ConfigStore, FREQUENCY_KEY};
use crate::fetcher::DEFAULT_FETCH_TIMEOUT;
use crate::poller::StatusPoller;
use scout_device::DeviceAdapter;
use std::time::Duration;

/// 轮询器运行参数
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// 子状态等待上限
    pub fetch_timeout: Duration,
    /// 频率值 1 对应的实际间隔
    ///
    /// 生产环境为 1 秒；测试可缩短到毫秒级加速调度路径。
    pub frequency_unit: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            frequency_unit: Duration::from_secs(1),
        }
    }
}

/// 状态轮询器构建器
///
/// ```rust,ignore
/// let store = TomlConfigStore::open("/etc/scout/status.toml")?;
/// let poller = StatusPollerBuilder::new(device, store)
///     .fetch_timeout(Duration::from_millis(1500))
///     .build();
/// ```
pub struct StatusPollerBuilder<D, C> {
    device: D,
    store: C,
    config: PollerConfig,
}

impl<D, C> StatusPollerBuilder<D, C>
where
    D: DeviceAdapter + Send + 'static,
    C: ConfigStore + 'static,
{
    pub fn new(device: D, store: C) -> Self {
        Self {
            device,
            store,
            config: PollerConfig::default(),
        }
    }

    /// 设置子状态等待上限
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    /// 设置频率单位
    pub fn frequency_unit(mut self, unit: Duration) -> Self {
        self.config.frequency_unit = unit;
        self
    }

    /// 整体替换运行参数
    pub fn poller_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// 启动轮询器
    ///
    /// 从配置存储读取持久化频率，非零时工作线程立即进入自动刷新。
    /// 非法值按 0 处理。
    pub fn build(self) -> StatusPoller {
        let initial_frequency = self
            .store
            .get_value(FREQUENCY_KEY, "0")
            .parse()
            .unwrap_or(0);
        StatusPoller::spawn(self.device, self.store, initial_frequency, self.config)
    }
}
