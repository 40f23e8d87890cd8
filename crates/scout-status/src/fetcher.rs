//! 有界子状态拉取
//!
//! 电量和版本信息通过异步查询获取，完成时间不可控。拉取器为
//! 两个查询设置共同的截止时间：先发出全部查询，再依次等待，
//! 未按期到达的子状态留空，周期照常完成。

use crate::builder::PollerConfig;
use scout_device::{BatteryState, DeviceAdapter, DeviceError, VersionState};
use std::time::{Duration, Instant};
use tracing::debug;

/// 子状态等待的默认上限
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(1500);

/// 一次子状态拉取的结果
#[derive(Debug, Default, Clone)]
pub struct SubFetch {
    pub battery: Option<BatteryState>,
    pub version: Option<VersionState>,
}

impl SubFetch {
    /// 是否有子状态未按期到达
    pub fn is_partial(&self) -> bool {
        self.battery.is_none() || self.version.is_none()
    }
}

/// 带截止时间的子状态拉取器
#[derive(Debug, Clone)]
pub struct BoundedFetcher {
    timeout: Duration,
}

impl BoundedFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub(crate) fn from_config(config: &PollerConfig) -> Self {
        Self::new(config.fetch_timeout)
    }

    /// 发出电量与版本查询并在共同截止时间内等待
    ///
    /// 查询发出失败是设备错误，向上传播；查询发出成功但未按期
    /// 完成只产生部分结果。
    pub fn fetch<D: DeviceAdapter>(&self, device: &mut D) -> Result<SubFetch, DeviceError> {
        let battery_query = device.query_battery()?;
        let version_query = device.query_version()?;

        // 两个查询共享同一截止时间，总等待不超过 timeout
        let deadline = Instant::now() + self.timeout;

        let battery = battery_query.wait_deadline(deadline);
        if battery.is_none() {
            debug!("battery state missed fetch deadline");
        }
        let version = version_query.wait_deadline(deadline);
        if version.is_none() {
            debug!("version state missed fetch deadline");
        }

        Ok(SubFetch { battery, version })
    }
}

impl Default for BoundedFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_device::mock::{MockDevice, MockScript, Respond};

    #[test]
    fn test_both_substates_complete() {
        let (mut device, _handle) = MockDevice::new();
        let fetcher = BoundedFetcher::new(Duration::from_millis(100));

        let result = fetcher.fetch(&mut device).unwrap();
        assert!(result.battery.is_some());
        assert!(result.version.is_some());
        assert!(!result.is_partial());
    }

    /// 超出截止时间的子状态缺失，另一个仍然到达
    #[test]
    fn test_slow_battery_is_dropped() {
        let (mut device, handle) = MockDevice::new();
        handle.update_script(|script| {
            script.battery_respond = Respond::After(Duration::from_millis(200));
        });
        let fetcher = BoundedFetcher::new(Duration::from_millis(50));

        let result = fetcher.fetch(&mut device).unwrap();
        assert!(result.battery.is_none());
        assert!(result.version.is_some());
        assert!(result.is_partial());
    }

    #[test]
    fn test_never_responding_substates() {
        let (mut device, handle) = MockDevice::new();
        handle.set_script(MockScript {
            battery_respond: Respond::Never,
            version_respond: Respond::Never,
            ..MockScript::default()
        });
        let fetcher = BoundedFetcher::new(Duration::from_millis(30));

        let start = Instant::now();
        let result = fetcher.fetch(&mut device).unwrap();
        assert!(result.battery.is_none());
        assert!(result.version.is_none());
        // 截止时间共享，总耗时约等于一个 timeout 而非两个
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    /// 两个查询并发完成：各需 40ms，共享 60ms 截止时间内都能到达
    #[test]
    fn test_queries_wait_concurrently() {
        let (mut device, handle) = MockDevice::new();
        handle.update_script(|script| {
            script.battery_respond = Respond::After(Duration::from_millis(40));
            script.version_respond = Respond::After(Duration::from_millis(40));
        });
        let fetcher = BoundedFetcher::new(Duration::from_millis(60));

        let result = fetcher.fetch(&mut device).unwrap();
        assert!(result.battery.is_some());
        assert!(result.version.is_some());
    }
}
