//! Mock 设备（无硬件依赖）
//!
//! 测试用的可编程设备实现：通过共享脚本控制每个操作的成功与失败，
//! 以及两个慢速子查询的响应时机。设备本体交给轮询器独占之后，测试
//! 仍然可以通过 [`MockDeviceHandle`] 改写脚本、读取调用计数。

use crate::deferred::DeferredQuery;
use crate::state::{BatteryState, RobotMetrics, StatusFlags, VersionState};
use crate::{DeviceAdapter, DeviceError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// 子查询响应方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Respond {
    /// 立即返回结果
    Now,
    /// 延迟一段时间后返回结果
    After(Duration),
    /// 永不返回（完成端直接丢弃）
    Never,
}

/// Mock 设备脚本
///
/// 描述设备接下来的行为。可以在任意时刻通过 [`MockDeviceHandle`]
/// 整体替换或局部修改，对之后的调用立即生效。
#[derive(Debug, Clone)]
pub struct MockScript {
    /// `connect` 返回失败
    pub fail_connect: bool,
    /// `disconnect` 返回失败
    pub fail_disconnect: bool,
    /// `status_flags` 返回失败
    pub fail_flags: bool,
    /// `robot_metrics` 返回失败
    pub fail_metrics: bool,
    /// 电池子查询的响应方式
    pub battery_respond: Respond,
    /// 版本子查询的响应方式
    pub version_respond: Respond,
    /// 返回的布尔标志
    pub flags: StatusFlags,
    /// 返回的数值指标
    pub metrics: RobotMetrics,
    /// 返回的电池状态
    pub battery: BatteryState,
    /// 返回的版本状态
    pub version: VersionState,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            fail_connect: false,
            fail_disconnect: false,
            fail_flags: false,
            fail_metrics: false,
            battery_respond: Respond::Now,
            version_respond: Respond::Now,
            flags: StatusFlags::default(),
            metrics: RobotMetrics::default(),
            battery: BatteryState {
                battery_volts: 4.1,
                battery_level: 2,
                is_charging: false,
                is_on_charger_platform: false,
                suggested_charger_sec: 0,
            },
            version: VersionState {
                os_version: "1.8.0".to_string(),
                engine_build_id: "mock-build-0001".to_string(),
            },
        }
    }
}

/// 调用计数（测试断言用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCounters {
    pub connects: u32,
    pub disconnects: u32,
    pub flag_reads: u32,
    pub metric_reads: u32,
    pub battery_queries: u32,
    pub version_queries: u32,
}

#[derive(Debug, Default)]
struct MockInner {
    script: MockScript,
    counters: MockCounters,
    connected: bool,
}

/// 可编程 Mock 设备
#[derive(Debug)]
pub struct MockDevice {
    inner: Arc<Mutex<MockInner>>,
}

/// Mock 设备的测试侧句柄
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    inner: Arc<Mutex<MockInner>>,
}

impl MockDevice {
    /// 创建一对（设备本体, 测试句柄）
    pub fn new() -> (Self, MockDeviceHandle) {
        let inner = Arc::new(Mutex::new(MockInner::default()));
        (
            Self {
                inner: inner.clone(),
            },
            MockDeviceHandle { inner },
        )
    }
}

impl MockDeviceHandle {
    /// 整体替换脚本
    pub fn set_script(&self, script: MockScript) {
        self.inner.lock().script = script;
    }

    /// 局部修改脚本
    pub fn update_script(&self, f: impl FnOnce(&mut MockScript)) {
        f(&mut self.inner.lock().script);
    }

    /// 读取调用计数
    pub fn counters(&self) -> MockCounters {
        self.inner.lock().counters
    }

    /// 当前是否处于已连接状态
    pub fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }
}

/// 按脚本指定的方式完成一个延迟查询
fn respond_deferred<T: Send + 'static>(value: T, mode: Respond) -> DeferredQuery<T> {
    let (tx, query) = DeferredQuery::pair();
    match mode {
        Respond::Now => {
            let _ = tx.send(value);
        }
        Respond::After(delay) => {
            thread::spawn(move || {
                thread::sleep(delay);
                let _ = tx.send(value);
            });
        }
        Respond::Never => drop(tx),
    }
    query
}

impl DeviceAdapter for MockDevice {
    fn connect(&mut self) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        inner.counters.connects += 1;
        if inner.script.fail_connect {
            return Err(DeviceError::ConnectionFailed(
                "mock connect refused".to_string(),
            ));
        }
        inner.connected = true;
        debug!("mock device connected");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        inner.counters.disconnects += 1;
        if inner.script.fail_disconnect {
            return Err(DeviceError::Protocol(
                "mock disconnect refused".to_string(),
            ));
        }
        inner.connected = false;
        debug!("mock device disconnected");
        Ok(())
    }

    fn status_flags(&mut self) -> Result<StatusFlags, DeviceError> {
        let mut inner = self.inner.lock();
        inner.counters.flag_reads += 1;
        if inner.script.fail_flags {
            return Err(DeviceError::Protocol("mock flag read refused".to_string()));
        }
        Ok(inner.script.flags)
    }

    fn robot_metrics(&mut self) -> Result<RobotMetrics, DeviceError> {
        let mut inner = self.inner.lock();
        inner.counters.metric_reads += 1;
        if inner.script.fail_metrics {
            return Err(DeviceError::Protocol(
                "mock metric read refused".to_string(),
            ));
        }
        Ok(inner.script.metrics)
    }

    fn query_battery(&mut self) -> Result<DeferredQuery<BatteryState>, DeviceError> {
        let mut inner = self.inner.lock();
        inner.counters.battery_queries += 1;
        let (value, mode) = (inner.script.battery, inner.script.battery_respond);
        drop(inner);
        Ok(respond_deferred(value, mode))
    }

    fn query_version(&mut self) -> Result<DeferredQuery<VersionState>, DeviceError> {
        let mut inner = self.inner.lock();
        inner.counters.version_queries += 1;
        let (value, mode) = (inner.script.version.clone(), inner.script.version_respond);
        drop(inner);
        Ok(respond_deferred(value, mode))
    }
}
