//! # Scout Device Adapter Layer
//!
//! 设备能力抽象层，为状态轮询子系统提供统一的设备接口。
//!
//! 接口覆盖四类能力：
//! - 连接生命周期（`connect` / `disconnect`）
//! - 同步快速读取（布尔标志、数值指标）
//! - 异步慢速子查询（电池、版本），以 [`DeferredQuery`] 形式返回
//! - 统一错误分类（[`DeviceError`]）
//!
//! 设备侧的线缆协议不在本层定义，由具体适配器实现负责。

use thiserror::Error;

pub mod deferred;
pub mod state;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use deferred::DeferredQuery;
pub use state::{BatteryState, RobotMetrics, StatusFlags, VersionState};

/// 设备层统一错误类型
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// 会话建立失败
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// 会话尚未建立
    #[error("Device not connected")]
    NotConnected,

    /// 设备协议层错误
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// 设备响应超时
    #[error("Device response timeout")]
    Timeout,
}

/// 设备能力接口
///
/// 状态轮询子系统对物理设备的全部要求。`connect` 为幂等操作，
/// 对已建立的会话重复调用不报错；`disconnect` 失败被上层视为
/// 连接不健康的信号。两个 `query_*` 操作在设备侧后台执行，
/// 返回可带截止时刻等待的 [`DeferredQuery`]，派发后立即返回。
pub trait DeviceAdapter {
    fn connect(&mut self) -> Result<(), DeviceError>;
    fn disconnect(&mut self) -> Result<(), DeviceError>;
    fn status_flags(&mut self) -> Result<StatusFlags, DeviceError>;
    fn robot_metrics(&mut self) -> Result<RobotMetrics, DeviceError>;
    fn query_battery(&mut self) -> Result<DeferredQuery<BatteryState>, DeviceError>;
    fn query_version(&mut self) -> Result<DeferredQuery<VersionState>, DeviceError>;
}
