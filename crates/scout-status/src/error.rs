//! 轮询层错误类型定义

use scout_device::DeviceError;
use thiserror::Error;

/// 轮询周期内的致命失败分类
///
/// 按失败环节打标签，便于针对性日志与计数。所有变体都在周期内部
/// 被吸收：对外可见的后果只有轮询停止，错误不会传播给 `read` 的
/// 调用方。连接失败不在此列（记日志后本轮继续执行），子查询超时
/// 也不是错误（对应子状态直接省略）。
#[derive(Error, Debug)]
pub enum CycleError {
    /// 快照构建失败（字段读取或子查询派发出错）
    #[error("status capture failed: {0}")]
    Capture(#[source] DeviceError),

    /// 断开连接失败（视为连接不健康的终止信号）
    #[error("device disconnect failed: {0}")]
    Disconnect(#[source] DeviceError),
}

/// 配置存储错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 轮询器句柄错误
///
/// `read` / `diagnostics` 唯一可能的失败：worker 线程已经退出。
#[derive(Error, Debug)]
pub enum PollerError {
    /// 命令通道已关闭（worker 线程退出）
    #[error("Poller command channel closed")]
    ChannelClosed,

    /// worker 未回复（线程退出或 panic）
    #[error("Poller worker did not reply")]
    WorkerGone,
}
