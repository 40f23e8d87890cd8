//! # Scout Status Poller
//!
//! 设备状态轮询子系统：维护一条到设备的连接，按自重置定时器刷新
//! 缓存的状态快照，对慢速子查询限时等待，外部长时间无人读取时自动
//! 停止轮询。
//!
//! 核心结构：
//! - [`StatusPoller`]：对外句柄。worker 线程独占全部可变状态，
//!   读取请求、频率变更和定时触发都经由命令队列串行执行。
//! - [`BoundedFetcher`]：电池 / 版本两个慢速子查询共享一个截止
//!   时刻，接受部分完成。
//! - [`StatusPollerBuilder`]：链式构造，从 [`ConfigStore`] 读取
//!   持久化的轮询频率。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use scout_status::{MemoryConfigStore, StatusPollerBuilder};
//!
//! let poller = StatusPollerBuilder::new(device, MemoryConfigStore::new()).build();
//!
//! // 每 5 个频率单位（默认秒）刷新一次，快照推送给 consumer
//! poller.read(consumer, None, Some(5))?;
//!
//! // 无锁读取最近一次快照
//! if let Some(snapshot) = poller.latest() {
//!     println!("charging: {}", snapshot.current.is_charging);
//! }
//! ```

mod builder;
mod command;
mod config;
mod error;
mod fetcher;
mod metrics;
mod poller;
mod scheduler;
mod snapshot;

pub use builder::{PollerConfig, StatusPollerBuilder};
pub use command::SnapshotConsumer;
pub use config::{ConfigStore, FREQUENCY_KEY, MemoryConfigStore, TomlConfigStore};
pub use error::{ConfigError, CycleError, PollerError};
pub use fetcher::{BoundedFetcher, DEFAULT_FETCH_TIMEOUT, SubFetch};
pub use metrics::{MetricsSnapshot, PollerMetrics};
pub use poller::{PollerDiagnostics, StatusPoller};
pub use snapshot::{SnapshotMeta, StateCategory, StatusSnapshot};
