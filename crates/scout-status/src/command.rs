//! 工作线程命令定义
//!
//! 所有对轮询器的操作都通过命令通道串行化到工作线程上执行，
//! 工作线程独占设备与状态，避免任何共享锁。

use crate::poller::PollerDiagnostics;
use crate::snapshot::{StateCategory, StatusSnapshot};
use crossbeam_channel::Sender;
use std::sync::Arc;

/// 快照消费者
///
/// `read` 请求完成后，结果快照通过该接口交付。交付是尽力而为：
/// 消费者已经消失时静默丢弃。
pub trait SnapshotConsumer: Send {
    /// 交付一次读取结果；采集失败时为 `None`
    fn send_status(&self, snapshot: Option<Arc<StatusSnapshot>>);
}

impl SnapshotConsumer for Sender<Option<Arc<StatusSnapshot>>> {
    fn send_status(&self, snapshot: Option<Arc<StatusSnapshot>>) {
        // 接收端关闭不是错误，丢弃即可
        let _ = self.send(snapshot);
    }
}

/// 发送到工作线程的命令
pub(crate) enum PollerCommand {
    /// 消费者发起的读取，可附带频率变更
    Read {
        states: Option<Vec<StateCategory>>,
        frequency: Option<u32>,
        consumer: Box<dyn SnapshotConsumer>,
    },
    /// 定时器到期，执行一次自动刷新
    Tick,
    /// 读取当前调度状态（测试与排障用）
    Diagnostics(Sender<PollerDiagnostics>),
    /// 停止工作线程
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotMeta;
    use scout_device::{RobotMetrics, StatusFlags};

    fn dummy_snapshot() -> Arc<StatusSnapshot> {
        Arc::new(StatusSnapshot {
            current: StatusFlags::default(),
            robot: RobotMetrics::default(),
            battery: None,
            version: None,
            meta: SnapshotMeta {
                frequency: 3,
                captured_at_us: 1,
            },
        })
    }

    #[test]
    fn test_channel_consumer_delivers() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send_status(Some(dummy_snapshot()));
        let got = rx.recv().unwrap();
        assert_eq!(got.unwrap().meta.frequency, 3);
    }

    /// 接收端已关闭时交付不 panic
    #[test]
    fn test_channel_consumer_ignores_closed_receiver() {
        let (tx, rx) = crossbeam_channel::unbounded::<Option<Arc<StatusSnapshot>>>();
        drop(rx);
        tx.send_status(None);
    }
}
