//! 延迟查询结果
//!
//! 设备的慢速子查询（电池、版本）在设备侧后台执行，调用方拿到一个
//! [`DeferredQuery`]，在共享截止时刻之前等待结果。等待超时只是不再
//! 等待，不会取消设备侧仍在执行的工作。

use crossbeam_channel::{Receiver, Sender, bounded};
use std::time::Instant;

/// 一次性的延迟查询结果
///
/// 内部是容量为 1 的 channel 接收端。超时和发送端被丢弃（查询被
/// 设备侧放弃）都表现为 `None`。
#[derive(Debug)]
pub struct DeferredQuery<T> {
    rx: Receiver<T>,
}

impl<T> DeferredQuery<T> {
    /// 创建一对（完成端, 查询端）
    ///
    /// 适配器实现持有完成端，在结果就绪时 `send`；查询端交给调用方等待。
    pub fn pair() -> (Sender<T>, Self) {
        let (tx, rx) = bounded(1);
        (tx, Self { rx })
    }

    /// 立即完成的查询（结果已就绪）
    pub fn ready(value: T) -> Self {
        let (tx, query) = Self::pair();
        // 容量为 1 且接收端在手，send 不会失败
        let _ = tx.send(value);
        query
    }

    /// 等待结果直到截止时刻
    ///
    /// 截止时刻之前完成返回 `Some`；超时或发送端被丢弃返回 `None`。
    pub fn wait_deadline(self, deadline: Instant) -> Option<T> {
        self.rx.recv_deadline(deadline).ok()
    }

    /// 非阻塞读取（仅对已就绪的结果有意义）
    pub fn try_take(self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_ready_resolves_immediately() {
        let query = DeferredQuery::ready(42u32);
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(query.wait_deadline(deadline), Some(42));
    }

    #[test]
    fn test_wait_deadline_times_out() {
        let (_tx, query) = DeferredQuery::<u32>::pair();
        let start = Instant::now();
        let deadline = start + Duration::from_millis(30);
        assert_eq!(query.wait_deadline(deadline), None);
        // 等待确实持续到了截止时刻附近
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_dropped_sender_yields_none() {
        let (tx, query) = DeferredQuery::<u32>::pair();
        drop(tx);
        let deadline = Instant::now() + Duration::from_secs(1);
        let start = Instant::now();
        assert_eq!(query.wait_deadline(deadline), None);
        // 发送端丢弃后立即返回，不会等满截止时刻
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_late_completion_within_deadline() {
        let (tx, query) = DeferredQuery::pair();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let _ = tx.send("battery");
        });
        let deadline = Instant::now() + Duration::from_millis(500);
        assert_eq!(query.wait_deadline(deadline), Some("battery"));
    }

    #[test]
    fn test_try_take() {
        assert_eq!(DeferredQuery::ready(7u8).try_take(), Some(7));
        let (_tx, query) = DeferredQuery::<u8>::pair();
        assert_eq!(query.try_take(), None);
    }
}
