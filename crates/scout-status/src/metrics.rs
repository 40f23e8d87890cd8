//! 轮询器运行计数
//!
//! 所有计数器为原子变量，工作线程写入，任意线程可随时读取快照。

use std::sync::atomic::{AtomicU64, Ordering};

/// 轮询器计数器集合
#[derive(Debug, Default)]
pub struct PollerMetrics {
    /// 执行过的采集周期总数
    pub cycles_total: AtomicU64,
    /// 采集失败的周期数
    pub cycles_failed: AtomicU64,
    /// 连接失败次数（周期继续执行）
    pub connect_failures: AtomicU64,
    /// 断开失败次数（触发停止）
    pub disconnect_failures: AtomicU64,
    /// 子状态未在期限内全部到齐的周期数
    pub partial_fetches: AtomicU64,
    /// 定时器武装次数
    pub timers_armed: AtomicU64,
    /// 自动刷新停止次数
    pub halts: AtomicU64,
}

impl PollerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取当前计数快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_total: self.cycles_total.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            disconnect_failures: self.disconnect_failures.load(Ordering::Relaxed),
            partial_fetches: self.partial_fetches.load(Ordering::Relaxed),
            timers_armed: self.timers_armed.load(Ordering::Relaxed),
            halts: self.halts.load(Ordering::Relaxed),
        }
    }

    /// 清零全部计数
    pub fn reset(&self) {
        self.cycles_total.store(0, Ordering::Relaxed);
        self.cycles_failed.store(0, Ordering::Relaxed);
        self.connect_failures.store(0, Ordering::Relaxed);
        self.disconnect_failures.store(0, Ordering::Relaxed);
        self.partial_fetches.store(0, Ordering::Relaxed);
        self.timers_armed.store(0, Ordering::Relaxed);
        self.halts.store(0, Ordering::Relaxed);
    }
}

/// 计数器的一致性读取结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_total: u64,
    pub cycles_failed: u64,
    pub connect_failures: u64,
    pub disconnect_failures: u64,
    pub partial_fetches: u64,
    pub timers_armed: u64,
    pub halts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counts() {
        let metrics = PollerMetrics::new();
        metrics.cycles_total.fetch_add(3, Ordering::Relaxed);
        metrics.cycles_failed.fetch_add(1, Ordering::Relaxed);

        let snap = metrics.snapshot();
        assert_eq!(snap.cycles_total, 3);
        assert_eq!(snap.cycles_failed, 1);
        assert_eq!(snap.halts, 0);
    }

    #[test]
    fn test_reset_clears_all() {
        let metrics = PollerMetrics::new();
        metrics.timers_armed.fetch_add(5, Ordering::Relaxed);
        metrics.halts.fetch_add(2, Ordering::Relaxed);

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
