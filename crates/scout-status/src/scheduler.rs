//! 刷新定时器
//!
//! 一次性定时器：到期向工作线程发送 `Tick`，或被提前取消。
//! 每次重新调度都会创建新的定时器实例，旧实例先取消。

use crate::command::PollerCommand;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::trace;

pub(crate) struct RefreshTimer {
    cancel_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    /// 武装定时器：`delay` 之后向 `tick_tx` 发送一次 `Tick`
    pub(crate) fn arm(delay: Duration, tick_tx: Sender<PollerCommand>) -> Self {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("scout-refresh-timer".to_string())
            .spawn(move || {
                match cancel_rx.recv_timeout(delay) {
                    Err(RecvTimeoutError::Timeout) => {
                        trace!("refresh timer fired");
                        // 工作线程已退出时发送失败，直接结束
                        let _ = tick_tx.send(PollerCommand::Tick);
                    }
                    // 收到取消信号或发送端被丢弃
                    _ => trace!("refresh timer cancelled"),
                }
            })
            .expect("failed to spawn refresh timer thread");

        Self {
            cancel_tx,
            handle: Some(handle),
        }
    }

    /// 取消定时器并等待线程退出
    pub(crate) fn cancel(mut self) {
        self.cancel_and_join();
    }

    fn cancel_and_join(&mut self) {
        let _ = self.cancel_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Instant;

    #[test]
    fn test_timer_fires_after_delay() {
        let (tx, rx) = unbounded();
        let start = Instant::now();
        let _timer = RefreshTimer::arm(Duration::from_millis(20), tx);

        let cmd = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(cmd, PollerCommand::Tick));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancel_prevents_tick() {
        let (tx, rx) = unbounded();
        let timer = RefreshTimer::arm(Duration::from_millis(50), tx);
        timer.cancel();

        assert!(rx.recv_timeout(Duration::from_millis(120)).is_err());
    }

    /// Drop 与显式取消等价
    #[test]
    fn test_drop_cancels() {
        let (tx, rx) = unbounded();
        {
            let _timer = RefreshTimer::arm(Duration::from_millis(50), tx);
        }
        assert!(rx.recv_timeout(Duration::from_millis(120)).is_err());
    }
}
