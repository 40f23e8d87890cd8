//! 状态轮询器
//!
//! 工作线程独占设备、配置存储与调度状态，所有操作通过命令通道
//! 串行执行。最新快照镜像到 `ArcSwapOption`，`latest()` 无锁读取。
//!
//! 调度规则：
//! - 每次消费者读取把倒计数重置为预算值；
//! - 每个自动刷新周期递减倒计数，耗尽后停止自动刷新；
//! - 频率为 0、采集失败或断开失败都立即停止自动刷新。

use crate::builder::PollerConfig;
use crate::command::{PollerCommand, SnapshotConsumer};
use crate::config::{ConfigStore, FREQUENCY_KEY};
use crate::error::{CycleError, PollerError};
use crate::fetcher::BoundedFetcher;
use crate::metrics::{MetricsSnapshot, PollerMetrics};
use crate::scheduler::RefreshTimer;
use crate::snapshot::{unix_timestamp_us, SnapshotMeta, StateCategory, StatusSnapshot};
use arc_swap::ArcSwapOption;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use scout_device::DeviceAdapter;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// 无消费者读取时允许的自动刷新周期数
const AUTO_STOP_BUDGET: i32 = 10;
/// 自动刷新已停止的倒计数标记值
const COUNTDOWN_HALTED: i32 = -1;

/// 调度状态的外部视图（测试与排障用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerDiagnostics {
    pub frequency: u32,
    pub countdown: i32,
    pub timer_armed: bool,
    pub has_snapshot: bool,
}

/// 停止自动刷新的原因
#[derive(Debug, Clone, Copy)]
enum HaltReason {
    FrequencyCleared,
    CountdownExhausted,
    CycleFailed,
    DisconnectFailed,
}

/// 状态轮询器句柄
///
/// 克隆语义不提供：句柄被 Drop 时工作线程停止。需要共享时包一层 `Arc`。
pub struct StatusPoller {
    cmd_tx: Sender<PollerCommand>,
    latest: Arc<ArcSwapOption<StatusSnapshot>>,
    metrics: Arc<PollerMetrics>,
    worker: Option<JoinHandle<()>>,
}

impl StatusPoller {
    /// 启动工作线程
    pub(crate) fn spawn<D, C>(
        device: D,
        store: C,
        initial_frequency: u32,
        config: PollerConfig,
    ) -> Self
    where
        D: DeviceAdapter + Send + 'static,
        C: ConfigStore + 'static,
    {
        let (cmd_tx, cmd_rx) = unbounded();
        let latest = Arc::new(ArcSwapOption::<StatusSnapshot>::empty());
        let metrics = Arc::new(PollerMetrics::new());

        let worker_ctx = Worker {
            device,
            store,
            fetcher: BoundedFetcher::from_config(&config),
            config,
            cmd_tx: cmd_tx.clone(),
            latest: Arc::clone(&latest),
            metrics: Arc::clone(&metrics),
            state: PollerState {
                frequency: initial_frequency,
                countdown: AUTO_STOP_BUDGET,
                cached: None,
                timer: None,
            },
        };

        let worker = thread::Builder::new()
            .name("scout-status-poller".to_string())
            .spawn(move || worker_ctx.run(cmd_rx))
            .expect("failed to spawn status poller thread");

        Self {
            cmd_tx,
            latest,
            metrics,
            worker: Some(worker),
        }
    }

    /// 发起一次消费者读取
    ///
    /// 结果通过 `consumer` 异步交付。`frequency` 为 `Some` 时变更
    /// 自动刷新频率并持久化；`states` 预留给选择性订阅。
    pub fn read<C: SnapshotConsumer + 'static>(
        &self,
        consumer: C,
        states: Option<Vec<StateCategory>>,
        frequency: Option<u32>,
    ) -> Result<(), PollerError> {
        self.cmd_tx
            .send(PollerCommand::Read {
                states,
                frequency,
                consumer: Box::new(consumer),
            })
            .map_err(|_| PollerError::ChannelClosed)
    }

    /// 最近一次成功采集的快照，尚无快照时为 `None`
    pub fn latest(&self) -> Option<Arc<StatusSnapshot>> {
        self.latest.load_full()
    }

    /// 当前调度状态
    pub fn diagnostics(&self) -> Result<PollerDiagnostics, PollerError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.cmd_tx
            .send(PollerCommand::Diagnostics(reply_tx))
            .map_err(|_| PollerError::ChannelClosed)?;
        reply_rx.recv().map_err(|_| PollerError::WorkerGone)
    }

    /// 运行计数快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PollerCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// 工作线程的调度状态
struct PollerState {
    frequency: u32,
    countdown: i32,
    cached: Option<Arc<StatusSnapshot>>,
    timer: Option<RefreshTimer>,
}

struct Worker<D, C> {
    device: D,
    store: C,
    fetcher: BoundedFetcher,
    config: PollerConfig,
    cmd_tx: Sender<PollerCommand>,
    latest: Arc<ArcSwapOption<StatusSnapshot>>,
    metrics: Arc<PollerMetrics>,
    state: PollerState,
}

impl<D, C> Worker<D, C>
where
    D: DeviceAdapter + Send + 'static,
    C: ConfigStore + 'static,
{
    fn run(mut self, cmd_rx: Receiver<PollerCommand>) {
        info!(frequency = self.state.frequency, "status poller started");

        // 持久化频率非零时立即进入自动刷新
        if self.state.frequency > 0 {
            self.arm_timer();
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                PollerCommand::Read {
                    states,
                    frequency,
                    consumer,
                } => self.handle_read(states, frequency, consumer),
                PollerCommand::Tick => {
                    // 定时器取消后残留的 Tick 直接忽略
                    if self.state.timer.is_some() {
                        self.state.timer = None;
                        self.poll_once(true);
                    }
                }
                PollerCommand::Diagnostics(reply_tx) => {
                    let _ = reply_tx.send(PollerDiagnostics {
                        frequency: self.state.frequency,
                        countdown: self.state.countdown,
                        timer_armed: self.state.timer.is_some(),
                        has_snapshot: self.state.cached.is_some(),
                    });
                }
                PollerCommand::Shutdown => break,
            }
        }

        if let Some(timer) = self.state.timer.take() {
            timer.cancel();
        }
        info!("status poller stopped");
    }

    /// 处理一次消费者读取
    fn handle_read(
        &mut self,
        states: Option<Vec<StateCategory>>,
        frequency: Option<u32>,
        consumer: Box<dyn SnapshotConsumer>,
    ) {
        if let Some(states) = &states {
            // TODO: 选择性订阅过滤；目前始终交付完整快照
            debug!(?states, "state filter requested, delivering full snapshot");
        }

        // 无缓存时同步执行一次采集，消费者拿到新鲜数据。
        // 定时器续约由下面的频率变更分支负责，采集周期内不续约
        if self.state.cached.is_none() {
            self.poll_once(false);
        }

        if let Some(freq) = frequency {
            if freq != self.state.frequency {
                info!(
                    from = self.state.frequency,
                    to = freq,
                    "refresh frequency changed"
                );
                self.state.frequency = freq;
                if let Err(e) = self.store.set_value(FREQUENCY_KEY, &freq.to_string()) {
                    warn!(error = %e, "failed to persist refresh frequency");
                }
                if freq > 0 {
                    self.arm_timer();
                } else {
                    self.halt(HaltReason::FrequencyCleared);
                }
            }
        }

        // 请求频率与快照记录的频率不同时，仅在交付副本上覆盖，
        // 缓存保持采集时刻的原值
        let snapshot = match (&self.state.cached, frequency) {
            (Some(cached), Some(freq)) if cached.meta.frequency != freq => {
                let mut shown = (**cached).clone();
                shown.meta.frequency = freq;
                Some(Arc::new(shown))
            }
            (cached, _) => cached.clone(),
        };

        self.state.countdown = AUTO_STOP_BUDGET;
        consumer.send_status(snapshot);
    }

    /// 执行一个采集周期
    ///
    /// `from_init` 表示由定时器或启动路径触发，周期完成后负责续约
    /// 下一次定时器；消费者读取触发的同步采集不续约。
    fn poll_once(&mut self, from_init: bool) {
        if self.state.frequency == 0 {
            // 频率已清零仍执行本周期，只是不再续约
            self.halt(HaltReason::FrequencyCleared);
        }

        debug!(
            from_init,
            frequency = self.state.frequency,
            countdown = self.state.countdown,
            "poll cycle"
        );
        self.metrics.cycles_total.fetch_add(1, Ordering::Relaxed);

        match self.capture_snapshot() {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.state.cached = Some(Arc::clone(&snapshot));
                self.latest.store(Some(snapshot));
            }
            Err(e) => {
                self.metrics.cycles_failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "status capture failed");
                self.halt(HaltReason::CycleFailed);
            }
        }

        // 收尾阶段无论采集成败都执行
        if from_init && self.state.frequency > 0 {
            self.arm_timer();
        }
        if self.state.countdown > 0 && self.state.frequency > 0 {
            self.state.countdown -= 1;
        }

        if let Err(e) = self.device.disconnect() {
            self.metrics
                .disconnect_failures
                .fetch_add(1, Ordering::Relaxed);
            warn!(error = %CycleError::Disconnect(e), "ending poll cycle");
            self.halt(HaltReason::DisconnectFailed);
        } else if self.state.frequency == 0 {
            self.halt(HaltReason::FrequencyCleared);
        } else if self.state.countdown <= 0 {
            self.halt(HaltReason::CountdownExhausted);
        }
    }

    /// 采集一份完整快照
    fn capture_snapshot(&mut self) -> Result<StatusSnapshot, CycleError> {
        if let Err(e) = self.device.connect() {
            // 连接失败不终止周期，可能已有存活会话
            self.metrics
                .connect_failures
                .fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "could not connect, proceeding with existing session");
        }

        let current = self.device.status_flags().map_err(CycleError::Capture)?;
        let robot = self.device.robot_metrics().map_err(CycleError::Capture)?;

        let sub = self
            .fetcher
            .fetch(&mut self.device)
            .map_err(CycleError::Capture)?;
        if sub.is_partial() {
            self.metrics.partial_fetches.fetch_add(1, Ordering::Relaxed);
            debug!(
                battery = sub.battery.is_some(),
                version = sub.version.is_some(),
                "partial sub-state fetch"
            );
        }

        Ok(StatusSnapshot {
            current,
            robot,
            battery: sub.battery,
            version: sub.version,
            meta: SnapshotMeta {
                frequency: self.state.frequency,
                captured_at_us: unix_timestamp_us(),
            },
        })
    }

    /// 按当前频率重新武装定时器，旧定时器先取消
    fn arm_timer(&mut self) {
        if let Some(timer) = self.state.timer.take() {
            timer.cancel();
        }
        let delay = self.config.frequency_unit * self.state.frequency;
        debug!(?delay, "arming refresh timer");
        self.state.timer = Some(RefreshTimer::arm(delay, self.cmd_tx.clone()));
        self.metrics.timers_armed.fetch_add(1, Ordering::Relaxed);
    }

    /// 停止自动刷新
    fn halt(&mut self, reason: HaltReason) {
        info!(?reason, "stopping auto-refresh");
        self.state.countdown = COUNTDOWN_HALTED;
        self.state.frequency = 0;
        if let Some(timer) = self.state.timer.take() {
            timer.cancel();
        }
        self.metrics.halts.fetch_add(1, Ordering::Relaxed);
    }
}
