//! 状态快照结构定义
//!
//! 一次轮询周期产出的不可变快照。快照只会被整体替换、从不原地修改，
//! 读取方要么看到上一份、要么看到完整的新一份。

use scout_device::{BatteryState, RobotMetrics, StatusFlags, VersionState};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// 快照元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// 产出本快照时生效的轮询频率（频率单位个数，0 = 轮询停止）
    ///
    /// 交付给消费者时可能被改写为调用方显式给定的值；缓存中的
    /// 快照始终保留产出时的原值。
    pub frequency: u32,
    /// 采集时刻（UNIX 时间戳，微秒）
    pub captured_at_us: u64,
}

/// 设备状态快照
///
/// `battery` / `version` 两个子状态只有在对应子查询于共享截止时刻
/// 之前完成时才会出现，缺席不是错误。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// 布尔状态标志
    pub current: StatusFlags,
    /// 数值指标
    pub robot: RobotMetrics,
    /// 电池子状态
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<BatteryState>,
    /// 版本子状态
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionState>,
    /// 元信息
    pub meta: SnapshotMeta,
}

/// 状态类别（`read` 的选择性订阅词汇表）
///
/// 目前仅作为接口词汇保留：`read` 接受类别列表但还没有做过滤，
/// 始终交付完整快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateCategory {
    Current,
    Robot,
    Battery,
    Version,
}

/// 当前 UNIX 时间戳（微秒）
pub(crate) fn unix_timestamp_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> StatusSnapshot {
        StatusSnapshot {
            current: StatusFlags {
                is_charging: true,
                ..Default::default()
            },
            robot: RobotMetrics::default(),
            battery: Some(BatteryState {
                battery_volts: 3.9,
                battery_level: 2,
                is_charging: true,
                is_on_charger_platform: true,
                suggested_charger_sec: 120,
            }),
            version: None,
            meta: SnapshotMeta {
                frequency: 5,
                captured_at_us: 1_700_000_000_000_000,
            },
        }
    }

    /// 缺席的子状态在 JSON 中整体省略（消费者据此判断是否超时）
    #[test]
    fn test_absent_substates_omitted_from_json() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();
        assert!(json.get("battery").is_some());
        assert!(json.get("version").is_none());
        assert_eq!(json["meta"]["frequency"], 5);
        assert_eq!(json["current"]["is_charging"], true);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StatusSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_state_category_json_names() {
        assert_eq!(
            serde_json::to_string(&StateCategory::Battery).unwrap(),
            "\"battery\""
        );
    }

    #[test]
    fn test_unix_timestamp_is_recent() {
        // 2023-01-01 之后
        assert!(unix_timestamp_us() > 1_672_531_200_000_000);
    }
}
