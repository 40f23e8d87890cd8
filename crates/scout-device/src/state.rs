//! 设备状态数据结构定义
//!
//! 设备侧一次读取返回的原始状态结构。全部是纯数据（`Clone` + serde），
//! 由上层组装为完整的状态快照后推送给外部消费者。

use serde::{Deserialize, Serialize};

/// 设备布尔状态标志
///
/// 对应设备状态寄存器的一次同步读取。读取开销低，适合每个轮询
/// 周期直接读取。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusFlags {
    /// 任一电机在运动
    pub are_motors_moving: bool,
    /// 轮组在运动
    pub are_wheels_moving: bool,
    /// 正在播放动画
    pub is_animating: bool,
    /// 被握持中
    pub is_being_held: bool,
    /// 背部按钮被按下
    pub is_button_pressed: bool,
    /// 正在搬运负载
    pub is_carrying_payload: bool,
    /// 充电中
    pub is_charging: bool,
    /// 检测到跌落边缘
    pub is_cliff_detected: bool,
    /// 正在对接充电座
    pub is_docking: bool,
    /// 跌落中
    pub is_falling: bool,
    /// 头部已到目标位置
    pub is_head_in_position: bool,
    /// 低功耗静默模式
    pub is_in_calm_power_mode: bool,
    /// 在充电座上
    pub is_on_charger: bool,
    /// 路径规划执行中
    pub is_pathing: bool,
    /// 被拿起
    pub is_picked_up: bool,
    /// 机器人整体在运动
    pub is_robot_moving: bool,
}

/// 设备数值指标
///
/// 与 [`StatusFlags`] 一样由同步读取返回，字段带单位标注。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotMetrics {
    /// 头部俯仰角（弧度）
    pub head_angle_rad: f32,
    /// 升降臂高度（毫米）
    pub lift_height_mm: f32,
    /// 位姿偏航角（弧度）
    pub pose_angle_rad: f32,
    /// 位姿俯仰角（弧度）
    pub pose_pitch_rad: f32,
    /// 左轮速度（mm/s）
    pub left_wheel_speed_mmps: f32,
    /// 右轮速度（mm/s）
    pub right_wheel_speed_mmps: f32,
    /// 陀螺仪三轴角速度 [X, Y, Z]（rad/s）
    pub gyro: [f32; 3],
}

/// 电池子状态
///
/// 由慢速子查询返回，可能因为超出共享截止时刻而在快照中缺席。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatteryState {
    /// 电池电压（伏特）
    pub battery_volts: f32,
    /// 电量等级（1 = 低，2 = 正常，3 = 满）
    pub battery_level: u8,
    /// 充电中
    pub is_charging: bool,
    /// 在充电平台上
    pub is_on_charger_platform: bool,
    /// 建议充电时长（秒）
    pub suggested_charger_sec: u32,
}

/// 版本子状态
///
/// 同 [`BatteryState`]，由慢速子查询返回。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionState {
    /// 设备操作系统版本
    pub os_version: String,
    /// 引擎构建号
    pub engine_build_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 状态结构序列化为 JSON 后保持字段名不变（外部消费者按名取值）
    #[test]
    fn test_status_flags_json_field_names() {
        let flags = StatusFlags {
            is_charging: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&flags).unwrap();
        assert_eq!(json["is_charging"], true);
        assert_eq!(json["are_motors_moving"], false);
        assert_eq!(json["is_on_charger"], false);
    }

    #[test]
    fn test_robot_metrics_roundtrip() {
        let metrics = RobotMetrics {
            head_angle_rad: -0.35,
            lift_height_mm: 45.0,
            gyro: [0.1, -0.2, 0.0],
            ..Default::default()
        };
        let json = serde_json::to_string(&metrics).unwrap();
        let back: RobotMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metrics);
    }

    #[test]
    fn test_battery_state_default_is_empty() {
        let battery = BatteryState::default();
        assert_eq!(battery.battery_level, 0);
        assert!(!battery.is_charging);
    }
}
