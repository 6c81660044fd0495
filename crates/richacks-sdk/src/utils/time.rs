//! 时间处理工具模块
//!
//! # 设计原则
//!
//! - **存储层**: 所有时间字段使用 UTC 毫秒时间戳
//! - **显示层**: 根据配置的时区把时间戳转换成展示字符串
//! - **远端**: 远程行的 `created_at` 是 RFC 3339 字符串，在这里统一解析

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};

/// 时区配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    /// 时区偏移（秒），例如：+08:00 = 28800, -05:00 = -18000
    pub offset_seconds: i32,
}

impl TimezoneConfig {
    /// 创建时区配置（从小时偏移）
    pub fn from_hours(hours: i32) -> Self {
        Self {
            offset_seconds: hours * 3600,
        }
    }

    /// 创建时区配置（从分钟偏移）
    pub fn from_minutes(minutes: i32) -> Self {
        Self {
            offset_seconds: minutes * 60,
        }
    }

    /// UTC
    pub fn utc() -> Self {
        Self { offset_seconds: 0 }
    }

    /// 使用系统本地时区
    pub fn local() -> Self {
        let now = Local::now();
        Self {
            offset_seconds: now.offset().local_minus_utc(),
        }
    }

    /// 获取 FixedOffset，非法偏移退回 UTC
    pub fn to_fixed_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_seconds).unwrap_or_else(|| Utc.fix())
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::local()
    }
}

/// 时间格式化工具
#[derive(Debug, Clone, Copy)]
pub struct TimeFormatter {
    offset: FixedOffset,
}

impl TimeFormatter {
    pub fn new(config: TimezoneConfig) -> Self {
        Self {
            offset: config.to_fixed_offset(),
        }
    }

    /// 当前 UTC 毫秒时间戳
    pub fn now_utc_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// 将 UTC 毫秒时间戳转换为配置的时区，非法时间戳返回当前时间
    pub fn to_timezone(&self, utc_timestamp_ms: i64) -> DateTime<FixedOffset> {
        let datetime_utc = Utc
            .timestamp_millis_opt(utc_timestamp_ms)
            .single()
            .unwrap_or_else(Utc::now);
        datetime_utc.with_timezone(&self.offset)
    }

    /// 格式化为标准日期时间字符串
    ///
    /// 格式: "YYYY-MM-DD HH:MM:SS"
    pub fn format_standard(&self, utc_timestamp_ms: i64) -> String {
        self.to_timezone(utc_timestamp_ms)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// 解析远端时间戳为 UTC 毫秒
    ///
    /// 接受带偏移的 RFC 3339（`2024-01-17T14:30:45.123+00:00`）和
    /// 不带偏移的 PostgREST 格式（按 UTC 处理）。
    pub fn parse_remote_timestamp(value: &str) -> Option<i64> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.timestamp_millis());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|naive| naive.and_utc().timestamp_millis())
    }
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::new(TimezoneConfig::default())
    }
}
