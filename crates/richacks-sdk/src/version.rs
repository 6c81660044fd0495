//! SDK 版本与本地数据布局版本
//!
//! - **SDK Version** → Cargo.toml（唯一权威源）
//! - **Schema Version** → 本地 KV 键的命名空间标签，布局不兼容时递增

/// SDK semver，来自 Cargo.toml
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 当前本地数据布局版本
///
/// 键格式为 `{prefix}_{SCHEMA_VERSION}_{logical}`，旧布局（v1/v2）留在原处不被覆盖。
pub const SCHEMA_VERSION: &str = "v3";

/// 默认键前缀
pub const KEY_PREFIX: &str = "richacks";

/// 旧版订阅数镜像键（不带命名空间，供旧读取方使用）
pub const LEGACY_SUBS_KEY: &str = "richacks_manual_subs";
