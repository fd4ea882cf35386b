//! 中继配置：窗口容量与批量阈值。
//!
//! # 模块定位（Why）
//! - 两类中继各自只有一个参数，但都必须是正整数且在中继生命周期内固定不变；
//!   本模块以 [`WindowCapacity`] 与 [`BatchThreshold`] 两个新类型把“已校验”编码进类型系统，
//!   中继内部不再重复判断。
//! - [`RelayConfig`] 为宿主提供 TOML 装载入口，默认值与 `relay_demo` 保持一致（均为 3）。
//!
//! # 设计要点（How）
//! - 新类型内部使用 [`NonZeroUsize`]，构造时校验，失败返回
//!   [`RelayError::InvalidConfiguration`]；
//! - TOML 先反序列化为原始 `usize` 结构，再统一校验，确保 `capacity = 0`
//!   报告为配置错误而不是语法错误。

use std::{fmt, fs, num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

use crate::{batch::BatchingRelay, error::RelayError, window::SlidingWindowRelay};

/// 演示程序使用的默认窗口容量。
///
/// 两个默认值在编译期转换为 `NonZeroUsize`，取 0 会导致编译失败。
pub const DEFAULT_WINDOW_CAPACITY: usize = 3;
/// 演示程序使用的默认批量阈值。
pub const DEFAULT_BATCH_THRESHOLD: usize = 3;

macro_rules! positive_setting {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(into = "usize")]
        pub struct $name(NonZeroUsize);

        impl $name {
            /// 校验并构造；`value < 1` 时返回 [`RelayError::InvalidConfiguration`]。
            pub fn new(value: usize) -> Result<Self, RelayError> {
                NonZeroUsize::new(value)
                    .map(Self)
                    .ok_or(RelayError::InvalidConfiguration {
                        field: $field,
                        value,
                    })
            }

            /// 读取原始数值，恒大于 0。
            pub fn get(self) -> usize {
                self.0.get()
            }
        }

        impl TryFrom<usize> for $name {
            type Error = RelayError;

            fn try_from(value: usize) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for usize {
            fn from(value: $name) -> usize {
                value.get()
            }
        }

        impl From<NonZeroUsize> for $name {
            fn from(value: NonZeroUsize) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

positive_setting!(
    /// 滑动窗口容量 `N`，窗口内最多保留 `N` 个尚未交付的最新条目。
    WindowCapacity,
    "window.capacity"
);

positive_setting!(
    /// 批量阈值 `B`，缓冲长度达到 `B` 时立即冲刷。
    BatchThreshold,
    "batch.threshold"
);

impl Default for WindowCapacity {
    fn default() -> Self {
        Self(const { NonZeroUsize::new(DEFAULT_WINDOW_CAPACITY).unwrap() })
    }
}

impl Default for BatchThreshold {
    fn default() -> Self {
        Self(const { NonZeroUsize::new(DEFAULT_BATCH_THRESHOLD).unwrap() })
    }
}

/// 滑动窗口中继的配置段。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WindowSettings {
    pub capacity: WindowCapacity,
}

/// 批量中继的配置段。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSettings {
    pub threshold: BatchThreshold,
}

/// 中继整体配置。
///
/// # 教案式说明
/// - **意图 (Why)**：宿主进程通常以一份 TOML 描述所有中继参数，本结构提供统一的装载与校验入口；
/// - **契约 (What)**：
///   - 所有字段均已校验为正整数，缺省段落回落到默认值；
///   - 未知键会被拒绝，避免拼写错误被静默忽略；
/// - **执行 (How)**：`from_toml_str` 先反序列化为原始数值，再逐项调用新类型的 `new` 完成校验。
///
/// ```toml
/// [window]
/// capacity = 3
///
/// [batch]
/// threshold = 3
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelayConfig {
    pub window: WindowSettings,
    pub batch: BatchSettings,
}

impl RelayConfig {
    /// 从 TOML 文本解析并校验配置。
    pub fn from_toml_str(text: &str) -> Result<Self, RelayError> {
        let raw: RawRelayConfig = toml::from_str(text)?;
        raw.validate()
    }

    /// 从文件读取 TOML 配置。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RelayError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// 按配置构造滑动窗口中继。
    pub fn sliding_window_relay(&self) -> SlidingWindowRelay {
        SlidingWindowRelay::with_capacity(self.window.capacity)
    }

    /// 按配置构造批量中继。
    pub fn batching_relay(&self) -> BatchingRelay {
        BatchingRelay::with_threshold(self.batch.threshold)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelayConfig {
    #[serde(default)]
    window: RawWindowSettings,
    #[serde(default)]
    batch: RawBatchSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWindowSettings {
    #[serde(default = "default_window_capacity")]
    capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBatchSettings {
    #[serde(default = "default_batch_threshold")]
    threshold: usize,
}

impl Default for RawWindowSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

impl Default for RawBatchSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BATCH_THRESHOLD,
        }
    }
}

fn default_window_capacity() -> usize {
    DEFAULT_WINDOW_CAPACITY
}

fn default_batch_threshold() -> usize {
    DEFAULT_BATCH_THRESHOLD
}

impl RawRelayConfig {
    fn validate(self) -> Result<RelayConfig, RelayError> {
        Ok(RelayConfig {
            window: WindowSettings {
                capacity: WindowCapacity::new(self.window.capacity)?,
            },
            batch: BatchSettings {
                threshold: BatchThreshold::new(self.batch.threshold)?,
            },
        })
    }
}
