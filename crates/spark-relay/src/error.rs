//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 中继在运行期没有可恢复的错误：消费者停滞由策略吸收（窗口淘汰、批量背压），
//!   上游耗尽是正常结束而非错误；
//! - 因此错误域只覆盖两类场景：构造期的配置校验，以及批量中继发现下游已彻底离线。
//!
//! ## 设计要求（What）
//! - 所有错误类型实现 `thiserror::Error`，可直接交给 `anyhow` 等上层框架；
//! - 配置错误携带字段名与原始值，便于在启动日志中直接定位。

use std::{io, path::PathBuf};

use thiserror::Error;

/// 中继错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：将“配置不合法”与“下游离线”两类失败以稳定的枚举暴露，避免调用方解析字符串；
/// - **契约 (What)**：
///   - `InvalidConfiguration`：窗口容量或批量阈值小于 1，构造阶段即拒绝；
///   - `ConfigSyntax` / `ConfigIo`：加载 TOML 配置时的语法或读取失败；
///   - `SinkDetached`：批量中继交付时下游已不可达，`pending` 为未能交付的条目数；
/// - **风险 (Trade-offs)**：`ConfigSyntax` 持有 `toml::de::Error`，因此本枚举不派生 `Clone`/`PartialEq`，
///   测试中请使用 `matches!` 断言。
#[derive(Debug, Error)]
pub enum RelayError {
    /// 配置项必须为正整数。
    #[error("invalid configuration: `{field}` must be a positive integer, got {value}")]
    InvalidConfiguration { field: &'static str, value: usize },

    /// 配置文本无法解析。
    #[error("failed to parse relay configuration: {source}")]
    ConfigSyntax {
        #[from]
        source: toml::de::Error,
    },

    /// 配置文件读取失败。
    #[error("failed to read relay configuration `{}`: {source}", .path.display())]
    ConfigIo { path: PathBuf, source: io::Error },

    /// 批量下游已离线，批次无法交付。
    ///
    /// - **意图 (Why)**：批量中继承诺“每个条目恰好出现在一个批次中”，下游消失后该承诺无法兑现，
    ///   继续消费上游只会静默丢数据，因此以错误形式终止；
    /// - **契约 (What)**：`pending` 为被拒绝批次中的条目数量，始终大于 0。
    #[error("batch sink detached with {pending} undelivered item(s)")]
    SinkDetached { pending: usize },
}

impl RelayError {
    /// 判断错误是否源自配置阶段。
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidConfiguration { .. }
                | RelayError::ConfigSyntax { .. }
                | RelayError::ConfigIo { .. }
        )
    }
}
