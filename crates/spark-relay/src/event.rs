//! 控制循环共享的事件模型与终止护栏。
//!
//! # 模块定位（Why）
//! - 两类中继的控制循环都在一个 `tokio::select!` 中同时等待多个事件（新条目、下游就绪、
//!   冲刷信号、上游耗尽），本模块把“等待”与“处理”拆开：`select!` 只负责产出
//!   [`RelayEvent`]，随后的 `match` 负责状态迁移，使每个分支的副作用集中且可读。
//! - [`SourceState`] 记录上游是否已经耗尽，保证耗尽处理只执行一次，迟到或重复的耗尽信号不会
//!   引发第二次收尾冲刷。

/// 控制循环一次多路等待的结果。
///
/// # 教案式说明
/// - **意图 (Why)**：以带标签的变体取代“魔法值”表示流结束，`SourceExhausted` 与任何合法条目都可区分；
/// - **契约 (What)**：
///   - `ItemArrived(item)`：上游交付了一个条目；
///   - `SinkReady(slot)`：下游准备好接收恰好一个条目，`slot` 用于完成交付；
///   - `SinkDetached`：下游永久离线，不会再有就绪事件；
///   - `FlushRequested`：外部冲刷信号到达（仅批量中继）；
///   - `SourceExhausted`：上游耗尽；
/// - **风险 (Trade-offs)**：当多个事件同时就绪时选择哪一个未作规定，调用方不得依赖优先级。
#[derive(Debug)]
pub enum RelayEvent<T, S = ()> {
    ItemArrived(T),
    SinkReady(S),
    SinkDetached,
    FlushRequested,
    SourceExhausted,
}

impl<T, S> RelayEvent<T, S> {
    /// 将一次上游拉取结果映射为事件：`None` 即耗尽。
    pub fn from_pull(pulled: Option<T>) -> Self {
        match pulled {
            Some(item) => RelayEvent::ItemArrived(item),
            None => RelayEvent::SourceExhausted,
        }
    }

    /// 将一次下游就绪等待结果映射为事件：`None` 即下游离线。
    pub fn from_readiness(slot: Option<S>) -> Self {
        match slot {
            Some(slot) => RelayEvent::SinkReady(slot),
            None => RelayEvent::SinkDetached,
        }
    }
}

/// 上游生命周期：活跃或已耗尽。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceState {
    #[default]
    Active,
    Exhausted,
}

impl SourceState {
    /// 上游是否仍可能产出条目。
    pub fn is_active(self) -> bool {
        matches!(self, SourceState::Active)
    }

    /// 标记上游耗尽。
    ///
    /// 仅首次调用返回 `true`；调用方据此保证收尾逻辑只运行一次。
    pub fn mark_exhausted(&mut self) -> bool {
        match self {
            SourceState::Active => {
                *self = SourceState::Exhausted;
                true
            }
            SourceState::Exhausted => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_result_maps_to_tagged_event() {
        assert!(matches!(
            RelayEvent::<u32>::from_pull(Some(0)),
            RelayEvent::ItemArrived(0)
        ));
        assert!(matches!(
            RelayEvent::<u32>::from_pull(None),
            RelayEvent::SourceExhausted
        ));
    }

    #[test]
    fn readiness_result_maps_to_tagged_event() {
        assert!(matches!(
            RelayEvent::<u32, &str>::from_readiness(Some("slot")),
            RelayEvent::SinkReady("slot")
        ));
        assert!(matches!(
            RelayEvent::<u32, &str>::from_readiness(None),
            RelayEvent::SinkDetached
        ));
    }

    #[test]
    fn exhaustion_is_marked_once() {
        let mut state = SourceState::default();
        assert!(state.is_active());
        assert!(state.mark_exhausted());
        assert!(!state.mark_exhausted());
        assert!(!state.is_active());
    }
}
