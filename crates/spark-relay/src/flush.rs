//! 外部冲刷信号。
//!
//! # 模块定位（Why）
//! - 批量中继除阈值与上游耗尽外，还接受外部“立即冲刷”请求（例如上层定时器或运维命令）；
//! - 触发方不能被中继阻塞，且在中继忙于交付批次期间发出的请求不能丢失。
//!
//! # 设计要点（How）
//! - 基于 [`tokio::sync::Notify`]：`notify_one` 在无人等待时保存一个许可，
//!   下一次等待立即完成；连续多次触发合并为一个许可。
//! - [`FlushTrigger`] 可克隆并跨任务分发；[`FlushSignal`] 归中继独占。
//!
//! # 契约（What）
//! - [`FlushTrigger::raise`] 非阻塞、可在任意时刻调用，包括缓冲为空时（届时为空操作）；
//! - [`FlushSignal::requested`] 取消安全：在 `select!` 中落选的等待会把已收到的通知转交回去，
//!   不会吞掉许可。

use std::sync::Arc;

use tokio::sync::Notify;

/// 创建一对冲刷信号端点。
pub fn flush_signal() -> (FlushTrigger, FlushSignal) {
    let notify = Arc::new(Notify::new());
    (
        FlushTrigger {
            notify: Arc::clone(&notify),
        },
        FlushSignal { notify },
    )
}

/// 触发端：请求批量中继立即冲刷。
#[derive(Clone, Debug)]
pub struct FlushTrigger {
    notify: Arc<Notify>,
}

impl FlushTrigger {
    /// 发出冲刷请求；尚未被消费的请求会与之合并。
    pub fn raise(&self) {
        self.notify.notify_one();
    }
}

/// 中继侧：等待冲刷请求。
#[derive(Debug)]
pub struct FlushSignal {
    notify: Arc<Notify>,
}

impl FlushSignal {
    /// 永不触发的信号，供不需要外部冲刷的调用方使用。
    pub fn never() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
        }
    }

    /// 等待下一次冲刷请求。
    pub async fn requested(&self) {
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn raise_before_wait_is_not_lost() {
        let (trigger, signal) = flush_signal();
        trigger.raise();
        tokio::time::timeout(Duration::from_secs(1), signal.requested())
            .await
            .expect("先发出的请求应被保留");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_raises_coalesce() {
        let (trigger, signal) = flush_signal();
        trigger.raise();
        trigger.raise();
        signal.requested().await;
        let second = tokio::time::timeout(Duration::from_millis(10), signal.requested()).await;
        assert!(second.is_err(), "多次触发应合并为一个许可");
    }

    #[tokio::test(start_paused = true)]
    async fn never_signal_stays_pending() {
        let signal = FlushSignal::never();
        let waited = tokio::time::timeout(Duration::from_millis(10), signal.requested()).await;
        assert!(waited.is_err());
    }
}
