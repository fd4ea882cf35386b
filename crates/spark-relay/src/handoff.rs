//! 零容量会合通道（rendezvous handoff）。
//!
//! # 模块定位（Why）
//! - 滑动窗口中继需要观测“下游此刻正准备接收”这一事件：只有下游真正在等待时才交付窗口头部，
//!   否则条目必须留在窗口中接受淘汰策略约束。
//! - Tokio `mpsc` 通道至少带有一个槽位的隐式缓冲，`send` 成功并不代表消费者已就绪；
//!   若直接用它作为下游，窗口之外会多出一段不受淘汰约束的队列。
//! - 本模块把“需求”显式化：消费者每次 [`Taker::take`] 都先登记一份需求（一次性回执），
//!   中继侧通过 [`Handoff::ready`] 观测到需求后，再把条目写入回执完成交付。
//!
//! # 契约（What）
//! - 每个需求恰好交付一个值；
//! - 中继侧丢弃后，所有等待中与后续的 `take` 均返回 `None`；
//! - 消费者在登记需求后放弃等待，[`HandoffSlot::deliver`] 会把值原样退回，调用方可放回缓冲。
//!
//! # 注意事项（Trade-offs）
//! - `take` 在值已写入回执、但尚未被读取时被取消，该值随回执一同丢弃；需要严格不丢失的消费者
//!   应将 `take` 一直等待至完成。

use tokio::sync::{mpsc, oneshot};

/// 同时排队的需求上限；每个 [`Taker`] 同一时刻至多一份需求。
const DEMAND_QUEUE_DEPTH: usize = 1;

/// 创建一对会合通道端点。
pub fn handoff<T>() -> (Handoff<T>, Taker<T>) {
    let (demand_tx, demand_rx) = mpsc::channel(DEMAND_QUEUE_DEPTH);
    (
        Handoff { demand: demand_rx },
        Taker { demand: demand_tx },
    )
}

/// 中继侧端点：观测下游需求并完成交付。
#[derive(Debug)]
pub struct Handoff<T> {
    demand: mpsc::Receiver<oneshot::Sender<T>>,
}

impl<T> Handoff<T> {
    /// 等待下一份仍然有效的需求。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：把“消费者就绪”转化为一个可以参与 `select!` 的 Future；
    /// - **契约 (What)**：返回 `Some(slot)` 时恰好有一个消费者在等待；返回 `None` 表示所有
    ///   [`Taker`] 均已丢弃，不会再有需求；
    /// - **执行 (How)**：跳过消费者已放弃的过期需求；
    /// - **取消安全**：仅在 `mpsc::Receiver::recv` 处挂起，取得需求后同步返回，
    ///   因此在 `select!` 中被丢弃不会吞掉需求。
    pub async fn ready(&mut self) -> Option<HandoffSlot<T>> {
        loop {
            let reply = self.demand.recv().await?;
            if !reply.is_closed() {
                return Some(HandoffSlot { reply });
            }
        }
    }
}

/// 一次已就绪的交付机会。
#[derive(Debug)]
pub struct HandoffSlot<T> {
    reply: oneshot::Sender<T>,
}

impl<T> HandoffSlot<T> {
    /// 交付一个值；消费者在此期间放弃等待时原样退回。
    pub fn deliver(self, value: T) -> Result<(), T> {
        self.reply.send(value)
    }
}

/// 消费者侧端点，可克隆给多个消费者共享。
#[derive(Debug)]
pub struct Taker<T> {
    demand: mpsc::Sender<oneshot::Sender<T>>,
}

impl<T> Clone for Taker<T> {
    fn clone(&self) -> Self {
        Self {
            demand: self.demand.clone(),
        }
    }
}

impl<T> Taker<T> {
    /// 登记需求并等待下一个值；中继已结束时返回 `None`。
    pub async fn take(&self) -> Option<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.demand.send(reply_tx).await.ok()?;
        reply_rx.await.ok()
    }

    /// 持续读取直至中继结束，按交付顺序收集全部值。
    pub async fn collect(self) -> Vec<T> {
        let mut values = Vec::new();
        while let Some(value) = self.take().await {
            values.push(value);
        }
        values
    }
}
