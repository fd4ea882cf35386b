//! 下游抽象：滑动窗口的逐条交付与批量中继的整批交付。
//!
//! # 模块定位（Why）
//! - 两类中继对下游的要求不同：
//!   - 滑动窗口需要先观测“下游就绪”，再决定交付哪一个条目（就绪时窗口头部才出队），
//!     因此拆分为 [`WindowSink::ready`] 与 [`DeliverySlot::deliver`] 两步；
//!   - 批量中继以阻塞交付实现背压，[`BatchSink::accept_batch`] 完成前中继不再接纳上游条目。
//! - 下游永远拿不到缓冲本身，只能拿到单个条目或一份批次快照。
//!
//! # 契约（What）
//! - `ready()` 会在 `select!` 中与上游竞争，必须取消安全；返回 `None` 表示下游永久离线；
//! - `deliver` 失败时原样退回条目，中继将其放回窗口头部，顺序不变；
//! - `accept_batch` 从不以空批次调用；失败时原样退回批次。

use std::future::Future;

use tokio::sync::mpsc;

use crate::handoff::{Handoff, HandoffSlot};

/// 一次就绪的交付机会，恰好接收一个条目。
pub trait DeliverySlot<T>: Send {
    /// 交付条目；下游在就绪后又离开时退回条目。
    fn deliver(self, item: T) -> Result<(), T>;
}

/// 滑动窗口中继的下游端点。
pub trait WindowSink<T>: Send {
    type Slot: DeliverySlot<T>;

    /// 等待下游就绪；`None` 表示下游永久离线。
    fn ready(&mut self) -> impl Future<Output = Option<Self::Slot>> + Send;
}

/// 批量中继的下游端点。
pub trait BatchSink<T>: Send {
    /// 阻塞交付一个非空批次；下游离线时退回批次。
    fn accept_batch(&mut self, batch: Vec<T>) -> impl Future<Output = Result<(), Vec<T>>> + Send;
}

impl<T: Send> DeliverySlot<T> for HandoffSlot<T> {
    fn deliver(self, item: T) -> Result<(), T> {
        HandoffSlot::deliver(self, item)
    }
}

/// 会合通道：就绪即“有消费者正在等待”，是滑动窗口语义的精确实现。
impl<T: Send> WindowSink<T> for Handoff<T> {
    type Slot = HandoffSlot<T>;

    fn ready(&mut self) -> impl Future<Output = Option<Self::Slot>> + Send {
        Handoff::ready(self)
    }
}

impl<T: Send> DeliverySlot<T> for mpsc::OwnedPermit<T> {
    fn deliver(self, item: T) -> Result<(), T> {
        self.send(item);
        Ok(())
    }
}

/// 有界 `mpsc` 通道：就绪即“通道内有空闲槽位”。
///
/// - **风险 (Trade-offs)**：通道自身的容量会成为窗口之外的第二级缓冲，
///   已进入通道的条目不再受淘汰策略约束；需要严格“最新 N 条”语义时请使用 [`Handoff`]。
impl<T: Send + 'static> WindowSink<T> for mpsc::Sender<T> {
    type Slot = mpsc::OwnedPermit<T>;

    fn ready(&mut self) -> impl Future<Output = Option<Self::Slot>> + Send {
        let sender = self.clone();
        async move { sender.reserve_owned().await.ok() }
    }
}

impl<T: Send> BatchSink<T> for mpsc::Sender<Vec<T>> {
    fn accept_batch(&mut self, batch: Vec<T>) -> impl Future<Output = Result<(), Vec<T>>> + Send {
        async move { self.send(batch).await.map_err(|err| err.0) }
    }
}

impl<T: Send> BatchSink<T> for mpsc::UnboundedSender<Vec<T>> {
    fn accept_batch(&mut self, batch: Vec<T>) -> impl Future<Output = Result<(), Vec<T>>> + Send {
        let result = self.send(batch).map_err(|err| err.0);
        async move { result }
    }
}

/// 会合通道作为批量下游：批次只交给正在等待的消费者，消费者不取则中继一直阻塞。
impl<T: Send> BatchSink<T> for Handoff<Vec<T>> {
    fn accept_batch(&mut self, batch: Vec<T>) -> impl Future<Output = Result<(), Vec<T>>> + Send {
        async move {
            let mut batch = batch;
            loop {
                let Some(slot) = self.ready().await else {
                    return Err(batch);
                };
                match slot.deliver(batch) {
                    Ok(()) => return Ok(()),
                    Err(refused) => batch = refused,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::handoff;

    #[tokio::test]
    async fn mpsc_sender_is_ready_while_capacity_remains() {
        let (mut tx, mut rx) = mpsc::channel::<u32>(1);
        let slot = WindowSink::ready(&mut tx).await.expect("通道有空闲槽位");
        slot.deliver(5).expect("交付");
        assert_eq!(rx.recv().await, Some(5));
    }

    #[tokio::test]
    async fn closed_mpsc_sender_reports_detached() {
        let (mut tx, rx) = mpsc::channel::<u32>(1);
        drop(rx);
        assert!(WindowSink::ready(&mut tx).await.is_none());
    }

    #[tokio::test]
    async fn batch_sink_returns_batch_when_receiver_is_gone() {
        let (mut tx, rx) = mpsc::channel::<Vec<u32>>(1);
        drop(rx);
        let refused = tx.accept_batch(vec![1, 2]).await.expect_err("下游已离线");
        assert_eq!(refused, vec![1, 2]);
    }

    #[tokio::test]
    async fn handoff_batch_sink_waits_for_taker() {
        let (mut sink, taker) = handoff::<Vec<u32>>();
        let consumer = tokio::spawn(async move { taker.collect().await });
        sink.accept_batch(vec![1, 2]).await.expect("交付第一批");
        sink.accept_batch(vec![3]).await.expect("交付第二批");
        drop(sink);
        assert_eq!(
            consumer.await.expect("消费者任务"),
            vec![vec![1, 2], vec![3]]
        );
    }
}
