//! 上游抽象：按序产出条目并最终发出耗尽信号。
//!
//! # 模块定位（Why）
//! - 中继只需要“拉取下一个条目或得知已耗尽”这一种能力，[`RelaySource`] 将其收敛为单个方法；
//! - 为常见的 Tokio 通道与 `futures::Stream` 提供现成实现，调用方无需编写胶水代码。
//!
//! # 契约（What）
//! - `next()` 返回 `Some(item)` 表示新条目，`None` 表示耗尽；耗尽是显式信号，与任何条目值无关；
//! - 每个条目恰好被交付一次，不会重复；
//! - `next()` 返回的 Future 会在 `select!` 中与其他事件竞争，**必须是取消安全的**：
//!   Future 在完成前被丢弃时不得丢失条目。Tokio `mpsc` 的 `recv` 与 `StreamExt::next` 均满足该要求。
//!
//! # 注意事项（Trade-offs）
//! - 传输层故障需由实现方自行翻译为耗尽（`None`）或在更高层处理，中继不承担恢复职责。

use std::future::Future;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;

/// 中继的上游端点。
pub trait RelaySource<T>: Send {
    /// 拉取下一个条目；`None` 表示上游已耗尽。
    fn next(&mut self) -> impl Future<Output = Option<T>> + Send;
}

impl<T: Send> RelaySource<T> for mpsc::Receiver<T> {
    fn next(&mut self) -> impl Future<Output = Option<T>> + Send {
        self.recv()
    }
}

impl<T: Send> RelaySource<T> for mpsc::UnboundedReceiver<T> {
    fn next(&mut self) -> impl Future<Output = Option<T>> + Send {
        self.recv()
    }
}

/// 将任意 `Stream` 适配为 [`RelaySource`]。
///
/// - **契约 (What)**：流结束（`poll_next` 返回 `None`）即视为耗尽；
/// - **前置条件**：流需满足 `Unpin + Send`，非 `Unpin` 的流可先以 `Box::pin` 包装。
#[derive(Debug)]
pub struct StreamSource<S> {
    inner: S,
}

impl<S> StreamSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// 取回被包装的流。
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, T> RelaySource<T> for StreamSource<S>
where
    S: Stream<Item = T> + Unpin + Send,
    T: Send,
{
    fn next(&mut self) -> impl Future<Output = Option<T>> + Send {
        StreamExt::next(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_close_reads_as_exhaustion() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(0u32).await.expect("发送条目");
        drop(tx);
        assert_eq!(RelaySource::next(&mut rx).await, Some(0));
        assert_eq!(RelaySource::next(&mut rx).await, None);
    }

    #[tokio::test]
    async fn stream_end_reads_as_exhaustion() {
        let mut source = StreamSource::new(futures::stream::iter(vec![1, 2]));
        assert_eq!(source.next().await, Some(1));
        assert_eq!(source.next().await, Some(2));
        assert_eq!(source.next().await, None);
    }
}
