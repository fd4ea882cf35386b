use tracing::{debug, trace, warn};

use crate::{
    config::WindowCapacity,
    error::RelayError,
    event::{RelayEvent, SourceState},
    sink::{DeliverySlot, WindowSink},
    source::RelaySource,
};

use super::WindowBuffer;

/// 滑动窗口中继。
///
/// # 教案式说明
/// - **意图 (Why)**：在上游与下游速率不可预测时，以“新鲜度优先于完整性”的策略解耦两者：
///   下游停滞只会让旧数据被淘汰，不会导致内存无界增长或上游阻塞；适用于实时遥测等
///   旧数据价值低于丢失代价的场景。
/// - **契约 (What)**：
///   - [`run`](Self::run) 将上游消费至耗尽，向下游交付已接纳条目的一个子序列；
///   - 任意时刻最多保留最近接纳且尚未交付的 `N` 个条目，窗口满时淘汰最旧条目；
///   - 交付顺序与接纳顺序一致，淘汰只移除最旧条目，从不重排；
///   - 上游耗尽后继续排空窗口，已在窗口中的条目不会因耗尽而丢失；
///   - 窗口为空且上游已耗尽时（`DRAINED`），释放下游端点并返回。
/// - **执行 (How)**：单个控制循环独占 [`WindowBuffer`]：
///   - `EMPTY_WAITING`：窗口为空，只等待上游；
///   - `HAS_ITEMS`：以 `tokio::select!` 竞争“下游就绪”与“上游产出”，两者同时就绪时选择未作规定；
///   - 下游永久离线后停止等待下游，继续按淘汰策略消费上游直至耗尽，剩余条目随窗口丢弃。
/// - **风险 (Trade-offs)**：没有运行期错误路径；下游停滞表现为淘汰压力而非错误。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlidingWindowRelay {
    capacity: WindowCapacity,
}

/// 单次运行的计数，仅用于结束时的日志摘要。
#[derive(Debug, Default)]
struct WindowTally {
    admitted: u64,
    delivered: u64,
    evicted: u64,
}

impl SlidingWindowRelay {
    /// 以原始容量构造；`capacity < 1` 时返回 [`RelayError::InvalidConfiguration`]。
    pub fn new(capacity: usize) -> Result<Self, RelayError> {
        Ok(Self::with_capacity(WindowCapacity::new(capacity)?))
    }

    pub fn with_capacity(capacity: WindowCapacity) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> WindowCapacity {
        self.capacity
    }

    /// 运行中继直至上游耗尽且窗口排空（或下游离线后上游耗尽）。
    #[tracing::instrument(
        name = "sliding_window_relay",
        skip_all,
        fields(capacity = self.capacity.get())
    )]
    pub async fn run<T, Src, Snk>(&self, mut source: Src, mut sink: Snk)
    where
        T: Send,
        Src: RelaySource<T>,
        Snk: WindowSink<T>,
    {
        let mut buffer = WindowBuffer::new(self.capacity);
        let mut source_state = SourceState::Active;
        let mut sink_attached = true;
        let mut tally = WindowTally::default();

        loop {
            if !source_state.is_active() && (buffer.is_empty() || !sink_attached) {
                break;
            }

            let event: RelayEvent<T, Snk::Slot> = if buffer.is_empty() || !sink_attached {
                RelayEvent::from_pull(source.next().await)
            } else if !source_state.is_active() {
                RelayEvent::from_readiness(sink.ready().await)
            } else {
                tokio::select! {
                    slot = sink.ready() => RelayEvent::from_readiness(slot),
                    pulled = source.next() => RelayEvent::from_pull(pulled),
                }
            };

            match event {
                RelayEvent::ItemArrived(item) => {
                    tally.admitted += 1;
                    if buffer.admit(item).is_some() {
                        tally.evicted += 1;
                        debug!(buffered = buffer.len(), "window full, oldest item evicted");
                    } else {
                        trace!(buffered = buffer.len(), "item admitted");
                    }
                }
                RelayEvent::SinkReady(slot) => {
                    let Some(item) = buffer.take_oldest() else {
                        continue;
                    };
                    match slot.deliver(item) {
                        Ok(()) => {
                            tally.delivered += 1;
                            trace!(buffered = buffer.len(), "item delivered");
                        }
                        Err(item) => {
                            // 消费者在就绪后离开：条目回到头部，顺序不变。
                            if buffer.restore_oldest(item).is_some() {
                                tally.evicted += 1;
                            }
                            trace!("consumer left before handoff, item restored");
                        }
                    }
                }
                RelayEvent::SinkDetached => {
                    sink_attached = false;
                    warn!(
                        buffered = buffer.len(),
                        "window sink detached, remaining items will age out"
                    );
                }
                RelayEvent::SourceExhausted => {
                    if source_state.mark_exhausted() {
                        debug!(buffered = buffer.len(), "source exhausted, draining window");
                    }
                }
                RelayEvent::FlushRequested => {}
            }
        }

        drop(sink);
        debug!(
            admitted = tally.admitted,
            delivered = tally.delivered,
            evicted = tally.evicted,
            undelivered = buffer.len(),
            "sliding window relay terminated"
        );
    }
}

/// 以原始容量运行滑动窗口中继。
///
/// 容量非法时立即返回 [`RelayError::InvalidConfiguration`]，不会消费上游。
pub async fn run_sliding_window<T, Src, Snk>(
    source: Src,
    sink: Snk,
    capacity: usize,
) -> Result<(), RelayError>
where
    T: Send,
    Src: RelaySource<T>,
    Snk: WindowSink<T>,
{
    SlidingWindowRelay::new(capacity)?.run(source, sink).await;
    Ok(())
}
