use tracing::{debug, trace, warn};

use crate::{
    config::BatchThreshold,
    error::RelayError,
    event::{RelayEvent, SourceState},
    flush::FlushSignal,
    sink::BatchSink,
    source::RelaySource,
};

use super::BatchBuffer;

/// 批量累积中继。
///
/// # 教案式说明
/// - **意图 (Why)**：当完整性比实时性更重要时，以批次为单位向下游交付，并用阻塞交付把下游的
///   慢速传导回上游（真正的背压），而不是像滑动窗口那样丢弃数据。
/// - **契约 (What)**：
///   - [`run`](Self::run) 将上游消费至耗尽，向下游交付一串非空批次；
///   - 批次内与批次间均保持接纳顺序，每个条目恰好出现在一个批次中；
///   - 三个互不排斥的冲刷触发：长度达到阈值、外部冲刷信号、上游耗尽；
///     三者共用同一冲刷逻辑（先交付，后清空），空缓冲上的冲刷信号为空操作；
///   - 上游耗尽时剩余条目恰好冲刷一次，随后释放下游端点；
///   - 批次交付未完成前不接纳任何新条目。
/// - **执行 (How)**：单个控制循环以 `tokio::select!` 竞争“上游产出”与“冲刷信号”，
///   事件交由内部会话对象处理。
/// - **风险 (Trade-offs)**：下游永久离线时无法兑现完整性承诺，运行以
///   [`RelayError::SinkDetached`] 结束。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchingRelay {
    threshold: BatchThreshold,
}

impl BatchingRelay {
    /// 以原始阈值构造；`threshold < 1` 时返回 [`RelayError::InvalidConfiguration`]。
    pub fn new(threshold: usize) -> Result<Self, RelayError> {
        Ok(Self::with_threshold(BatchThreshold::new(threshold)?))
    }

    pub fn with_threshold(threshold: BatchThreshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> BatchThreshold {
        self.threshold
    }

    /// 运行中继直至上游耗尽并完成收尾冲刷。
    #[tracing::instrument(
        name = "batching_relay",
        skip_all,
        fields(threshold = self.threshold.get())
    )]
    pub async fn run<T, Src, Snk>(
        &self,
        mut source: Src,
        flush: FlushSignal,
        sink: Snk,
    ) -> Result<(), RelayError>
    where
        T: Send,
        Src: RelaySource<T>,
        Snk: BatchSink<T>,
    {
        let mut session = BatchSession::new(self.threshold, sink);
        while session.is_accumulating() {
            let event: RelayEvent<T> = tokio::select! {
                pulled = source.next() => RelayEvent::from_pull(pulled),
                () = flush.requested() => RelayEvent::FlushRequested,
            };
            session.handle(event).await?;
        }
        Ok(())
    }
}

/// 以原始阈值运行批量中继。
///
/// 阈值非法时立即返回 [`RelayError::InvalidConfiguration`]，不会消费上游。
pub async fn run_batching<T, Src, Snk>(
    source: Src,
    flush: FlushSignal,
    sink: Snk,
    threshold: usize,
) -> Result<(), RelayError>
where
    T: Send,
    Src: RelaySource<T>,
    Snk: BatchSink<T>,
{
    BatchingRelay::new(threshold)?.run(source, flush, sink).await
}

/// 触发本次冲刷的原因，仅用于日志。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlushCause {
    Threshold,
    Signal,
    Exhaustion,
}

impl FlushCause {
    fn as_str(self) -> &'static str {
        match self {
            FlushCause::Threshold => "threshold",
            FlushCause::Signal => "signal",
            FlushCause::Exhaustion => "exhaustion",
        }
    }
}

/// 一次运行的全部可变状态：缓冲、上游生命周期与下游端点。
///
/// 下游以 `Option` 持有，关闭即取出并丢弃，保证终止关闭只发生一次。
struct BatchSession<T, Snk> {
    buffer: BatchBuffer<T>,
    source: SourceState,
    sink: Option<Snk>,
    admitted: u64,
    batches: u64,
}

impl<T, Snk> BatchSession<T, Snk>
where
    T: Send,
    Snk: BatchSink<T>,
{
    fn new(threshold: BatchThreshold, sink: Snk) -> Self {
        Self {
            buffer: BatchBuffer::new(threshold),
            source: SourceState::Active,
            sink: Some(sink),
            admitted: 0,
            batches: 0,
        }
    }

    fn is_accumulating(&self) -> bool {
        self.source.is_active()
    }

    async fn handle(&mut self, event: RelayEvent<T>) -> Result<(), RelayError> {
        match event {
            RelayEvent::ItemArrived(item) => {
                if !self.source.is_active() {
                    warn!("item arrived after source exhaustion, ignored");
                    return Ok(());
                }
                self.admitted += 1;
                if let Some(batch) = self.buffer.push(item) {
                    self.emit(batch, FlushCause::Threshold).await?;
                } else {
                    trace!(buffered = self.buffer.len(), "item admitted");
                }
            }
            RelayEvent::FlushRequested => match self.buffer.flush() {
                Some(batch) => self.emit(batch, FlushCause::Signal).await?,
                None => trace!("flush requested on empty buffer, ignored"),
            },
            RelayEvent::SourceExhausted => self.finish().await?,
            RelayEvent::SinkReady(()) | RelayEvent::SinkDetached => {}
        }
        Ok(())
    }

    /// 耗尽收尾：冲刷剩余条目并关闭下游。重复调用为空操作。
    async fn finish(&mut self) -> Result<(), RelayError> {
        if !self.source.mark_exhausted() {
            return Ok(());
        }
        if let Some(batch) = self.buffer.flush() {
            self.emit(batch, FlushCause::Exhaustion).await?;
        }
        if self.sink.take().is_some() {
            debug!(
                admitted = self.admitted,
                batches = self.batches,
                "batching relay drained, sink closed"
            );
        }
        Ok(())
    }

    async fn emit(&mut self, batch: Vec<T>, cause: FlushCause) -> Result<(), RelayError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(RelayError::SinkDetached {
                pending: batch.len(),
            });
        };
        let size = batch.len();
        match sink.accept_batch(batch).await {
            Ok(()) => {
                self.batches += 1;
                debug!(size, trigger = cause.as_str(), "batch flushed");
                Ok(())
            }
            Err(refused) => {
                self.sink = None;
                warn!(
                    pending = refused.len(),
                    trigger = cause.as_str(),
                    "batch sink detached"
                );
                Err(RelayError::SinkDetached {
                    pending: refused.len(),
                })
            }
        }
    }
}
