#![deny(unsafe_code)]

//! # spark-relay
//!
//! ## 定位与职责（Why）
//! - 在速率互不相关的异步生产者与消费者之间充当有界缓冲中继，以显式的接纳/淘汰策略吸收速率差，
//!   同时保证内存有界、终止确定；
//! - 提供两种策略：
//!   - **滑动窗口**（[`SlidingWindowRelay`]）：只保留最近 `N` 个未交付条目，满载淘汰最旧条目，
//!     新鲜度优先；
//!   - **批量累积**（[`BatchingRelay`]）：阈值、外部信号、上游耗尽三类触发冲刷，阻塞交付形成背压，
//!     完整性优先。
//!
//! ## 架构嵌入（Where）
//! - `source` / `sink`：上下游端点契约及 Tokio 通道、`Stream` 适配；
//! - `handoff`：零容量会合通道，精确表达“消费者此刻就绪”；
//! - `flush`：批量中继的外部冲刷信号；
//! - `event`：控制循环共享的事件模型与耗尽护栏；
//! - `window` / `batch`：缓冲结构与中继控制循环；
//! - `config` / `error`：配置校验与错误域。
//!
//! ## 并发模型（How）
//! - 每个中继实例是一个异步任务内的单控制循环，缓冲由该循环独占，不使用锁；
//! - 多路等待统一使用 `tokio::select!` 产出带标签的 [`RelayEvent`] 后再分派，
//!   多个事件同时就绪时的选择未作规定；
//! - 终止只由上游耗尽驱动；超时等外部取消属于调用方的组合职责。
//!
//! ```no_run
//! use spark_relay::{handoff, run_sliding_window};
//! use tokio::sync::mpsc;
//!
//! # async fn demo() -> Result<(), spark_relay::RelayError> {
//! let (tx, rx) = mpsc::channel(16);
//! let (sink, taker) = handoff();
//! tokio::spawn(async move {
//!     while let Some(value) = taker.take().await {
//!         println!("value: {value}");
//!     }
//! });
//! for value in 1..=10u32 {
//!     let _ = tx.send(value).await;
//! }
//! drop(tx);
//! run_sliding_window(rx, sink, 3).await
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod event;
pub mod flush;
pub mod handoff;
pub mod sink;
pub mod source;
pub mod window;

pub use batch::{BatchBuffer, BatchingRelay, run_batching};
pub use config::{BatchSettings, BatchThreshold, RelayConfig, WindowCapacity, WindowSettings};
pub use error::RelayError;
pub use event::{RelayEvent, SourceState};
pub use flush::{FlushSignal, FlushTrigger, flush_signal};
pub use handoff::{Handoff, HandoffSlot, Taker, handoff};
pub use sink::{BatchSink, DeliverySlot, WindowSink};
pub use source::{RelaySource, StreamSource};
pub use window::{SlidingWindowRelay, WindowBuffer, run_sliding_window};
