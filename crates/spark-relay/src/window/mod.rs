//! 滑动窗口：有界窗口缓冲与最新 N 条中继。
//!
//! - [`WindowBuffer`]：满载淘汰最旧条目的有界 FIFO；
//! - [`SlidingWindowRelay`] / [`run_sliding_window`]：驱动窗口的单控制循环。

mod buffer;
mod relay;

pub use buffer::WindowBuffer;
pub use relay::{SlidingWindowRelay, run_sliding_window};
