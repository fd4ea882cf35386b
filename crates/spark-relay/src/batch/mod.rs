//! 批量累积：阈值/信号/耗尽三类触发的批量中继。
//!
//! - [`BatchBuffer`]：累积至阈值或显式冲刷才清空的缓冲；
//! - [`BatchingRelay`] / [`run_batching`]：驱动缓冲的单控制循环，耗尽时保证最终排空。

mod buffer;
mod relay;

pub use buffer::BatchBuffer;
pub use relay::{BatchingRelay, run_batching};
