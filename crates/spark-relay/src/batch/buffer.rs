use std::mem;

use crate::config::BatchThreshold;

/// 批量缓冲：累积条目直到阈值或显式冲刷。
///
/// # 教案式说明
/// - **意图 (Why)**：与窗口缓冲相反，批量缓冲从不丢弃条目，每个条目恰好进入一个批次；
/// - **契约 (What)**：
///   - [`push`](Self::push) 使长度达到阈值 `B` 时，在同一步内返回整批并清空缓冲，
///     因此两次冲刷之间长度始终小于 `B`；
///   - [`flush`](Self::flush) 在缓冲为空时返回 `None`，空批次永远不会产生；
///   - 批次内保持插入顺序；
/// - **执行 (How)**：以 `Vec` 存储，冲刷时整体移出并按阈值重新预分配。
#[derive(Debug, Clone)]
pub struct BatchBuffer<T> {
    items: Vec<T>,
    threshold: BatchThreshold,
}

impl<T> BatchBuffer<T> {
    pub fn new(threshold: BatchThreshold) -> Self {
        Self {
            items: Vec::with_capacity(threshold.get()),
            threshold,
        }
    }

    pub fn threshold(&self) -> BatchThreshold {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 追加条目；长度达到阈值时返回整批。
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.items.push(item);
        if self.items.len() >= self.threshold.get() {
            self.flush()
        } else {
            None
        }
    }

    /// 取出当前全部条目作为一个批次；缓冲为空时返回 `None`。
    pub fn flush(&mut self) -> Option<Vec<T>> {
        if self.items.is_empty() {
            return None;
        }
        let fresh = Vec::with_capacity(self.threshold.get());
        Some(mem::replace(&mut self.items, fresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(threshold: usize) -> BatchBuffer<u32> {
        BatchBuffer::new(BatchThreshold::new(threshold).expect("合法阈值"))
    }

    #[test]
    fn threshold_push_returns_full_batch_and_resets() {
        let mut buffer = buffer(3);
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.push(3), Some(vec![1, 2, 3]));
        assert!(buffer.is_empty());
    }

    #[test]
    fn flush_on_empty_buffer_yields_nothing() {
        let mut buffer = buffer(2);
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn explicit_flush_returns_partial_batch() {
        let mut buffer = buffer(5);
        buffer.push(1);
        buffer.push(2);
        assert_eq!(buffer.flush(), Some(vec![1, 2]));
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn threshold_one_flushes_every_item() {
        let mut buffer = buffer(1);
        assert_eq!(buffer.push(9), Some(vec![9]));
        assert_eq!(buffer.push(0), Some(vec![0]));
    }
}
