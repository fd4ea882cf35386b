use std::collections::{VecDeque, vec_deque};

use crate::config::WindowCapacity;

/// 有界 FIFO 窗口，满载时淘汰最旧条目。
///
/// # 教案式说明
/// - **意图 (Why)**：为滑动窗口中继保存“最新的 N 个尚未交付条目”，下游停滞时以丢弃旧数据换取新鲜度，
///   内存占用始终受容量约束；
/// - **契约 (What)**：
///   - 头部为最旧条目，尾部为最新条目；
///   - 任意一次变更完成后都满足 `len() <= capacity()`，淘汰先于插入，不存在瞬时越界；
///   - 条目从不重排，淘汰只发生在最旧一端；
/// - **执行 (How)**：以 `VecDeque` 存储并按容量预分配；
/// - **风险 (Trade-offs)**：窗口由单个控制循环独占，不提供任何并发保护。
#[derive(Debug, Clone)]
pub struct WindowBuffer<T> {
    items: VecDeque<T>,
    capacity: WindowCapacity,
}

impl<T> WindowBuffer<T> {
    /// 创建空窗口。
    pub fn new(capacity: WindowCapacity) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    pub fn capacity(&self) -> WindowCapacity {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity.get()
    }

    /// 接纳新条目；窗口已满时先淘汰最旧条目并将其返回。
    pub fn admit(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// 取出最旧条目用于交付。
    pub fn take_oldest(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// 查看最旧条目。
    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    /// 将交付失败的条目放回头部。
    ///
    /// 仅在紧随 `take_oldest` 之后调用，因此不会越过容量；若窗口已满则丢弃该条目并返回它。
    pub(crate) fn restore_oldest(&mut self, item: T) -> Option<T> {
        if self.is_full() {
            return Some(item);
        }
        self.items.push_front(item);
        None
    }

    /// 由旧到新遍历窗口。
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }
}
