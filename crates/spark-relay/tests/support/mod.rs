//! 集成测试共享的脚本化上游。
//!
//! # 设计动机（Why）
//! - 中继的多路等待在多个事件同时就绪时随机选择，测试若要断言“下游读取前上游已耗尽”，
//!   必须能观测到中继何时读到了耗尽信号；
//! - 同时需要模拟“耗尽之后仍有迟到条目/重复耗尽”的异常上游，验证中继不会再次拉取。
//!
//! # 契约说明（What）
//! - 脚本中 `Some(item)` 为条目，`None` 为耗尽标记；脚本读完后始终返回 `None`；
//! - 首次返回 `None` 时触发 [`ScriptedSource::on_exhaustion`] 返回的回执；
//! - `pulls` 记录 `next()` 实际被轮询完成的次数。
//! - 出队发生在 Future 首次被轮询时，因此在 `select!` 中落选不会丢失条目。

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use spark_relay::RelaySource;
use tokio::sync::oneshot;

pub struct ScriptedSource<T> {
    script: VecDeque<Option<T>>,
    exhausted: Option<oneshot::Sender<()>>,
    pulls: Arc<AtomicUsize>,
}

impl<T> ScriptedSource<T> {
    /// 以条目序列构造，序列结束即耗尽。
    pub fn items(items: impl IntoIterator<Item = T>) -> Self {
        Self::script(items.into_iter().map(Some))
    }

    /// 以原始脚本构造，`None` 表示一次耗尽标记。
    pub fn script(steps: impl IntoIterator<Item = Option<T>>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            exhausted: None,
            pulls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 注册耗尽回执：中继首次读到耗尽时完成。
    pub fn on_exhaustion(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.exhausted = Some(tx);
        rx
    }

    /// 共享的拉取计数器。
    pub fn pulls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pulls)
    }
}

impl<T: Send> RelaySource<T> for ScriptedSource<T> {
    fn next(&mut self) -> impl Future<Output = Option<T>> + Send {
        async move {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.pop_front().flatten();
            if step.is_none() {
                if let Some(exhausted) = self.exhausted.take() {
                    let _ = exhausted.send(());
                }
            }
            step
        }
    }
}
