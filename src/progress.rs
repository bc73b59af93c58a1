//! 进度回调
//!
//! 两个耗时检查 (corrupt plists / unused resources) 可选地上报进度。
//! 回调始终在调用线程上同步执行，index 单调递增。

use tracing::trace;

/// 单条进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    /// 当前条目，从 0 开始
    pub index: usize,
    pub total: usize,
    pub label: Option<&'a str>,
}

/// 调用方提供的观察者
pub type Observer<'o> = &'o mut dyn for<'a> FnMut(Progress<'a>);

pub(crate) struct ProgressReporter<'o> {
    observer: Option<Observer<'o>>,
    total: usize,
}

impl<'o> ProgressReporter<'o> {
    pub(crate) fn new(observer: Option<Observer<'o>>, total: usize) -> Self {
        Self { observer, total }
    }

    pub(crate) fn report(&mut self, index: usize, label: Option<&str>) {
        trace!(index, total = self.total, label = label.unwrap_or_default(), "progress");
        if let Some(observer) = self.observer.as_mut() {
            observer(Progress {
                index,
                total: self.total,
                label,
            });
        }
    }
}

/// 每批并行处理的文件数
pub(crate) fn batch_size() -> usize {
    rayon::current_num_threads().max(1) * 4
}
