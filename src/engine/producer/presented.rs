use std::collections::HashSet;

use super::TargetId;

/// ### English
/// Output targets that have been presented at least once.
///
/// A clear is only captured when it hits one of these, which filters out offscreen and auxiliary
/// passes. Identities are opaque; a released target whose identity is reused by a new resource
/// will still match its stale entry.
///
/// ### 中文
/// 至少被呈现过一次的输出目标集合。
///
/// 只有命中其中目标的 clear 才会被捕获，以此过滤离屏与辅助渲染。
/// 标识是不透明的；已释放目标的标识若被新资源复用，仍会匹配到旧条目。
#[derive(Debug, Default)]
pub struct PresentedTargets {
    targets: HashSet<TargetId>,
}

impl PresentedTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Records a presented target. Returns `true` if it was not known before.
    ///
    /// ### 中文
    /// 记录一个被呈现的目标；此前未知时返回 `true`。
    #[inline]
    pub fn record(&mut self, target: TargetId) -> bool {
        self.targets.insert(target)
    }

    #[inline]
    pub fn contains(&self, target: TargetId) -> bool {
        self.targets.contains(&target)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
