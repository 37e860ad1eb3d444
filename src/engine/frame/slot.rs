use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize};

use super::Channel;

#[repr(C, align(64))]
pub(super) struct SlotAtomics {
    /// ### English
    /// Producer surface handle (0 = not created).
    ///
    /// ### 中文
    /// 生产者表面句柄（0 = 未创建）。
    pub(super) surface: AtomicUsize,
    /// ### English
    /// Cross-API share handle of the surface.
    ///
    /// ### 中文
    /// 该表面的跨 API 共享句柄。
    pub(super) share_handle: AtomicUsize,
    /// ### English
    /// Channel label (`Channel as u8`), written at end of capture.
    ///
    /// ### 中文
    /// 通道标签（`Channel as u8`），在捕获结束时写入。
    pub(super) channel: AtomicU8,
    /// ### English
    /// Set once the producer handed this slot off; cleared after the display thread read it.
    ///
    /// ### 中文
    /// 生产者交出该槽位后置位；显示线程读取完成后清除。
    pub(super) ready: AtomicBool,
    /// ### English
    /// Set while the producer is drawing into this slot.
    ///
    /// ### 中文
    /// 生产者正在向该槽位绘制时置位。
    pub(super) capturing: AtomicBool,
    /// ### English
    /// Set while the display thread holds the interop lock on this slot.
    ///
    /// ### 中文
    /// 显示线程持有该槽位 interop 锁时置位。
    pub(super) locked: AtomicBool,
}

impl SlotAtomics {
    pub(super) fn new() -> Self {
        Self {
            surface: AtomicUsize::new(0),
            share_handle: AtomicUsize::new(0),
            channel: AtomicU8::new(Channel::Unset as u8),
            ready: AtomicBool::new(false),
            capturing: AtomicBool::new(false),
            locked: AtomicBool::new(false),
        }
    }
}
