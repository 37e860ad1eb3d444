use std::sync::atomic::Ordering;

use super::super::SharedSurface;
use super::SharedSurfaceSet;

impl SharedSurfaceSet {
    /// ### English
    /// Publishes the producer surface created for `slot`.
    ///
    /// Must happen before the display thread is started; the thread spawn provides the
    /// happens-before edge for the display side.
    ///
    /// ### 中文
    /// 发布为 `slot` 创建的生产者表面。
    ///
    /// 必须在显示线程启动之前完成；线程创建为显示侧提供 happens-before 关系。
    pub fn install(&self, slot: usize, surface: SharedSurface) {
        let slot_state = &self.slots[slot];
        slot_state
            .share_handle
            .store(surface.share_handle, Ordering::Relaxed);
        slot_state.surface.store(surface.surface, Ordering::Release);
    }

    /// ### English
    /// Surface handles of a slot, or `None` before creation / after release.
    ///
    /// ### 中文
    /// 槽位的表面句柄；创建前或释放后为 `None`。
    pub fn surface(&self, slot: usize) -> Option<SharedSurface> {
        let slot_state = &self.slots[slot];
        let surface = slot_state.surface.load(Ordering::Acquire);
        if surface == 0 {
            return None;
        }
        Some(SharedSurface {
            surface,
            share_handle: slot_state.share_handle.load(Ordering::Relaxed),
        })
    }

    /// ### English
    /// Removes a slot's surface so it is released exactly once.
    ///
    /// ### 中文
    /// 取走槽位的表面，确保只释放一次。
    pub fn take(&self, slot: usize) -> Option<SharedSurface> {
        let slot_state = &self.slots[slot];
        let surface = slot_state.surface.swap(0, Ordering::AcqRel);
        if surface == 0 {
            return None;
        }
        Some(SharedSurface {
            surface,
            share_handle: slot_state.share_handle.swap(0, Ordering::Relaxed),
        })
    }
}
