use std::sync::atomic::Ordering;

use tracing::error;

use super::SharedSurfaceSet;

impl SharedSurfaceSet {
    /// ### English
    /// Marks a slot as the producer's current render target.
    ///
    /// Store-then-load with `SeqCst` on both sides guarantees that if the two threads race, at
    /// least one of them observes the other's flag.
    ///
    /// ### 中文
    /// 将槽位标记为生产者当前的渲染目标。
    ///
    /// 双方均以 `SeqCst` 先写后读，若两线程竞争，至少有一方能观察到对方的标记。
    pub fn begin_write(&self, slot: usize) {
        let slot_state = &self.slots[slot];
        slot_state.capturing.store(true, Ordering::SeqCst);
        if slot_state.locked.load(Ordering::SeqCst) {
            self.record_overlap(slot, "producer bound a slot locked by the display thread");
        }
    }

    /// ### English
    /// Clears the producer's claim on a slot.
    ///
    /// ### 中文
    /// 清除生产者对槽位的占用。
    #[inline]
    pub fn end_write(&self, slot: usize) {
        self.slots[slot].capturing.store(false, Ordering::SeqCst);
    }

    /// ### English
    /// Marks a slot as interop-locked by the display thread.
    ///
    /// ### 中文
    /// 将槽位标记为被显示线程 interop 加锁。
    pub fn begin_read(&self, slot: usize) {
        let slot_state = &self.slots[slot];
        slot_state.locked.store(true, Ordering::SeqCst);
        if slot_state.capturing.load(Ordering::SeqCst) {
            self.record_overlap(slot, "display thread locked a slot the producer is drawing into");
        }
    }

    #[inline]
    pub fn end_read(&self, slot: usize) {
        self.slots[slot].locked.store(false, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_capturing(&self, slot: usize) -> bool {
        self.slots[slot].capturing.load(Ordering::SeqCst)
    }

    /// ### English
    /// Number of ownership overlaps observed so far (0 when the hand-off never timed out).
    ///
    /// ### 中文
    /// 目前观察到的所有权重叠次数（交接从未超时则为 0）。
    #[inline]
    pub fn overlap_count(&self) -> u64 {
        self.meta.overlaps.load(Ordering::Relaxed)
    }

    fn record_overlap(&self, slot: usize, what: &'static str) {
        let total = self.meta.overlaps.fetch_add(1, Ordering::Relaxed) + 1;
        error!(slot, total, "{what}");
    }
}
