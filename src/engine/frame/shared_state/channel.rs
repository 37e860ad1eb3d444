use std::sync::atomic::Ordering;

use super::super::Channel;
use super::SharedSurfaceSet;

impl SharedSurfaceSet {
    /// ### English
    /// Labels a slot and marks it handed off (producer side, end of capture).
    ///
    /// The label is published before the ready flag so a reader that observes `ready` also
    /// observes the label.
    ///
    /// ### 中文
    /// 为槽位写入标签并标记为已交出（生产者侧，捕获结束时）。
    ///
    /// 标签先于 ready 标记发布，读到 `ready` 的一方必然能读到该标签。
    pub fn hand_off(&self, slot: usize, channel: Channel) {
        let slot_state = &self.slots[slot];
        slot_state.channel.store(channel as u8, Ordering::Relaxed);
        slot_state.ready.store(true, Ordering::Release);
    }

    /// ### English
    /// Current label of a slot.
    ///
    /// ### 中文
    /// 槽位当前的标签。
    #[inline]
    pub fn channel(&self, slot: usize) -> Channel {
        Channel::from_u8(self.slots[slot].channel.load(Ordering::Acquire))
    }

    /// ### English
    /// Whether a slot holds a handed-off frame the display thread has not read yet.
    ///
    /// ### 中文
    /// 槽位是否持有显示线程尚未读取的已交出帧。
    #[inline]
    pub fn is_ready(&self, slot: usize) -> bool {
        self.slots[slot].ready.load(Ordering::Acquire)
    }

    /// ### English
    /// Marks a slot as read by the display thread. The label is left untouched.
    ///
    /// ### 中文
    /// 标记槽位已被显示线程读取；标签保持不变。
    #[inline]
    pub fn consume(&self, slot: usize) {
        self.slots[slot].ready.store(false, Ordering::Release);
    }
}
