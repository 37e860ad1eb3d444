use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64};

use crate::engine::cache::pad_after2;

use super::SessionState;
use super::slot::SlotAtomics;

const META_FLAGS_PAD_BYTES: usize = pad_after2::<AtomicBool, AtomicU8>();

/// ### English
/// Lock-free state of the shared surface ring.
///
/// The producer thread writes surfaces, labels and the `capturing` flag; the display thread reads
/// labels and toggles the `locked` flag while it holds the interop lock. Cursors are not stored
/// here: the write cursor belongs to the capture controller and the read cursor to the presenter,
/// each owned by exactly one thread.
///
/// ### 中文
/// 共享表面环的无锁状态。
///
/// 生产者线程写入表面、标签与 `capturing` 标记；显示线程读取标签，并在持有 interop 锁期间
/// 切换 `locked` 标记。游标不保存在这里：写游标属于捕获控制器，读游标属于呈现器，
/// 各自只由一个线程持有。
pub struct SharedSurfaceSet {
    /// ### English
    /// Per-slot atomics (length fixed at construction).
    ///
    /// ### 中文
    /// 每个槽位的原子状态（长度在构造时固定）。
    slots: Box<[SlotAtomics]>,
    /// ### English
    /// Ring-wide flags and diagnostics.
    ///
    /// ### 中文
    /// 环级别的标记与诊断计数。
    meta: RingMeta,
}

#[repr(C, align(64))]
struct RingMeta {
    /// ### English
    /// Sticky stereo latch (never cleared once set).
    ///
    /// ### 中文
    /// 粘滞的立体模式锁存（一旦置位不再清除）。
    stereo: AtomicBool,
    /// ### English
    /// Session state (`SessionState as u8`).
    ///
    /// ### 中文
    /// 会话状态（`SessionState as u8`）。
    session: AtomicU8,
    /// ### English
    /// Keeps the overlap counter off the flags' cache line.
    ///
    /// ### 中文
    /// 让重叠计数器与标记位处于不同的缓存行。
    _pad_flags: [u8; META_FLAGS_PAD_BYTES],
    /// ### English
    /// Number of times one slot was seen both captured and locked.
    ///
    /// ### 中文
    /// 同一槽位被观察到同时处于捕获与加锁状态的次数。
    overlaps: AtomicU64,
}

impl SharedSurfaceSet {
    /// ### English
    /// Creates a ring with `slot_count` empty slots (at least one).
    ///
    /// ### 中文
    /// 创建包含 `slot_count` 个空槽位的环（至少一个）。
    pub fn new(slot_count: usize) -> Self {
        let slot_count = slot_count.max(1);
        Self {
            slots: (0..slot_count).map(|_| SlotAtomics::new()).collect(),
            meta: RingMeta {
                stereo: AtomicBool::new(false),
                session: AtomicU8::new(SessionState::Idle as u8),
                _pad_flags: [0; META_FLAGS_PAD_BYTES],
                overlaps: AtomicU64::new(0),
            },
        }
    }

    /// ### English
    /// Number of slots in the ring.
    ///
    /// ### 中文
    /// 环中的槽位数量。
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

mod channel;
mod flags;
mod ownership;
mod publish;
