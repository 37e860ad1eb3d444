use std::sync::atomic::Ordering;

use super::super::SessionState;
use super::SharedSurfaceSet;

impl SharedSurfaceSet {
    /// ### English
    /// Sets the sticky stereo latch. Returns `true` only for the call that flipped it.
    ///
    /// ### 中文
    /// 置位粘滞的立体模式锁存；仅在真正翻转它的那次调用返回 `true`。
    #[inline]
    pub fn latch_stereo(&self) -> bool {
        !self.meta.stereo.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn stereo_enabled(&self) -> bool {
        self.meta.stereo.load(Ordering::Acquire)
    }

    #[inline]
    pub fn session(&self) -> SessionState {
        SessionState::from_u8(self.meta.session.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_session(&self, state: SessionState) {
        self.meta.session.store(state as u8, Ordering::Release);
    }

    /// ### English
    /// Moves the session from `from` to `to`; fails if another thread moved it first.
    ///
    /// ### 中文
    /// 将会话从 `from` 切换到 `to`；若其它线程已先切换则失败。
    #[inline]
    pub fn advance_session(&self, from: SessionState, to: SessionState) -> bool {
        self.meta
            .session
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
