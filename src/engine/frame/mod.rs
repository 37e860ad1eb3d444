/// ### English
/// Shared surface ring used to hand frames from the producer thread to the display thread.
/// Per-slot state lives in atomics so either side can inspect it without a lock.
///
/// ### 中文
/// 用于把帧从生产者线程交给显示线程的共享表面环。
/// 每个槽位的状态保存在原子变量中，双方无需加锁即可读取。
mod shared_state;
mod slot;

pub use shared_state::SharedSurfaceSet;

/// ### English
/// Default ring length: one slot being written while the other is displayed.
///
/// ### 中文
/// 默认环长度：一个槽位写入的同时另一个槽位被显示。
pub const DEFAULT_SLOT_COUNT: usize = 2;

/// ### English
/// Logical channel a captured slot belongs to.
///
/// ### 中文
/// 已捕获槽位所属的逻辑通道。
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    /// ### English
    /// Never labelled by the producer.
    ///
    /// ### 中文
    /// 尚未被生产者标记。
    #[default]
    Unset = 0,
    /// ### English
    /// Single 2D image (displayed to the back buffer).
    ///
    /// ### 中文
    /// 单幅 2D 图像（显示到后缓冲）。
    Mono = 1,
    /// ### English
    /// Left eye of a stereo pair.
    ///
    /// ### 中文
    /// 立体对中的左眼。
    Left = 2,
    /// ### English
    /// Right eye of a stereo pair.
    ///
    /// ### 中文
    /// 立体对中的右眼。
    Right = 3,
}

impl Channel {
    #[inline]
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Mono,
            2 => Self::Left,
            3 => Self::Right,
            _ => Self::Unset,
        }
    }
}

/// ### English
/// Producer-side surface handles for one ring slot.
///
/// Both values are opaque to the engine: `surface` is handed back to the producer device when
/// binding, and `share_handle` is what the interop layer registers on the display side.
///
/// ### 中文
/// 单个环槽位在生产者侧的表面句柄。
///
/// 两个值对引擎都是不透明的：`surface` 在绑定时交还给生产者设备，
/// `share_handle` 则由显示侧的 interop 层注册。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharedSurface {
    pub surface: usize,
    pub share_handle: usize,
}

/// ### English
/// Lifecycle of one enhanced-rendering session.
///
/// ### 中文
/// 单次增强渲染会话的生命周期。
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// ### English
    /// No resources created yet.
    ///
    /// ### 中文
    /// 尚未创建任何资源。
    Idle = 0,
    /// ### English
    /// Producer surfaces exist; the display thread is initializing.
    ///
    /// ### 中文
    /// 生产者表面已创建；显示线程正在初始化。
    Starting = 1,
    /// ### English
    /// Display thread entered its dispatch loop.
    ///
    /// ### 中文
    /// 显示线程已进入事件分发循环。
    Running = 2,
    /// ### English
    /// A fatal failure ended the session; hooks are pass-through.
    ///
    /// ### 中文
    /// 致命失败已结束会话；钩子直接透传。
    Failed = 3,
    /// ### English
    /// Torn down by the owner.
    ///
    /// ### 中文
    /// 已被持有者销毁。
    Stopped = 4,
}

impl SessionState {
    #[inline]
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Failed,
            4 => Self::Stopped,
            _ => Self::Idle,
        }
    }

    /// ### English
    /// Whether frames should still be handed off to the display thread.
    ///
    /// ### 中文
    /// 是否仍应把帧交给显示线程。
    #[inline]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// ### English
    /// Whether the session has ended (failed or stopped).
    ///
    /// ### 中文
    /// 会话是否已结束（失败或停止）。
    #[inline]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Failed | Self::Stopped)
    }
}
