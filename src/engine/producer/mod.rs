//! ### English
//! Producer-side collaborator: the device whose frames are captured into the ring.
//!
//! The interception layer owns the real device; the engine only talks to it through
//! `ProducerDevice`.
//!
//! ### 中文
//! 生产者侧协作者：其帧被捕获到环中的设备。
//!
//! 真实设备由拦截层持有；引擎只通过 `ProducerDevice` 与其交互。
use std::sync::Arc;

use dpi::PhysicalSize;

use super::display::SourceWindow;
use super::error::Result;
use super::frame::SharedSurface;
use super::stereo::Viewport;

mod presented;

pub use presented::PresentedTargets;

/// ### English
/// Opaque identity of a producer output target, compared by equality only.
///
/// ### 中文
/// 生产者输出目标的不透明标识，仅按相等比较。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub u64);

/// ### English
/// Producer pixel format code (the device's own enumeration value).
///
/// ### 中文
/// 生产者像素格式代码（设备自身的枚举值）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelFormat(pub u32);

impl PixelFormat {
    /// ### English
    /// 32-bit RGB with unused alpha; fallback when the adapter format is unknown.
    ///
    /// ### 中文
    /// 32 位 RGB（alpha 未使用）；适配器格式未知时的兜底值。
    pub const X8R8G8B8: Self = Self(22);
}

/// ### English
/// Size, format and multisample count of a producer surface.
///
/// ### 中文
/// 生产者表面的尺寸、格式与多重采样数。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub size: PhysicalSize<u32>,
    pub format: PixelFormat,
    /// ### English
    /// Multisample count (`0` or `1` = none).
    ///
    /// ### 中文
    /// 多重采样数（`0` 或 `1` = 无）。
    pub samples: u32,
}

/// ### English
/// Operations the engine needs from the producer device.
///
/// All calls happen on the producer thread, inside the intercepted call sequence.
///
/// ### 中文
/// 引擎需要从生产者设备获得的操作。
///
/// 所有调用都发生在生产者线程、被拦截的调用序列之内。
pub trait ProducerDevice {
    /// ### English
    /// Identity of the currently bound output target.
    ///
    /// ### 中文
    /// 当前绑定输出目标的标识。
    fn current_render_target(&self) -> Option<TargetId>;

    /// ### English
    /// Description of the currently bound output target.
    ///
    /// ### 中文
    /// 当前绑定输出目标的描述。
    fn render_target_desc(&self) -> Option<SurfaceDesc>;

    fn viewport(&self) -> Option<Viewport>;

    fn set_viewport(&self, viewport: &Viewport);

    /// ### English
    /// Display format of the adapter the device runs on.
    ///
    /// ### 中文
    /// 设备所在适配器的显示格式。
    fn display_format(&self) -> Option<PixelFormat>;

    /// ### English
    /// Depth/stencil format, for diagnostics only.
    ///
    /// ### 中文
    /// 深度/模板格式，仅用于诊断。
    fn depth_stencil_format(&self) -> Option<PixelFormat>;

    /// ### English
    /// Creates a shareable render target and returns it with its share handle.
    ///
    /// ### 中文
    /// 创建可共享的渲染目标，并连同共享句柄一起返回。
    fn create_render_target(&self, desc: &SurfaceDesc) -> Result<SharedSurface>;

    fn set_render_target(&self, surface: &SharedSurface) -> Result<()>;

    fn release_render_target(&self, surface: SharedSurface);

    /// ### English
    /// Rebinds the host's own output target (used when the session stops capturing).
    ///
    /// ### 中文
    /// 重新绑定宿主自己的输出目标（会话停止捕获时使用）。
    fn restore_output_target(&self);

    /// ### English
    /// The window the host renders into.
    ///
    /// ### 中文
    /// 宿主渲染所用的窗口。
    fn focus_window(&self) -> Option<Arc<dyn SourceWindow>>;
}
