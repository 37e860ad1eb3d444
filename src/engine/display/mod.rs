//! ### English
//! Display thread: owns the consumer GL surface, the interop device and the presenter, and
//! dispatches `DisplayEvent`s to a `DisplayWindow`.
//!
//! Platform specifics (window creation, pixel formats, message pumping) sit behind
//! `DisplayBackend` and `DisplaySurface`; the host application's window is reached only through
//! `SourceWindow`.
//!
//! ### 中文
//! 显示线程：持有消费者 GL 表面、interop 设备与呈现器，并把 `DisplayEvent` 分发给 `DisplayWindow`。
//!
//! 平台细节（窗口创建、像素格式、消息泵）隐藏在 `DisplayBackend` 与 `DisplaySurface` 之后；
//! 宿主应用的窗口只能通过 `SourceWindow` 访问。
use dpi::PhysicalSize;

use super::error::Result;
use super::interop::InteropDevice;
use super::present::ConsumerGl;

mod event;
mod thread;
mod window;

pub use event::{ButtonAction, DisplayEvent, EventHandler, EventSink, Flow, InputEvent, MouseButton};
pub use thread::{DISPLAY_THREAD_NAME, DisplayThreadInit, spawn_display_thread};
pub use window::{DisplayWindow, WindowConfig};

/// ### English
/// Parameters for the child display surface.
///
/// ### 中文
/// 子显示表面的创建参数。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceRequest {
    pub size: PhysicalSize<u32>,
    /// ### English
    /// Requested multisample count (`0` = none).
    ///
    /// ### 中文
    /// 请求的多重采样数（`0` = 无）。
    pub samples: u32,
    pub stereo: bool,
    /// ### English
    /// Native handle of the source window the surface is parented to.
    ///
    /// ### 中文
    /// 表面所挂载的源窗口的原生句柄。
    pub parent: usize,
}

/// ### English
/// A visible GL surface owned by the display thread.
///
/// ### 中文
/// 由显示线程持有的可见 GL 表面。
pub trait DisplaySurface {
    /// ### English
    /// Multisample count the surface was actually created with.
    ///
    /// ### 中文
    /// 表面实际创建时的多重采样数。
    fn samples(&self) -> u32;

    fn size(&self) -> PhysicalSize<u32>;

    fn swap_buffers(&self);

    /// ### English
    /// Invalidates the surface and forces an immediate `Paint`.
    ///
    /// Returns `false` if the surface cannot repaint itself; the caller then paints directly.
    ///
    /// ### 中文
    /// 使表面失效并立即触发一次 `Paint`。
    ///
    /// 表面无法自行重绘时返回 `false`；此时由调用方直接绘制。
    fn request_redraw(&self) -> bool;

    fn show_no_activate(&self);

    fn window_handle(&self) -> usize;

    /// ### English
    /// Dispatches pending native window messages; their effects arrive as `DisplayEvent`s.
    ///
    /// ### 中文
    /// 分发待处理的原生窗口消息；其结果以 `DisplayEvent` 形式到达。
    fn pump_messages(&self);
}

/// ### English
/// Platform layer for the display side. Moved onto the display thread once resources exist.
///
/// ### 中文
/// 显示侧的平台层；资源创建后被移动到显示线程。
pub trait DisplayBackend: Send + 'static {
    type Surface: DisplaySurface;
    type Gl: ConsumerGl;
    type Interop: InteropDevice;

    /// ### English
    /// Creates a throwaway surface with the default pixel format and returns its sample count,
    /// which reveals multisampling forced by the driver. Runs on the producer thread.
    ///
    /// ### 中文
    /// 以默认像素格式创建一个临时表面并返回其采样数，用于探测驱动强制的多重采样。
    /// 在生产者线程执行。
    fn probe_forced_samples(&self) -> u32;

    fn stereo_available(&self) -> bool;

    /// ### English
    /// Creates the child display surface and makes its GL context current on the calling thread.
    /// Native window messages are turned into events posted to `events`.
    ///
    /// ### 中文
    /// 创建子显示表面，并使其 GL 上下文在调用线程上成为当前上下文。
    /// 原生窗口消息会被转换为事件投递到 `events`。
    fn create_surface(&mut self, request: &SurfaceRequest, events: EventSink)
    -> Result<Self::Surface>;

    fn load_gl(&mut self, surface: &Self::Surface) -> Result<Self::Gl>;

    /// ### English
    /// Opens the interop device between the producer device and the current GL context.
    ///
    /// ### 中文
    /// 在生产者设备与当前 GL 上下文之间打开 interop 设备。
    fn open_interop(&mut self, surface: &Self::Surface) -> Result<Self::Interop>;
}

/// ### English
/// The host application's window, as far as the display thread needs it.
///
/// ### 中文
/// 显示线程所需的宿主应用窗口能力。
pub trait SourceWindow: Send + Sync {
    fn handle(&self) -> usize;

    fn client_size(&self) -> PhysicalSize<u32>;

    /// ### English
    /// Stops the source window from erasing its background, which would flicker under the
    /// display surface.
    ///
    /// ### 中文
    /// 禁止源窗口擦除背景，否则会在显示表面下方产生闪烁。
    fn suppress_background_erase(&self);

    fn forward_input(&self, event: InputEvent);

    fn request_close(&self);

    /// ### English
    /// Asks the host pipeline to end the session.
    ///
    /// ### 中文
    /// 请求宿主管线结束会话。
    fn post_quit(&self);
}
