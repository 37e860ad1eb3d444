//! ### English
//! Events delivered to the display thread and the dispatch contract that handles them.
//!
//! ### 中文
//! 投递到显示线程的事件，以及处理这些事件的分发约定。

use crossbeam_channel as channel;
use dpi::PhysicalSize;
use tracing::trace;

/// ### English
/// Mouse button named by an input event.
///
/// ### 中文
/// 输入事件涉及的鼠标按键。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// ### English
/// What happened to a mouse button.
///
/// ### 中文
/// 鼠标按键发生的动作。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Down,
    Up,
    DoubleClick,
}

/// ### English
/// User input received by the display surface. The display surface covers the source window,
/// so every input event is forwarded there unchanged.
///
/// `x`/`y` are client coordinates; `modifiers` and key codes are the platform's own values.
///
/// ### 中文
/// 显示表面收到的用户输入。显示表面覆盖在源窗口之上，因此每个输入事件都原样转发给源窗口。
///
/// `x`/`y` 为客户区坐标；`modifiers` 与按键码为平台自身的取值。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: u32, flags: u32 },
    KeyUp { key: u32, flags: u32 },
    Char { codepoint: u32, flags: u32 },
    MouseMove { x: i32, y: i32, modifiers: u32 },
    MouseWheel { delta: i32, x: i32, y: i32, modifiers: u32 },
    MouseButton {
        button: MouseButton,
        action: ButtonAction,
        x: i32,
        y: i32,
        modifiers: u32,
    },
}

/// ### English
/// Messages processed by the display thread's dispatch loop.
///
/// ### 中文
/// 由显示线程分发循环处理的消息。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    /// ### English
    /// The producer handed off a frame.
    ///
    /// ### 中文
    /// 生产者交出了一帧。
    NewFrame,
    /// ### English
    /// The window system asks for the surface to be painted.
    ///
    /// ### 中文
    /// 窗口系统请求绘制表面。
    Paint,
    Resize(PhysicalSize<u32>),
    Input(InputEvent),
    /// ### English
    /// The user asked to close the display surface; forwarded to the source window.
    ///
    /// ### 中文
    /// 用户请求关闭显示表面；转发给源窗口。
    Close,
    /// ### English
    /// Leave the dispatch loop and tear down.
    ///
    /// ### 中文
    /// 退出分发循环并执行销毁。
    Quit,
}

/// ### English
/// Whether the dispatch loop keeps running after an event.
///
/// ### 中文
/// 处理完某个事件后分发循环是否继续运行。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// ### English
/// Per-window event handling on the display thread.
///
/// ### 中文
/// 显示线程上按窗口进行的事件处理。
pub trait EventHandler {
    fn handle(&mut self, event: DisplayEvent) -> Flow;
}

/// ### English
/// Sending half of the display thread's event channel. Cheap to clone; never blocks.
///
/// ### 中文
/// 显示线程事件通道的发送端；clone 开销低且从不阻塞。
#[derive(Clone, Debug)]
pub struct EventSink {
    tx: channel::Sender<DisplayEvent>,
}

impl EventSink {
    /// ### English
    /// Creates a sink and the receiver the display thread drains.
    ///
    /// ### 中文
    /// 创建发送端以及由显示线程 drain 的接收端。
    pub fn channel() -> (Self, channel::Receiver<DisplayEvent>) {
        let (tx, rx) = channel::unbounded();
        (Self { tx }, rx)
    }

    /// ### English
    /// Queues `event`. Returns `false` if the display thread is gone.
    ///
    /// ### 中文
    /// 将 `event` 入队；显示线程已退出时返回 `false`。
    pub fn post(&self, event: DisplayEvent) -> bool {
        let delivered = self.tx.try_send(event).is_ok();
        if !delivered {
            trace!(?event, "display thread gone, event dropped");
        }
        delivered
    }
}
