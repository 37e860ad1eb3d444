//! ### English
//! Display events and input events as they cross the C ABI.
//!
//! The host's display window procedure posts `StereoBridgeDisplayEvent`s; input is forwarded to
//! the source window as `StereoBridgeInputEvent`s.
//!
//! ### 中文
//! 跨越 C ABI 的显示事件与输入事件。
//!
//! 宿主的显示窗口过程投递 `StereoBridgeDisplayEvent`；输入以 `StereoBridgeInputEvent`
//! 的形式转发给源窗口。
use dpi::PhysicalSize;

use crate::engine::display::{ButtonAction, DisplayEvent, InputEvent, MouseButton};

pub const STEREO_BRIDGE_INPUT_KIND_KEY_DOWN: u32 = 1;
pub const STEREO_BRIDGE_INPUT_KIND_KEY_UP: u32 = 2;
pub const STEREO_BRIDGE_INPUT_KIND_CHAR: u32 = 3;
pub const STEREO_BRIDGE_INPUT_KIND_MOUSE_MOVE: u32 = 4;
pub const STEREO_BRIDGE_INPUT_KIND_MOUSE_WHEEL: u32 = 5;
pub const STEREO_BRIDGE_INPUT_KIND_MOUSE_BUTTON: u32 = 6;

pub const STEREO_BRIDGE_MOUSE_BUTTON_LEFT: u32 = 0;
pub const STEREO_BRIDGE_MOUSE_BUTTON_RIGHT: u32 = 1;
pub const STEREO_BRIDGE_MOUSE_BUTTON_MIDDLE: u32 = 2;

pub const STEREO_BRIDGE_BUTTON_ACTION_DOWN: u32 = 0;
pub const STEREO_BRIDGE_BUTTON_ACTION_UP: u32 = 1;
pub const STEREO_BRIDGE_BUTTON_ACTION_DOUBLE_CLICK: u32 = 2;

pub const STEREO_BRIDGE_EVENT_NEW_FRAME: u32 = 1;
pub const STEREO_BRIDGE_EVENT_PAINT: u32 = 2;
pub const STEREO_BRIDGE_EVENT_RESIZE: u32 = 3;
pub const STEREO_BRIDGE_EVENT_INPUT: u32 = 4;
pub const STEREO_BRIDGE_EVENT_CLOSE: u32 = 5;
pub const STEREO_BRIDGE_EVENT_QUIT: u32 = 6;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// ### English
/// One input event.
///
/// - `kind`: `STEREO_BRIDGE_INPUT_KIND_*`.
/// - `code`: Virtual key for key events, UTF-32 code point for `CHAR`.
/// - `flags`: Key flags for keyboard events, modifier state for mouse events.
/// - `button`/`action`: `STEREO_BRIDGE_MOUSE_BUTTON_*` / `STEREO_BRIDGE_BUTTON_ACTION_*`.
/// - `x`/`y`: Client coordinates. `delta`: wheel delta.
///
/// ### 中文
/// 单个输入事件。
///
/// - `kind`：`STEREO_BRIDGE_INPUT_KIND_*`。
/// - `code`：键盘事件为虚拟键码，`CHAR` 为 UTF-32 码点。
/// - `flags`：键盘事件为按键标志，鼠标事件为修饰键状态。
/// - `button`/`action`：`STEREO_BRIDGE_MOUSE_BUTTON_*` / `STEREO_BRIDGE_BUTTON_ACTION_*`。
/// - `x`/`y`：客户区坐标。`delta`：滚轮增量。
pub struct StereoBridgeInputEvent {
    pub kind: u32,
    pub code: u32,
    pub flags: u32,
    pub button: u32,
    pub action: u32,
    pub x: i32,
    pub y: i32,
    pub delta: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// ### English
/// One display-window event. `width`/`height` are used by `RESIZE`, `input` by `INPUT`.
///
/// ### 中文
/// 单个显示窗口事件。`RESIZE` 使用 `width`/`height`，`INPUT` 使用 `input`。
pub struct StereoBridgeDisplayEvent {
    pub kind: u32,
    pub width: u32,
    pub height: u32,
    pub input: StereoBridgeInputEvent,
}

fn mouse_button(value: u32) -> Option<MouseButton> {
    match value {
        STEREO_BRIDGE_MOUSE_BUTTON_LEFT => Some(MouseButton::Left),
        STEREO_BRIDGE_MOUSE_BUTTON_RIGHT => Some(MouseButton::Right),
        STEREO_BRIDGE_MOUSE_BUTTON_MIDDLE => Some(MouseButton::Middle),
        _ => None,
    }
}

fn button_action(value: u32) -> Option<ButtonAction> {
    match value {
        STEREO_BRIDGE_BUTTON_ACTION_DOWN => Some(ButtonAction::Down),
        STEREO_BRIDGE_BUTTON_ACTION_UP => Some(ButtonAction::Up),
        STEREO_BRIDGE_BUTTON_ACTION_DOUBLE_CLICK => Some(ButtonAction::DoubleClick),
        _ => None,
    }
}

impl StereoBridgeInputEvent {
    /// ### English
    /// Decodes the event. Unknown kinds, buttons or actions yield `None`.
    ///
    /// ### 中文
    /// 解码事件；未知的类型、按键或动作返回 `None`。
    pub fn to_input(self) -> Option<InputEvent> {
        let event = match self.kind {
            STEREO_BRIDGE_INPUT_KIND_KEY_DOWN => InputEvent::KeyDown {
                key: self.code,
                flags: self.flags,
            },
            STEREO_BRIDGE_INPUT_KIND_KEY_UP => InputEvent::KeyUp {
                key: self.code,
                flags: self.flags,
            },
            STEREO_BRIDGE_INPUT_KIND_CHAR => InputEvent::Char {
                codepoint: self.code,
                flags: self.flags,
            },
            STEREO_BRIDGE_INPUT_KIND_MOUSE_MOVE => InputEvent::MouseMove {
                x: self.x,
                y: self.y,
                modifiers: self.flags,
            },
            STEREO_BRIDGE_INPUT_KIND_MOUSE_WHEEL => InputEvent::MouseWheel {
                delta: self.delta,
                x: self.x,
                y: self.y,
                modifiers: self.flags,
            },
            STEREO_BRIDGE_INPUT_KIND_MOUSE_BUTTON => InputEvent::MouseButton {
                button: mouse_button(self.button)?,
                action: button_action(self.action)?,
                x: self.x,
                y: self.y,
                modifiers: self.flags,
            },
            _ => return None,
        };
        Some(event)
    }
}

impl From<InputEvent> for StereoBridgeInputEvent {
    fn from(value: InputEvent) -> Self {
        match value {
            InputEvent::KeyDown { key, flags } => Self {
                kind: STEREO_BRIDGE_INPUT_KIND_KEY_DOWN,
                code: key,
                flags,
                ..Self::default()
            },
            InputEvent::KeyUp { key, flags } => Self {
                kind: STEREO_BRIDGE_INPUT_KIND_KEY_UP,
                code: key,
                flags,
                ..Self::default()
            },
            InputEvent::Char { codepoint, flags } => Self {
                kind: STEREO_BRIDGE_INPUT_KIND_CHAR,
                code: codepoint,
                flags,
                ..Self::default()
            },
            InputEvent::MouseMove { x, y, modifiers } => Self {
                kind: STEREO_BRIDGE_INPUT_KIND_MOUSE_MOVE,
                flags: modifiers,
                x,
                y,
                ..Self::default()
            },
            InputEvent::MouseWheel {
                delta,
                x,
                y,
                modifiers,
            } => Self {
                kind: STEREO_BRIDGE_INPUT_KIND_MOUSE_WHEEL,
                flags: modifiers,
                x,
                y,
                delta,
                ..Self::default()
            },
            InputEvent::MouseButton {
                button,
                action,
                x,
                y,
                modifiers,
            } => Self {
                kind: STEREO_BRIDGE_INPUT_KIND_MOUSE_BUTTON,
                flags: modifiers,
                button: match button {
                    MouseButton::Left => STEREO_BRIDGE_MOUSE_BUTTON_LEFT,
                    MouseButton::Right => STEREO_BRIDGE_MOUSE_BUTTON_RIGHT,
                    MouseButton::Middle => STEREO_BRIDGE_MOUSE_BUTTON_MIDDLE,
                },
                action: match action {
                    ButtonAction::Down => STEREO_BRIDGE_BUTTON_ACTION_DOWN,
                    ButtonAction::Up => STEREO_BRIDGE_BUTTON_ACTION_UP,
                    ButtonAction::DoubleClick => STEREO_BRIDGE_BUTTON_ACTION_DOUBLE_CLICK,
                },
                x,
                y,
                ..Self::default()
            },
        }
    }
}

impl StereoBridgeDisplayEvent {
    /// ### English
    /// Decodes the event. Unknown kinds and undecodable input yield `None`.
    ///
    /// ### 中文
    /// 解码事件；未知类型或无法解码的输入返回 `None`。
    pub fn to_display_event(self) -> Option<DisplayEvent> {
        match self.kind {
            STEREO_BRIDGE_EVENT_NEW_FRAME => Some(DisplayEvent::NewFrame),
            STEREO_BRIDGE_EVENT_PAINT => Some(DisplayEvent::Paint),
            STEREO_BRIDGE_EVENT_RESIZE => Some(DisplayEvent::Resize(PhysicalSize::new(
                self.width,
                self.height,
            ))),
            STEREO_BRIDGE_EVENT_INPUT => self.input.to_input().map(DisplayEvent::Input),
            STEREO_BRIDGE_EVENT_CLOSE => Some(DisplayEvent::Close),
            STEREO_BRIDGE_EVENT_QUIT => Some(DisplayEvent::Quit),
            _ => None,
        }
    }
}
