//! ### English
//! Display-side presentation: copies handed-off ring slots to the visible output.
//!
//! ### 中文
//! 显示侧呈现：把已交出的环槽位复制到可见输出。
use dpi::PhysicalSize;

use super::error::Result;
use super::frame::Channel;
use super::interop::{InteropObject, ObjectKind};

mod glow_backend;
mod presenter;

pub use glow_backend::GlowConsumer;
pub use presenter::{PaintReport, Presenter, SlotOutcome};

/// ### English
/// Edge of the square stereo indicator (pixels).
///
/// ### 中文
/// 立体指示块的边长（像素）。
pub const STEREO_INDICATOR_SIZE: u32 = 32;

/// ### English
/// GL draw buffer a channel is displayed into.
///
/// ### 中文
/// 某个通道显示到的 GL 绘制缓冲。
pub const fn draw_buffer_for(channel: Channel) -> u32 {
    match channel {
        Channel::Left => glow::BACK_LEFT,
        Channel::Right => glow::BACK_RIGHT,
        Channel::Mono | Channel::Unset => glow::BACK,
    }
}

/// ### English
/// How a slot's pixels reach the output.
///
/// ### 中文
/// 槽位像素到达输出的方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyMode {
    /// ### English
    /// Framebuffer blit, vertically flipped; keeps resolution and samples.
    ///
    /// ### 中文
    /// 帧缓冲 blit（垂直翻转）；保持分辨率与采样。
    Blit,
    /// ### English
    /// Full-screen quad sampling the slot as a texture.
    ///
    /// ### 中文
    /// 以纹理方式采样槽位的全屏四边形。
    TexturedQuad,
}

impl CopyMode {
    /// ### English
    /// Blit unless textures are in use and multisample matching is on.
    ///
    /// ### 中文
    /// 除非使用纹理且开启多重采样匹配，否则使用 blit。
    pub const fn select(use_texture: bool, match_original_msaa: bool) -> Self {
        if !use_texture || !match_original_msaa {
            Self::Blit
        } else {
            Self::TexturedQuad
        }
    }
}

/// ### English
/// Renderer strings logged when the display context is created.
///
/// ### 中文
/// 创建显示上下文时记录的渲染器信息。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlInfo {
    pub version: String,
    pub vendor: String,
    pub renderer: String,
    pub max_texture_size: i32,
}

/// ### English
/// Display-side GL objects for one ring slot. Owned by the display thread.
///
/// ### 中文
/// 单个环槽位在显示侧的 GL 对象；由显示线程持有。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsumerSlot {
    /// ### English
    /// Texture or renderbuffer name bound to the shared memory.
    ///
    /// ### 中文
    /// 绑定到共享内存的纹理或 renderbuffer 名称。
    pub object: u32,
    pub kind: ObjectKind,
    /// ### English
    /// GL target `object` was registered with.
    ///
    /// ### 中文
    /// 注册 `object` 时使用的 GL 目标。
    pub target: u32,
    /// ### English
    /// Framebuffer with `object` as colour attachment 0 (0 = none).
    ///
    /// ### 中文
    /// 以 `object` 为颜色附件 0 的帧缓冲（0 = 无）。
    pub framebuffer: u32,
    pub interop: Option<InteropObject>,
}

/// ### English
/// GL operations the presenter and the resource lifecycle need.
///
/// Object names are raw GL names so the trait stays independent of a binding crate.
/// Every call requires the display context to be current on the calling thread.
///
/// ### 中文
/// 呈现器与资源生命周期所需的 GL 操作。
///
/// 对象名称为原始 GL 名称，使该 trait 不依赖具体绑定库。
/// 每次调用都要求显示上下文在调用线程上为当前上下文。
pub trait ConsumerGl {
    fn info(&self) -> GlInfo;

    fn create_color_object(&self, kind: ObjectKind) -> Result<u32>;

    fn delete_color_object(&self, kind: ObjectKind, object: u32);

    fn create_framebuffer(&self) -> Result<u32>;

    fn delete_framebuffer(&self, framebuffer: u32);

    /// ### English
    /// Attaches `slot.object` as colour attachment 0 of `slot.framebuffer` and returns the
    /// framebuffer status.
    ///
    /// ### 中文
    /// 将 `slot.object` 附加为 `slot.framebuffer` 的颜色附件 0，并返回帧缓冲状态。
    fn attach_color(&self, slot: &ConsumerSlot) -> u32;

    fn set_viewport(&self, size: PhysicalSize<u32>);

    fn bind_default_framebuffer(&self);

    fn select_draw_buffer(&self, buffer: u32);

    /// ### English
    /// Blits `framebuffer` to the bound draw buffer, flipping it vertically.
    ///
    /// ### 中文
    /// 将 `framebuffer` blit 到当前绑定的绘制缓冲，并垂直翻转。
    fn blit_flipped(&self, framebuffer: u32, size: PhysicalSize<u32>);

    /// ### English
    /// Draws a full-screen quad sampling `texture` (flipped vertically).
    ///
    /// ### 中文
    /// 绘制采样 `texture` 的全屏四边形（垂直翻转）。
    fn draw_textured_quad(&self, texture: u32) -> Result<()>;

    /// ### English
    /// Fills a `size`-pixel square in the bottom-left corner of `buffer`.
    ///
    /// ### 中文
    /// 在 `buffer` 左下角填充边长为 `size` 像素的正方形。
    fn fill_corner(&self, buffer: u32, size: u32, rgb: [f32; 3]);
}
