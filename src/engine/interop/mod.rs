//! ### English
//! Cross-API interop: one GPU surface visible to both the producer device and the display GL
//! context, handed back and forth with an exclusive lock.
//!
//! ### 中文
//! 跨 API 互操作：同一 GPU 表面同时对生产者设备和显示 GL 上下文可见，
//! 通过独占锁在两者之间来回交接。
use std::num::NonZeroUsize;

use super::error::Result;
use super::frame::SharedSurface;

mod wgl;

pub use wgl::{WglDxInterop, WglInteropApi};

/// ### English
/// Registration token for one shared surface.
///
/// ### 中文
/// 单个共享表面的注册令牌。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InteropObject(NonZeroUsize);

impl InteropObject {
    #[inline]
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0.get()
    }
}

/// ### English
/// Kind of GL object a shared surface is registered as.
///
/// ### 中文
/// 共享表面注册为的 GL 对象类型。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Texture,
    Renderbuffer,
}

impl ObjectKind {
    /// ### English
    /// GL target used to register and attach an object of this kind.
    ///
    /// Textures become `GL_TEXTURE_2D_MULTISAMPLE` when the display context is multisampled.
    ///
    /// ### 中文
    /// 注册与附加该类型对象时使用的 GL 目标。
    ///
    /// 显示上下文启用多重采样时，纹理使用 `GL_TEXTURE_2D_MULTISAMPLE`。
    pub fn gl_target(self, display_samples: u32) -> u32 {
        match self {
            Self::Texture if display_samples > 1 => glow::TEXTURE_2D_MULTISAMPLE,
            Self::Texture => glow::TEXTURE_2D,
            Self::Renderbuffer => glow::RENDERBUFFER,
        }
    }
}

/// ### English
/// Dual-owned resource capability, bound to one display GL context.
///
/// Lives on the display thread. Closing the device happens on `Drop`.
///
/// ### 中文
/// 双方共有资源的能力接口，绑定到一个显示 GL 上下文。
///
/// 位于显示线程；设备在 `Drop` 时关闭。
pub trait InteropDevice {
    /// ### English
    /// Associates the surface with its share handle (needed by some drivers before registering).
    ///
    /// ### 中文
    /// 将表面与其共享句柄关联（部分驱动在注册前需要）。
    fn set_share_handle(&self, surface: &SharedSurface) -> Result<()>;

    /// ### English
    /// Registers `surface` against the GL object `name` of type `target`, read-only.
    ///
    /// ### 中文
    /// 以只读方式将 `surface` 注册到类型为 `target` 的 GL 对象 `name`。
    fn register(&self, surface: &SharedSurface, name: u32, target: u32) -> Option<InteropObject>;

    /// ### English
    /// Takes exclusive access for the GL side. `false` means the surface must not be read.
    ///
    /// ### 中文
    /// 为 GL 侧获取独占访问；返回 `false` 表示不得读取该表面。
    fn lock(&self, object: InteropObject) -> bool;

    fn unlock(&self, object: InteropObject) -> bool;

    fn unregister(&self, object: InteropObject) -> bool;
}
