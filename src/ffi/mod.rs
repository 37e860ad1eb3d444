//! ### English
//! C ABI surface for `stereo_bridge`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! The host passes two function tables (producer and display) whose entries are plain
//! addresses; every entry must be non-zero. Strings must be NUL-terminated UTF-8.
//!
//! ### 中文
//! `stereo_bridge` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 宿主传入两张函数表（生产者与显示），表项为普通地址，且每一项都必须非 0。
//! 字符串必须是以 NUL 结尾的 UTF-8。
mod abi;
mod bridge;
mod display;
mod input;
mod producer;

use std::ffi::{CStr, c_char, c_void};
use std::path::PathBuf;

use dpi::PhysicalSize;

use crate::engine::error::{BridgeError, Result};
use crate::engine::producer::{PixelFormat, SurfaceDesc};
use crate::engine::stats::StatsSnapshot;
use crate::engine::stereo::Viewport;
use crate::engine::StereoBridge;

pub use display::{StereoBridgeDisplayApi, StereoBridgeEventSink, StereoBridgeSurfaceRequest};
pub use input::{StereoBridgeDisplayEvent, StereoBridgeInputEvent};
pub use producer::StereoBridgeProducerApi;

#[repr(C)]
/// ### English
/// Opaque bridge handle. Owned by the host's producer thread; every hook must be called there.
///
/// ### 中文
/// 不透明桥接句柄，归宿主的生产者线程所有；所有钩子都必须在该线程调用。
pub struct StereoBridgeHandle {
    bridge: StereoBridge<producer::FfiProducer, display::FfiDisplayBackend>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// ### English
/// Producer viewport as passed through the C ABI.
///
/// ### 中文
/// 经由 C ABI 传递的生产者视口。
pub struct StereoBridgeViewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub min_z: f32,
    pub max_z: f32,
}

impl From<StereoBridgeViewport> for Viewport {
    fn from(value: StereoBridgeViewport) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
            min_z: value.min_z,
            max_z: value.max_z,
        }
    }
}

impl From<Viewport> for StereoBridgeViewport {
    fn from(value: Viewport) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
            min_z: value.min_z,
            max_z: value.max_z,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// ### English
/// Size, format and multisample count of a producer surface.
///
/// ### 中文
/// 生产者表面的尺寸、格式与多重采样数。
pub struct StereoBridgeSurfaceDesc {
    pub width: u32,
    pub height: u32,
    /// ### English
    /// The producer device's own format code.
    ///
    /// ### 中文
    /// 生产者设备自身的格式代码。
    pub format: u32,
    pub samples: u32,
}

impl From<StereoBridgeSurfaceDesc> for SurfaceDesc {
    fn from(value: StereoBridgeSurfaceDesc) -> Self {
        Self {
            size: PhysicalSize::new(value.width, value.height),
            format: PixelFormat(value.format),
            samples: value.samples,
        }
    }
}

impl From<SurfaceDesc> for StereoBridgeSurfaceDesc {
    fn from(value: SurfaceDesc) -> Self {
        Self {
            width: value.size.width,
            height: value.size.height,
            format: value.format.0,
            samples: value.samples,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// ### English
/// A shareable producer render target and the handle the interop layer registers.
///
/// ### 中文
/// 可共享的生产者渲染目标，以及 interop 层注册所用的句柄。
pub struct StereoBridgeSharedSurface {
    pub surface: *mut c_void,
    pub share_handle: *mut c_void,
}

impl Default for StereoBridgeSharedSurface {
    fn default() -> Self {
        Self {
            surface: std::ptr::null_mut(),
            share_handle: std::ptr::null_mut(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// ### English
/// Diagnostic counters copied out by `stereo_bridge_stats`.
///
/// ### 中文
/// 由 `stereo_bridge_stats` 拷贝出的诊断计数。
pub struct StereoBridgeStats {
    pub frames_dx: u64,
    pub frames_gl: u64,
    pub wait_timeouts: u64,
    pub lock_failures: u64,
    pub presented_targets: u64,
    pub elapsed_secs: f64,
}

impl From<StatsSnapshot> for StereoBridgeStats {
    fn from(value: StatsSnapshot) -> Self {
        Self {
            frames_dx: value.frames_dx,
            frames_gl: value.frames_gl,
            wait_timeouts: value.wait_timeouts,
            lock_failures: value.lock_failures,
            presented_targets: value.presented_targets,
            elapsed_secs: value.elapsed_secs,
        }
    }
}

/// ### English
/// C ABI version for `stereo_bridge`.
///
/// ### 中文
/// `stereo_bridge` 的 C ABI 版本号。
const STEREO_BRIDGE_ABI_VERSION: u32 = 1;

/// ### English
/// Fails with the name of the first zero entry in a host function table.
///
/// ### 中文
/// 若宿主函数表中存在为 0 的表项，则以第一个此类表项的名称报错。
fn require_entries(entries: &[(&'static str, usize)]) -> Result<()> {
    match entries.iter().find(|(_, address)| *address == 0) {
        Some((name, _)) => Err(BridgeError::MissingEntryPoint(name)),
        None => Ok(()),
    }
}

/// ### English
/// Converts an optional NUL-terminated UTF-8 C string into a `PathBuf`.
///
/// Returns `None` for NULL pointers, invalid UTF-8, or empty strings.
///
/// # Safety
/// `ptr` must be valid and point to a NUL-terminated string for the duration of the call.
///
/// ### 中文
/// 将可选的 NUL 结尾 UTF-8 C 字符串转换为 `PathBuf`。
///
/// 对 NULL 指针、UTF-8 非法或空字符串返回 `None`。
///
/// # Safety
/// `ptr` 在本次调用期间必须有效，并指向以 NUL 结尾的字符串。
unsafe fn cstr_to_path(ptr: *const c_char) -> Option<PathBuf> {
    if ptr.is_null() {
        return None;
    }

    let value = unsafe { CStr::from_ptr(ptr) }.to_str().ok()?;
    if value.is_empty() {
        return None;
    }

    Some(PathBuf::from(value))
}
