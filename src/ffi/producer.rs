//! ### English
//! Host-provided producer device and source window, reached through a function table.
//!
//! ### 中文
//! 宿主提供的生产者设备与源窗口，通过函数表访问。

use std::ffi::c_void;
use std::sync::Arc;

use dpi::PhysicalSize;

use super::{
    StereoBridgeInputEvent, StereoBridgeSharedSurface, StereoBridgeSurfaceDesc,
    StereoBridgeViewport, require_entries,
};
use crate::engine::display::{InputEvent, SourceWindow};
use crate::engine::error::{BridgeError, Result};
use crate::engine::frame::SharedSurface;
use crate::engine::producer::{PixelFormat, ProducerDevice, SurfaceDesc, TargetId};
use crate::engine::stereo::Viewport;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
/// ### English
/// Producer function table. Every entry is the address of an `extern "C"` function whose first
/// argument is `user_data`; none may be zero.
///
/// The `window_*` entries are called from the display thread; all others from the producer
/// thread inside the hooks.
///
/// | Entry | Signature |
/// |---|---|
/// | `native_device` | `fn(user) -> *mut c_void` (the producer's device pointer) |
/// | `current_render_target` | `fn(user) -> u64` (`0` = none) |
/// | `render_target_desc` | `fn(user, *mut StereoBridgeSurfaceDesc) -> bool` |
/// | `get_viewport` | `fn(user, *mut StereoBridgeViewport) -> bool` |
/// | `set_viewport` | `fn(user, *const StereoBridgeViewport)` |
/// | `display_format` | `fn(user) -> u32` (`0` = unknown) |
/// | `depth_stencil_format` | `fn(user) -> u32` (`0` = none) |
/// | `create_render_target` | `fn(user, *const StereoBridgeSurfaceDesc, *mut StereoBridgeSharedSurface) -> bool` |
/// | `set_render_target` | `fn(user, *const StereoBridgeSharedSurface) -> bool` |
/// | `release_render_target` | `fn(user, *const StereoBridgeSharedSurface)` |
/// | `restore_output_target` | `fn(user)` |
/// | `focus_window` | `fn(user) -> *mut c_void` (`null` = none) |
/// | `window_client_size` | `fn(user, *mut u32, *mut u32)` |
/// | `window_suppress_background_erase` | `fn(user)` |
/// | `window_forward_input` | `fn(user, *const StereoBridgeInputEvent)` |
/// | `window_request_close` | `fn(user)` |
/// | `window_post_quit` | `fn(user)` |
///
/// ### 中文
/// 生产者函数表。每一项都是 `extern "C"` 函数的地址，其第一个参数为 `user_data`；不得为 0。
///
/// `window_*` 表项在显示线程调用；其余表项在钩子内、生产者线程上调用。
/// 各表项签名见上表。
pub struct StereoBridgeProducerApi {
    pub user_data: *mut c_void,
    pub native_device: usize,
    pub current_render_target: usize,
    pub render_target_desc: usize,
    pub get_viewport: usize,
    pub set_viewport: usize,
    pub display_format: usize,
    pub depth_stencil_format: usize,
    pub create_render_target: usize,
    pub set_render_target: usize,
    pub release_render_target: usize,
    pub restore_output_target: usize,
    pub focus_window: usize,
    pub window_client_size: usize,
    pub window_suppress_background_erase: usize,
    pub window_forward_input: usize,
    pub window_request_close: usize,
    pub window_post_quit: usize,
}

type NativeDevice = unsafe extern "C" fn(*mut c_void) -> *mut c_void;
type CurrentRenderTarget = unsafe extern "C" fn(*mut c_void) -> u64;
type RenderTargetDesc = unsafe extern "C" fn(*mut c_void, *mut StereoBridgeSurfaceDesc) -> bool;
type GetViewport = unsafe extern "C" fn(*mut c_void, *mut StereoBridgeViewport) -> bool;
type SetViewport = unsafe extern "C" fn(*mut c_void, *const StereoBridgeViewport);
type FormatQuery = unsafe extern "C" fn(*mut c_void) -> u32;
type CreateRenderTarget = unsafe extern "C" fn(
    *mut c_void,
    *const StereoBridgeSurfaceDesc,
    *mut StereoBridgeSharedSurface,
) -> bool;
type SetRenderTarget = unsafe extern "C" fn(*mut c_void, *const StereoBridgeSharedSurface) -> bool;
type ReleaseRenderTarget = unsafe extern "C" fn(*mut c_void, *const StereoBridgeSharedSurface);
type Notify = unsafe extern "C" fn(*mut c_void);
type FocusWindow = unsafe extern "C" fn(*mut c_void) -> *mut c_void;
type ClientSize = unsafe extern "C" fn(*mut c_void, *mut u32, *mut u32);
type ForwardInput = unsafe extern "C" fn(*mut c_void, *const StereoBridgeInputEvent);

/// ### English
/// `StereoBridgeProducerApi` with typed function pointers.
///
/// ### 中文
/// 带类型函数指针的 `StereoBridgeProducerApi`。
pub(super) struct FfiProducer {
    user_data: *mut c_void,
    native_device: NativeDevice,
    current_render_target: CurrentRenderTarget,
    render_target_desc: RenderTargetDesc,
    get_viewport: GetViewport,
    set_viewport: SetViewport,
    display_format: FormatQuery,
    depth_stencil_format: FormatQuery,
    create_render_target: CreateRenderTarget,
    set_render_target: SetRenderTarget,
    release_render_target: ReleaseRenderTarget,
    restore_output_target: Notify,
    focus_window: FocusWindow,
    window: SourceTable,
}

/// ### English
/// The `window_*` part of the table, shared with the display thread.
///
/// ### 中文
/// 函数表中的 `window_*` 部分，与显示线程共享。
#[derive(Clone, Copy)]
struct SourceTable {
    /// ### English
    /// `user_data` as an address so the table can cross threads.
    ///
    /// ### 中文
    /// 以地址形式保存的 `user_data`，使函数表可以跨线程。
    user_data: usize,
    client_size: ClientSize,
    suppress_background_erase: Notify,
    forward_input: ForwardInput,
    request_close: Notify,
    post_quit: Notify,
}

impl FfiProducer {
    /// ### English
    /// Validates `api` and converts its entries into typed function pointers.
    ///
    /// ### 中文
    /// 校验 `api` 并将其表项转换为带类型的函数指针。
    pub(super) fn new(api: StereoBridgeProducerApi) -> Result<Self> {
        require_entries(&[
            ("native_device", api.native_device),
            ("current_render_target", api.current_render_target),
            ("render_target_desc", api.render_target_desc),
            ("get_viewport", api.get_viewport),
            ("set_viewport", api.set_viewport),
            ("display_format", api.display_format),
            ("depth_stencil_format", api.depth_stencil_format),
            ("create_render_target", api.create_render_target),
            ("set_render_target", api.set_render_target),
            ("release_render_target", api.release_render_target),
            ("restore_output_target", api.restore_output_target),
            ("focus_window", api.focus_window),
            ("window_client_size", api.window_client_size),
            (
                "window_suppress_background_erase",
                api.window_suppress_background_erase,
            ),
            ("window_forward_input", api.window_forward_input),
            ("window_request_close", api.window_request_close),
            ("window_post_quit", api.window_post_quit),
        ])?;

        Ok(Self {
            user_data: api.user_data,
            native_device: unsafe { std::mem::transmute::<usize, NativeDevice>(api.native_device) },
            current_render_target: unsafe {
                std::mem::transmute::<usize, CurrentRenderTarget>(api.current_render_target)
            },
            render_target_desc: unsafe {
                std::mem::transmute::<usize, RenderTargetDesc>(api.render_target_desc)
            },
            get_viewport: unsafe { std::mem::transmute::<usize, GetViewport>(api.get_viewport) },
            set_viewport: unsafe { std::mem::transmute::<usize, SetViewport>(api.set_viewport) },
            display_format: unsafe {
                std::mem::transmute::<usize, FormatQuery>(api.display_format)
            },
            depth_stencil_format: unsafe {
                std::mem::transmute::<usize, FormatQuery>(api.depth_stencil_format)
            },
            create_render_target: unsafe {
                std::mem::transmute::<usize, CreateRenderTarget>(api.create_render_target)
            },
            set_render_target: unsafe {
                std::mem::transmute::<usize, SetRenderTarget>(api.set_render_target)
            },
            release_render_target: unsafe {
                std::mem::transmute::<usize, ReleaseRenderTarget>(api.release_render_target)
            },
            restore_output_target: unsafe {
                std::mem::transmute::<usize, Notify>(api.restore_output_target)
            },
            focus_window: unsafe { std::mem::transmute::<usize, FocusWindow>(api.focus_window) },
            window: SourceTable {
                user_data: api.user_data as usize,
                client_size: unsafe {
                    std::mem::transmute::<usize, ClientSize>(api.window_client_size)
                },
                suppress_background_erase: unsafe {
                    std::mem::transmute::<usize, Notify>(api.window_suppress_background_erase)
                },
                forward_input: unsafe {
                    std::mem::transmute::<usize, ForwardInput>(api.window_forward_input)
                },
                request_close: unsafe {
                    std::mem::transmute::<usize, Notify>(api.window_request_close)
                },
                post_quit: unsafe { std::mem::transmute::<usize, Notify>(api.window_post_quit) },
            },
        })
    }

    /// ### English
    /// The producer's native device pointer, needed to open the interop device.
    ///
    /// ### 中文
    /// 生产者的原生设备指针，打开 interop 设备时需要。
    pub(super) fn native_device(&self) -> *mut c_void {
        unsafe { (self.native_device)(self.user_data) }
    }
}

fn to_ffi_surface(surface: &SharedSurface) -> StereoBridgeSharedSurface {
    StereoBridgeSharedSurface {
        surface: surface.surface as *mut c_void,
        share_handle: surface.share_handle as *mut c_void,
    }
}

impl ProducerDevice for FfiProducer {
    fn current_render_target(&self) -> Option<TargetId> {
        let id = unsafe { (self.current_render_target)(self.user_data) };
        (id != 0).then_some(TargetId(id))
    }

    fn render_target_desc(&self) -> Option<SurfaceDesc> {
        let mut desc = StereoBridgeSurfaceDesc::default();
        unsafe { (self.render_target_desc)(self.user_data, &mut desc) }.then(|| desc.into())
    }

    fn viewport(&self) -> Option<Viewport> {
        let mut viewport = StereoBridgeViewport::default();
        unsafe { (self.get_viewport)(self.user_data, &mut viewport) }.then(|| viewport.into())
    }

    fn set_viewport(&self, viewport: &Viewport) {
        let viewport = StereoBridgeViewport::from(*viewport);
        unsafe { (self.set_viewport)(self.user_data, &viewport) };
    }

    fn display_format(&self) -> Option<PixelFormat> {
        let format = unsafe { (self.display_format)(self.user_data) };
        (format != 0).then_some(PixelFormat(format))
    }

    fn depth_stencil_format(&self) -> Option<PixelFormat> {
        let format = unsafe { (self.depth_stencil_format)(self.user_data) };
        (format != 0).then_some(PixelFormat(format))
    }

    fn create_render_target(&self, desc: &SurfaceDesc) -> Result<SharedSurface> {
        let desc = StereoBridgeSurfaceDesc::from(*desc);
        let mut out = StereoBridgeSharedSurface::default();
        let ok = unsafe { (self.create_render_target)(self.user_data, &desc, &mut out) };
        if !ok || out.surface.is_null() {
            return Err(BridgeError::SurfaceCreate { slot: 0 });
        }
        Ok(SharedSurface {
            surface: out.surface as usize,
            share_handle: out.share_handle as usize,
        })
    }

    fn set_render_target(&self, surface: &SharedSurface) -> Result<()> {
        let surface = to_ffi_surface(surface);
        if unsafe { (self.set_render_target)(self.user_data, &surface) } {
            Ok(())
        } else {
            Err(BridgeError::RenderTarget)
        }
    }

    fn release_render_target(&self, surface: SharedSurface) {
        let surface = to_ffi_surface(&surface);
        unsafe { (self.release_render_target)(self.user_data, &surface) };
    }

    fn restore_output_target(&self) {
        unsafe { (self.restore_output_target)(self.user_data) };
    }

    fn focus_window(&self) -> Option<Arc<dyn SourceWindow>> {
        let handle = unsafe { (self.focus_window)(self.user_data) };
        if handle.is_null() {
            return None;
        }
        Some(Arc::new(FfiSourceWindow {
            handle: handle as usize,
            table: self.window,
        }))
    }
}

/// ### English
/// The host window the producer renders into. The host must accept these calls from the
/// display thread.
///
/// ### 中文
/// 生产者渲染所用的宿主窗口；宿主必须允许这些调用来自显示线程。
struct FfiSourceWindow {
    handle: usize,
    table: SourceTable,
}

impl SourceWindow for FfiSourceWindow {
    fn handle(&self) -> usize {
        self.handle
    }

    fn client_size(&self) -> PhysicalSize<u32> {
        let (mut width, mut height) = (0u32, 0u32);
        unsafe { (self.table.client_size)(self.table.user_data as *mut c_void, &mut width, &mut height) };
        PhysicalSize::new(width, height)
    }

    fn suppress_background_erase(&self) {
        unsafe { (self.table.suppress_background_erase)(self.table.user_data as *mut c_void) };
    }

    fn forward_input(&self, event: InputEvent) {
        let event = StereoBridgeInputEvent::from(event);
        unsafe { (self.table.forward_input)(self.table.user_data as *mut c_void, &event) };
    }

    fn request_close(&self) {
        unsafe { (self.table.request_close)(self.table.user_data as *mut c_void) };
    }

    fn post_quit(&self) {
        unsafe { (self.table.post_quit)(self.table.user_data as *mut c_void) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_api() -> StereoBridgeProducerApi {
        StereoBridgeProducerApi {
            user_data: std::ptr::null_mut(),
            native_device: 0,
            current_render_target: 0,
            render_target_desc: 0,
            get_viewport: 0,
            set_viewport: 0,
            display_format: 0,
            depth_stencil_format: 0,
            create_render_target: 0,
            set_render_target: 0,
            release_render_target: 0,
            restore_output_target: 0,
            focus_window: 0,
            window_client_size: 0,
            window_suppress_background_erase: 0,
            window_forward_input: 0,
            window_request_close: 0,
            window_post_quit: 0,
        }
    }

    #[test]
    fn test_missing_entry_is_rejected() {
        assert!(matches!(
            FfiProducer::new(empty_api()),
            Err(BridgeError::MissingEntryPoint("native_device"))
        ));
    }
}
