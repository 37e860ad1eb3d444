//! ### English
//! Host-provided display platform (child window, GL context, message pump), reached through a
//! function table, plus the entry point its window procedure posts events through.
//!
//! ### 中文
//! 宿主提供的显示平台（子窗口、GL 上下文、消息泵），通过函数表访问；
//! 以及其窗口过程投递事件所用的入口函数。

use std::ffi::{CString, c_char, c_void};
use std::ptr::NonNull;

use dpi::PhysicalSize;
use tracing::{debug, warn};

use super::{StereoBridgeDisplayEvent, require_entries};
use crate::engine::display::{DisplayBackend, DisplaySurface, EventSink, SurfaceRequest};
use crate::engine::error::{BridgeError, Result};
use crate::engine::interop::{WglDxInterop, WglInteropApi};
use crate::engine::present::GlowConsumer;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
/// ### English
/// Display function table. Every entry is the address of an `extern "C"` function whose first
/// argument is `user_data`; none may be zero. `probe_forced_samples` is called on the producer
/// thread, everything else on the display thread.
///
/// | Entry | Signature |
/// |---|---|
/// | `probe_forced_samples` | `fn(user) -> u32` |
/// | `stereo_available` | `fn(user) -> bool` |
/// | `create_surface` | `fn(user, *const StereoBridgeSurfaceRequest, *mut StereoBridgeEventSink) -> *mut c_void` |
/// | `destroy_surface` | `fn(user, surface)` |
/// | `surface_samples` | `fn(user, surface) -> u32` |
/// | `surface_size` | `fn(user, surface, *mut u32, *mut u32)` |
/// | `swap_buffers` | `fn(user, surface)` |
/// | `request_redraw` | `fn(user, surface) -> bool` |
/// | `show_no_activate` | `fn(user, surface)` |
/// | `window_handle` | `fn(user, surface) -> *mut c_void` |
/// | `pump_messages` | `fn(user, surface)` |
/// | `get_proc_address` | `fn(user, *const c_char) -> *const c_void` |
///
/// `create_surface` must make the new surface's GL context current on the calling thread and
/// return `null` on failure. The sink stays valid until `destroy_surface` returns.
///
/// ### 中文
/// 显示函数表。每一项都是 `extern "C"` 函数的地址，其第一个参数为 `user_data`；不得为 0。
/// `probe_forced_samples` 在生产者线程调用，其余均在显示线程调用。
///
/// `create_surface` 必须使新表面的 GL 上下文在调用线程上成为当前上下文，失败时返回 `null`。
/// 事件接收端在 `destroy_surface` 返回之前一直有效。
pub struct StereoBridgeDisplayApi {
    pub user_data: *mut c_void,
    pub probe_forced_samples: usize,
    pub stereo_available: usize,
    pub create_surface: usize,
    pub destroy_surface: usize,
    pub surface_samples: usize,
    pub surface_size: usize,
    pub swap_buffers: usize,
    pub request_redraw: usize,
    pub show_no_activate: usize,
    pub window_handle: usize,
    pub pump_messages: usize,
    pub get_proc_address: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// ### English
/// Parameters for the child display surface.
///
/// ### 中文
/// 子显示表面的创建参数。
pub struct StereoBridgeSurfaceRequest {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub stereo: bool,
    /// ### English
    /// Native handle of the source window to parent the surface to.
    ///
    /// ### 中文
    /// 表面要挂载到的源窗口原生句柄。
    pub parent: usize,
}

impl From<&SurfaceRequest> for StereoBridgeSurfaceRequest {
    fn from(value: &SurfaceRequest) -> Self {
        Self {
            width: value.size.width,
            height: value.size.height,
            samples: value.samples,
            stereo: value.stereo,
            parent: value.parent,
        }
    }
}

#[repr(C)]
/// ### English
/// Opaque event sink handed to `create_surface`; pass it to `stereo_bridge_display_post_event`.
///
/// ### 中文
/// 交给 `create_surface` 的不透明事件接收端；将其传给 `stereo_bridge_display_post_event`。
pub struct StereoBridgeEventSink {
    sink: EventSink,
}

type ProbeSamples = unsafe extern "C" fn(*mut c_void) -> u32;
type StereoAvailable = unsafe extern "C" fn(*mut c_void) -> bool;
type CreateSurface = unsafe extern "C" fn(
    *mut c_void,
    *const StereoBridgeSurfaceRequest,
    *mut StereoBridgeEventSink,
) -> *mut c_void;
type SurfaceCall = unsafe extern "C" fn(*mut c_void, *mut c_void);
type SurfaceQuery = unsafe extern "C" fn(*mut c_void, *mut c_void) -> u32;
type SurfaceSize = unsafe extern "C" fn(*mut c_void, *mut c_void, *mut u32, *mut u32);
type SurfaceFlag = unsafe extern "C" fn(*mut c_void, *mut c_void) -> bool;
type SurfaceHandle = unsafe extern "C" fn(*mut c_void, *mut c_void) -> *mut c_void;
type GetProcAddress = unsafe extern "C" fn(*mut c_void, *const c_char) -> *const c_void;

/// ### English
/// `StereoBridgeDisplayApi` with typed function pointers.
///
/// ### 中文
/// 带类型函数指针的 `StereoBridgeDisplayApi`。
#[derive(Clone, Copy)]
struct DisplayTable {
    /// ### English
    /// `user_data` as an address so the table can move to the display thread.
    ///
    /// ### 中文
    /// 以地址形式保存的 `user_data`，使函数表可以移动到显示线程。
    user_data: usize,
    probe_forced_samples: ProbeSamples,
    stereo_available: StereoAvailable,
    create_surface: CreateSurface,
    destroy_surface: SurfaceCall,
    surface_samples: SurfaceQuery,
    surface_size: SurfaceSize,
    swap_buffers: SurfaceCall,
    request_redraw: SurfaceFlag,
    show_no_activate: SurfaceCall,
    window_handle: SurfaceHandle,
    pump_messages: SurfaceCall,
    get_proc_address: GetProcAddress,
}

impl DisplayTable {
    #[inline]
    fn user(&self) -> *mut c_void {
        self.user_data as *mut c_void
    }

    /// ### English
    /// Looks up a GL/WGL entry point for the context current on the calling thread.
    ///
    /// ### 中文
    /// 为调用线程上的当前上下文查找 GL/WGL 入口点。
    fn proc_address(&self, name: &str) -> *const c_void {
        let Ok(name) = CString::new(name) else {
            return std::ptr::null();
        };
        unsafe { (self.get_proc_address)(self.user(), name.as_ptr()) }
    }
}

/// ### English
/// `DisplayBackend` over the host display table.
///
/// ### 中文
/// 基于宿主显示函数表的 `DisplayBackend`。
pub(super) struct FfiDisplayBackend {
    table: DisplayTable,
    /// ### English
    /// Producer device pointer the interop device is opened for.
    ///
    /// ### 中文
    /// 打开 interop 设备所针对的生产者设备指针。
    dx_device: usize,
}

impl FfiDisplayBackend {
    /// ### English
    /// Validates `api` and converts its entries into typed function pointers.
    ///
    /// ### 中文
    /// 校验 `api` 并将其表项转换为带类型的函数指针。
    pub(super) fn new(api: StereoBridgeDisplayApi, dx_device: *mut c_void) -> Result<Self> {
        require_entries(&[
            ("probe_forced_samples", api.probe_forced_samples),
            ("stereo_available", api.stereo_available),
            ("create_surface", api.create_surface),
            ("destroy_surface", api.destroy_surface),
            ("surface_samples", api.surface_samples),
            ("surface_size", api.surface_size),
            ("swap_buffers", api.swap_buffers),
            ("request_redraw", api.request_redraw),
            ("show_no_activate", api.show_no_activate),
            ("window_handle", api.window_handle),
            ("pump_messages", api.pump_messages),
            ("get_proc_address", api.get_proc_address),
        ])?;
        if dx_device.is_null() {
            return Err(BridgeError::InteropOpen);
        }

        let table = DisplayTable {
            user_data: api.user_data as usize,
            probe_forced_samples: unsafe {
                std::mem::transmute::<usize, ProbeSamples>(api.probe_forced_samples)
            },
            stereo_available: unsafe {
                std::mem::transmute::<usize, StereoAvailable>(api.stereo_available)
            },
            create_surface: unsafe {
                std::mem::transmute::<usize, CreateSurface>(api.create_surface)
            },
            destroy_surface: unsafe {
                std::mem::transmute::<usize, SurfaceCall>(api.destroy_surface)
            },
            surface_samples: unsafe {
                std::mem::transmute::<usize, SurfaceQuery>(api.surface_samples)
            },
            surface_size: unsafe { std::mem::transmute::<usize, SurfaceSize>(api.surface_size) },
            swap_buffers: unsafe { std::mem::transmute::<usize, SurfaceCall>(api.swap_buffers) },
            request_redraw: unsafe {
                std::mem::transmute::<usize, SurfaceFlag>(api.request_redraw)
            },
            show_no_activate: unsafe {
                std::mem::transmute::<usize, SurfaceCall>(api.show_no_activate)
            },
            window_handle: unsafe {
                std::mem::transmute::<usize, SurfaceHandle>(api.window_handle)
            },
            pump_messages: unsafe { std::mem::transmute::<usize, SurfaceCall>(api.pump_messages) },
            get_proc_address: unsafe {
                std::mem::transmute::<usize, GetProcAddress>(api.get_proc_address)
            },
        };

        Ok(Self {
            table,
            dx_device: dx_device as usize,
        })
    }
}

impl DisplayBackend for FfiDisplayBackend {
    type Surface = FfiSurface;
    type Gl = GlowConsumer;
    type Interop = WglDxInterop;

    fn probe_forced_samples(&self) -> u32 {
        unsafe { (self.table.probe_forced_samples)(self.table.user()) }
    }

    fn stereo_available(&self) -> bool {
        unsafe { (self.table.stereo_available)(self.table.user()) }
    }

    fn create_surface(&mut self, request: &SurfaceRequest, events: EventSink) -> Result<FfiSurface> {
        let ffi_request = StereoBridgeSurfaceRequest::from(request);
        let sink = Box::into_raw(Box::new(StereoBridgeEventSink { sink: events }));
        let handle = unsafe { (self.table.create_surface)(self.table.user(), &ffi_request, sink) };
        let Some(handle) = NonNull::new(handle) else {
            drop(unsafe { Box::from_raw(sink) });
            return Err(BridgeError::DisplaySurface(
                "host create_surface returned null".to_string(),
            ));
        };
        debug!(surface = ?handle, "display surface created");
        Ok(FfiSurface {
            table: self.table,
            handle,
            sink,
        })
    }

    fn load_gl(&mut self, _surface: &FfiSurface) -> Result<GlowConsumer> {
        let table = self.table;
        Ok(unsafe { GlowConsumer::from_loader_function(|name| table.proc_address(name)) })
    }

    fn open_interop(&mut self, _surface: &FfiSurface) -> Result<WglDxInterop> {
        let table = self.table;
        let api = WglInteropApi::load(|name| table.proc_address(name))?;
        WglDxInterop::open(api, self.dx_device as *mut c_void)
    }
}

/// ### English
/// A host display surface. Destroying it also frees the event sink it was created with.
///
/// ### 中文
/// 宿主的显示表面；销毁时一并释放创建它时使用的事件接收端。
pub(super) struct FfiSurface {
    table: DisplayTable,
    handle: NonNull<c_void>,
    sink: *mut StereoBridgeEventSink,
}

impl DisplaySurface for FfiSurface {
    fn samples(&self) -> u32 {
        unsafe { (self.table.surface_samples)(self.table.user(), self.handle.as_ptr()) }
    }

    fn size(&self) -> PhysicalSize<u32> {
        let (mut width, mut height) = (0u32, 0u32);
        unsafe {
            (self.table.surface_size)(
                self.table.user(),
                self.handle.as_ptr(),
                &mut width,
                &mut height,
            )
        };
        PhysicalSize::new(width, height)
    }

    fn swap_buffers(&self) {
        unsafe { (self.table.swap_buffers)(self.table.user(), self.handle.as_ptr()) };
    }

    fn request_redraw(&self) -> bool {
        unsafe { (self.table.request_redraw)(self.table.user(), self.handle.as_ptr()) }
    }

    fn show_no_activate(&self) {
        unsafe { (self.table.show_no_activate)(self.table.user(), self.handle.as_ptr()) };
    }

    fn window_handle(&self) -> usize {
        unsafe { (self.table.window_handle)(self.table.user(), self.handle.as_ptr()) as usize }
    }

    fn pump_messages(&self) {
        unsafe { (self.table.pump_messages)(self.table.user(), self.handle.as_ptr()) };
    }
}

impl Drop for FfiSurface {
    fn drop(&mut self) {
        unsafe { (self.table.destroy_surface)(self.table.user(), self.handle.as_ptr()) };
        drop(unsafe { Box::from_raw(self.sink) });
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Posts a display-window event to the display thread. Called from the host's window procedure.
///
/// Returns `false` for null arguments, unknown event kinds, or when the display thread is gone.
///
/// ### 中文
/// 向显示线程投递一个显示窗口事件；由宿主的窗口过程调用。
///
/// 参数为空、事件类型未知或显示线程已退出时返回 `false`。
pub unsafe extern "C" fn stereo_bridge_display_post_event(
    sink: *mut StereoBridgeEventSink,
    event: *const StereoBridgeDisplayEvent,
) -> bool {
    if sink.is_null() || event.is_null() {
        return false;
    }

    let event = unsafe { *event };
    let Some(event) = event.to_display_event() else {
        warn!(kind = event.kind, "unknown display event dropped");
        return false;
    };
    unsafe { &(*sink).sink }.post(event)
}
