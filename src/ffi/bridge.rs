//! ### English
//! C ABI bindings for the bridge lifecycle and the producer hooks.
//!
//! ### 中文
//! 桥接生命周期与生产者钩子的 C ABI 绑定。

use std::ffi::c_char;

use tracing::{error, info};

use super::display::FfiDisplayBackend;
use super::producer::FfiProducer;
use super::{
    StereoBridgeDisplayApi, StereoBridgeHandle, StereoBridgeProducerApi, StereoBridgeStats,
    StereoBridgeViewport,
};
use crate::engine::StereoBridge;
use crate::engine::logging;
use crate::engine::settings::BridgeSettings;
use crate::engine::stereo::Viewport;

#[unsafe(no_mangle)]
/// ### English
/// Creates a bridge for one producer device.
///
/// `settings_path` is an optional NUL-terminated UTF-8 path to a TOML settings file. NULL, an
/// empty string, or a missing file means "defaults". `flags` is a bitmask of
/// `STEREO_BRIDGE_FLAG_*` applied on top of the file.
///
/// Returns NULL if either table is NULL, has a zero entry, or the producer has no native device.
/// Nothing is created until the first presented frame.
///
/// ### 中文
/// 为一个生产者设备创建桥接。
///
/// `settings_path` 为可选的 NUL 结尾 UTF-8 TOML 设置文件路径；NULL、空字符串或文件不存在
/// 表示使用默认值。`flags` 为 `STEREO_BRIDGE_FLAG_*` 位掩码，覆盖在文件设置之上。
///
/// 任一函数表为 NULL、存在为 0 的表项，或生产者没有原生设备时返回 NULL。
/// 在第一次呈现帧之前不会创建任何资源。
pub unsafe extern "C" fn stereo_bridge_create(
    producer_api: *const StereoBridgeProducerApi,
    display_api: *const StereoBridgeDisplayApi,
    settings_path: *const c_char,
    flags: u32,
) -> *mut StereoBridgeHandle {
    if producer_api.is_null() || display_api.is_null() {
        return std::ptr::null_mut();
    }

    let (settings, load_error) = match unsafe { super::cstr_to_path(settings_path) } {
        Some(path) => match BridgeSettings::load(&path) {
            Ok(settings) => (settings, None),
            Err(err) => (BridgeSettings::default(), Some((path, err))),
        },
        None => (BridgeSettings::default(), None),
    };
    let settings = settings.with_flags(flags);
    logging::init(&settings.log_level);
    if let Some((path, err)) = load_error {
        error!(path = %path.display(), %err, "settings file rejected, using defaults");
    }

    let producer = match FfiProducer::new(unsafe { *producer_api }) {
        Ok(producer) => producer,
        Err(err) => {
            error!(%err, "producer table rejected");
            return std::ptr::null_mut();
        }
    };
    let dx_device = producer.native_device();
    let backend = match FfiDisplayBackend::new(unsafe { *display_api }, dx_device) {
        Ok(backend) => backend,
        Err(err) => {
            error!(%err, "display table rejected");
            return std::ptr::null_mut();
        }
    };

    info!(?settings, "stereo bridge created");
    let bridge = StereoBridge::new(producer, backend, settings);
    Box::into_raw(Box::new(StereoBridgeHandle { bridge }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a bridge created by `stereo_bridge_create`, stopping the display thread and releasing
/// the producer surfaces. Call from the producer thread while the device is still alive.
///
/// ### 中文
/// 销毁由 `stereo_bridge_create` 创建的桥接：停止显示线程并释放生产者表面。
/// 须在生产者线程、且设备仍存活时调用。
pub unsafe extern "C" fn stereo_bridge_destroy(handle: *mut StereoBridgeHandle) {
    if handle.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(handle));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Hook called before the producer clears its output target (pre-`Clear`).
///
/// ### 中文
/// 生产者清除输出目标之前调用的钩子（`Clear` 之前）。
pub unsafe extern "C" fn stereo_bridge_on_frame_begin(handle: *mut StereoBridgeHandle) {
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return;
    };
    handle.bridge.on_frame_boundary_begin();
}

#[unsafe(no_mangle)]
/// ### English
/// Hook called once per frame before the producer presents (pre-`Present`).
///
/// ### 中文
/// 每帧在生产者呈现之前调用一次的钩子（`Present` 之前）。
pub unsafe extern "C" fn stereo_bridge_on_frame_end(handle: *mut StereoBridgeHandle) {
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return;
    };
    handle.bridge.on_frame_boundary_end();
}

#[unsafe(no_mangle)]
/// ### English
/// Hook called after the producer presents. Blocks until the display side has shown the frame or
/// the configured timeout expires. Returns whether the frame was shown in time.
///
/// ### 中文
/// 生产者呈现之后调用的钩子。阻塞直到显示侧已显示该帧或超时；返回是否按时显示。
pub unsafe extern "C" fn stereo_bridge_on_frame_presented(handle: *mut StereoBridgeHandle) -> bool {
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return false;
    };
    handle.bridge.on_frame_presented()
}

#[unsafe(no_mangle)]
/// ### English
/// Hook for the producer's viewport change. Returns `true` when the host should forward the call
/// to the device; currently always `true`, including for NULL arguments.
///
/// ### 中文
/// 生产者视口变化时的钩子。返回 `true` 表示宿主应将调用转发给设备；
/// 目前总是返回 `true`，参数为 NULL 时亦然。
pub unsafe extern "C" fn stereo_bridge_on_viewport(
    handle: *mut StereoBridgeHandle,
    viewport: *const StereoBridgeViewport,
) -> bool {
    let (Some(handle), Some(viewport)) = (unsafe { handle.as_mut() }, unsafe { viewport.as_ref() })
    else {
        return true;
    };
    handle.bridge.on_viewport_change(&Viewport::from(*viewport))
}

#[unsafe(no_mangle)]
/// ### English
/// Copies the diagnostic counters into `out`. Returns `false` for NULL arguments.
///
/// ### 中文
/// 将诊断计数拷贝到 `out`；参数为 NULL 时返回 `false`。
pub unsafe extern "C" fn stereo_bridge_stats(
    handle: *const StereoBridgeHandle,
    out: *mut StereoBridgeStats,
) -> bool {
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return false;
    };
    if out.is_null() {
        return false;
    }
    unsafe { out.write(StereoBridgeStats::from(handle.bridge.stats())) };
    true
}

#[unsafe(no_mangle)]
/// ### English
/// Returns whether the current session is in stereo mode.
///
/// ### 中文
/// 返回当前会话是否处于立体模式。
pub unsafe extern "C" fn stereo_bridge_stereo_enabled(handle: *const StereoBridgeHandle) -> bool {
    unsafe { handle.as_ref() }.is_some_and(|handle| handle.bridge.stereo_enabled())
}
