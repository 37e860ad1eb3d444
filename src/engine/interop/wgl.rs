//! ### English
//! `WGL_NV_DX_interop` binding.
//!
//! Entry points are resolved through the display context's proc-address loader and stored as
//! typed function pointers. Only `wglDXSetResourceShareHandleNV` is optional at load time; its
//! absence is reported per slot when the share handle is set.
//!
//! ### 中文
//! `WGL_NV_DX_interop` 绑定。
//!
//! 入口点通过显示上下文的 proc-address loader 解析，并保存为带类型的函数指针。
//! 只有 `wglDXSetResourceShareHandleNV` 在加载时是可选的；其缺失会在为各槽位设置共享句柄时报告。

use std::ffi::c_void;
use std::ptr::NonNull;

use tracing::{debug, error, warn};

use super::{InteropDevice, InteropObject};
use crate::engine::error::{BridgeError, Result};
use crate::engine::frame::SharedSurface;

/// ### English
/// `WGL_ACCESS_READ_ONLY_NV`: the display side only reads the shared surfaces.
///
/// ### 中文
/// `WGL_ACCESS_READ_ONLY_NV`：显示侧只读取共享表面。
const WGL_ACCESS_READ_ONLY_NV: u32 = 0x0000;

/// ### English
/// Win32 `BOOL`.
///
/// ### 中文
/// Win32 `BOOL`。
type Bool = i32;

/// ### English
/// Function pointer type for `wglDXOpenDeviceNV`.
///
/// ### 中文
/// `wglDXOpenDeviceNV` 的函数指针类型。
type WglDxOpenDeviceNv = unsafe extern "system" fn(dx_device: *mut c_void) -> *mut c_void;
/// ### English
/// Function pointer type for `wglDXCloseDeviceNV`.
///
/// ### 中文
/// `wglDXCloseDeviceNV` 的函数指针类型。
type WglDxCloseDeviceNv = unsafe extern "system" fn(device: *mut c_void) -> Bool;
/// ### English
/// Function pointer type for `wglDXRegisterObjectNV`.
///
/// ### 中文
/// `wglDXRegisterObjectNV` 的函数指针类型。
type WglDxRegisterObjectNv = unsafe extern "system" fn(
    device: *mut c_void,
    dx_object: *mut c_void,
    name: u32,
    object_type: u32,
    access: u32,
) -> *mut c_void;
type WglDxUnregisterObjectNv = unsafe extern "system" fn(device: *mut c_void, object: *mut c_void) -> Bool;
type WglDxLockObjectsNv =
    unsafe extern "system" fn(device: *mut c_void, count: i32, objects: *mut *mut c_void) -> Bool;
type WglDxUnlockObjectsNv =
    unsafe extern "system" fn(device: *mut c_void, count: i32, objects: *mut *mut c_void) -> Bool;
type WglDxSetResourceShareHandleNv =
    unsafe extern "system" fn(dx_object: *mut c_void, share_handle: *mut c_void) -> Bool;

/// ### English
/// Resolved `WGL_NV_DX_interop` entry points.
///
/// ### 中文
/// 已解析的 `WGL_NV_DX_interop` 入口点。
#[derive(Clone, Copy)]
pub struct WglInteropApi {
    open_device: WglDxOpenDeviceNv,
    close_device: WglDxCloseDeviceNv,
    register_object: WglDxRegisterObjectNv,
    unregister_object: WglDxUnregisterObjectNv,
    lock_objects: WglDxLockObjectsNv,
    unlock_objects: WglDxUnlockObjectsNv,
    set_resource_share_handle: Option<WglDxSetResourceShareHandleNv>,
}

impl WglInteropApi {
    /// ### English
    /// Resolves the entry points with `loader` (a `wglGetProcAddress`-style lookup).
    ///
    /// Must run with the display GL context current.
    ///
    /// #### Parameters
    /// - `loader`: Returns the address of a named GL/WGL function, or null.
    ///
    /// ### 中文
    /// 通过 `loader`（类似 `wglGetProcAddress` 的查找函数）解析入口点。
    ///
    /// 必须在显示 GL 上下文为当前上下文时调用。
    ///
    /// #### 参数
    /// - `loader`：返回指定 GL/WGL 函数的地址，或空指针。
    pub fn load<F>(mut loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        let mut require = |name: &'static str| -> Result<*const c_void> {
            let address = loader(name);
            if address.is_null() {
                Err(BridgeError::MissingEntryPoint(name))
            } else {
                Ok(address)
            }
        };

        let open_device = require("wglDXOpenDeviceNV")?;
        let close_device = require("wglDXCloseDeviceNV")?;
        let register_object = require("wglDXRegisterObjectNV")?;
        let unregister_object = require("wglDXUnregisterObjectNV")?;
        let lock_objects = require("wglDXLockObjectsNV")?;
        let unlock_objects = require("wglDXUnlockObjectsNV")?;
        let set_resource_share_handle = loader("wglDXSetResourceShareHandleNV");

        debug!("loaded WGL_NV_DX_interop entry points");

        Ok(Self {
            open_device: unsafe {
                std::mem::transmute::<*const c_void, WglDxOpenDeviceNv>(open_device)
            },
            close_device: unsafe {
                std::mem::transmute::<*const c_void, WglDxCloseDeviceNv>(close_device)
            },
            register_object: unsafe {
                std::mem::transmute::<*const c_void, WglDxRegisterObjectNv>(register_object)
            },
            unregister_object: unsafe {
                std::mem::transmute::<*const c_void, WglDxUnregisterObjectNv>(unregister_object)
            },
            lock_objects: unsafe {
                std::mem::transmute::<*const c_void, WglDxLockObjectsNv>(lock_objects)
            },
            unlock_objects: unsafe {
                std::mem::transmute::<*const c_void, WglDxUnlockObjectsNv>(unlock_objects)
            },
            set_resource_share_handle: (!set_resource_share_handle.is_null()).then(|| unsafe {
                std::mem::transmute::<*const c_void, WglDxSetResourceShareHandleNv>(
                    set_resource_share_handle,
                )
            }),
        })
    }
}

/// ### English
/// Open interop device for one producer device on the current GL context.
///
/// ### 中文
/// 在当前 GL 上下文上为某个生产者设备打开的互操作设备。
pub struct WglDxInterop {
    api: WglInteropApi,
    /// ### English
    /// Handle returned by `wglDXOpenDeviceNV`.
    ///
    /// ### 中文
    /// `wglDXOpenDeviceNV` 返回的句柄。
    device: NonNull<c_void>,
}

impl WglDxInterop {
    /// ### English
    /// Opens the interop device for `dx_device`.
    ///
    /// #### Parameters
    /// - `api`: Resolved entry points.
    /// - `dx_device`: The producer's native device pointer.
    ///
    /// ### 中文
    /// 为 `dx_device` 打开互操作设备。
    ///
    /// #### 参数
    /// - `api`：已解析的入口点。
    /// - `dx_device`：生产者的原生设备指针。
    pub fn open(api: WglInteropApi, dx_device: *mut c_void) -> Result<Self> {
        if dx_device.is_null() {
            return Err(BridgeError::InteropOpen);
        }
        let device = unsafe { (api.open_device)(dx_device) };
        let device = NonNull::new(device).ok_or(BridgeError::InteropOpen)?;
        debug!(device = ?device, "opened GL/DX interop device");
        Ok(Self { api, device })
    }

    fn lock_call(&self, f: WglDxLockObjectsNv, object: InteropObject) -> bool {
        let mut handle = object.raw() as *mut c_void;
        unsafe { f(self.device.as_ptr(), 1, &mut handle) != 0 }
    }
}

impl InteropDevice for WglDxInterop {
    fn set_share_handle(&self, surface: &SharedSurface) -> Result<()> {
        let Some(set_share_handle) = self.api.set_resource_share_handle else {
            return Err(BridgeError::MissingEntryPoint("wglDXSetResourceShareHandleNV"));
        };
        let ok = unsafe {
            set_share_handle(
                surface.surface as *mut c_void,
                surface.share_handle as *mut c_void,
            )
        };
        if ok == 0 {
            // Advisory only; registration reports the real failure.
            warn!(share_handle = surface.share_handle, "wglDXSetResourceShareHandleNV returned FALSE");
        }
        Ok(())
    }

    fn register(&self, surface: &SharedSurface, name: u32, target: u32) -> Option<InteropObject> {
        let handle = unsafe {
            (self.api.register_object)(
                self.device.as_ptr(),
                surface.surface as *mut c_void,
                name,
                target,
                WGL_ACCESS_READ_ONLY_NV,
            )
        };
        let object = InteropObject::from_raw(handle as usize);
        if object.is_none() {
            error!(
                name,
                target,
                os_error = %std::io::Error::last_os_error(),
                "wglDXRegisterObjectNV failed"
            );
        }
        object
    }

    fn lock(&self, object: InteropObject) -> bool {
        self.lock_call(self.api.lock_objects, object)
    }

    fn unlock(&self, object: InteropObject) -> bool {
        self.lock_call(self.api.unlock_objects, object)
    }

    fn unregister(&self, object: InteropObject) -> bool {
        unsafe { (self.api.unregister_object)(self.device.as_ptr(), object.raw() as *mut c_void) != 0 }
    }
}

impl Drop for WglDxInterop {
    fn drop(&mut self) {
        if unsafe { (self.api.close_device)(self.device.as_ptr()) } == 0 {
            warn!("wglDXCloseDeviceNV failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reports_first_missing_entry_point() {
        let result = WglInteropApi::load(|_| std::ptr::null());
        assert!(matches!(
            result,
            Err(BridgeError::MissingEntryPoint("wglDXOpenDeviceNV"))
        ));
    }
}
