use dpi::PhysicalSize;
use tracing::{debug, error, info};

use crate::engine::error::{BridgeError, Result};
use crate::engine::frame::SharedSurfaceSet;
use crate::engine::producer::{PixelFormat, ProducerDevice, SurfaceDesc};

/// ### English
/// Upper bound for driver-forced multisampling.
///
/// ### 中文
/// 驱动强制多重采样数的上限。
pub const MAX_FORCED_SAMPLES: u32 = 16;

/// ### English
/// What the producer surfaces will look like, derived from the current output target.
///
/// ### 中文
/// 根据当前输出目标推导出的生产者表面参数。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProducerPlan {
    pub desc: SurfaceDesc,
    /// ### English
    /// Multisample count the display surface should request (`0` = none).
    ///
    /// ### 中文
    /// 显示表面应请求的多重采样数（`0` = 无）。
    pub samples_dx: u32,
}

/// ### English
/// Works out the surface description for the ring.
///
/// Falls back to the viewport size when the output target cannot be described, and to
/// `X8R8G8B8` when the adapter format is unknown. If the driver forces more samples on the
/// display side than the producer uses, the producer count is raised so both pixel formats match.
///
/// #### Parameters
/// - `device`: Producer device, at its first presented frame boundary.
/// - `forced_samples`: Sample count the display driver imposes on a default surface.
///
/// ### 中文
/// 推导环所用的表面描述。
///
/// 无法获取输出目标描述时退回视口尺寸；适配器格式未知时退回 `X8R8G8B8`。
/// 若驱动在显示侧强制的采样数多于生产者所用，则提升生产者采样数，使双方像素格式一致。
///
/// #### 参数
/// - `device`：处于首个被呈现帧边界的生产者设备。
/// - `forced_samples`：显示驱动对默认表面强制施加的采样数。
pub fn plan_surfaces<D>(device: &D, forced_samples: u32) -> ProducerPlan
where
    D: ProducerDevice + ?Sized,
{
    let forced = if forced_samples > 1 {
        forced_samples.min(MAX_FORCED_SAMPLES)
    } else {
        0
    };
    info!(forced_samples = forced, "display forced multisampling");

    let format = device.display_format().unwrap_or_else(|| {
        error!("failed to get adapter display format, using X8R8G8B8");
        PixelFormat::X8R8G8B8
    });

    let (size, mut samples) = if device.current_render_target().is_some() {
        match device.render_target_desc() {
            Some(desc) => {
                info!(format = desc.format.0, "producer render target format");
                (desc.size, desc.samples)
            }
            None => {
                error!("failed to get render target description, using viewport size");
                let viewport = device.viewport().unwrap_or_default();
                (PhysicalSize::new(viewport.width, viewport.height), 0)
            }
        }
    } else {
        error!("failed to get render target");
        (PhysicalSize::new(0, 0), 0)
    };
    info!(width = size.width, height = size.height, samples, "producer viewport");

    if samples < forced {
        samples = forced;
        info!(samples, "raising producer multisampling to the forced count");
    }
    let samples_dx = if (2..=MAX_FORCED_SAMPLES).contains(&samples) {
        samples
    } else {
        0
    };

    match device.depth_stencil_format() {
        Some(depth_stencil) => info!(format = depth_stencil.0, "producer depth/stencil format"),
        None => error!("failed to get depth/stencil surface"),
    }

    ProducerPlan {
        desc: SurfaceDesc {
            size,
            format,
            samples,
        },
        samples_dx,
    }
}

/// ### English
/// Creates one shareable render target per ring slot and publishes it.
///
/// On failure every surface created so far is released again.
///
/// ### 中文
/// 为每个环槽位创建一个可共享渲染目标并发布。
///
/// 失败时释放此前已创建的全部表面。
pub fn create_surfaces<D>(device: &D, ring: &SharedSurfaceSet, desc: &SurfaceDesc) -> Result<()>
where
    D: ProducerDevice + ?Sized,
{
    for slot in 0..ring.len() {
        match device.create_render_target(desc) {
            Ok(surface) => {
                debug!(slot, share_handle = surface.share_handle, "created shared render target");
                ring.install(slot, surface);
            }
            Err(err) => {
                error!(slot, %err, "failed to create shared render target");
                release_surfaces(device, ring);
                return Err(BridgeError::SurfaceCreate { slot });
            }
        }
    }
    Ok(())
}

/// ### English
/// Releases every published surface, last slot first. Safe to call more than once.
///
/// ### 中文
/// 按从后往前的顺序释放所有已发布表面；可重复调用。
pub fn release_surfaces<D>(device: &D, ring: &SharedSurfaceSet)
where
    D: ProducerDevice + ?Sized,
{
    for slot in (0..ring.len()).rev() {
        if let Some(surface) = ring.take(slot) {
            debug!(slot, "releasing shared render target");
            device.release_render_target(surface);
        }
    }
}
