//! ### English
//! Bitflags overriding boolean settings from the C ABI.
//!
//! These are passed to `stereo_bridge_create` as a `u32` bitmask and win over the settings file.
//!
//! ### 中文
//! 通过 C ABI 覆盖布尔设置项的位标志。
//!
//! 以 `u32` 位掩码传给 `stereo_bridge_create`，优先级高于设置文件。

/// ### English
/// Register the shared surfaces as textures and present with a textured quad
/// (only when multisample matching is on; otherwise presentation still blits).
///
/// ### 中文
/// 以纹理形式注册共享表面并用纹理四边形呈现
/// （仅在开启多重采样匹配时生效；否则仍使用 blit）。
pub const STEREO_BRIDGE_FLAG_USE_TEXTURE: u32 = 1 << 0;

/// ### English
/// Do not request the producer's multisample count for the display surface.
///
/// ### 中文
/// 不为显示表面请求与生产者一致的多重采样数。
pub const STEREO_BRIDGE_FLAG_NO_MATCH_MSAA: u32 = 1 << 1;

/// ### English
/// Draw the blue/red left/right channel indicator in the bottom-left corner.
///
/// ### 中文
/// 在左下角绘制蓝/红色的左右通道指示块。
pub const STEREO_BRIDGE_FLAG_STEREO_INDICATOR: u32 = 1 << 2;
