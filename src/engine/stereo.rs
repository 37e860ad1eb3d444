//! ### English
//! In-band stereo signal carried by a reserved viewport rectangle.
//!
//! Cooperating content marks the start of right-eye rendering by issuing one viewport call with
//! `X = 1, Width = 2, Height = 3` (`Y` and the depth range are ignored). The values are not checked
//! against the range of real viewport requests; content is trusted not to use them otherwise.
//!
//! ### 中文
//! 通过保留视口矩形传递的带内立体信号。
//!
//! 配合的内容通过一次 `X = 1, Width = 2, Height = 3` 的视口调用标记右眼渲染开始
//! （`Y` 与深度范围被忽略）。这些值不会与真实视口请求的取值范围做校验；
//! 依赖内容方不在其它场合使用它们。

/// ### English
/// Sentinel `X` origin.
///
/// ### 中文
/// 哨兵 `X` 原点。
pub const STEREO_SIGNAL_X: u32 = 1;
/// ### English
/// Sentinel width.
///
/// ### 中文
/// 哨兵宽度。
pub const STEREO_SIGNAL_WIDTH: u32 = 2;
/// ### English
/// Sentinel height.
///
/// ### 中文
/// 哨兵高度。
pub const STEREO_SIGNAL_HEIGHT: u32 = 3;

/// ### English
/// Producer viewport rectangle (pixels) with its depth range.
///
/// ### 中文
/// 生产者视口矩形（像素）及其深度范围。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub min_z: f32,
    pub max_z: f32,
}

/// ### English
/// Returns `true` if `viewport` is the reserved "switch to right eye" marker.
///
/// ### 中文
/// 若 `viewport` 是保留的“切换到右眼”标记则返回 `true`。
#[inline]
pub const fn is_stereo_signal(viewport: &Viewport) -> bool {
    viewport.x == STEREO_SIGNAL_X
        && viewport.width == STEREO_SIGNAL_WIDTH
        && viewport.height == STEREO_SIGNAL_HEIGHT
}
