/// ### English
/// `stereo_bridge` crate root.
/// The C ABI lives in `ffi`; the frame hand-off core and its collaborators live under `engine`.
///
/// ### 中文
/// `stereo_bridge` 的 crate 根。
/// C ABI 位于 `ffi`；帧交接核心及其协作者位于 `engine` 模块。
pub mod engine;
mod ffi;
