#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn stereo_bridge_abi_version() -> u32 {
    super::STEREO_BRIDGE_ABI_VERSION
}
