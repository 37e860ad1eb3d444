//! ### English
//! Error type shared by every fallible engine operation.
//!
//! ### 中文
//! 引擎中所有可失败操作共用的错误类型。

use thiserror::Error;

/// ### English
/// Failure raised while creating, binding, or tearing down bridge resources.
///
/// Only initialization failures end a session; per-frame problems are logged and skipped instead
/// of surfacing as errors.
///
/// ### 中文
/// 创建、绑定或销毁桥接资源时产生的失败。
///
/// 只有初始化失败会终止会话；逐帧问题仅记录日志并跳过，不会作为错误返回。
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("WGL_NV_DX_interop is not available on this context")]
    InteropUnavailable,
    #[error("failed to open the GL/DX interop device")]
    InteropOpen,
    #[error("failed to set the share handle for slot {slot}")]
    ShareHandle { slot: usize },
    #[error("failed to register slot {slot} with the interop device")]
    Register { slot: usize },
    #[error("failed to create producer surface for slot {slot}")]
    SurfaceCreate { slot: usize },
    #[error("failed to bind the producer render target")]
    RenderTarget,
    #[error("failed to create the display surface: {0}")]
    DisplaySurface(String),
    #[error("failed to create GL {what}")]
    GlObject { what: &'static str },
    #[error("display thread: {0}")]
    Thread(String),
    #[error("missing entry point `{0}`")]
    MissingEntryPoint(&'static str),
    #[error("invalid settings file: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// ### English
/// Result alias used across the engine.
///
/// ### 中文
/// 引擎内通用的 Result 别名。
pub type Result<T> = std::result::Result<T, BridgeError>;
