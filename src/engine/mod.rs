/// ### English
/// Engine internal modules: the shared surface ring, capture/present state machines,
/// cross-thread signalling, and the collaborator traits they are driven through.
///
/// ### 中文
/// 引擎内部模块：共享表面环、捕获/呈现状态机、跨线程信号，
/// 以及驱动它们的协作者 trait。
pub(crate) mod cache;
pub mod capture;
pub mod display;
pub mod error;
pub mod flags;
pub mod frame;
pub mod interop;
pub mod lifecycle;
pub mod logging;
pub mod present;
pub mod producer;
pub mod runtime;
pub mod settings;
pub mod stats;
pub mod stereo;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BridgeError, Result};
pub use runtime::StereoBridge;
