//! ### English
//! Cross-thread signalling between the producer thread and the display thread.
//!
//! ### 中文
//! 生产者线程与显示线程之间的跨线程信号。
mod frame_signal;

pub use frame_signal::FrameDoneSignal;
