//! ### English
//! Process-wide `tracing` subscriber, installed once.
//!
//! ### 中文
//! 进程级 `tracing` subscriber，只安装一次。

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// ### English
/// Installs the subscriber. `RUST_LOG` wins over `default_directive`. A subscriber already set
/// by the host is left in place.
///
/// ### 中文
/// 安装 subscriber。`RUST_LOG` 优先于 `default_directive`；宿主已安装的 subscriber 会被保留。
pub fn init(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init();
    });
}
