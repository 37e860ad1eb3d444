//! ### English
//! Producer-side orchestration (public API).
//!
//! `StereoBridge` is driven by the interception layer from the producer thread. It owns the
//! capture controller, creates the ring on the first presented frame boundary, and spawns and
//! owns the display thread.
//!
//! ### 中文
//! 生产者侧编排（对外公开 API）。
//!
//! `StereoBridge` 由拦截层在生产者线程驱动。它持有捕获控制器，在首个被呈现的帧边界创建环，
//! 并启动、持有显示线程。

mod hooks;
mod session;
mod teardown;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel as channel;

use crate::engine::capture::CaptureController;
use crate::engine::display::{DisplayBackend, DisplayEvent, EventSink, SourceWindow};
use crate::engine::frame::{SessionState, SharedSurfaceSet};
use crate::engine::producer::{PresentedTargets, ProducerDevice};
use crate::engine::settings::BridgeSettings;
use crate::engine::stats::{FrameStats, StatsSnapshot};
use crate::engine::sync::FrameDoneSignal;

/// ### English
/// Frame hand-off engine between a producer device and a display thread.
///
/// ### 中文
/// 生产者设备与显示线程之间的帧交接引擎。
pub struct StereoBridge<P: ProducerDevice, B: DisplayBackend> {
    device: P,
    /// ### English
    /// Display platform layer; moved onto the display thread when it starts.
    ///
    /// ### 中文
    /// 显示平台层；显示线程启动时被移入该线程。
    backend: Option<B>,
    settings: BridgeSettings,
    ring: Arc<SharedSurfaceSet>,
    stats: Arc<FrameStats>,
    signal: Arc<FrameDoneSignal>,
    capture: CaptureController,
    presented: PresentedTargets,
    events: EventSink,
    /// ### English
    /// Receiving half of the display event channel until the display thread takes it.
    ///
    /// ### 中文
    /// 显示事件通道的接收端，直到被显示线程取走。
    events_rx: Option<channel::Receiver<DisplayEvent>>,
    display: Option<thread::JoinHandle<()>>,
    source: Option<Arc<dyn SourceWindow>>,
    /// ### English
    /// Producer surfaces exist and have not been released yet.
    ///
    /// ### 中文
    /// 生产者表面已创建且尚未释放。
    initialised: bool,
    /// ### English
    /// A slot was handed off at the current present boundary.
    ///
    /// ### 中文
    /// 当前呈现边界已交出一个槽位。
    handed_off: bool,
}

impl<P: ProducerDevice, B: DisplayBackend> StereoBridge<P, B> {
    /// ### English
    /// Creates an idle bridge. Nothing is allocated until the first presented frame boundary.
    ///
    /// #### Parameters
    /// - `device`: The producer device the host renders with.
    /// - `backend`: Display platform layer.
    /// - `settings`: Effective settings (file plus flag overrides).
    ///
    /// ### 中文
    /// 创建空闲状态的桥接器；首个被呈现的帧边界之前不分配任何资源。
    ///
    /// #### 参数
    /// - `device`：宿主用于渲染的生产者设备。
    /// - `backend`：显示平台层。
    /// - `settings`：生效的设置（配置文件加标志覆盖）。
    pub fn new(device: P, backend: B, settings: BridgeSettings) -> Self {
        let ring = Arc::new(SharedSurfaceSet::new(settings.slot_count));
        let stats = Arc::new(FrameStats::new());
        let (events, events_rx) = EventSink::channel();
        Self {
            capture: CaptureController::new(ring.clone(), stats.clone()),
            device,
            backend: Some(backend),
            settings,
            ring,
            stats,
            signal: Arc::new(FrameDoneSignal::new()),
            presented: PresentedTargets::new(),
            events,
            events_rx: Some(events_rx),
            display: None,
            source: None,
            initialised: false,
            handed_off: false,
        }
    }

    #[inline]
    pub fn session(&self) -> SessionState {
        self.ring.session()
    }

    #[inline]
    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    #[inline]
    pub fn stereo_enabled(&self) -> bool {
        self.ring.stereo_enabled()
    }

    /// ### English
    /// Current diagnostic counters.
    ///
    /// ### 中文
    /// 当前的诊断计数。
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    #[inline]
    fn display_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.display_timeout_ms)
    }
}

#[cfg(test)]
mod tests;
