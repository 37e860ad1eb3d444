use tracing::{error, info, warn};

use super::StereoBridge;
use crate::engine::display::{
    DisplayBackend, DisplayEvent, DisplayThreadInit, WindowConfig, spawn_display_thread,
};
use crate::engine::error::{BridgeError, Result};
use crate::engine::frame::SessionState;
use crate::engine::lifecycle::{create_surfaces, plan_surfaces, release_surfaces};
use crate::engine::producer::ProducerDevice;

impl<P: ProducerDevice, B: DisplayBackend> StereoBridge<P, B> {
    /// ### English
    /// Creates the producer surfaces and starts the display thread.
    ///
    /// Any failure marks the session `Failed`; from then on every hook is a pass-through.
    ///
    /// ### 中文
    /// 创建生产者表面并启动显示线程。
    ///
    /// 任何失败都会把会话标记为 `Failed`；此后所有钩子都直接放行。
    pub(super) fn create_resources(&mut self) -> Result<()> {
        let result = self.try_create_resources();
        if result.is_err() {
            self.ring.set_session(SessionState::Failed);
            if let Some(source) = &self.source {
                source.post_quit();
            }
        }
        result
    }

    fn try_create_resources(&mut self) -> Result<()> {
        info!("creating stereo bridge resources");

        let forced_samples = self
            .backend
            .as_ref()
            .map(|backend| backend.probe_forced_samples())
            .unwrap_or(0);

        let source = self
            .device
            .focus_window()
            .ok_or_else(|| BridgeError::DisplaySurface("producer has no focus window".to_string()))?;
        self.source = Some(source.clone());

        let plan = plan_surfaces(&self.device, forced_samples);
        create_surfaces(&self.device, &self.ring, &plan.desc)?;

        let (Some(backend), Some(events)) = (self.backend.take(), self.events_rx.take()) else {
            release_surfaces(&self.device, &self.ring);
            return Err(BridgeError::Thread("display thread already started".to_string()));
        };

        self.ring.set_session(SessionState::Starting);
        let init = DisplayThreadInit {
            backend,
            window: WindowConfig {
                settings: self.settings.clone(),
                samples_dx: plan.samples_dx,
                ring: self.ring.clone(),
                stats: self.stats.clone(),
                signal: self.signal.clone(),
                source,
                events: self.events.clone(),
            },
            events,
        };
        match spawn_display_thread(init) {
            Ok(handle) => self.display = Some(handle),
            Err(err) => {
                release_surfaces(&self.device, &self.ring);
                return Err(err);
            }
        }

        self.initialised = true;
        info!(
            slots = self.ring.len(),
            width = plan.desc.size.width,
            height = plan.desc.size.height,
            samples_dx = plan.samples_dx,
            "stereo bridge resources created"
        );
        Ok(())
    }

    /// ### English
    /// Reads the session state, finishing a failure reported by the display thread.
    ///
    /// ### 中文
    /// 读取会话状态，并收尾显示线程报告的失败。
    pub(super) fn poll_session(&mut self) -> SessionState {
        let state = self.ring.session();
        if state == SessionState::Failed {
            self.settle_failure();
        }
        state
    }

    /// ### English
    /// Ends capturing after a producer-side failure mid-session.
    ///
    /// ### 中文
    /// 会话中途生产者侧失败后结束捕获。
    pub(super) fn fail_session(&mut self) {
        self.ring.set_session(SessionState::Failed);
        self.settle_failure();
    }

    /// ### English
    /// Stops the display thread, releases the producer surfaces and hands the host its own
    /// output target back. Runs once per failure.
    ///
    /// ### 中文
    /// 停止显示线程、释放生产者表面，并把宿主自己的输出目标交还给它；每次失败只执行一次。
    fn settle_failure(&mut self) {
        if !self.initialised {
            return;
        }
        self.initialised = false;
        self.handed_off = false;

        self.events.post(DisplayEvent::Quit);
        if let Some(handle) = self.display.take()
            && handle.join().is_err()
        {
            error!("display thread panicked");
        }
        release_surfaces(&self.device, &self.ring);
        self.device.restore_output_target();
        warn!("stereo bridge session failed, capture disabled");
    }
}
