use tracing::{debug, error, trace};

use super::StereoBridge;
use crate::engine::display::{DisplayBackend, DisplayEvent};
use crate::engine::frame::SessionState;
use crate::engine::producer::ProducerDevice;
use crate::engine::stereo::{Viewport, is_stereo_signal};

impl<P: ProducerDevice, B: DisplayBackend> StereoBridge<P, B> {
    /// ### English
    /// Pre-clear hook: starts capturing the frame if it targets a presented output.
    ///
    /// The first such boundary creates the ring and starts the display thread.
    ///
    /// ### 中文
    /// 清屏前钩子：若本帧的目标是被呈现过的输出，则开始捕获。
    ///
    /// 第一个这样的边界会创建环并启动显示线程。
    pub fn on_frame_boundary_begin(&mut self) {
        if self.presented.is_empty() {
            return;
        }
        let Some(target) = self.device.current_render_target() else {
            return;
        };
        if !self.presented.contains(target) {
            trace!(?target, "frame targets an offscreen surface, not captured");
            return;
        }

        match self.poll_session() {
            SessionState::Idle => {
                if let Err(err) = self.create_resources() {
                    error!(%err, "failed to create stereo bridge resources");
                    return;
                }
            }
            SessionState::Starting | SessionState::Running => {}
            SessionState::Failed | SessionState::Stopped => return,
        }

        if let Err(err) = self.capture.begin_capture(&self.device) {
            error!(%err, "failed to bind capture surface");
            self.fail_session();
        }
    }

    /// ### English
    /// Pre-present hook: records the presented target and hands the captured slot off.
    ///
    /// A pending display signal is dropped before the hand-off.
    ///
    /// ### 中文
    /// 呈现前钩子：记录被呈现的目标，并交出已捕获的槽位。
    ///
    /// 交出之前会丢弃尚未消费的显示信号。
    pub fn on_frame_boundary_end(&mut self) {
        self.handed_off = false;

        if let Some(target) = self.device.current_render_target()
            && self.presented.record(target)
        {
            debug!(?target, total = self.presented.len(), "new presented target");
            self.stats.set_presented_targets(self.presented.len());
        }

        if !self.initialised || !self.poll_session().is_live() {
            return;
        }

        // A late signal from a pass the producer already gave up on must not satisfy this frame.
        self.signal.reset();
        self.capture.end_capture(self.capture.present_channel());
        self.events.post(DisplayEvent::NewFrame);
        self.handed_off = true;
    }

    /// ### English
    /// Post-present hook: waits (bounded) for the display thread to show the handed-off frame.
    ///
    /// Returns `true` if the display thread signalled in time, `false` on timeout or when
    /// nothing was handed off at this boundary.
    ///
    /// ### 中文
    /// 呈现后钩子：有上限地等待显示线程显示已交出的帧。
    ///
    /// 显示线程及时发出信号时返回 `true`；超时或本边界未交出任何帧时返回 `false`。
    pub fn on_frame_presented(&mut self) -> bool {
        if !std::mem::take(&mut self.handed_off) {
            return false;
        }

        let timeout = self.display_timeout();
        let signalled = self.signal.wait_for_display(timeout);
        if !signalled {
            self.stats.record_timeout();
            debug!(timeout_ms = timeout.as_millis() as u64, "display wait timed out");
        }

        self.poll_session();
        signalled
    }

    /// ### English
    /// Pre-viewport hook. Detects the eye-switch marker; always lets the call proceed.
    ///
    /// ### 中文
    /// 设置视口前钩子：检测眼切换标记；始终允许原调用继续。
    pub fn on_viewport_change(&mut self, viewport: &Viewport) -> bool {
        if !is_stereo_signal(viewport) {
            return true;
        }

        match self.poll_session() {
            SessionState::Idle => {
                self.capture.latch_stereo();
            }
            SessionState::Starting | SessionState::Running if self.initialised => {
                if let Err(err) = self.capture.on_stereo_signal(&self.device) {
                    error!(%err, "failed to bind right-eye capture surface");
                    self.fail_session();
                }
            }
            _ => trace!("stereo signal ignored, session not capturing"),
        }
        true
    }
}
