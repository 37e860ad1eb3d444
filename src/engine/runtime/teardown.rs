use tracing::{error, info};

use super::StereoBridge;
use crate::engine::display::{DisplayBackend, DisplayEvent};
use crate::engine::frame::SessionState;
use crate::engine::lifecycle::release_surfaces;
use crate::engine::producer::ProducerDevice;

impl<P: ProducerDevice, B: DisplayBackend> StereoBridge<P, B> {
    /// ### English
    /// Stops the session: ends the display thread, then releases the producer surfaces.
    ///
    /// Idempotent; also runs on `Drop`. Must be called from the producer thread.
    ///
    /// ### 中文
    /// 停止会话：先结束显示线程，再释放生产者表面。
    ///
    /// 幂等；`Drop` 时也会执行。必须在生产者线程调用。
    pub fn shutdown(&mut self) {
        let previous = self.ring.session();
        if previous == SessionState::Stopped {
            return;
        }
        self.ring.set_session(SessionState::Stopped);
        self.handed_off = false;
        self.stats.set_presented_targets(self.presented.len());

        // The display thread unregisters its objects before the surfaces go away.
        self.events.post(DisplayEvent::Quit);
        if let Some(handle) = self.display.take()
            && handle.join().is_err()
        {
            error!("display thread panicked");
        }

        if std::mem::replace(&mut self.initialised, false) {
            release_surfaces(&self.device, &self.ring);
            self.device.restore_output_target();
        }
        info!(?previous, "stereo bridge stopped");
    }
}

impl<P: ProducerDevice, B: DisplayBackend> Drop for StereoBridge<P, B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
