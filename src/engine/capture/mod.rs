//! ### English
//! Capture state machine on the producer thread: which ring slot the producer draws into, and
//! when a slot is labelled and handed to the display thread.
//!
//! ### 中文
//! 生产者线程上的捕获状态机：生产者向哪个环槽位绘制，以及槽位何时被打标签并交给显示线程。

use std::sync::Arc;

use tracing::{info, trace};

use super::error::{BridgeError, Result};
use super::frame::{Channel, SharedSurfaceSet};
use super::producer::ProducerDevice;
use super::stats::FrameStats;

/// ### English
/// Owns the write cursor. Caller discipline is not validated: every `end_capture` advances the
/// cursor, whatever happened before it.
///
/// ### 中文
/// 持有写游标。不校验调用方的调用顺序：每次 `end_capture` 都会推进游标，
/// 无论之前发生了什么。
pub struct CaptureController {
    ring: Arc<SharedSurfaceSet>,
    stats: Arc<FrameStats>,
    /// ### English
    /// Next slot to write (`0..ring.len()`).
    ///
    /// ### 中文
    /// 下一个写入的槽位（`0..ring.len()`）。
    write_index: usize,
}

impl CaptureController {
    pub fn new(ring: Arc<SharedSurfaceSet>, stats: Arc<FrameStats>) -> Self {
        Self {
            ring,
            stats,
            write_index: 0,
        }
    }

    #[inline]
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    #[inline]
    pub fn stereo_enabled(&self) -> bool {
        self.ring.stereo_enabled()
    }

    /// ### English
    /// Directs subsequent producer drawing at the slot under the write cursor.
    ///
    /// Binding a render target resets the producer's viewport, so the current viewport is saved
    /// and restored around the bind. Calling this again within one frame rebinds the same slot.
    ///
    /// ### 中文
    /// 将生产者后续的绘制指向写游标所在槽位。
    ///
    /// 绑定渲染目标会重置生产者视口，因此在绑定前后保存并恢复当前视口。
    /// 同一帧内重复调用只会重新绑定同一槽位。
    pub fn begin_capture<D>(&mut self, device: &D) -> Result<()>
    where
        D: ProducerDevice + ?Sized,
    {
        let slot = self.write_index;
        let surface = self.ring.surface(slot).ok_or(BridgeError::RenderTarget)?;

        let saved = device.viewport();
        trace!(slot, "begin capture");
        device.set_render_target(&surface)?;
        if let Some(viewport) = saved {
            device.set_viewport(&viewport);
        }

        self.ring.begin_write(slot);
        Ok(())
    }

    /// ### English
    /// Labels the slot under the write cursor, hands it off, and advances the cursor.
    ///
    /// Returns the slot that was labelled.
    ///
    /// ### 中文
    /// 为写游标所在槽位打标签、交出该槽位并推进游标。
    ///
    /// 返回被打标签的槽位。
    pub fn end_capture(&mut self, channel: Channel) -> usize {
        let slot = self.write_index;
        trace!(slot, ?channel, "end capture");

        self.ring.hand_off(slot, channel);
        self.ring.end_write(slot);
        self.write_index = (slot + 1) % self.ring.len();

        if self.ring.stereo_enabled() {
            self.stats.count_producer_frame();
        }
        slot
    }

    /// ### English
    /// Handles the mid-frame eye switch: the current slot becomes the left eye and the rest of
    /// the frame goes to the next slot. The first call latches stereo mode for the session.
    ///
    /// ### 中文
    /// 处理帧内的眼切换：当前槽位成为左眼，帧的剩余部分写入下一个槽位。
    /// 第一次调用会为本会话锁存立体模式。
    pub fn on_stereo_signal<D>(&mut self, device: &D) -> Result<()>
    where
        D: ProducerDevice + ?Sized,
    {
        trace!("stereo signal");
        self.latch_stereo();
        self.end_capture(Channel::Left);
        self.begin_capture(device)
    }

    /// ### English
    /// Latches stereo mode without touching the ring. Returns `true` the first time.
    ///
    /// ### 中文
    /// 仅锁存立体模式而不操作环；第一次调用返回 `true`。
    pub fn latch_stereo(&self) -> bool {
        let first = self.ring.latch_stereo();
        if first {
            info!("stereo enabled");
        }
        first
    }

    /// ### English
    /// Channel used for the producer's present boundary in the current mode.
    ///
    /// ### 中文
    /// 当前模式下生产者呈现边界所使用的通道。
    #[inline]
    pub fn present_channel(&self) -> Channel {
        if self.ring.stereo_enabled() {
            Channel::Right
        } else {
            Channel::Mono
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{MockProducer, ProducerCall, install_test_surfaces};

    fn controller(slots: usize) -> (CaptureController, Arc<SharedSurfaceSet>, Arc<FrameStats>) {
        let ring = Arc::new(SharedSurfaceSet::new(slots));
        install_test_surfaces(&ring);
        let stats = Arc::new(FrameStats::new());
        (
            CaptureController::new(ring.clone(), stats.clone()),
            ring,
            stats,
        )
    }

    #[test]
    fn test_write_index_is_end_count_mod_n() {
        for slots in 1..=5 {
            let (mut capture, _, _) = controller(slots);
            let device = MockProducer::new();
            for k in 1..=17usize {
                if k % 3 == 0 {
                    capture.begin_capture(&device).unwrap();
                    capture.begin_capture(&device).unwrap();
                }
                capture.end_capture(Channel::Mono);
                assert_eq!(capture.write_index(), k % slots);
            }
        }
    }

    #[test]
    fn test_end_before_begin_still_advances() {
        let (mut capture, ring, _) = controller(2);
        assert_eq!(capture.end_capture(Channel::Mono), 0);
        assert_eq!(capture.end_capture(Channel::Mono), 1);
        assert_eq!(capture.write_index(), 0);
        assert_eq!(ring.channel(0), Channel::Mono);
        assert_eq!(ring.channel(1), Channel::Mono);
    }

    #[test]
    fn test_begin_capture_restores_viewport() {
        let (mut capture, ring, _) = controller(2);
        let device = MockProducer::new();
        capture.begin_capture(&device).unwrap();

        let calls = device.calls();
        let surface = ring.surface(0).unwrap();
        assert_eq!(
            calls,
            vec![
                ProducerCall::SetRenderTarget(surface),
                ProducerCall::SetViewport(device.current_viewport()),
            ]
        );
        assert!(ring.is_capturing(0));
    }

    #[test]
    fn test_begin_capture_without_surface_fails() {
        let ring = Arc::new(SharedSurfaceSet::new(2));
        let mut capture = CaptureController::new(ring, Arc::new(FrameStats::new()));
        let device = MockProducer::new();
        assert!(matches!(
            capture.begin_capture(&device),
            Err(BridgeError::RenderTarget)
        ));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_bind_failure_propagates() {
        let (mut capture, ring, _) = controller(2);
        let device = MockProducer::new();
        device.fail_set_render_target(true);
        assert!(capture.begin_capture(&device).is_err());
        assert!(!ring.is_capturing(0));
    }

    #[test]
    fn test_mono_frame_scenario() {
        let (mut capture, ring, stats) = controller(2);
        let device = MockProducer::new();
        capture.begin_capture(&device).unwrap();
        capture.end_capture(capture.present_channel());

        assert_eq!(capture.write_index(), 1);
        assert_eq!(ring.channel(0), Channel::Mono);
        assert!(ring.is_ready(0));
        assert!(!ring.is_capturing(0));
        assert_eq!(stats.snapshot().frames_dx, 0);
    }

    #[test]
    fn test_stereo_signal_splits_frame() {
        let (mut capture, ring, stats) = controller(2);
        let device = MockProducer::new();
        capture.begin_capture(&device).unwrap();
        capture.on_stereo_signal(&device).unwrap();

        assert!(capture.stereo_enabled());
        assert_eq!(ring.channel(0), Channel::Left);
        assert!(ring.is_capturing(1));
        assert_eq!(capture.write_index(), 1);

        let surface_1 = ring.surface(1).unwrap();
        assert_eq!(
            device.calls().last().cloned(),
            Some(ProducerCall::SetViewport(device.current_viewport()))
        );
        assert!(device.calls().contains(&ProducerCall::SetRenderTarget(surface_1)));

        capture.end_capture(capture.present_channel());
        assert_eq!(ring.channel(1), Channel::Right);
        assert_eq!(capture.write_index(), 0);
        assert_eq!(stats.snapshot().frames_dx, 2);
    }

    #[test]
    fn test_stereo_latch_is_one_way() {
        let (mut capture, _, _) = controller(2);
        let device = MockProducer::new();
        capture.on_stereo_signal(&device).unwrap();
        for _ in 0..5 {
            capture.end_capture(capture.present_channel());
            capture.begin_capture(&device).unwrap();
            assert!(capture.stereo_enabled());
        }
        assert!(!capture.latch_stereo());
        assert_eq!(capture.present_channel(), Channel::Right);
    }
}
