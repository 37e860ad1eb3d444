use std::sync::Arc;

use dpi::PhysicalSize;
use tracing::{trace, warn};

use super::{ConsumerGl, ConsumerSlot, CopyMode, STEREO_INDICATOR_SIZE, draw_buffer_for};
use crate::engine::display::DisplaySurface;
use crate::engine::frame::{Channel, SharedSurfaceSet};
use crate::engine::interop::{InteropDevice, ObjectKind};
use crate::engine::stats::FrameStats;
use crate::engine::sync::FrameDoneSignal;

/// ### English
/// What happened to one slot during a display pass.
///
/// ### 中文
/// 一次显示轮次中某个槽位的处理结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotOutcome {
    /// ### English
    /// Locked, copied to the output, unlocked.
    ///
    /// ### 中文
    /// 已加锁、复制到输出并解锁。
    Displayed,
    /// ### English
    /// The interop lock was refused; the slot was skipped.
    ///
    /// ### 中文
    /// interop 加锁被拒绝；该槽位被跳过。
    LockFailed,
    /// ### English
    /// The slot has no interop registration; the slot was skipped.
    ///
    /// ### 中文
    /// 该槽位没有 interop 注册；已跳过。
    Unregistered,
}

/// ### English
/// Slots visited by one display pass, in order.
///
/// ### 中文
/// 一次显示轮次按顺序访问过的槽位。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaintReport {
    pub slots: Vec<(usize, Channel, SlotOutcome)>,
}

impl PaintReport {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// ### English
    /// Number of slots actually copied to the output.
    ///
    /// ### 中文
    /// 实际复制到输出的槽位数量。
    pub fn displayed(&self) -> usize {
        self.slots
            .iter()
            .filter(|(_, _, outcome)| *outcome == SlotOutcome::Displayed)
            .count()
    }
}

/// ### English
/// Display-thread side of the hand-off. Owns the read cursor.
///
/// ### 中文
/// 交接中的显示线程一侧；持有读游标。
pub struct Presenter {
    ring: Arc<SharedSurfaceSet>,
    stats: Arc<FrameStats>,
    /// ### English
    /// Next slot to display (`0..ring.len()`).
    ///
    /// ### 中文
    /// 下一个要显示的槽位（`0..ring.len()`）。
    read_index: usize,
    /// ### English
    /// Output size in pixels; also the size of every shared surface.
    ///
    /// ### 中文
    /// 输出尺寸（像素）；也是每个共享表面的尺寸。
    size: PhysicalSize<u32>,
    copy_mode: CopyMode,
    stereo_indicator: bool,
}

impl Presenter {
    pub fn new(
        ring: Arc<SharedSurfaceSet>,
        stats: Arc<FrameStats>,
        size: PhysicalSize<u32>,
        copy_mode: CopyMode,
        stereo_indicator: bool,
    ) -> Self {
        Self {
            ring,
            stats,
            read_index: 0,
            size,
            copy_mode,
            stereo_indicator,
        }
    }

    #[inline]
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    #[inline]
    pub fn set_size(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
    }

    #[inline]
    pub fn copy_mode(&self) -> CopyMode {
        self.copy_mode
    }

    /// ### English
    /// Runs one full display pass: copies the handed-off slots, then flips the output and
    /// signals the producer.
    ///
    /// A pass that finds no handed-off slot under the read cursor does nothing: no flip, no
    /// signal. Repaints requested by the window system therefore never consume a slot the
    /// producer is still drawing into.
    ///
    /// ### 中文
    /// 执行一次完整的显示轮次：复制已交出的槽位，然后翻转输出并通知生产者。
    ///
    /// 若读游标处没有已交出的槽位，本轮什么都不做：不翻转、不发信号。
    /// 因此窗口系统请求的重绘永远不会消费生产者仍在绘制的槽位。
    pub fn paint<G, I, S>(
        &mut self,
        gl: &G,
        interop: &I,
        surface: &S,
        slots: &[ConsumerSlot],
        signal: &FrameDoneSignal,
    ) -> PaintReport
    where
        G: ConsumerGl + ?Sized,
        I: InteropDevice + ?Sized,
        S: DisplaySurface + ?Sized,
    {
        let report = self.present_pass(gl, interop, slots);
        if !report.is_empty() {
            self.finish_pass(gl, surface, signal, &report);
        }
        report
    }

    /// ### English
    /// Copies up to two consecutive slots: one mono slot, or a left slot followed by its right
    /// slot. A slot that cannot be locked is skipped but still consumed.
    ///
    /// A left slot is only taken together with its right slot; until the right eye is handed off
    /// the pair stays untouched.
    ///
    /// ### 中文
    /// 最多复制两个连续槽位：一个单目槽位，或一个左眼槽位及其后的右眼槽位。
    /// 无法加锁的槽位会被跳过，但仍视为已消费。
    ///
    /// 左眼槽位只会与其右眼槽位一起取走；右眼交出之前，这一对槽位保持不动。
    pub fn present_pass<G, I>(&mut self, gl: &G, interop: &I, slots: &[ConsumerSlot]) -> PaintReport
    where
        G: ConsumerGl + ?Sized,
        I: InteropDevice + ?Sized,
    {
        let mut report = PaintReport::default();
        if !self.ring.is_ready(self.read_index) {
            trace!(slot = self.read_index, "no handed-off frame to display");
            return report;
        }
        if self.ring.channel(self.read_index) == Channel::Left {
            let right = (self.read_index + 1) % self.ring.len();
            if !self.ring.is_ready(right) {
                trace!(slot = self.read_index, "left eye handed off, right eye still in flight");
                return report;
            }
        }

        gl.bind_default_framebuffer();

        for _eye in 0..2 {
            let slot = self.read_index;
            if !self.ring.is_ready(slot) {
                break;
            }

            let channel = self.ring.channel(slot);
            trace!(slot, ?channel, "display slot");
            gl.select_draw_buffer(draw_buffer_for(channel));

            let outcome = self.copy_slot(gl, interop, slot, slots.get(slot));

            self.ring.consume(slot);
            self.read_index = (slot + 1) % self.ring.len();
            report.slots.push((slot, channel, outcome));

            if channel != Channel::Left {
                break;
            }
        }
        report
    }

    /// ### English
    /// Indicator, flip, signal, and (in stereo mode) frame-rate bookkeeping.
    ///
    /// ### 中文
    /// 指示块、翻转、发信号，以及（立体模式下）帧率统计。
    pub fn finish_pass<G, S>(&self, gl: &G, surface: &S, signal: &FrameDoneSignal, report: &PaintReport)
    where
        G: ConsumerGl + ?Sized,
        S: DisplaySurface + ?Sized,
    {
        if self.stereo_indicator {
            gl.fill_corner(glow::BACK_LEFT, STEREO_INDICATOR_SIZE, [0.0, 0.0, 1.0]);
            gl.fill_corner(glow::BACK_RIGHT, STEREO_INDICATOR_SIZE, [1.0, 0.0, 0.0]);
        }

        surface.swap_buffers();
        signal.signal_displayed();
        trace!("display swap");

        if self.ring.stereo_enabled() && report.displayed() > 0 {
            self.stats.record_consumer_frame();
        }
    }

    fn copy_slot<G, I>(
        &mut self,
        gl: &G,
        interop: &I,
        slot: usize,
        consumer: Option<&ConsumerSlot>,
    ) -> SlotOutcome
    where
        G: ConsumerGl + ?Sized,
        I: InteropDevice + ?Sized,
    {
        let Some((consumer, object)) = consumer.and_then(|c| c.interop.map(|object| (c, object)))
        else {
            warn!(slot, "unable to lock slot on paint: not registered");
            self.stats.record_lock_failure();
            return SlotOutcome::Unregistered;
        };

        if !interop.lock(object) {
            warn!(slot, "unable to lock slot on paint");
            self.stats.record_lock_failure();
            return SlotOutcome::LockFailed;
        }
        self.ring.begin_read(slot);

        match self.mode_for(consumer) {
            CopyMode::Blit => gl.blit_flipped(consumer.framebuffer, self.size),
            CopyMode::TexturedQuad => {
                if let Err(err) = gl.draw_textured_quad(consumer.object) {
                    warn!(%err, "textured quad unavailable, presenting with blit");
                    self.copy_mode = CopyMode::Blit;
                    gl.blit_flipped(consumer.framebuffer, self.size);
                }
            }
        }

        self.ring.end_read(slot);
        if !interop.unlock(object) {
            warn!(slot, "unable to unlock slot after paint");
        }
        SlotOutcome::Displayed
    }

    /// ### English
    /// Multisampled textures cannot be sampled by the quad shader, so they are blitted.
    ///
    /// ### 中文
    /// 多重采样纹理无法被四边形着色器采样，因此改用 blit。
    fn mode_for(&self, consumer: &ConsumerSlot) -> CopyMode {
        match self.copy_mode {
            CopyMode::TexturedQuad
                if consumer.kind == ObjectKind::Texture && consumer.target == glow::TEXTURE_2D =>
            {
                CopyMode::TexturedQuad
            }
            _ => CopyMode::Blit,
        }
    }
}
