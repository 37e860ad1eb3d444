//! ### English
//! Diagnostic frame counters. Nothing here influences the hand-off itself.
//!
//! ### 中文
//! 诊断用的帧计数器；这里的数据不影响交接本身。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::info;

/// ### English
/// Counters shared by the producer thread and the display thread.
///
/// ### 中文
/// 生产者线程与显示线程共享的计数器。
pub struct FrameStats {
    /// ### English
    /// Reference point for the frame timestamps.
    ///
    /// ### 中文
    /// 帧时间戳的参考起点。
    epoch: Instant,
    /// ### English
    /// Producer frames captured while in stereo mode (one per eye).
    ///
    /// ### 中文
    /// 立体模式下捕获的生产者帧数（每只眼各计一次）。
    frames_dx: AtomicU64,
    /// ### English
    /// Display passes completed while in stereo mode.
    ///
    /// ### 中文
    /// 立体模式下完成的显示轮次。
    frames_gl: AtomicU64,
    first_frame_us: AtomicU64,
    last_frame_us: AtomicU64,
    wait_timeouts: AtomicU64,
    lock_failures: AtomicU64,
    presented_targets: AtomicU64,
}

/// ### English
/// Point-in-time copy of `FrameStats`.
///
/// ### 中文
/// `FrameStats` 的某一时刻快照。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatsSnapshot {
    pub frames_dx: u64,
    pub frames_gl: u64,
    /// ### English
    /// Seconds between the first and the latest counted display pass.
    ///
    /// ### 中文
    /// 第一次与最近一次计数的显示轮次之间的秒数。
    pub elapsed_secs: f64,
    pub wait_timeouts: u64,
    pub lock_failures: u64,
    pub presented_targets: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            frames_dx: AtomicU64::new(0),
            frames_gl: AtomicU64::new(0),
            first_frame_us: AtomicU64::new(0),
            last_frame_us: AtomicU64::new(0),
            wait_timeouts: AtomicU64::new(0),
            lock_failures: AtomicU64::new(0),
            presented_targets: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn count_producer_frame(&self) {
        self.frames_dx.fetch_add(1, Ordering::Relaxed);
    }

    /// ### English
    /// Records one completed stereo display pass at the current time.
    ///
    /// ### 中文
    /// 以当前时间记录一次完成的立体显示轮次。
    pub fn record_consumer_frame(&self) {
        self.record_consumer_frame_at(Instant::now());
    }

    /// ### English
    /// Records one completed stereo display pass at `now`.
    ///
    /// The first pass sets the start timestamp, later passes move the end timestamp. Only the
    /// display thread calls this.
    ///
    /// ### 中文
    /// 以 `now` 记录一次完成的立体显示轮次。
    ///
    /// 第一次记录起始时间戳，之后更新结束时间戳；只由显示线程调用。
    pub fn record_consumer_frame_at(&self, now: Instant) {
        let micros = now.saturating_duration_since(self.epoch).as_micros() as u64;
        if self.frames_gl.load(Ordering::Relaxed) == 0 {
            self.first_frame_us.store(micros, Ordering::Relaxed);
        } else {
            self.last_frame_us.store(micros, Ordering::Relaxed);
        }
        self.frames_gl.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_timeout(&self) {
        self.wait_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_lock_failure(&self) {
        self.lock_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn set_presented_targets(&self, count: usize) {
        self.presented_targets
            .store(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let first = self.first_frame_us.load(Ordering::Relaxed);
        let last = self.last_frame_us.load(Ordering::Relaxed);
        StatsSnapshot {
            frames_dx: self.frames_dx.load(Ordering::Relaxed),
            frames_gl: self.frames_gl.load(Ordering::Relaxed),
            elapsed_secs: last.saturating_sub(first) as f64 / 1_000_000.0,
            wait_timeouts: self.wait_timeouts.load(Ordering::Relaxed),
            lock_failures: self.lock_failures.load(Ordering::Relaxed),
            presented_targets: self.presented_targets.load(Ordering::Relaxed),
        }
    }

    /// ### English
    /// Logs the end-of-session summary.
    ///
    /// ### 中文
    /// 输出会话结束时的汇总日志。
    pub fn log_report(&self) {
        let snapshot = self.snapshot();
        info!(
            presented_targets = snapshot.presented_targets,
            frames_gl = snapshot.frames_gl,
            frames_dx = snapshot.frames_dx,
            wait_timeouts = snapshot.wait_timeouts,
            lock_failures = snapshot.lock_failures,
            "session statistics"
        );
        if let Some(metric) = snapshot.dx_gl_metric() {
            info!(metric, "DX/GL metric (tends towards 200 in stereo)");
        }
        if let Some(fps) = snapshot.fps() {
            info!("frame rate = {fps:.2} fps");
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSnapshot {
    /// ### English
    /// `100 * frames_dx / frames_gl`, or `None` before the first display pass.
    ///
    /// ### 中文
    /// `100 * frames_dx / frames_gl`；在第一次显示轮次之前为 `None`。
    pub fn dx_gl_metric(&self) -> Option<u64> {
        (self.frames_gl > 0).then(|| 100 * self.frames_dx / self.frames_gl)
    }

    /// ### English
    /// Average display rate over the counted passes; `None` if less than 10 ms elapsed.
    ///
    /// ### 中文
    /// 计数轮次内的平均显示帧率；经过时间不足 10 ms 时为 `None`。
    pub fn fps(&self) -> Option<f64> {
        (self.elapsed_secs > 0.01)
            .then(|| self.frames_gl.saturating_sub(1) as f64 / self.elapsed_secs)
    }
}
