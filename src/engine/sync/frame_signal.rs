use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// ### English
/// Auto-reset binary signal: "the display thread finished the last hand-off".
///
/// - `signal_displayed` sets the flag and wakes at most one waiter.
/// - `wait_for_display` consumes the flag, or gives up after the timeout.
///
/// No lock is held while the caller proceeds; the mutex only guards the flag itself.
///
/// ### 中文
/// 自动复位的二值信号：“显示线程已完成上一次交接”。
///
/// - `signal_displayed` 置位并最多唤醒一个等待者。
/// - `wait_for_display` 消费该标记，或在超时后放弃。
///
/// 调用方继续执行时不持有任何锁；互斥锁只保护标记本身。
#[derive(Default)]
pub struct FrameDoneSignal {
    /// ### English
    /// Pending signal flag.
    ///
    /// ### 中文
    /// 待消费的信号标记。
    signalled: Mutex<bool>,
    /// ### English
    /// Wakes the waiting producer.
    ///
    /// ### 中文
    /// 用于唤醒等待中的生产者。
    cond: Condvar,
}

impl FrameDoneSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Blocks until signalled or until `timeout` elapses.
    ///
    /// Returns `true` if a signal was consumed, `false` on timeout. A timeout is a liveness
    /// fallback, not an error: the caller proceeds either way.
    ///
    /// #### Parameters
    /// - `timeout`: Upper bound on the time spent blocked.
    ///
    /// ### 中文
    /// 阻塞直到收到信号或 `timeout` 到期。
    ///
    /// 消费到信号返回 `true`，超时返回 `false`。超时只是保证活性的兜底而不是错误：
    /// 调用方无论如何都会继续执行。
    ///
    /// #### 参数
    /// - `timeout`：阻塞时长上限。
    pub fn wait_for_display(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut signalled = self.signalled.lock();
        while !*signalled {
            if self.cond.wait_until(&mut signalled, deadline).timed_out() {
                break;
            }
        }
        std::mem::replace(&mut *signalled, false)
    }

    /// ### English
    /// Sets the signal and wakes at most one waiter. A signal with no waiter stays pending until
    /// the next wait consumes it.
    ///
    /// ### 中文
    /// 置位信号并最多唤醒一个等待者；无人等待时信号保持挂起，直到下一次等待将其消费。
    pub fn signal_displayed(&self) {
        let mut signalled = self.signalled.lock();
        *signalled = true;
        self.cond.notify_one();
    }

    /// ### English
    /// Drops a pending signal without waiting.
    ///
    /// ### 中文
    /// 丢弃挂起的信号（不等待）。
    pub fn reset(&self) {
        *self.signalled.lock() = false;
    }
}
