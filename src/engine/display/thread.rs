//! ### English
//! Display thread entry point and dispatch loop.
//!
//! ### 中文
//! 显示线程入口与分发循环。

use std::thread;
use std::time::Duration;

use crossbeam_channel as channel;
use tracing::{error, info};

use super::window::{DisplayWindow, WindowConfig};
use super::{DisplayBackend, DisplayEvent, EventHandler, Flow};
use crate::engine::error::{BridgeError, Result};
use crate::engine::frame::SessionState;

/// ### English
/// Name given to the display thread.
///
/// ### 中文
/// 显示线程的名称。
pub const DISPLAY_THREAD_NAME: &str = "stereo-bridge-display";

/// ### English
/// How long the loop waits for an event before pumping native messages again.
///
/// ### 中文
/// 分发循环在再次泵送原生消息前等待事件的时长。
const IDLE_PUMP_INTERVAL: Duration = Duration::from_millis(4);

/// ### English
/// Everything moved onto the display thread.
///
/// ### 中文
/// 被移动到显示线程的全部内容。
pub struct DisplayThreadInit<B: DisplayBackend> {
    pub backend: B,
    pub window: WindowConfig,
    pub events: channel::Receiver<DisplayEvent>,
}

/// ### English
/// Spawns the display thread.
///
/// The producer does not wait for initialisation: the thread moves the session from `Starting`
/// to `Running` or `Failed` on its own.
///
/// ### 中文
/// 启动显示线程。
///
/// 生产者不等待其初始化完成：线程自行将会话从 `Starting` 推进到 `Running` 或 `Failed`。
pub fn spawn_display_thread<B: DisplayBackend>(
    init: DisplayThreadInit<B>,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name(DISPLAY_THREAD_NAME.to_string())
        .spawn(move || run_display_thread(init))
        .map_err(|err| BridgeError::Thread(err.to_string()))
}

fn run_display_thread<B: DisplayBackend>(init: DisplayThreadInit<B>) {
    info!("display thread started");

    let DisplayThreadInit {
        mut backend,
        window: config,
        events,
    } = init;
    let ring = config.ring.clone();
    let signal = config.signal.clone();
    let source = config.source.clone();

    let mut window = match DisplayWindow::create(&mut backend, config) {
        Ok(window) => window,
        Err(err) => {
            error!(%err, "failed to initialise display resources, ending session");
            ring.advance_session(SessionState::Starting, SessionState::Failed);
            source.post_quit();
            signal.signal_displayed();
            return;
        }
    };

    window.show();
    if !ring.advance_session(SessionState::Starting, SessionState::Running) {
        info!(session = ?ring.session(), "session ended during display start-up");
        window.teardown();
        return;
    }
    info!("display thread running");

    dispatch(&mut window, &events);

    window.teardown();
    info!("display thread exiting");
}

/// ### English
/// Runs the dispatch loop until the handler asks to exit or every sender is gone.
///
/// ### 中文
/// 运行分发循环，直到处理器请求退出或所有发送端都已关闭。
fn dispatch<B: DisplayBackend>(
    window: &mut DisplayWindow<B>,
    events: &channel::Receiver<DisplayEvent>,
) {
    loop {
        window.pump_messages();
        let event = match events.recv_timeout(IDLE_PUMP_INTERVAL) {
            Ok(event) => event,
            Err(channel::RecvTimeoutError::Timeout) => continue,
            Err(channel::RecvTimeoutError::Disconnected) => return,
        };
        if window.handle(event) == Flow::Exit {
            return;
        }
        for event in events.try_iter() {
            if window.handle(event) == Flow::Exit {
                return;
            }
        }
    }
}
