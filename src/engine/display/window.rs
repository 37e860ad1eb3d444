use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::{
    DisplayBackend, DisplayEvent, DisplaySurface, EventHandler, EventSink, Flow, SourceWindow,
    SurfaceRequest,
};
use crate::engine::error::Result;
use crate::engine::frame::SharedSurfaceSet;
use crate::engine::interop::ObjectKind;
use crate::engine::lifecycle::ConsumerResources;
use crate::engine::present::{ConsumerGl, CopyMode, PaintReport, Presenter};
use crate::engine::settings::BridgeSettings;
use crate::engine::stats::FrameStats;
use crate::engine::sync::FrameDoneSignal;

/// ### English
/// Everything the display window needs from the producer side.
///
/// ### 中文
/// 显示窗口从生产者侧获得的全部输入。
pub struct WindowConfig {
    pub settings: BridgeSettings,
    /// ### English
    /// Producer multisample count the display surface should match (`0` = none).
    ///
    /// ### 中文
    /// 显示表面应匹配的生产者多重采样数（`0` = 无）。
    pub samples_dx: u32,
    pub ring: Arc<SharedSurfaceSet>,
    pub stats: Arc<FrameStats>,
    pub signal: Arc<FrameDoneSignal>,
    pub source: Arc<dyn SourceWindow>,
    pub events: EventSink,
}

/// ### English
/// The display surface laid over the source window, with the GL objects that read the ring.
///
/// Field order is drop order: the interop device closes before the GL context goes away.
///
/// ### 中文
/// 覆盖在源窗口之上的显示表面，以及读取环的 GL 对象。
///
/// 字段顺序即 drop 顺序：interop 设备先于 GL 上下文关闭。
pub struct DisplayWindow<B: DisplayBackend> {
    presenter: Presenter,
    resources: ConsumerResources,
    interop: B::Interop,
    gl: B::Gl,
    surface: B::Surface,
    source: Arc<dyn SourceWindow>,
    signal: Arc<FrameDoneSignal>,
    stats: Arc<FrameStats>,
}

impl<B: DisplayBackend> DisplayWindow<B> {
    /// ### English
    /// Creates the display surface, opens the interop device and registers every ring slot.
    ///
    /// Any failure drops whatever was created so far and returns the error; the caller decides
    /// how the session ends.
    ///
    /// ### 中文
    /// 创建显示表面、打开 interop 设备并注册所有环槽位。
    ///
    /// 任一步失败都会丢弃已创建的对象并返回错误；会话如何结束由调用方决定。
    pub fn create(backend: &mut B, config: WindowConfig) -> Result<Self> {
        let WindowConfig {
            settings,
            samples_dx,
            ring,
            stats,
            signal,
            source,
            events,
        } = config;

        source.suppress_background_erase();

        let samples = if settings.match_original_msaa {
            info!(samples_dx, "display surface will match the producer's multisampling");
            samples_dx
        } else {
            info!("display surface multisampling not matched to the producer");
            0
        };

        let request = SurfaceRequest {
            size: source.client_size(),
            samples,
            stereo: backend.stereo_available(),
            parent: source.handle(),
        };
        debug!(?request, "creating display surface");
        let surface = backend.create_surface(&request, events)?;
        if surface.samples() != samples {
            warn!(
                requested = samples,
                obtained = surface.samples(),
                "display surface multisampling differs from the request; interop registration may fail"
            );
        }

        let gl = backend.load_gl(&surface)?;
        let gl_info = gl.info();
        info!(
            version = %gl_info.version,
            vendor = %gl_info.vendor,
            renderer = %gl_info.renderer,
            samples = surface.samples(),
            max_texture_size = gl_info.max_texture_size,
            "display GL context"
        );

        let interop = backend.open_interop(&surface)?;
        let kind = if settings.use_texture {
            ObjectKind::Texture
        } else {
            ObjectKind::Renderbuffer
        };
        let resources = ConsumerResources::create(&gl, &interop, &ring, kind, surface.samples())?;

        let size = surface.size();
        gl.set_viewport(size);
        let presenter = Presenter::new(
            ring,
            stats.clone(),
            size,
            CopyMode::select(settings.use_texture, settings.match_original_msaa),
            settings.stereo_indicator,
        );

        Ok(Self {
            presenter,
            resources,
            interop,
            gl,
            surface,
            source,
            signal,
            stats,
        })
    }

    /// ### English
    /// Shows the surface without taking focus from the source window.
    ///
    /// ### 中文
    /// 显示表面但不从源窗口夺取焦点。
    pub fn show(&self) {
        self.surface.show_no_activate();
    }

    #[inline]
    pub fn pump_messages(&self) {
        self.surface.pump_messages();
    }

    #[inline]
    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn paint(&mut self) -> PaintReport {
        self.presenter.paint(
            &self.gl,
            &self.interop,
            &self.surface,
            self.resources.slots(),
            &self.signal,
        )
    }

    fn redraw(&mut self) {
        if !self.surface.request_redraw() {
            self.paint();
        }
    }

    /// ### English
    /// Releases the display-side slot objects and logs the session report. Idempotent.
    ///
    /// ### 中文
    /// 释放显示侧槽位对象并输出会话报告；幂等。
    pub fn teardown(&mut self) {
        if self.resources.is_destroyed() {
            return;
        }
        self.resources.destroy(&self.gl, &self.interop);
        self.stats.log_report();
    }
}

impl<B: DisplayBackend> EventHandler for DisplayWindow<B> {
    fn handle(&mut self, event: DisplayEvent) -> Flow {
        trace!(?event, "display event");
        match event {
            DisplayEvent::NewFrame => self.redraw(),
            DisplayEvent::Paint => {
                self.paint();
            }
            DisplayEvent::Resize(size) => {
                self.gl.set_viewport(size);
                self.presenter.set_size(size);
                self.redraw();
            }
            DisplayEvent::Input(input) => self.source.forward_input(input),
            DisplayEvent::Close => self.source.request_close(),
            DisplayEvent::Quit => return Flow::Exit,
        }
        Flow::Continue
    }
}

impl<B: DisplayBackend> Drop for DisplayWindow<B> {
    fn drop(&mut self) {
        self.resources.destroy(&self.gl, &self.interop);
    }
}

#[cfg(test)]
mod tests {
    use dpi::PhysicalSize;

    use super::*;
    use crate::engine::capture::CaptureController;
    use crate::engine::display::{ButtonAction, InputEvent, MouseButton};
    use crate::engine::error::BridgeError;
    use crate::engine::frame::Channel;
    use crate::engine::testing::{
        GlCall, MockBackend, MockProducer, MockSourceWindow, SourceCall, install_test_surfaces,
    };

    struct Fixture {
        backend: MockBackend,
        source: Arc<MockSourceWindow>,
        ring: Arc<SharedSurfaceSet>,
        stats: Arc<FrameStats>,
        signal: Arc<FrameDoneSignal>,
    }

    fn fixture() -> Fixture {
        let ring = Arc::new(SharedSurfaceSet::new(2));
        install_test_surfaces(&ring);
        Fixture {
            backend: MockBackend::new(),
            source: Arc::new(MockSourceWindow::new(PhysicalSize::new(800, 600))),
            ring,
            stats: Arc::new(FrameStats::new()),
            signal: Arc::new(FrameDoneSignal::new()),
        }
    }

    impl Fixture {
        fn config(&self, settings: BridgeSettings, samples_dx: u32) -> WindowConfig {
            WindowConfig {
                settings,
                samples_dx,
                ring: self.ring.clone(),
                stats: self.stats.clone(),
                signal: self.signal.clone(),
                source: self.source.clone(),
                events: EventSink::channel().0,
            }
        }

        fn window(&mut self) -> DisplayWindow<MockBackend> {
            let config = self.config(BridgeSettings::default(), 0);
            DisplayWindow::create(&mut self.backend, config).unwrap()
        }
    }

    #[test]
    fn test_create_requests_surface_over_source() {
        let mut fx = fixture();
        fx.backend.set_stereo_available(true);
        let config = fx.config(BridgeSettings::default(), 4);
        let window = DisplayWindow::create(&mut fx.backend, config).unwrap();

        let request = fx.backend.last_request().unwrap();
        assert_eq!(request.size, PhysicalSize::new(800, 600));
        assert_eq!(request.samples, 4);
        assert!(request.stereo);
        assert_eq!(request.parent, fx.source.handle());
        assert!(fx.source.calls().contains(&SourceCall::SuppressBackgroundErase));
        assert_eq!(window.presenter().size(), PhysicalSize::new(800, 600));
        assert_eq!(window.presenter().copy_mode(), CopyMode::Blit);
    }

    #[test]
    fn test_unmatched_msaa_requests_no_samples() {
        let mut fx = fixture();
        let settings = BridgeSettings {
            match_original_msaa: false,
            ..BridgeSettings::default()
        };
        let config = fx.config(settings, 8);
        DisplayWindow::create(&mut fx.backend, config).unwrap();
        assert_eq!(fx.backend.last_request().unwrap().samples, 0);
    }

    #[test]
    fn test_interop_open_failure_is_reported() {
        let mut fx = fixture();
        fx.backend.fail_open_interop(true);
        let config = fx.config(BridgeSettings::default(), 0);
        let result = DisplayWindow::create(&mut fx.backend, config);
        assert!(matches!(result, Err(BridgeError::InteropOpen)));
    }

    #[test]
    fn test_new_frame_paints_through_redraw() {
        let mut fx = fixture();
        let mut window = fx.window();
        let producer = MockProducer::new();
        let mut capture = CaptureController::new(fx.ring.clone(), fx.stats.clone());
        capture.begin_capture(&producer).unwrap();
        capture.end_capture(Channel::Mono);

        assert_eq!(window.handle(DisplayEvent::NewFrame), Flow::Continue);
        assert_eq!(window.presenter().read_index(), 1);
        assert_eq!(fx.backend.surface_swaps(), 1);
        assert!(fx.signal.wait_for_display(std::time::Duration::ZERO));
    }

    #[test]
    fn test_resize_updates_viewport_and_presenter() {
        let mut fx = fixture();
        let mut window = fx.window();
        let size = PhysicalSize::new(1024, 768);
        window.handle(DisplayEvent::Resize(size));
        assert_eq!(window.presenter().size(), size);
        assert!(fx.backend.gl_calls().contains(&GlCall::SetViewport(size)));
    }

    #[test]
    fn test_input_and_close_are_forwarded() {
        let mut fx = fixture();
        let mut window = fx.window();
        let click = InputEvent::MouseButton {
            button: MouseButton::Left,
            action: ButtonAction::DoubleClick,
            x: 10,
            y: 20,
            modifiers: 0,
        };
        window.handle(DisplayEvent::Input(click));
        window.handle(DisplayEvent::Close);
        let calls = fx.source.calls();
        assert!(calls.contains(&SourceCall::ForwardInput(click)));
        assert!(calls.contains(&SourceCall::RequestClose));
    }

    #[test]
    fn test_quit_exits_and_teardown_is_idempotent() {
        let mut fx = fixture();
        let mut window = fx.window();
        assert_eq!(window.handle(DisplayEvent::Quit), Flow::Exit);
        window.teardown();
        window.teardown();
        drop(window);
        assert_eq!(fx.backend.gl_live_objects(), 0);
    }
}
