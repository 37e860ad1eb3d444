//! ### English
//! In-memory stand-ins for the producer device, the display platform, GL and interop, used by
//! unit tests across the engine. Every double records the calls it receives.
//!
//! ### 中文
//! 供引擎各处单元测试使用的内存替身：生产者设备、显示平台、GL 与 interop。
//! 每个替身都会记录收到的调用。
use std::collections::HashSet;
use std::sync::Arc;

use dpi::PhysicalSize;
use parking_lot::Mutex;

use super::display::{
    DisplayBackend, DisplaySurface, EventSink, InputEvent, SourceWindow, SurfaceRequest,
};
use super::error::{BridgeError, Result};
use super::frame::{SharedSurface, SharedSurfaceSet};
use super::interop::{InteropDevice, InteropObject, ObjectKind};
use super::present::{ConsumerGl, ConsumerSlot, GlInfo};
use super::producer::{PixelFormat, ProducerDevice, SurfaceDesc, TargetId};
use super::stereo::Viewport;

/// ### English
/// Publishes a distinct fake surface in every ring slot.
///
/// ### 中文
/// 在每个环槽位发布一个互不相同的假表面。
pub fn install_test_surfaces(ring: &SharedSurfaceSet) {
    for slot in 0..ring.len() {
        ring.install(
            slot,
            SharedSurface {
                surface: 0x1000 + slot,
                share_handle: 0x2000 + slot,
            },
        );
    }
}

/// ### English
/// Registers every published ring surface with `interop` and returns ready-to-present slots.
///
/// ### 中文
/// 将所有已发布的环表面注册到 `interop`，并返回可直接呈现的槽位。
pub fn registered_slots(
    ring: &SharedSurfaceSet,
    interop: &MockInterop,
    kind: ObjectKind,
) -> Vec<ConsumerSlot> {
    let target = kind.gl_target(0);
    (0..ring.len())
        .map(|slot| {
            let object = slot as u32 + 1;
            let registered = ring
                .surface(slot)
                .and_then(|surface| interop.register(&surface, object, target));
            ConsumerSlot {
                object,
                kind,
                target,
                framebuffer: 100 + slot as u32 + 1,
                interop: registered,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------------------------
// Producer
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum ProducerCall {
    CreateRenderTarget(SurfaceDesc),
    SetRenderTarget(SharedSurface),
    SetViewport(Viewport),
    ReleaseRenderTarget(SharedSurface),
    RestoreOutputTarget,
}

struct ProducerState {
    calls: Vec<ProducerCall>,
    viewport: Viewport,
    target: Option<TargetId>,
    target_desc: Option<SurfaceDesc>,
    display_format: Option<PixelFormat>,
    has_window: bool,
    fail_set_render_target: bool,
    fail_create_after: Option<usize>,
    created: usize,
    live: usize,
}

#[derive(Clone)]
pub struct MockProducer {
    state: Arc<Mutex<ProducerState>>,
    source: Arc<MockSourceWindow>,
}

impl MockProducer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProducerState {
                calls: Vec::new(),
                viewport: Viewport {
                    x: 0,
                    y: 0,
                    width: 800,
                    height: 600,
                    min_z: 0.0,
                    max_z: 1.0,
                },
                target: Some(TargetId(1)),
                target_desc: Some(SurfaceDesc {
                    size: PhysicalSize::new(800, 600),
                    format: PixelFormat(21),
                    samples: 0,
                }),
                display_format: Some(PixelFormat::X8R8G8B8),
                has_window: true,
                fail_set_render_target: false,
                fail_create_after: None,
                created: 0,
                live: 0,
            })),
            source: Arc::new(MockSourceWindow::new(PhysicalSize::new(800, 600))),
        }
    }

    pub fn calls(&self) -> Vec<ProducerCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn current_viewport(&self) -> Viewport {
        self.state.lock().viewport
    }

    pub fn target_desc(&self) -> Option<SurfaceDesc> {
        self.state.lock().target_desc
    }

    pub fn set_target_desc(&self, desc: Option<SurfaceDesc>) {
        self.state.lock().target_desc = desc;
    }

    pub fn set_current_target(&self, target: Option<TargetId>) {
        self.state.lock().target = target;
    }

    pub fn set_display_format(&self, format: Option<PixelFormat>) {
        self.state.lock().display_format = format;
    }

    pub fn set_has_window(&self, has_window: bool) {
        self.state.lock().has_window = has_window;
    }

    pub fn fail_set_render_target(&self, fail: bool) {
        self.state.lock().fail_set_render_target = fail;
    }

    /// ### English
    /// Lets `count` render targets be created, then fails every further creation.
    ///
    /// ### 中文
    /// 允许创建 `count` 个渲染目标，之后的创建全部失败。
    pub fn fail_create_after(&self, count: usize) {
        self.state.lock().fail_create_after = Some(count);
    }

    /// ### English
    /// Render targets created and not yet released.
    ///
    /// ### 中文
    /// 已创建且尚未释放的渲染目标数。
    pub fn live_surfaces(&self) -> usize {
        self.state.lock().live
    }

    pub fn source(&self) -> Arc<MockSourceWindow> {
        self.source.clone()
    }
}

impl ProducerDevice for MockProducer {
    fn current_render_target(&self) -> Option<TargetId> {
        self.state.lock().target
    }

    fn render_target_desc(&self) -> Option<SurfaceDesc> {
        self.state.lock().target_desc
    }

    fn viewport(&self) -> Option<Viewport> {
        Some(self.state.lock().viewport)
    }

    fn set_viewport(&self, viewport: &Viewport) {
        let mut state = self.state.lock();
        state.viewport = *viewport;
        state.calls.push(ProducerCall::SetViewport(*viewport));
    }

    fn display_format(&self) -> Option<PixelFormat> {
        self.state.lock().display_format
    }

    fn depth_stencil_format(&self) -> Option<PixelFormat> {
        Some(PixelFormat(75))
    }

    fn create_render_target(&self, desc: &SurfaceDesc) -> Result<SharedSurface> {
        let mut state = self.state.lock();
        state.calls.push(ProducerCall::CreateRenderTarget(*desc));
        if state
            .fail_create_after
            .is_some_and(|count| state.created >= count)
        {
            return Err(BridgeError::SurfaceCreate {
                slot: state.created,
            });
        }
        state.created += 1;
        state.live += 1;
        Ok(SharedSurface {
            surface: 0x100 + state.created,
            share_handle: 0x200 + state.created,
        })
    }

    fn set_render_target(&self, surface: &SharedSurface) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(ProducerCall::SetRenderTarget(*surface));
        if state.fail_set_render_target {
            return Err(BridgeError::RenderTarget);
        }
        Ok(())
    }

    fn release_render_target(&self, surface: SharedSurface) {
        let mut state = self.state.lock();
        state.calls.push(ProducerCall::ReleaseRenderTarget(surface));
        state.live = state.live.saturating_sub(1);
    }

    fn restore_output_target(&self) {
        self.state.lock().calls.push(ProducerCall::RestoreOutputTarget);
    }

    fn focus_window(&self) -> Option<Arc<dyn SourceWindow>> {
        if self.state.lock().has_window {
            Some(self.source.clone())
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------------------------
// Source window
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceCall {
    SuppressBackgroundErase,
    ForwardInput(InputEvent),
    RequestClose,
    PostQuit,
}

pub struct MockSourceWindow {
    size: PhysicalSize<u32>,
    calls: Mutex<Vec<SourceCall>>,
}

impl MockSourceWindow {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            size,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().clone()
    }
}

impl SourceWindow for MockSourceWindow {
    fn handle(&self) -> usize {
        0xC0DE
    }

    fn client_size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn suppress_background_erase(&self) {
        self.calls.lock().push(SourceCall::SuppressBackgroundErase);
    }

    fn forward_input(&self, event: InputEvent) {
        self.calls.lock().push(SourceCall::ForwardInput(event));
    }

    fn request_close(&self) {
        self.calls.lock().push(SourceCall::RequestClose);
    }

    fn post_quit(&self) {
        self.calls.lock().push(SourceCall::PostQuit);
    }
}

// ---------------------------------------------------------------------------------------------
// Interop
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteropCall {
    SetShareHandle(SharedSurface),
    Register(SharedSurface),
    Lock(InteropObject),
    Unlock(InteropObject),
    Unregister(InteropObject),
}

#[derive(Default)]
struct InteropState {
    calls: Vec<InteropCall>,
    next_object: usize,
    registrations: usize,
    fail_share_handle: bool,
    fail_register_at: Option<usize>,
    failing_locks: HashSet<InteropObject>,
    locks: usize,
    unlocks: usize,
}

#[derive(Clone, Default)]
pub struct MockInterop {
    state: Arc<Mutex<InteropState>>,
}

impl MockInterop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<InteropCall> {
        self.state.lock().calls.clone()
    }

    pub fn fail_share_handle(&self, fail: bool) {
        self.state.lock().fail_share_handle = fail;
    }

    /// ### English
    /// Makes the `index`-th registration (0-based) fail.
    ///
    /// ### 中文
    /// 使第 `index` 次注册（从 0 开始）失败。
    pub fn fail_register_at(&self, index: usize) {
        self.state.lock().fail_register_at = Some(index);
    }

    pub fn fail_lock(&self, object: InteropObject) {
        self.state.lock().failing_locks.insert(object);
    }

    /// ### English
    /// Lock attempts, refused ones included.
    ///
    /// ### 中文
    /// 加锁尝试次数（包括被拒绝的）。
    pub fn lock_count(&self) -> usize {
        self.state.lock().locks
    }

    pub fn unlock_count(&self) -> usize {
        self.state.lock().unlocks
    }
}

impl InteropDevice for MockInterop {
    fn set_share_handle(&self, surface: &SharedSurface) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(InteropCall::SetShareHandle(*surface));
        if state.fail_share_handle {
            return Err(BridgeError::MissingEntryPoint("wglDXSetResourceShareHandleNV"));
        }
        Ok(())
    }

    fn register(&self, surface: &SharedSurface, _name: u32, _target: u32) -> Option<InteropObject> {
        let mut state = self.state.lock();
        state.calls.push(InteropCall::Register(*surface));
        let index = state.registrations;
        state.registrations += 1;
        if state.fail_register_at == Some(index) {
            return None;
        }
        state.next_object += 1;
        InteropObject::from_raw(state.next_object)
    }

    fn lock(&self, object: InteropObject) -> bool {
        let mut state = self.state.lock();
        state.calls.push(InteropCall::Lock(object));
        state.locks += 1;
        !state.failing_locks.contains(&object)
    }

    fn unlock(&self, object: InteropObject) -> bool {
        let mut state = self.state.lock();
        state.calls.push(InteropCall::Unlock(object));
        state.unlocks += 1;
        true
    }

    fn unregister(&self, object: InteropObject) -> bool {
        self.state.lock().calls.push(InteropCall::Unregister(object));
        true
    }
}

// ---------------------------------------------------------------------------------------------
// GL
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    CreateColorObject(ObjectKind, u32),
    DeleteColorObject(ObjectKind, u32),
    CreateFramebuffer(u32),
    DeleteFramebuffer(u32),
    AttachColor(ConsumerSlot),
    SetViewport(PhysicalSize<u32>),
    BindDefaultFramebuffer,
    SelectDrawBuffer(u32),
    BlitFlipped(u32, PhysicalSize<u32>),
    DrawTexturedQuad(u32),
    FillCorner(u32, u32, [f32; 3]),
}

struct GlState {
    calls: Vec<GlCall>,
    next_name: u32,
    live: usize,
    framebuffer_status: u32,
    fail_textured_quad: bool,
}

#[derive(Clone)]
pub struct MockGl {
    state: Arc<Mutex<GlState>>,
}

impl MockGl {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GlState {
                calls: Vec::new(),
                next_name: 0,
                live: 0,
                framebuffer_status: glow::FRAMEBUFFER_COMPLETE,
                fail_textured_quad: false,
            })),
        }
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.lock().calls.clone()
    }

    pub fn set_framebuffer_status(&self, status: u32) {
        self.state.lock().framebuffer_status = status;
    }

    pub fn fail_textured_quad(&self, fail: bool) {
        self.state.lock().fail_textured_quad = fail;
    }

    /// ### English
    /// Colour objects and framebuffers created and not yet deleted.
    ///
    /// ### 中文
    /// 已创建且尚未删除的颜色对象与帧缓冲数。
    pub fn live_objects(&self) -> usize {
        self.state.lock().live
    }

    fn record(&self, call: GlCall) {
        self.state.lock().calls.push(call);
    }

    fn allocate(&self) -> u32 {
        let mut state = self.state.lock();
        state.next_name += 1;
        state.live += 1;
        state.next_name
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.live = state.live.saturating_sub(1);
    }
}

impl ConsumerGl for MockGl {
    fn info(&self) -> GlInfo {
        GlInfo {
            version: "4.6 mock".to_string(),
            vendor: "stereo-bridge".to_string(),
            renderer: "MockGl".to_string(),
            max_texture_size: 16384,
        }
    }

    fn create_color_object(&self, kind: ObjectKind) -> Result<u32> {
        let name = self.allocate();
        self.record(GlCall::CreateColorObject(kind, name));
        Ok(name)
    }

    fn delete_color_object(&self, kind: ObjectKind, object: u32) {
        self.release();
        self.record(GlCall::DeleteColorObject(kind, object));
    }

    fn create_framebuffer(&self) -> Result<u32> {
        let name = self.allocate();
        self.record(GlCall::CreateFramebuffer(name));
        Ok(name)
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.release();
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn attach_color(&self, slot: &ConsumerSlot) -> u32 {
        self.record(GlCall::AttachColor(*slot));
        self.state.lock().framebuffer_status
    }

    fn set_viewport(&self, size: PhysicalSize<u32>) {
        self.record(GlCall::SetViewport(size));
    }

    fn bind_default_framebuffer(&self) {
        self.record(GlCall::BindDefaultFramebuffer);
    }

    fn select_draw_buffer(&self, buffer: u32) {
        self.record(GlCall::SelectDrawBuffer(buffer));
    }

    fn blit_flipped(&self, framebuffer: u32, size: PhysicalSize<u32>) {
        self.record(GlCall::BlitFlipped(framebuffer, size));
    }

    fn draw_textured_quad(&self, texture: u32) -> Result<()> {
        if self.state.lock().fail_textured_quad {
            return Err(BridgeError::GlObject {
                what: "quad program",
            });
        }
        self.record(GlCall::DrawTexturedQuad(texture));
        Ok(())
    }

    fn fill_corner(&self, buffer: u32, size: u32, rgb: [f32; 3]) {
        self.record(GlCall::FillCorner(buffer, size, rgb));
    }
}

// ---------------------------------------------------------------------------------------------
// Display surface and backend
// ---------------------------------------------------------------------------------------------

struct SurfaceState {
    size: PhysicalSize<u32>,
    samples: u32,
    swaps: usize,
    shown: bool,
}

#[derive(Clone)]
pub struct MockSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl MockSurface {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self::with_samples(size, 0)
    }

    pub fn with_samples(size: PhysicalSize<u32>, samples: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState {
                size,
                samples,
                swaps: 0,
                shown: false,
            })),
        }
    }

    pub fn swaps(&self) -> usize {
        self.state.lock().swaps
    }

    pub fn is_shown(&self) -> bool {
        self.state.lock().shown
    }
}

impl DisplaySurface for MockSurface {
    fn samples(&self) -> u32 {
        self.state.lock().samples
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.state.lock().size
    }

    fn swap_buffers(&self) {
        self.state.lock().swaps += 1;
    }

    fn request_redraw(&self) -> bool {
        false
    }

    fn show_no_activate(&self) {
        self.state.lock().shown = true;
    }

    fn window_handle(&self) -> usize {
        0xD15
    }

    fn pump_messages(&self) {}
}

#[derive(Default)]
struct BackendState {
    stereo_available: bool,
    forced_samples: u32,
    fail_open_interop: bool,
    last_request: Option<SurfaceRequest>,
    surface: Option<MockSurface>,
    gl: Option<MockGl>,
    interop: Option<MockInterop>,
}

/// ### English
/// Display backend whose surface, GL and interop doubles stay observable after the backend has
/// moved onto the display thread (clones share state).
///
/// ### 中文
/// 显示后端替身；移入显示线程后，其表面、GL 与 interop 替身仍可观察（克隆共享状态）。
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stereo_available(&self, available: bool) {
        self.state.lock().stereo_available = available;
    }

    pub fn set_forced_samples(&self, samples: u32) {
        self.state.lock().forced_samples = samples;
    }

    pub fn fail_open_interop(&self, fail: bool) {
        self.state.lock().fail_open_interop = fail;
    }

    pub fn last_request(&self) -> Option<SurfaceRequest> {
        self.state.lock().last_request
    }

    pub fn surface_swaps(&self) -> usize {
        self.state.lock().surface.as_ref().map_or(0, MockSurface::swaps)
    }

    pub fn surface_shown(&self) -> bool {
        self.state
            .lock()
            .surface
            .as_ref()
            .is_some_and(MockSurface::is_shown)
    }

    pub fn gl_calls(&self) -> Vec<GlCall> {
        self.state
            .lock()
            .gl
            .as_ref()
            .map(MockGl::calls)
            .unwrap_or_default()
    }

    pub fn gl_live_objects(&self) -> usize {
        self.state.lock().gl.as_ref().map_or(0, MockGl::live_objects)
    }

    pub fn interop(&self) -> Option<MockInterop> {
        self.state.lock().interop.clone()
    }
}

impl DisplayBackend for MockBackend {
    type Surface = MockSurface;
    type Gl = MockGl;
    type Interop = MockInterop;

    fn probe_forced_samples(&self) -> u32 {
        self.state.lock().forced_samples
    }

    fn stereo_available(&self) -> bool {
        self.state.lock().stereo_available
    }

    fn create_surface(
        &mut self,
        request: &SurfaceRequest,
        _events: EventSink,
    ) -> Result<Self::Surface> {
        let surface = MockSurface::with_samples(request.size, request.samples);
        let mut state = self.state.lock();
        state.last_request = Some(*request);
        state.surface = Some(surface.clone());
        Ok(surface)
    }

    fn load_gl(&mut self, _surface: &Self::Surface) -> Result<Self::Gl> {
        let gl = MockGl::new();
        self.state.lock().gl = Some(gl.clone());
        Ok(gl)
    }

    fn open_interop(&mut self, _surface: &Self::Surface) -> Result<Self::Interop> {
        let mut state = self.state.lock();
        if state.fail_open_interop {
            return Err(BridgeError::InteropOpen);
        }
        let interop = MockInterop::new();
        state.interop = Some(interop.clone());
        Ok(interop)
    }
}
