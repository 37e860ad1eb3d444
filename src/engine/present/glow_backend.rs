//! ### English
//! `ConsumerGl` on top of `glow`.
//!
//! ### 中文
//! 基于 `glow` 的 `ConsumerGl` 实现。

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::num::NonZeroU32;

use dpi::PhysicalSize;
use glow::HasContext as _;
use tracing::{debug, warn};

use super::{ConsumerGl, ConsumerSlot, GlInfo};
use crate::engine::error::{BridgeError, Result};
use crate::engine::interop::ObjectKind;

/// ### English
/// Full-screen triangle strip generated from `gl_VertexID`; `uv.y` is flipped because the
/// producer's rows run top to bottom.
///
/// ### 中文
/// 由 `gl_VertexID` 生成的全屏三角形带；由于生产者的行序自上而下，`uv.y` 被翻转。
const QUAD_VERTEX_SHADER: &str = r#"#version 130
out vec2 uv;
void main() {
    vec2 corner = vec2(float(gl_VertexID & 1), float((gl_VertexID >> 1) & 1));
    uv = vec2(corner.x, 1.0 - corner.y);
    gl_Position = vec4(corner * 2.0 - 1.0, 0.0, 1.0);
}
"#;

const QUAD_FRAGMENT_SHADER: &str = r#"#version 130
uniform sampler2D source;
in vec2 uv;
out vec4 color;
void main() {
    color = texture(source, uv);
}
"#;

/// ### English
/// Lazily built program and vertex array for the textured-quad copy.
///
/// ### 中文
/// 纹理四边形复制所用的程序与顶点数组（延迟构建）。
struct QuadProgram {
    program: glow::NativeProgram,
    vertex_array: glow::NativeVertexArray,
    source: Option<glow::NativeUniformLocation>,
}

/// ### English
/// Display-thread GL wrapper. Not `Send`: lives with the context that is current on the display
/// thread.
///
/// ### 中文
/// 显示线程的 GL 封装；不是 `Send`，与显示线程上的当前上下文同生命周期。
pub struct GlowConsumer {
    gl: glow::Context,
    quad: RefCell<Option<QuadProgram>>,
    /// ### English
    /// Set once quad program creation failed; later draws fail fast.
    ///
    /// ### 中文
    /// 四边形程序创建失败后置位；之后的绘制直接失败。
    quad_failed: Cell<bool>,
}

impl GlowConsumer {
    /// ### English
    /// Loads GL entry points for the context that is current on the calling thread.
    ///
    /// # Safety
    /// A GL context must be current and `loader` must return valid addresses for it.
    ///
    /// ### 中文
    /// 为调用线程上的当前上下文加载 GL 入口点。
    ///
    /// # Safety
    /// 必须已有当前 GL 上下文，且 `loader` 返回对该上下文有效的地址。
    pub unsafe fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        Self::new(unsafe { glow::Context::from_loader_function(loader) })
    }

    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            quad: RefCell::new(None),
            quad_failed: Cell::new(false),
        }
    }

    fn build_quad(&self) -> std::result::Result<QuadProgram, String> {
        let gl = &self.gl;
        unsafe {
            let program = gl.create_program()?;
            let mut shaders = Vec::with_capacity(2);
            for (kind, source) in [
                (glow::VERTEX_SHADER, QUAD_VERTEX_SHADER),
                (glow::FRAGMENT_SHADER, QUAD_FRAGMENT_SHADER),
            ] {
                let shader = gl.create_shader(kind)?;
                gl.shader_source(shader, source);
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    let log = gl.get_shader_info_log(shader);
                    gl.delete_shader(shader);
                    for attached in shaders {
                        gl.delete_shader(attached);
                    }
                    gl.delete_program(program);
                    return Err(log);
                }
                gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }
            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(log);
            }

            let vertex_array = match gl.create_vertex_array() {
                Ok(vertex_array) => vertex_array,
                Err(err) => {
                    gl.delete_program(program);
                    return Err(err);
                }
            };
            let source = gl.get_uniform_location(program, "source");
            debug!("textured quad program ready");
            Ok(QuadProgram {
                program,
                vertex_array,
                source,
            })
        }
    }
}

#[inline]
fn name(raw: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(raw)
}

impl ConsumerGl for GlowConsumer {
    fn info(&self) -> GlInfo {
        unsafe {
            GlInfo {
                version: self.gl.get_parameter_string(glow::VERSION),
                vendor: self.gl.get_parameter_string(glow::VENDOR),
                renderer: self.gl.get_parameter_string(glow::RENDERER),
                max_texture_size: self.gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE),
            }
        }
    }

    fn create_color_object(&self, kind: ObjectKind) -> Result<u32> {
        let created = unsafe {
            match kind {
                ObjectKind::Texture => self.gl.create_texture().map(|texture| texture.0.get()),
                ObjectKind::Renderbuffer => self
                    .gl
                    .create_renderbuffer()
                    .map(|renderbuffer| renderbuffer.0.get()),
            }
        };
        created.map_err(|err| {
            warn!(?kind, %err, "colour object creation failed");
            BridgeError::GlObject {
                what: match kind {
                    ObjectKind::Texture => "texture",
                    ObjectKind::Renderbuffer => "renderbuffer",
                },
            }
        })
    }

    fn delete_color_object(&self, kind: ObjectKind, object: u32) {
        let Some(object) = name(object) else {
            return;
        };
        unsafe {
            match kind {
                ObjectKind::Texture => self.gl.delete_texture(glow::NativeTexture(object)),
                ObjectKind::Renderbuffer => {
                    self.gl.delete_renderbuffer(glow::NativeRenderbuffer(object))
                }
            }
        }
    }

    fn create_framebuffer(&self) -> Result<u32> {
        unsafe { self.gl.create_framebuffer() }
            .map(|framebuffer| framebuffer.0.get())
            .map_err(|err| {
                warn!(%err, "framebuffer creation failed");
                BridgeError::GlObject { what: "framebuffer" }
            })
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        if let Some(framebuffer) = name(framebuffer) {
            unsafe { self.gl.delete_framebuffer(glow::NativeFramebuffer(framebuffer)) };
        }
    }

    fn attach_color(&self, slot: &ConsumerSlot) -> u32 {
        let gl = &self.gl;
        unsafe {
            gl.bind_framebuffer(
                glow::FRAMEBUFFER,
                name(slot.framebuffer).map(glow::NativeFramebuffer),
            );
            match slot.kind {
                ObjectKind::Texture => gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    glow::COLOR_ATTACHMENT0,
                    slot.target,
                    name(slot.object).map(glow::NativeTexture),
                    0,
                ),
                ObjectKind::Renderbuffer => gl.framebuffer_renderbuffer(
                    glow::FRAMEBUFFER,
                    glow::COLOR_ATTACHMENT0,
                    glow::RENDERBUFFER,
                    name(slot.object).map(glow::NativeRenderbuffer),
                ),
            }
            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            status
        }
    }

    fn set_viewport(&self, size: PhysicalSize<u32>) {
        unsafe {
            self.gl
                .viewport(0, 0, size.width as i32, size.height as i32);
        }
    }

    fn bind_default_framebuffer(&self) {
        unsafe { self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None) };
    }

    fn select_draw_buffer(&self, buffer: u32) {
        unsafe { self.gl.draw_buffer(buffer) };
    }

    fn blit_flipped(&self, framebuffer: u32, size: PhysicalSize<u32>) {
        let (width, height) = (size.width as i32, size.height as i32);
        unsafe {
            self.gl.bind_framebuffer(
                glow::READ_FRAMEBUFFER,
                name(framebuffer).map(glow::NativeFramebuffer),
            );
            self.gl.blit_framebuffer(
                0,
                0,
                width,
                height,
                0,
                height,
                width,
                0,
                glow::COLOR_BUFFER_BIT,
                glow::LINEAR,
            );
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
        }
    }

    fn draw_textured_quad(&self, texture: u32) -> Result<()> {
        if self.quad_failed.get() {
            return Err(BridgeError::GlObject { what: "quad program" });
        }
        let mut quad = self.quad.borrow_mut();
        if quad.is_none() {
            match self.build_quad() {
                Ok(built) => *quad = Some(built),
                Err(err) => {
                    warn!(%err, "textured quad program failed to build");
                    self.quad_failed.set(true);
                    return Err(BridgeError::GlObject { what: "quad program" });
                }
            }
        }
        let Some(quad) = quad.as_ref() else {
            return Err(BridgeError::GlObject { what: "quad program" });
        };

        let gl = &self.gl;
        unsafe {
            gl.use_program(Some(quad.program));
            gl.bind_vertex_array(Some(quad.vertex_array));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, name(texture).map(glow::NativeTexture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.uniform_1_i32(quad.source.as_ref(), 0);
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
        Ok(())
    }

    fn fill_corner(&self, buffer: u32, size: u32, rgb: [f32; 3]) {
        let gl = &self.gl;
        unsafe {
            gl.draw_buffer(buffer);
            gl.enable(glow::SCISSOR_TEST);
            gl.scissor(0, 0, size as i32, size as i32);
            gl.clear_color(rgb[0], rgb[1], rgb[2], 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.disable(glow::SCISSOR_TEST);
        }
    }
}

impl Drop for GlowConsumer {
    fn drop(&mut self) {
        if let Some(quad) = self.quad.get_mut().take() {
            unsafe {
                self.gl.delete_vertex_array(quad.vertex_array);
                self.gl.delete_program(quad.program);
            }
        }
    }
}
