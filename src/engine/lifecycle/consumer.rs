use tracing::{debug, error, info, warn};

use crate::engine::error::{BridgeError, Result};
use crate::engine::frame::SharedSurfaceSet;
use crate::engine::interop::{InteropDevice, ObjectKind};
use crate::engine::present::{ConsumerGl, ConsumerSlot};

/// ### English
/// Display-side objects for every ring slot: colour object, interop registration, framebuffer.
///
/// Created and destroyed on the display thread with its GL context current.
///
/// ### 中文
/// 每个环槽位在显示侧的对象：颜色对象、interop 注册与帧缓冲。
///
/// 在显示线程、其 GL 上下文为当前上下文时创建与销毁。
pub struct ConsumerResources {
    slots: Vec<ConsumerSlot>,
    /// ### English
    /// Set once `destroy` ran.
    ///
    /// ### 中文
    /// `destroy` 执行后置位。
    destroyed: bool,
}

impl ConsumerResources {
    /// ### English
    /// Creates and registers the display-side objects for every published ring surface.
    ///
    /// Any failure destroys what was created so far and reports the slot that failed.
    ///
    /// #### Parameters
    /// - `gl`: Display GL context wrapper.
    /// - `interop`: Open interop device.
    /// - `ring`: Ring whose surfaces were published by the producer thread.
    /// - `kind`: Register slots as textures or renderbuffers.
    /// - `display_samples`: Multisample count of the display surface.
    ///
    /// ### 中文
    /// 为每个已发布的环表面创建并注册显示侧对象。
    ///
    /// 任一步失败都会销毁此前已创建的对象，并报告失败的槽位。
    ///
    /// #### 参数
    /// - `gl`：显示 GL 上下文封装。
    /// - `interop`：已打开的 interop 设备。
    /// - `ring`：生产者线程已发布表面的环。
    /// - `kind`：以纹理或 renderbuffer 注册槽位。
    /// - `display_samples`：显示表面的多重采样数。
    pub fn create<G, I>(
        gl: &G,
        interop: &I,
        ring: &SharedSurfaceSet,
        kind: ObjectKind,
        display_samples: u32,
    ) -> Result<Self>
    where
        G: ConsumerGl + ?Sized,
        I: InteropDevice + ?Sized,
    {
        let target = kind.gl_target(display_samples);
        info!(?kind, target, slots = ring.len(), "creating display-side slot objects");

        let mut resources = Self {
            slots: Vec::with_capacity(ring.len()),
            destroyed: false,
        };
        for slot in 0..ring.len() {
            if let Err(err) = resources.create_slot(gl, interop, ring, slot, kind, target) {
                error!(slot, %err, "display-side slot creation failed");
                resources.destroy(gl, interop);
                return Err(err);
            }
        }
        Ok(resources)
    }

    fn create_slot<G, I>(
        &mut self,
        gl: &G,
        interop: &I,
        ring: &SharedSurfaceSet,
        slot: usize,
        kind: ObjectKind,
        target: u32,
    ) -> Result<()>
    where
        G: ConsumerGl + ?Sized,
        I: InteropDevice + ?Sized,
    {
        let surface = ring
            .surface(slot)
            .ok_or(BridgeError::SurfaceCreate { slot })?;

        let object = gl.create_color_object(kind)?;
        self.slots.push(ConsumerSlot {
            object,
            kind,
            target,
            framebuffer: 0,
            interop: None,
        });
        let index = self.slots.len() - 1;

        debug!(slot, share_handle = surface.share_handle, "setting share handle");
        interop.set_share_handle(&surface).map_err(|err| {
            error!(slot, %err, "failed to set share handle");
            BridgeError::ShareHandle { slot }
        })?;

        let registered = interop
            .register(&surface, object, target)
            .ok_or(BridgeError::Register { slot })?;
        self.slots[index].interop = Some(registered);

        self.slots[index].framebuffer = gl.create_framebuffer()?;

        let entry = self.slots[index];
        if interop.lock(registered) {
            let status = gl.attach_color(&entry);
            if !interop.unlock(registered) {
                error!(slot, "interop unlock failed after attaching colour object");
            }
            if status == glow::FRAMEBUFFER_COMPLETE {
                debug!(slot, "framebuffer complete");
            } else {
                // Some drivers report a missing attachment here and complete it on first use.
                warn!(slot, status, "framebuffer incomplete after attach");
            }
        } else {
            error!(slot, "interop lock failed while attaching colour object");
        }
        Ok(())
    }

    #[inline]
    pub fn slots(&self) -> &[ConsumerSlot] {
        &self.slots
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// ### English
    /// Unregisters and deletes every slot object, last slot first (idempotent).
    ///
    /// ### 中文
    /// 按从后往前的顺序注销并删除所有槽位对象（幂等）。
    pub fn destroy<G, I>(&mut self, gl: &G, interop: &I)
    where
        G: ConsumerGl + ?Sized,
        I: InteropDevice + ?Sized,
    {
        if std::mem::replace(&mut self.destroyed, true) {
            return;
        }

        while let Some(slot) = self.slots.pop() {
            if slot.framebuffer != 0 {
                gl.delete_framebuffer(slot.framebuffer);
            }
            if let Some(object) = slot.interop
                && !interop.unregister(object)
            {
                warn!(object = object.raw(), "interop unregister failed");
            }
            gl.delete_color_object(slot.kind, slot.object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{GlCall, InteropCall, MockGl, MockInterop, install_test_surfaces};

    fn ring(slots: usize) -> SharedSurfaceSet {
        let ring = SharedSurfaceSet::new(slots);
        install_test_surfaces(&ring);
        ring
    }

    #[test]
    fn test_create_registers_every_slot() {
        let (gl, interop, ring) = (MockGl::new(), MockInterop::new(), ring(2));
        let resources =
            ConsumerResources::create(&gl, &interop, &ring, ObjectKind::Renderbuffer, 0).unwrap();

        assert_eq!(resources.slots().len(), 2);
        for (slot, entry) in resources.slots().iter().enumerate() {
            assert_ne!(entry.object, 0);
            assert_ne!(entry.framebuffer, 0);
            assert_eq!(entry.target, glow::RENDERBUFFER);
            assert!(entry.interop.is_some());
            assert!(gl.calls().contains(&GlCall::AttachColor(*entry)));
            assert!(
                interop
                    .calls()
                    .contains(&InteropCall::SetShareHandle(ring.surface(slot).unwrap()))
            );
        }
        assert_eq!(interop.lock_count(), 2);
        assert_eq!(interop.unlock_count(), 2);
    }

    #[test]
    fn test_multisampled_textures_use_multisample_target() {
        let (gl, interop, ring) = (MockGl::new(), MockInterop::new(), ring(2));
        let resources =
            ConsumerResources::create(&gl, &interop, &ring, ObjectKind::Texture, 4).unwrap();
        assert!(
            resources
                .slots()
                .iter()
                .all(|entry| entry.target == glow::TEXTURE_2D_MULTISAMPLE)
        );
    }

    #[test]
    fn test_incomplete_framebuffer_is_not_fatal() {
        let (gl, interop, ring) = (MockGl::new(), MockInterop::new(), ring(2));
        gl.set_framebuffer_status(glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT);
        assert!(ConsumerResources::create(&gl, &interop, &ring, ObjectKind::Texture, 0).is_ok());
    }

    #[test]
    fn test_missing_share_handle_entry_point_is_fatal() {
        let (gl, interop, ring) = (MockGl::new(), MockInterop::new(), ring(2));
        interop.fail_share_handle(true);
        let result = ConsumerResources::create(&gl, &interop, &ring, ObjectKind::Texture, 0);
        assert!(matches!(result, Err(BridgeError::ShareHandle { slot: 0 })));
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn test_register_failure_rolls_back_in_reverse() {
        let (gl, interop, ring) = (MockGl::new(), MockInterop::new(), ring(3));
        interop.fail_register_at(2);
        let result = ConsumerResources::create(&gl, &interop, &ring, ObjectKind::Renderbuffer, 0);
        assert!(matches!(result, Err(BridgeError::Register { slot: 2 })));
        assert_eq!(gl.live_objects(), 0);

        let unregistered: Vec<_> = interop
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                InteropCall::Unregister(object) => Some(object),
                _ => None,
            })
            .collect();
        assert_eq!(unregistered.len(), 2);
        assert!(unregistered[0].raw() > unregistered[1].raw());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (gl, interop, ring) = (MockGl::new(), MockInterop::new(), ring(2));
        let mut resources =
            ConsumerResources::create(&gl, &interop, &ring, ObjectKind::Texture, 0).unwrap();
        resources.destroy(&gl, &interop);
        let calls_after_first = interop.calls().len();
        resources.destroy(&gl, &interop);

        assert!(resources.is_destroyed());
        assert!(resources.slots().is_empty());
        assert_eq!(interop.calls().len(), calls_after_first);
        assert_eq!(gl.live_objects(), 0);
    }
}
