//! ### English
//! Creation and teardown of the ring's resources on both sides of the hand-off.
//!
//! - `producer`: the shareable render targets, created on the producer thread.
//! - `consumer`: GL objects and interop registrations, created on the display thread.
//!
//! Teardown always runs in reverse creation order.
//!
//! ### 中文
//! 交接两侧环资源的创建与销毁。
//!
//! - `producer`：可共享渲染目标，在生产者线程创建。
//! - `consumer`：GL 对象与 interop 注册，在显示线程创建。
//!
//! 销毁总是按创建的逆序进行。
mod consumer;
mod producer;

pub use consumer::ConsumerResources;
pub use producer::{
    MAX_FORCED_SAMPLES, ProducerPlan, create_surfaces, plan_surfaces, release_surfaces,
};
