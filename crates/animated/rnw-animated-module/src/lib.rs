//! rnw-animated-module: the native animated module as seen by the bridge.
//!
//! Bridge calls land on a [`BridgeQueue`] on whatever thread the bridge runs on. Each
//! call becomes one [`AnimatedOperation`]; `on_batch_complete` hands the batch over to
//! the UI thread, where [`NativeAnimatedModule::on_frame`] applies it to the manager and
//! runs the frame's update pass.

pub mod module;
pub mod operation;
pub mod queue;

pub use module::{FrameReport, Lifecycle, NativeAnimatedModule};
pub use operation::AnimatedOperation;
pub use queue::BridgeQueue;
