//! UI-thread side: owns the manager and drains published batches once per frame.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, warn};
use rnw_animated_core::{NativeAnimatedNodesManager, UpdateStats, ViewTag, ViewUpdater};
use serde_json::Value as JsonValue;

use crate::queue::{lock, BridgeQueue, ReadyOperations};

/// Host lifecycle as far as frame delivery is concerned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// No frames are processed; published batches wait.
    #[default]
    Suspended,
    Resumed,
    /// Terminal. Pending work is discarded.
    Destroyed,
}

/// What a single [`NativeAnimatedModule::on_frame`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub operations_applied: usize,
    /// `None` when there was nothing to animate and the pass was skipped.
    pub stats: Option<UpdateStats>,
}

pub struct NativeAnimatedModule<V: ViewUpdater> {
    manager: NativeAnimatedNodesManager<V>,
    ready: ReadyOperations,
    lifecycle: Lifecycle,
}

impl<V: ViewUpdater> NativeAnimatedModule<V> {
    pub fn new(manager: NativeAnimatedNodesManager<V>) -> Self {
        Self {
            manager,
            ready: ReadyOperations::default(),
            lifecycle: Lifecycle::default(),
        }
    }

    /// A producer handle for the bridge thread. Each handle batches independently.
    pub fn bridge_queue(&self) -> BridgeQueue {
        BridgeQueue::new(Arc::clone(&self.ready))
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn manager(&self) -> &NativeAnimatedNodesManager<V> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut NativeAnimatedNodesManager<V> {
        &mut self.manager
    }

    pub fn on_resume(&mut self) {
        match self.lifecycle {
            Lifecycle::Destroyed => warn!("resume after destroy ignored"),
            _ => {
                self.lifecycle = Lifecycle::Resumed;
                debug!("animated frame callback enabled");
            }
        }
    }

    pub fn on_suspend(&mut self) {
        if self.lifecycle == Lifecycle::Resumed {
            self.lifecycle = Lifecycle::Suspended;
            debug!("animated frame callback disabled");
        }
    }

    pub fn on_destroy(&mut self) {
        self.lifecycle = Lifecycle::Destroyed;
        let dropped = std::mem::take(&mut *lock(&self.ready)).len();
        debug!("animated module destroyed; {dropped} queued operations dropped");
    }

    /// Apply every published operation in order, then run the update pass if anything
    /// is animating. The first failing operation aborts the frame and the rest of its
    /// batch is discarded.
    pub fn on_frame(&mut self, frame_time: Duration) -> Result<FrameReport> {
        if self.lifecycle != Lifecycle::Resumed {
            return Ok(FrameReport::default());
        }

        let operations = std::mem::take(&mut *lock(&self.ready));
        let mut report = FrameReport::default();
        for operation in operations {
            let name = operation.name();
            if let Err(err) = operation.apply(&mut self.manager) {
                error!("animated operation {name} failed: {err}");
                return Err(err).with_context(|| format!("animated operation {name} failed"));
            }
            report.operations_applied += 1;
        }

        if self.manager.has_active_animations() {
            let stats = self
                .manager
                .run_updates(frame_time)
                .context("animated frame update failed")?;
            report.stats = Some(stats);
        }
        Ok(report)
    }

    /// Forward a native view event. Events originate on the UI thread and bypass the queue.
    pub fn handle_event(
        &mut self,
        view: ViewTag,
        event_name: &str,
        payload: &JsonValue,
    ) -> Result<bool> {
        self.manager
            .handle_event(view, event_name, payload)
            .with_context(|| format!("animated event '{event_name}' on view {view} failed"))
    }
}
