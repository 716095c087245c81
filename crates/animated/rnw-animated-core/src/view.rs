//! Seam to the UI manager that owns native views.

use crate::ids::ViewTag;
use crate::value::PropMap;

/// Commits a property patch to a native view.
///
/// Hosts implement this over their UI manager. It is called synchronously on the thread
/// that owns the manager, from inside an update pass, and must not call back into the
/// manager.
pub trait ViewUpdater {
    fn synchronously_update_view(&mut self, view: ViewTag, props: &PropMap);
}

/// Keeps every commit in order. Useful for headless hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingViewUpdater {
    pub commits: Vec<(ViewTag, PropMap)>,
}

impl RecordingViewUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent patch committed to `view`, if any.
    pub fn last_for(&self, view: ViewTag) -> Option<&PropMap> {
        self.commits
            .iter()
            .rev()
            .find_map(|(v, props)| (*v == view).then_some(props))
    }

    pub fn clear(&mut self) {
        self.commits.clear();
    }
}

impl ViewUpdater for RecordingViewUpdater {
    fn synchronously_update_view(&mut self, view: ViewTag, props: &PropMap) {
        self.commits.push((view, props.clone()));
    }
}
