use crate::render::Renderer;
use permit_finder_engine::Severity;
use permit_finder_engine::ViewModel;
use permit_finder_engine::ViewSink;
use std::sync::Mutex;
use tracing::debug;

/// Echoes in-progress status lines ("Searching nearby...") to stderr while a
/// search runs. Final views are printed by the command itself.
pub(crate) struct ProgressSink {
    renderer: Renderer,
    last: Mutex<Option<String>>,
}

impl ProgressSink {
    pub(crate) fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            last: Mutex::new(None),
        }
    }
}

impl ViewSink for ProgressSink {
    fn publish(&self, view: &ViewModel) {
        debug!(
            "view: {} ({} of {} rows) {}",
            view.title,
            view.rows.len(),
            view.total_rows,
            view.status.text
        );
        let in_progress =
            view.status.severity == Severity::Info && view.status.text.ends_with("...");
        let Ok(mut last) = self.last.lock() else {
            return;
        };
        if !in_progress || last.as_deref() == Some(view.status.text.as_str()) {
            return;
        }
        eprintln!("{}", self.renderer.status(&view.status));
        *last = Some(view.status.text.clone());
    }
}
