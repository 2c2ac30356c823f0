//! Everything the engine remembers between user actions.

use crate::column::ColumnSet;
use crate::error::Result;
use crate::filter::ActiveDataFilters;
use crate::history::HistoryStack;
use crate::permit::Permit;
use crate::state::SearchState;
use crate::view::StatusMessage;
use std::borrow::Cow;

/// Session-wide state owned by the orchestrator.
///
/// Every search takes a ticket from a monotonically increasing counter; a
/// response may only be committed while its ticket is still the latest.
/// While a search is in flight its progress status stays `pending` and wins
/// over the summary of whatever frame is still on screen.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    history: HistoryStack,
    filters: ActiveDataFilters,
    columns: ColumnSet,
    last_fetched: Vec<Permit>,
    status: Option<StatusMessage>,
    pending: bool,
    latest_ticket: u64,
}

impl SessionState {
    pub fn new(columns: ColumnSet) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn filters(&self) -> &ActiveDataFilters {
        &self.filters
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether the current status reports a search that has not finished.
    pub fn is_pending(&self) -> bool {
        self.pending && self.status.is_some()
    }

    /// The active history frame, or a synthetic frame around the most recent
    /// fetch while history is empty.
    pub fn active_frame(&self) -> Cow<'_, SearchState> {
        match self.history.current() {
            Some(frame) => Cow::Borrowed(frame),
            None => Cow::Owned(SearchState::current_view(self.last_fetched.clone())),
        }
    }

    /// Invalidate every outstanding ticket and hand out a new one.
    pub fn next_ticket(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.latest_ticket
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket == ticket
    }

    /// Forget the previous top-level search.
    pub fn reset(&mut self) {
        self.history.clear();
        self.filters.clear();
        self.last_fetched.clear();
        self.clear_status();
    }

    /// Final outcome of the last action.
    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
        self.pending = false;
    }

    /// Progress of a search that is still running.
    pub fn set_progress(&mut self, status: StatusMessage) {
        self.status = Some(status);
        self.pending = true;
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.pending = false;
    }

    pub fn push_frame(&mut self, frame: SearchState) {
        self.last_fetched = frame.results().to_vec();
        self.history.push(frame);
    }

    /// Push a nearby frame in place of the empty exact frame that triggered it.
    pub fn push_nearby_frame(&mut self, frame: SearchState) {
        self.last_fetched = frame.results().to_vec();
        self.history.push_replacing_empty_exact(frame);
    }

    /// Return to an earlier breadcrumb. Value filters survive.
    pub fn navigate_to(&mut self, index: usize) -> Result<()> {
        self.history.truncate_to(index)?;
        self.last_fetched = self
            .history
            .current()
            .map(|frame| frame.results().to_vec())
            .unwrap_or_default();
        self.clear_status();
        Ok(())
    }

    pub fn set_column_visible(&mut self, id: &str, visible: bool) -> Result<bool> {
        let changed = self.columns.set_visible(id, visible)?;
        self.clear_status();
        Ok(changed)
    }

    pub fn toggle_filter(&mut self, field: &str, value: &str, enabled: bool) -> bool {
        self.clear_status();
        self.filters.toggle(field, value, enabled)
    }

    pub fn clear_filters(&mut self) {
        self.clear_status();
        self.filters.clear();
    }
}
