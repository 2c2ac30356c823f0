use crate::error::Result;
use crate::error::SearchError;
use crate::state::SearchKind;
use crate::state::SearchState;
use tracing::debug;

/// Breadcrumb trail of completed searches, oldest first. The last frame is the
/// active one. Only grows by push and only shrinks to a prefix.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    frames: Vec<SearchState>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: SearchState) {
        debug!(
            "history push #{}: {}",
            self.frames.len(),
            state.display_label()
        );
        self.frames.push(state);
    }

    /// Push a frame, first dropping a trailing exact-address frame that came
    /// back empty, so the trail only shows the search whose results the user
    /// actually sees.
    pub fn push_replacing_empty_exact(&mut self, state: SearchState) {
        if self
            .frames
            .last()
            .is_some_and(|last| last.kind() == SearchKind::ExactAddress && last.is_empty())
        {
            self.frames.pop();
        }
        self.push(state);
    }

    /// Keep frames `0..=index` and discard the rest.
    pub fn truncate_to(&mut self, index: usize) -> Result<()> {
        if index >= self.frames.len() {
            return Err(SearchError::InvalidFrame {
                index,
                len: self.frames.len(),
            });
        }
        self.frames.truncate(index + 1);
        Ok(())
    }

    pub fn current(&self) -> Option<&SearchState> {
        self.frames.last()
    }

    pub fn get(&self, index: usize) -> Option<&SearchState> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[SearchState] {
        &self.frames
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permit::Permit;
    use pretty_assertions::assert_eq;

    fn record(filing: &str) -> Permit {
        [("job_filing_number", filing)].into_iter().collect()
    }

    fn pivot(value: &str) -> SearchState {
        SearchState::parameter("owner_name", value, value, None, vec![record(value)])
    }

    #[test]
    fn truncate_restores_earlier_frame() {
        let mut history = HistoryStack::new();
        let first = SearchState::exact_address("1", "A ST", None, vec![record("J1")]);
        history.push(first.clone());
        history.push(pivot("B"));
        history.push(pivot("C"));

        history.truncate_to(0).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&first));
        assert_eq!(history.get(1), None);
    }

    #[test]
    fn truncate_to_last_is_a_no_op() {
        let mut history = HistoryStack::new();
        history.push(pivot("A"));
        history.push(pivot("B"));
        history.truncate_to(1).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn truncate_out_of_range_leaves_stack_untouched() {
        let mut history = HistoryStack::new();
        history.push(pivot("A"));
        let err = history.truncate_to(3).unwrap_err();
        assert!(matches!(err, SearchError::InvalidFrame { index: 3, len: 1 }));
        assert_eq!(history.len(), 1);

        let mut empty = HistoryStack::new();
        assert!(empty.truncate_to(0).is_err());
        assert_eq!(empty.current(), None);
    }

    #[test]
    fn nearby_frame_replaces_empty_exact_frame() {
        let mut history = HistoryStack::new();
        history.push(SearchState::exact_address("100", "MAIN ST", None, vec![]));
        history.push_replacing_empty_exact(SearchState::nearby_address(
            "100",
            "MAIN ST",
            "MAIN ST",
            None,
            vec![record("J1")],
        ));
        assert_eq!(history.len(), 1);
        assert_eq!(history.frames()[0].kind(), SearchKind::NearbyAddress);
    }

    #[test]
    fn non_empty_exact_frame_is_kept() {
        let mut history = HistoryStack::new();
        history.push(SearchState::exact_address(
            "100",
            "MAIN ST",
            None,
            vec![record("J9")],
        ));
        history.push_replacing_empty_exact(SearchState::nearby_address(
            "100",
            "MAIN ST",
            "MAIN ST",
            None,
            vec![],
        ));
        assert_eq!(history.len(), 2);
    }
}
