use crate::config::SearchConfig;
use crate::filter;
use crate::filter::ActiveDataFilters;
use crate::filter::FilterDomain;
use crate::session::SessionState;
use crate::state::SearchKind;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Position in the history stack; pass to `navigate_to`.
    pub index: usize,
    pub label: String,
    pub kind: SearchKind,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOption {
    pub id: String,
    pub label: String,
    pub visible: bool,
    pub always_visible: bool,
    pub filterable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub filing_number: Option<String>,
    pub cells: Vec<String>,
}

/// Everything a renderer needs, recomputed from scratch after each change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub title: String,
    pub frames: Vec<Breadcrumb>,
    pub columns: Vec<ColumnOption>,
    pub visible_columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Row count of the active frame before value filters
    pub total_rows: usize,
    pub status: StatusMessage,
    pub filter_domains: Vec<FilterDomain>,
    pub active_filters: ActiveDataFilters,
}

/// Receives a fresh [`ViewModel`] after every state change.
pub trait ViewSink: Send + Sync {
    fn publish(&self, view: &ViewModel);
}

/// Project the session into a view model.
pub fn build_view(session: &SessionState, config: &SearchConfig) -> ViewModel {
    let frame = session.active_frame();
    let columns = session.columns();
    let filters = session.filters();
    let history = session.history();

    let filtered = filter::apply(frame.results(), columns, filters);
    let rows: Vec<Row> = filtered
        .iter()
        .map(|permit| Row {
            filing_number: permit.filing_number(),
            cells: filter::project(permit, columns),
        })
        .collect();

    let frames = history
        .frames()
        .iter()
        .enumerate()
        .map(|(index, state)| Breadcrumb {
            index,
            label: state.display_label().to_string(),
            kind: state.kind(),
            active: index + 1 == history.len(),
        })
        .collect();

    let label = frame.display_label();
    let status = match session.status() {
        Some(status) if status.severity == Severity::Error || session.is_pending() => {
            status.clone()
        }
        _ if !rows.is_empty() => summary(frame.kind(), label, rows.len(), filters, config),
        _ if !filters.is_empty() => StatusMessage::info(format!(
            "No permits match the current data filters for \"{label}\". Try adjusting data filters."
        )),
        Some(status) => status.clone(),
        None => StatusMessage::info(format!("No permits found for \"{label}\".")),
    };

    let title = if frame.kind() == SearchKind::CurrentView {
        "Permit Results".to_string()
    } else {
        label.to_string()
    };

    ViewModel {
        title,
        frames,
        columns: columns
            .iter()
            .map(|column| ColumnOption {
                id: column.id.clone(),
                label: column.label.clone(),
                visible: column.visible,
                always_visible: column.always_visible,
                filterable: column.filterable,
            })
            .collect(),
        visible_columns: columns.visible().map(|column| column.label.clone()).collect(),
        rows,
        total_rows: frame.results().len(),
        status,
        filter_domains: filter::filter_domains(frame.results(), columns),
        active_filters: filters.clone(),
    }
}

fn summary(
    kind: SearchKind,
    label: &str,
    count: usize,
    filters: &ActiveDataFilters,
    config: &SearchConfig,
) -> StatusMessage {
    let suffix = if filters.is_empty() {
        ""
    } else {
        " (after applying data filters)"
    };
    let limit_note = match kind {
        SearchKind::Parameter => format!("Displaying up to {}.", config.exact_limit),
        SearchKind::NearbyAddress => format!(
            "Each nearby address scanned for up to {} permits.",
            config.nearby_limit
        ),
        SearchKind::ExactAddress | SearchKind::CurrentView => {
            format!("Displaying up to {} newest.", config.exact_limit)
        }
    };
    StatusMessage::success(format!(
        "{count} permit(s) found for {label}.{suffix} {limit_note}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permit::Permit;
    use crate::state::SearchState;
    use pretty_assertions::assert_eq;

    fn record(filing: &str, status: &str) -> Permit {
        [("job_filing_number", filing), ("permit_status", status)]
            .into_iter()
            .collect()
    }

    fn session_with_results() -> SessionState {
        let mut session = SessionState::default();
        session.push_frame(SearchState::exact_address(
            "100",
            "MAIN ST",
            None,
            vec![record("J1", "ISSUED"), record("J2", "EXPIRED")],
        ));
        session
    }

    #[test]
    fn empty_session_view() {
        let view = build_view(&SessionState::default(), &SearchConfig::default());
        assert_eq!(view.title, "Permit Results");
        assert!(view.frames.is_empty());
        assert!(view.rows.is_empty());
        assert_eq!(view.status.text, "No permits found for \"Current View\".");
    }

    #[test]
    fn summary_mentions_filters() {
        let mut session = session_with_results();
        let config = SearchConfig::default();
        let view = build_view(&session, &config);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(
            view.status,
            StatusMessage::success(
                "2 permit(s) found for Address: 100 MAIN ST. Displaying up to 500 newest."
            )
        );

        session.toggle_filter("permit_status", "ISSUED", true);
        let view = build_view(&session, &config);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.total_rows, 2);
        assert_eq!(
            view.status.text,
            "1 permit(s) found for Address: 100 MAIN ST. (after applying data filters) Displaying up to 500 newest."
        );
    }

    #[test]
    fn filters_that_match_nothing() {
        let mut session = session_with_results();
        session.toggle_filter("permit_status", "REVOKED", true);
        let view = build_view(&session, &SearchConfig::default());
        assert!(view.rows.is_empty());
        assert_eq!(
            view.status.text,
            "No permits match the current data filters for \"Address: 100 MAIN ST\". Try adjusting data filters."
        );
    }

    #[test]
    fn errors_win_over_summaries() {
        let mut session = session_with_results();
        session.set_status(StatusMessage::error("House Number and Street Name are required."));
        let view = build_view(&session, &SearchConfig::default());
        assert_eq!(view.status.severity, Severity::Error);
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn progress_wins_over_the_previous_summary() {
        let mut session = session_with_results();
        session.set_progress(StatusMessage::info("Fetching permits with owner name: ACME..."));
        let view = build_view(&session, &SearchConfig::default());
        assert_eq!(view.status.text, "Fetching permits with owner name: ACME...");
        assert_eq!(view.rows.len(), 2);

        session.set_status(StatusMessage::info("done"));
        let view = build_view(&session, &SearchConfig::default());
        assert_eq!(view.status.severity, Severity::Success);
    }

    #[test]
    fn breadcrumbs_mark_the_active_frame() {
        let mut session = session_with_results();
        session.push_frame(SearchState::parameter(
            "permit_status",
            "ISSUED",
            "ISSUED",
            None,
            vec![record("J1", "ISSUED")],
        ));
        let view = build_view(&session, &SearchConfig::default());
        let crumbs: Vec<_> = view
            .frames
            .iter()
            .map(|crumb| (crumb.index, crumb.active))
            .collect();
        assert_eq!(crumbs, vec![(0, false), (1, true)]);
        assert_eq!(view.title, "Parameter: permit status = ISSUED");
        assert!(view.status.text.ends_with("Displaying up to 500."));
    }
}
