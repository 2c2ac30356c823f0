//! Search lifecycle: validation, exact lookup, nearby fallback, pivots and the
//! view updates that follow each of them.

use crate::column::ColumnSet;
use crate::config::SearchConfig;
use crate::details::DetailsLinkResolver;
use crate::details::PermitDetails;
use crate::error::Result;
use crate::error::SearchError;
use crate::error::TransportError;
use crate::filter;
use crate::nearby::NearbySearchExpander;
use crate::query::PermitQuery;
use crate::query::is_field_identifier;
use crate::session::SessionState;
use crate::source::PermitSource;
use crate::state::SearchState;
use crate::state::field_label;
use crate::view::StatusMessage;
use crate::view::ViewModel;
use crate::view::ViewSink;
use crate::view::build_view;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

const REQUIRED_FIELDS_MESSAGE: &str = "House Number and Street Name are required.";
const OFFLINE_MESSAGE: &str = "Network offline. Cannot fetch permits.";
const CONNECT_MESSAGE: &str =
    "Failed to connect to the server. Please check your internet connection.";
const NEARBY_FAILED_MESSAGE: &str = "An error occurred while searching nearby addresses.";

/// Drives every user action against the session.
///
/// The session lock is only held while reading or committing state, never
/// across a call into the [`PermitSource`].
pub struct SearchOrchestrator {
    source: Arc<dyn PermitSource>,
    config: SearchConfig,
    expander: NearbySearchExpander,
    resolver: DetailsLinkResolver,
    session: Mutex<SessionState>,
    sink: Option<Arc<dyn ViewSink>>,
}

impl SearchOrchestrator {
    pub fn new(source: Arc<dyn PermitSource>, config: SearchConfig) -> Result<Self> {
        config.validate().map_err(SearchError::Config)?;
        Ok(Self {
            expander: NearbySearchExpander::new(Arc::clone(&source), config.clone()),
            resolver: DetailsLinkResolver::new(&config),
            source,
            config,
            session: Mutex::new(SessionState::new(ColumnSet::default())),
            sink: None,
        })
    }

    /// Publish a fresh view to `sink` after every state change.
    pub fn with_sink(mut self, sink: Arc<dyn ViewSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search one address, falling back to the surrounding house numbers when
    /// the exact lookup comes back empty or fails server-side.
    pub async fn run_address_search(
        &self,
        house_number: &str,
        street_name: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<SearchState> {
        let house_number = house_number.trim();
        let street_name = street_name.trim();
        if house_number.is_empty() || street_name.is_empty() {
            let mut session = self.session.lock().await;
            session.set_status(StatusMessage::error(REQUIRED_FIELDS_MESSAGE));
            self.publish(&session);
            return Err(SearchError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        let street_name_upper = street_name.to_uppercase();

        let ticket = {
            let mut session = self.session.lock().await;
            let ticket = session.next_ticket();
            session.reset();
            session.set_progress(StatusMessage::info(format!(
                "Searching for permits at {house_number} {street_name}..."
            )));
            self.publish(&session);
            ticket
        };
        info!("address search #{ticket}: {house_number} {street_name_upper}");

        let exact = if self.source.is_offline() {
            Err(TransportError::Offline)
        } else {
            let query = PermitQuery::address(
                house_number,
                &street_name_upper,
                start_date,
                self.config.exact_limit,
            );
            debug!("exact query: {query:?}");
            self.source.query(&query).await
        };

        let empty_exact =
            || SearchState::exact_address(house_number, street_name, start_date, Vec::new());
        match exact {
            Ok(rows) if !rows.is_empty() => {
                let frame =
                    SearchState::exact_address(house_number, street_name, start_date, rows);
                info!("exact match: {} permits", frame.results().len());
                self.commit(ticket, |session| session.push_frame(frame.clone()))
                    .await?;
                return Ok(frame);
            }
            Ok(_) => {
                self.commit(ticket, |session| {
                    session.push_frame(empty_exact());
                    session.set_progress(StatusMessage::info(format!(
                        "No exact match for {house_number} {street_name}. Searching nearby..."
                    )));
                })
                .await?;
            }
            Err(err) if err.is_connectivity() => {
                warn!("address search #{ticket}: server unreachable: {err}");
                let (message, err) = match err {
                    TransportError::Connect(reason) => {
                        (CONNECT_MESSAGE, SearchError::Connectivity(reason))
                    }
                    _ => (OFFLINE_MESSAGE, SearchError::Offline),
                };
                self.commit(ticket, |session| {
                    session.push_frame(empty_exact());
                    session.set_status(StatusMessage::error(message));
                })
                .await?;
                return Err(err);
            }
            Err(err) => {
                warn!("exact match for {house_number} {street_name_upper} failed: {err}");
                self.commit(ticket, |session| {
                    session.push_frame(empty_exact());
                    session.set_progress(StatusMessage::info(format!(
                        "Error on exact match for {house_number} {street_name}. Trying nearby..."
                    )));
                })
                .await?;
            }
        }

        self.run_nearby(ticket, house_number, street_name, &street_name_upper, start_date)
            .await
    }

    async fn run_nearby(
        &self,
        ticket: u64,
        house_number: &str,
        street_name: &str,
        street_name_upper: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<SearchState> {
        match self
            .expander
            .expand(house_number, street_name, street_name_upper, start_date)
            .await
        {
            Ok(outcome) => {
                let frame = outcome.state;
                self.commit(ticket, |session| {
                    session.push_nearby_frame(frame.clone());
                    if !frame.is_empty() {
                        return;
                    }
                    if outcome.house_number_parsed {
                        session.set_status(StatusMessage::info(format!(
                            "No permits found for {house_number} {street_name} or the immediate nearby addresses searched."
                        )));
                    } else {
                        session.set_status(StatusMessage::info(format!(
                            "No permits found for {house_number} {street_name}. Nearby search not applicable for this house number format."
                        )));
                    }
                })
                .await?;
                Ok(frame)
            }
            Err(err) => {
                warn!("nearby search #{ticket} failed: {err}");
                self.commit(ticket, |session| {
                    session.push_nearby_frame(SearchState::nearby_address(
                        house_number,
                        street_name,
                        street_name_upper,
                        start_date,
                        Vec::new(),
                    ));
                    session.set_status(StatusMessage::error(NEARBY_FAILED_MESSAGE));
                })
                .await?;
                Err(err)
            }
        }
    }

    /// Pivot on one field value of a displayed record. The active frame's
    /// start date carries over and value filters are reset.
    ///
    /// Source failures do not surface as `Err`: an empty frame is pushed and
    /// the failure lands in the status message.
    pub async fn run_parameter_search(
        &self,
        field: &str,
        raw_value: &str,
        display_value: &str,
    ) -> Result<SearchState> {
        if !is_field_identifier(field) {
            let message = format!("Cannot search by field \"{field}\".");
            let mut session = self.session.lock().await;
            session.set_status(StatusMessage::error(message.clone()));
            self.publish(&session);
            return Err(SearchError::Validation(message));
        }
        let key = field_label(field);

        let (ticket, start_date) = {
            let mut session = self.session.lock().await;
            let ticket = session.next_ticket();
            let start_date = session.active_frame().criteria().start_date();
            session.clear_filters();
            session.set_progress(StatusMessage::info(format!(
                "Fetching permits with {key}: {display_value}..."
            )));
            self.publish(&session);
            (ticket, start_date)
        };
        info!("parameter search #{ticket}: {field} = {raw_value}");

        let fetched = if self.source.is_offline() {
            Err(TransportError::Offline)
        } else {
            let query =
                PermitQuery::field_equals(field, raw_value, start_date, self.config.exact_limit);
            debug!("parameter query: {query:?}");
            self.source.query(&query).await
        };

        let (rows, status) = match fetched {
            Ok(rows) if rows.is_empty() => (
                rows,
                Some(StatusMessage::info(format!(
                    "No permits found with {key}: {display_value}."
                ))),
            ),
            Ok(rows) => (rows, None),
            Err(err) => {
                warn!("parameter search #{ticket} failed: {err}");
                let text = match err {
                    TransportError::Offline => OFFLINE_MESSAGE.to_string(),
                    err => format!("Failed to fetch permits for {key} ({display_value}): {err}"),
                };
                (Vec::new(), Some(StatusMessage::error(text)))
            }
        };

        let frame = SearchState::parameter(field, raw_value, display_value, start_date, rows);
        self.commit(ticket, |session| {
            session.push_frame(frame.clone());
            if let Some(status) = status {
                session.set_status(status);
            }
        })
        .await?;
        Ok(frame)
    }

    /// Return to breadcrumb `index`. Any search still in flight is discarded.
    pub async fn navigate_to(&self, index: usize) -> Result<()> {
        let mut session = self.session.lock().await;
        session.navigate_to(index)?;
        session.next_ticket();
        debug!("navigated to frame {index}");
        self.publish(&session);
        Ok(())
    }

    /// Show or hide a column. Returns whether anything changed.
    pub async fn set_column_visible(&self, id: &str, visible: bool) -> Result<bool> {
        let mut session = self.session.lock().await;
        let changed = session.set_column_visible(id, visible)?;
        self.publish(&session);
        Ok(changed)
    }

    /// Add or remove `value` from the allow-list of `field`.
    pub async fn toggle_filter_value(&self, field: &str, value: &str, enabled: bool) -> bool {
        let mut session = self.session.lock().await;
        let changed = session.toggle_filter(field, value, enabled);
        self.publish(&session);
        changed
    }

    pub async fn clear_filters(&self) {
        let mut session = self.session.lock().await;
        session.clear_filters();
        self.publish(&session);
    }

    pub async fn view(&self) -> ViewModel {
        let session = self.session.lock().await;
        build_view(&session, &self.config)
    }

    pub async fn history(&self) -> Vec<SearchState> {
        self.session.lock().await.history().frames().to_vec()
    }

    /// Details of the first record in the active frame with this filing number.
    pub async fn details(&self, filing_number: &str) -> Option<PermitDetails> {
        let session = self.session.lock().await;
        let frame = session.active_frame();
        frame
            .results()
            .iter()
            .find(|permit| permit.filing_number().as_deref() == Some(filing_number))
            .map(|permit| self.resolver.resolve(permit))
    }

    /// Details of the displayed row at `row` (zero-based, after value filters).
    pub async fn details_for_row(&self, row: usize) -> Option<PermitDetails> {
        let session = self.session.lock().await;
        let frame = session.active_frame();
        let rows = filter::apply(frame.results(), session.columns(), session.filters());
        rows.get(row).map(|permit| self.resolver.resolve(permit))
    }

    /// Apply `update` only if `ticket` is still the latest search. The
    /// search's progress status is dropped first; `update` sets the next one.
    async fn commit<T>(
        &self,
        ticket: u64,
        update: impl FnOnce(&mut SessionState) -> T,
    ) -> Result<T> {
        let mut session = self.session.lock().await;
        if !session.is_latest(ticket) {
            warn!("discarding stale response for search #{ticket}");
            return Err(SearchError::Superseded { ticket });
        }
        session.clear_status();
        let out = update(&mut session);
        self.publish(&session);
        Ok(out)
    }

    fn publish(&self, session: &SessionState) {
        if let Some(sink) = &self.sink {
            sink.publish(&build_view(session, &self.config));
        }
    }
}
