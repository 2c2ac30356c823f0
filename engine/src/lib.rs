/*!
# Permit Finder Engine

Search engine over the NYC DOB NOW approved-permits dataset:
- **Exact address search** with an optional issuance-date lower bound
- **Nearby fallback** fanning out over the surrounding house numbers
- **Parameter pivots** on any field value of a displayed permit
- **Breadcrumb history** with positional navigation
- **Value filters** and column visibility applied on top of the active frame
- **Details** with external portal links (DOB NOW, BIS, ZoLa)

## Architecture

```text
UI input
  └─> SearchOrchestrator
        ├─> PermitSource (exact / parameter query)
        ├─> NearbySearchExpander (on empty or failed exact match)
        │     └─> PermitSource x 2*radius, concurrently
        └─> SessionState
              ├─> HistoryStack (frames)
              ├─> ActiveDataFilters + ColumnSet
              └─> build_view ─> ViewSink
```

Searches are stamped with a ticket when they start. A response whose ticket
is no longer the latest is dropped with [`SearchError::Superseded`] and never
reaches the session.

## Example

```rust,no_run
use permit_finder_engine::{PermitSource, SearchConfig, SearchOrchestrator};
use std::sync::Arc;

async fn run(source: Arc<dyn PermitSource>) -> permit_finder_engine::Result<()> {
    let orchestrator = SearchOrchestrator::new(source, SearchConfig::default())?;
    orchestrator.run_address_search("100", "Main St", None).await?;

    let view = orchestrator.view().await;
    println!("{}", view.status.text);
    for row in &view.rows {
        println!("{}", row.cells.join(" | "));
    }
    Ok(())
}
```
*/

mod borough;
mod column;
mod config;
mod date;
mod details;
mod error;
mod filter;
mod history;
mod nearby;
mod orchestrator;
mod permit;
mod query;
mod session;
mod source;
mod state;
mod view;

pub use borough::borough_code;
pub use column::{Column, ColumnSet, ColumnValue, permittee_name};
pub use config::{MAX_NEARBY_RADIUS, SearchConfig};
pub use date::{format_long_date, format_short_date, parse_timestamp};
pub use details::{DetailItem, DetailsLinkResolver, ExternalLink, PermitDetails, external_links};
pub use error::{Result, SearchError, TransportError};
pub use filter::{ActiveDataFilters, FilterDomain, apply, filter_domains, project};
pub use history::HistoryStack;
pub use nearby::{
    NearbyOutcome, NearbySearchExpander, candidate_house_numbers, merge_candidates,
    parse_house_number,
};
pub use orchestrator::SearchOrchestrator;
pub use permit::{NOT_AVAILABLE, Permit, fields, value_to_text};
pub use query::{Condition, PermitQuery, SortDirection, SortKey, is_field_identifier};
pub use session::SessionState;
pub use source::PermitSource;
pub use state::{SearchCriteria, SearchKind, SearchState, field_label};
pub use view::{
    Breadcrumb, ColumnOption, Row, Severity, StatusMessage, ViewModel, ViewSink, build_view,
};
