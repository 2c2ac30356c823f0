use crate::config::SearchConfig;
use crate::error::Result;
use crate::error::SearchError;
use crate::permit::Permit;
use crate::query::PermitQuery;
use crate::source::PermitSource;
use crate::state::SearchState;
use chrono::NaiveDate;
use futures::future::join_all;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Result of a nearby expansion.
#[derive(Debug, Clone)]
pub struct NearbyOutcome {
    pub state: SearchState,
    /// House numbers that were queried, in issue order
    pub candidates: Vec<i64>,
    /// False when the original house number had no leading integer, in which
    /// case nothing was queried.
    pub house_number_parsed: bool,
}

/// Fallback search over the house numbers around an address that had no
/// exact match.
pub struct NearbySearchExpander {
    source: Arc<dyn PermitSource>,
    config: SearchConfig,
}

impl NearbySearchExpander {
    pub fn new(source: Arc<dyn PermitSource>, config: SearchConfig) -> Self {
        Self { source, config }
    }

    /// Query every candidate concurrently, wait for all of them, then merge.
    ///
    /// A failing candidate contributes no rows. Only a candidate task that
    /// could not run to completion fails the expansion.
    pub async fn expand(
        &self,
        original_house_number: &str,
        street_name: &str,
        street_name_upper: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<NearbyOutcome> {
        let Some(original) = parse_house_number(original_house_number) else {
            info!("house number '{original_house_number}' is not numeric; skipping nearby search");
            return Ok(NearbyOutcome {
                state: SearchState::nearby_address(
                    original_house_number,
                    street_name,
                    street_name_upper,
                    start_date,
                    Vec::new(),
                ),
                candidates: Vec::new(),
                house_number_parsed: false,
            });
        };

        let candidates = candidate_house_numbers(original, self.config.nearby_radius);
        info!(
            "nearby search around {original} {street_name_upper}: candidates {candidates:?}"
        );

        let tasks = candidates.iter().map(|&candidate| {
            let source = Arc::clone(&self.source);
            let query = PermitQuery::address(
                &candidate.to_string(),
                street_name_upper,
                start_date,
                self.config.nearby_limit,
            );
            tokio::spawn(async move {
                match source.query(&query).await {
                    Ok(rows) => {
                        debug!("nearby candidate {candidate}: {} rows", rows.len());
                        rows
                    }
                    Err(err) => {
                        warn!("nearby candidate {candidate} failed: {err}");
                        Vec::new()
                    }
                }
            })
        });

        let mut partials = Vec::with_capacity(candidates.len());
        for joined in join_all(tasks).await {
            partials.push(joined.map_err(|err| SearchError::NearbyFailed(err.to_string()))?);
        }

        let merged = merge_candidates(partials);
        debug!("nearby search merged {} unique rows", merged.len());

        Ok(NearbyOutcome {
            state: SearchState::nearby_address(
                original_house_number,
                street_name,
                street_name_upper,
                start_date,
                merged,
            ),
            candidates,
            house_number_parsed: true,
        })
    }
}

/// Leading integer of a house number: optional sign then digits, after
/// leading whitespace (`"12-34"` -> 12, `"100A"` -> 100, `"A1"` -> none).
pub fn parse_house_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..digits_end].parse::<i64>().ok().map(|n| sign * n)
}

/// `original + offset` for every offset in `-radius..=radius` except zero,
/// ascending, dropping non-positive house numbers.
pub fn candidate_house_numbers(original: i64, radius: u32) -> Vec<i64> {
    let radius = i64::from(radius);
    (-radius..=radius)
        .filter(|offset| *offset != 0)
        .filter_map(|offset| original.checked_add(offset))
        .filter(|candidate| *candidate > 0)
        .collect()
}

/// Concatenate partial result sets in order, keep the first record per filing
/// number (records without one are all kept), then order by issuance date,
/// newest first. Undated records go last; ties keep merge order.
pub fn merge_candidates(partials: Vec<Vec<Permit>>) -> Vec<Permit> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Permit> = partials
        .into_iter()
        .flatten()
        .filter(|permit| match permit.filing_number() {
            Some(filing) => seen.insert(filing),
            None => true,
        })
        .collect();
    merged.sort_by_cached_key(|permit| {
        let issued = permit.issued_at();
        (issued.is_none(), Reverse(issued))
    });
    merged
}
