use crate::permit::Permit;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    ExactAddress,
    NearbyAddress,
    Parameter,
    /// Synthetic frame wrapping the latest fetch while history is empty. Never
    /// pushed onto the history stack.
    CurrentView,
}

/// Inputs that produced a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchCriteria {
    Address {
        house_number: String,
        street_name: String,
        start_date: Option<NaiveDate>,
    },
    Nearby {
        house_number: String,
        street_name_upper: String,
        start_date: Option<NaiveDate>,
    },
    Parameter {
        field: String,
        raw_value: String,
        start_date: Option<NaiveDate>,
    },
    None,
}

impl SearchCriteria {
    /// Issuance-date lower bound carried by the search, if any.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            SearchCriteria::Address { start_date, .. }
            | SearchCriteria::Nearby { start_date, .. }
            | SearchCriteria::Parameter { start_date, .. } => *start_date,
            SearchCriteria::None => None,
        }
    }
}

/// One completed search. Frames are never modified once created; the history
/// stack only hands out shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    kind: SearchKind,
    criteria: SearchCriteria,
    display_label: String,
    results: Vec<Permit>,
}

impl SearchState {
    pub fn exact_address(
        house_number: &str,
        street_name: &str,
        start_date: Option<NaiveDate>,
        results: Vec<Permit>,
    ) -> Self {
        Self {
            kind: SearchKind::ExactAddress,
            display_label: format!("Address: {house_number} {street_name}"),
            criteria: SearchCriteria::Address {
                house_number: house_number.to_string(),
                street_name: street_name.to_string(),
                start_date,
            },
            results,
        }
    }

    /// `street_name` is the user's spelling (used for the label),
    /// `street_name_upper` the normalized form that was queried.
    pub fn nearby_address(
        house_number: &str,
        street_name: &str,
        street_name_upper: &str,
        start_date: Option<NaiveDate>,
        results: Vec<Permit>,
    ) -> Self {
        Self {
            kind: SearchKind::NearbyAddress,
            display_label: format!("Nearby: {house_number} {street_name}"),
            criteria: SearchCriteria::Nearby {
                house_number: house_number.to_string(),
                street_name_upper: street_name_upper.to_string(),
                start_date,
            },
            results,
        }
    }

    pub fn parameter(
        field: &str,
        raw_value: &str,
        display_value: &str,
        start_date: Option<NaiveDate>,
        results: Vec<Permit>,
    ) -> Self {
        Self {
            kind: SearchKind::Parameter,
            display_label: format!("Parameter: {} = {display_value}", field_label(field)),
            criteria: SearchCriteria::Parameter {
                field: field.to_string(),
                raw_value: raw_value.to_string(),
                start_date,
            },
            results,
        }
    }

    pub fn current_view(results: Vec<Permit>) -> Self {
        Self {
            kind: SearchKind::CurrentView,
            criteria: SearchCriteria::None,
            display_label: "Current View".to_string(),
            results,
        }
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    pub fn results(&self) -> &[Permit] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// `permittee_s_first_name` -> `permittee s first name`
pub fn field_label(field: &str) -> String {
    field.replace('_', " ")
}
