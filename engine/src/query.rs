//! Structured queries handed to a [`crate::PermitSource`].
//!
//! Values are stored raw; quoting and escaping belong to whichever dialect the
//! source renders them into.

use crate::permit::fields;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// `field = value`
    Equals { field: String, value: String },
    /// `upper(field) = value`; `value` is expected to be uppercase already.
    EqualsIgnoreCase { field: String, value: String },
    /// `field >= date` at midnight
    OnOrAfter { field: String, date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn descending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// Conjunction of conditions with an ordering and a row cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitQuery {
    pub conditions: Vec<Condition>,
    pub order: Vec<SortKey>,
    pub limit: usize,
}

impl PermitQuery {
    /// Permits at one address: house number equality plus case-insensitive
    /// street equality, newest first.
    pub fn address(
        house_number: &str,
        street_name_upper: &str,
        issued_since: Option<NaiveDate>,
        limit: usize,
    ) -> Self {
        let conditions = vec![
            Condition::Equals {
                field: fields::HOUSE_NO.to_string(),
                value: house_number.to_string(),
            },
            Condition::EqualsIgnoreCase {
                field: fields::STREET_NAME.to_string(),
                value: street_name_upper.to_string(),
            },
        ];
        Self::newest_first(conditions, issued_since, limit)
    }

    /// Permits whose `field` equals `value`, newest first.
    pub fn field_equals(
        field: &str,
        value: &str,
        issued_since: Option<NaiveDate>,
        limit: usize,
    ) -> Self {
        let conditions = vec![Condition::Equals {
            field: field.to_string(),
            value: value.to_string(),
        }];
        Self::newest_first(conditions, issued_since, limit)
    }

    fn newest_first(
        mut conditions: Vec<Condition>,
        issued_since: Option<NaiveDate>,
        limit: usize,
    ) -> Self {
        if let Some(date) = issued_since {
            conditions.push(Condition::OnOrAfter {
                field: fields::ISSUED_DATE.to_string(),
                date,
            });
        }
        Self {
            conditions,
            order: vec![
                SortKey::descending(fields::ISSUED_DATE),
                SortKey::descending(fields::JOB_FILING_NUMBER),
            ],
            limit,
        }
    }

    /// Value of the first `Equals` condition on `field`, if any.
    pub fn equals_value(&self, field: &str) -> Option<&str> {
        self.conditions.iter().find_map(|condition| match condition {
            Condition::Equals { field: f, value } if f == field => Some(value.as_str()),
            _ => None,
        })
    }
}

/// True for plain column identifiers (`[A-Za-z_][A-Za-z0-9_]*`), the only
/// field names the engine will put into a query.
pub fn is_field_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
