use crate::date::parse_timestamp;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Placeholder shown for absent, null or empty fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Field names of the DOB NOW approved-permits dataset that the engine reads
/// directly. Records may carry any number of other fields.
pub mod fields {
    pub const JOB_FILING_NUMBER: &str = "job_filing_number";
    pub const BOROUGH: &str = "borough";
    pub const HOUSE_NO: &str = "house_no";
    pub const STREET_NAME: &str = "street_name";
    pub const BLOCK: &str = "block";
    pub const LOT: &str = "lot";
    pub const BIN: &str = "bin";
    pub const WORK_TYPE: &str = "work_type";
    pub const JOB_DESCRIPTION: &str = "job_description";
    pub const PERMIT_STATUS: &str = "permit_status";
    pub const ISSUED_DATE: &str = "issued_date";
    pub const EXPIRED_DATE: &str = "expired_date";
    pub const APPROVED_DATE: &str = "approved_date";
    pub const PERMITTEE_FIRST_NAME: &str = "permittee_s_first_name";
    pub const PERMITTEE_LAST_NAME: &str = "permittee_s_last_name";
    pub const PERMITTEE_BUSINESS_NAME: &str = "permittee_s_business_name";
    pub const PERMITTEE_LICENSE_TYPE: &str = "permittee_s_license_type";
    pub const OWNER_NAME: &str = "owner_name";
    pub const OWNER_BUSINESS_NAME: &str = "owner_business_name";
}

/// One building-permit record. Field order is preserved as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permit(Map<String, Value>);

impl Permit {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw value at a dotted path (`"location.latitude"`). Null values are
    /// reported as absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Stringified value at `path`, or `None` when absent, null or empty.
    pub fn text(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(value_to_text)
            .filter(|text| !text.is_empty())
    }

    /// Stringified value at `path`, falling back to `default`.
    pub fn field_or(&self, path: &str, default: &str) -> String {
        self.text(path).unwrap_or_else(|| default.to_string())
    }

    /// Stringified value at `path`, falling back to [`NOT_AVAILABLE`].
    pub fn field(&self, path: &str) -> String {
        self.field_or(path, NOT_AVAILABLE)
    }

    pub fn filing_number(&self) -> Option<String> {
        self.text(fields::JOB_FILING_NUMBER)
    }

    pub fn issued_at(&self) -> Option<NaiveDateTime> {
        self.text(fields::ISSUED_DATE)
            .as_deref()
            .and_then(parse_timestamp)
    }

    /// Top-level fields in their natural order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Permit {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Permit {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Render a JSON value the way it is displayed and compared against filters.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Permit {
        serde_json::from_value(json!({
            "job_filing_number": "B00123456-I1",
            "house_no": 100,
            "owner_name": "",
            "bin": null,
            "location": { "latitude": "40.7", "inner": { "deep": true } },
            "zz_custom": "kept"
        }))
        .unwrap()
    }

    #[test]
    fn dotted_paths_walk_nested_objects() {
        let permit = sample();
        assert_eq!(permit.field("location.latitude"), "40.7");
        assert_eq!(permit.field("location.inner.deep"), "true");
        assert_eq!(permit.field("location.missing"), NOT_AVAILABLE);
        assert_eq!(permit.field("job_filing_number.nope"), NOT_AVAILABLE);
    }

    #[test]
    fn blank_values_fall_back_to_default() {
        let permit = sample();
        assert_eq!(permit.field("owner_name"), NOT_AVAILABLE);
        assert_eq!(permit.field("bin"), NOT_AVAILABLE);
        assert_eq!(permit.field_or("missing", ""), "");
        assert_eq!(permit.text("owner_name"), None);
    }

    #[test]
    fn numbers_are_stringified() {
        assert_eq!(sample().field("house_no"), "100");
    }

    #[test]
    fn unknown_fields_keep_their_order() {
        let keys: Vec<_> = sample().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![
                "job_filing_number",
                "house_no",
                "owner_name",
                "bin",
                "location",
                "zz_custom"
            ]
        );
    }

    #[test]
    fn issued_at_parses_dataset_timestamps() {
        let permit: Permit = [("issued_date", "2024-01-31T00:00:00.000")]
            .into_iter()
            .collect();
        assert_eq!(
            permit.issued_at().map(|d| d.to_string()),
            Some("2024-01-31 00:00:00".to_string())
        );
        let undated: Permit = [("issued_date", "soon")].into_iter().collect();
        assert_eq!(undated.issued_at(), None);
    }
}
