use crate::borough::borough_code;
use crate::config::SearchConfig;
use crate::date::format_long_date;
use crate::permit::NOT_AVAILABLE;
use crate::permit::Permit;
use crate::permit::fields;
use crate::permit::value_to_text;
use crate::state::field_label;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

const DOB_NOW_JOB_SEARCH_URL: &str = "https://a810-dobnow.nyc.gov/publish/Index.html#!/search?tab=Job";
const DOB_NOW_ADDRESS_SEARCH_URL: &str =
    "https://a810-dobnow.nyc.gov/publish/Index.html#!/search?tab=Address";
const BIS_BASE_URL: &str = "https://a810-bisweb.nyc.gov/bisweb";
const ZOLA_BASE_URL: &str = "https://zola.planning.nyc.gov";

const NO_IDENTIFIERS_NOTICE: &str =
    "No specific identifiers (Job # or BIN) available for direct linking to all portals.";

/// Fields shown first, in this order, when present.
const PRIORITY_FIELDS: &[&str] = &[
    fields::JOB_FILING_NUMBER,
    fields::BOROUGH,
    fields::HOUSE_NO,
    fields::STREET_NAME,
    fields::BLOCK,
    fields::LOT,
    fields::BIN,
    fields::WORK_TYPE,
    fields::JOB_DESCRIPTION,
    fields::PERMIT_STATUS,
    fields::ISSUED_DATE,
    fields::EXPIRED_DATE,
    fields::PERMITTEE_FIRST_NAME,
    fields::PERMITTEE_LAST_NAME,
    fields::PERMITTEE_BUSINESS_NAME,
    fields::PERMITTEE_LICENSE_TYPE,
    fields::OWNER_NAME,
    fields::OWNER_BUSINESS_NAME,
];

/// Identifiers and dates are too specific to be useful pivot keys.
const NON_PIVOT_FIELDS: &[&str] = &[
    fields::JOB_FILING_NUMBER,
    fields::BIN,
    fields::BLOCK,
    fields::LOT,
    fields::JOB_DESCRIPTION,
    fields::ISSUED_DATE,
    fields::EXPIRED_DATE,
    fields::APPROVED_DATE,
    fields::HOUSE_NO,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub field: String,
    pub label: String,
    pub value: String,
    /// Value to search for when the item is pivoted on
    pub raw_value: Option<String>,
    pub pivotable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExternalLink {
    Link { label: String, url: String },
    Notice { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitDetails {
    pub title: String,
    pub items: Vec<DetailItem>,
    pub links: Vec<ExternalLink>,
}

/// Builds the detail view of a single permit.
#[derive(Debug, Clone)]
pub struct DetailsLinkResolver {
    max_pivot_value_len: usize,
}

impl Default for DetailsLinkResolver {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl DetailsLinkResolver {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            max_pivot_value_len: config.max_pivot_value_len,
        }
    }

    pub fn resolve(&self, permit: &Permit) -> PermitDetails {
        PermitDetails {
            title: format!(
                "Details: {}",
                permit.field_or(fields::JOB_FILING_NUMBER, "Permit")
            ),
            items: self.detail_items(permit),
            links: external_links(permit),
        }
    }

    /// Priority fields first, then every other field in record order, each
    /// exactly once.
    pub fn detail_items(&self, permit: &Permit) -> Vec<DetailItem> {
        let mut emitted = HashSet::new();
        let priority = PRIORITY_FIELDS.iter().filter_map(|field| {
            permit
                .iter()
                .find(|(key, _)| key.as_str() == *field)
        });
        priority
            .chain(permit.iter())
            .filter(|(key, _)| emitted.insert(key.as_str()))
            .map(|(key, value)| self.detail_item(key, value))
            .collect()
    }

    fn detail_item(&self, field: &str, value: &Value) -> DetailItem {
        let raw = value_to_text(value);
        let raw_value = (!raw.trim().is_empty()).then_some(raw);
        let display = match raw_value.as_deref() {
            None => NOT_AVAILABLE.to_string(),
            Some(text) => format_long_date(text).unwrap_or_else(|| text.to_string()),
        };
        DetailItem {
            field: field.to_string(),
            label: field_label(field),
            pivotable: self.is_pivotable(field, raw_value.as_deref()),
            value: display,
            raw_value,
        }
    }

    /// Whether `field = value` is a sensible follow-up search.
    pub fn is_pivotable(&self, field: &str, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        if value == NOT_AVAILABLE || value.trim().is_empty() {
            return false;
        }
        !NON_PIVOT_FIELDS.contains(&field) && value.chars().count() <= self.max_pivot_value_len
    }
}

/// Cross-reference links for a permit, in display order.
pub fn external_links(permit: &Permit) -> Vec<ExternalLink> {
    let filing = identifier(permit, fields::JOB_FILING_NUMBER);
    let bin = identifier(permit, fields::BIN);
    let borough = identifier(permit, fields::BOROUGH);
    let parcel = match (
        borough.as_deref().and_then(borough_code),
        identifier(permit, fields::BLOCK),
        identifier(permit, fields::LOT),
    ) {
        (Some(code), Some(block), Some(lot)) => Some((code, block, lot)),
        _ => None,
    };

    if filing.is_none() && bin.is_none() && parcel.is_none() {
        return vec![ExternalLink::Notice {
            text: NO_IDENTIFIERS_NOTICE.to_string(),
        }];
    }

    let mut links = Vec::new();
    if let Some(filing) = &filing {
        links.push(link(
            format!("DOB NOW Public Portal (Search Job #: {filing})"),
            DOB_NOW_JOB_SEARCH_URL.to_string(),
        ));
        links.push(link(
            format!("BIS: Job Details (Job #: {filing})"),
            format!(
                "{BIS_BASE_URL}/JobsQueryByNumberServlet?passjobnumber={}&allbin=&allcount=1",
                urlencoding::encode(filing)
            ),
        ));
    }
    if let Some(bin) = &bin {
        links.push(link(
            format!("DOB NOW Public Portal (Search BIN: {bin})"),
            DOB_NOW_ADDRESS_SEARCH_URL.to_string(),
        ));
        links.push(link(
            format!("BIS: Property Profile (BIN: {bin})"),
            format!(
                "{BIS_BASE_URL}/PropertyProfileOverviewServlet?bin={}&bbl=&requestid=0",
                urlencoding::encode(bin)
            ),
        ));
    }
    match (parcel, &bin) {
        (Some((code, block, lot)), _) => links.push(link(
            format!(
                "ZoLa: Zoning & Land Use (Lot: {} B:{block} L:{lot})",
                borough.as_deref().unwrap_or_default()
            ),
            format!(
                "{ZOLA_BASE_URL}/lot/{code}/{}/{}",
                urlencoding::encode(&block),
                urlencoding::encode(&lot)
            ),
        )),
        (None, Some(bin)) => links.push(link(
            format!("ZoLa: Zoning & Land Use (Search by BIN: {bin} or address)"),
            format!("{ZOLA_BASE_URL}/"),
        )),
        (None, None) => links.push(link(
            "ZoLa: Zoning & Land Use (Search by address)".to_string(),
            format!("{ZOLA_BASE_URL}/"),
        )),
    }
    links
}

fn identifier(permit: &Permit, field: &str) -> Option<String> {
    permit
        .text(field)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty() && text != NOT_AVAILABLE)
}

fn link(label: String, url: String) -> ExternalLink {
    ExternalLink::Link { label, url }
}
