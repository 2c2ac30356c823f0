use crate::date::format_short_date;
use crate::error::Result;
use crate::error::SearchError;
use crate::permit::NOT_AVAILABLE;
use crate::permit::Permit;
use crate::permit::fields;

/// Where a column's cell text comes from.
#[derive(Debug, Clone)]
pub enum ColumnValue {
    /// Dotted path into the record
    Field(String),
    /// Derived from the whole record
    Computed(fn(&Permit) -> String),
}

/// One table column. Position in the owning [`ColumnSet`] is display order.
#[derive(Debug, Clone)]
pub struct Column {
    pub id: String,
    pub label: String,
    pub visible: bool,
    pub always_visible: bool,
    pub value: ColumnValue,
    pub is_date: bool,
    pub filterable: bool,
}

impl Column {
    pub fn field(id: &str, label: &str, data_key: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            visible: true,
            always_visible: false,
            value: ColumnValue::Field(data_key.to_string()),
            is_date: false,
            filterable: false,
        }
    }

    pub fn computed(id: &str, label: &str, render: fn(&Permit) -> String) -> Self {
        Self {
            value: ColumnValue::Computed(render),
            ..Self::field(id, label, id)
        }
    }

    pub fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self.visible = true;
        self
    }

    pub fn date(mut self) -> Self {
        self.is_date = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = self.always_visible;
        self
    }

    /// Record field backing this column, if it is not computed.
    pub fn data_key(&self) -> Option<&str> {
        match &self.value {
            ColumnValue::Field(key) => Some(key),
            ColumnValue::Computed(_) => None,
        }
    }

    /// Cell text for `permit`.
    pub fn render(&self, permit: &Permit) -> String {
        match &self.value {
            ColumnValue::Computed(render) => render(permit),
            ColumnValue::Field(key) => {
                let text = permit.field(key);
                if self.is_date && text != NOT_AVAILABLE {
                    format_short_date(&text)
                } else {
                    text
                }
            }
        }
    }
}

/// `first last`, trimmed, or `N/A` when both are blank.
pub fn permittee_name(permit: &Permit) -> String {
    let name = format!(
        "{} {}",
        permit.field_or(fields::PERMITTEE_FIRST_NAME, ""),
        permit.field_or(fields::PERMITTEE_LAST_NAME, "")
    );
    let name = name.trim();
    if name.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        name.to_string()
    }
}

/// Ordered column configuration.
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self::new(vec![
            Column::field("job_filing_number", "Job Filing #", fields::JOB_FILING_NUMBER)
                .always_visible(),
            Column::field("borough", "Borough", fields::BOROUGH).filterable(),
            Column::field("house_no", "House No", fields::HOUSE_NO),
            Column::field("street_name", "Street Name", fields::STREET_NAME),
            Column::field("work_type", "Work Type", fields::WORK_TYPE).filterable(),
            Column::field("issued_date", "Issuance Date", fields::ISSUED_DATE).date(),
            Column::computed("permittee", "Permittee", permittee_name),
            Column::field("permit_status", "Status", fields::PERMIT_STATUS).filterable(),
        ])
    }
}

impl ColumnSet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.visible)
    }

    pub fn filterable(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.filterable)
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// Show or hide a column. Returns whether anything changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<bool> {
        let Some(column) = self.columns.iter_mut().find(|column| column.id == id) else {
            return Err(SearchError::Validation(format!("unknown column '{id}'")));
        };
        if column.always_visible && !visible {
            return Err(SearchError::Validation(format!(
                "column '{}' is always visible",
                column.label
            )));
        }
        let changed = column.visible != visible;
        column.visible = visible;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids<'a>(columns: impl Iterator<Item = &'a Column>) -> Vec<&'a str> {
        columns.map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn default_columns_in_display_order() {
        let columns = ColumnSet::default();
        assert_eq!(
            ids(columns.iter()),
            vec![
                "job_filing_number",
                "borough",
                "house_no",
                "street_name",
                "work_type",
                "issued_date",
                "permittee",
                "permit_status"
            ]
        );
        assert_eq!(
            ids(columns.filterable()),
            vec!["borough", "work_type", "permit_status"]
        );
    }

    #[test]
    fn hiding_keeps_order_and_refuses_always_visible() {
        let mut columns = ColumnSet::default();
        assert!(columns.set_visible("borough", false).unwrap());
        assert!(!columns.set_visible("borough", false).unwrap());
        assert_eq!(ids(columns.visible()).len(), 7);

        assert!(columns.set_visible("job_filing_number", false).is_err());
        assert!(columns.set_visible("nope", true).is_err());

        assert!(columns.set_visible("borough", true).unwrap());
        assert_eq!(ids(columns.visible())[1], "borough");
    }

    #[test]
    fn rendering_cells() {
        let permit: Permit = [
            ("issued_date", "2023-04-05T00:00:00.000"),
            ("permittee_s_first_name", "Ada"),
            ("permittee_s_last_name", ""),
        ]
        .into_iter()
        .collect();
        let columns = ColumnSet::default();
        let cell = |id: &str| columns.get(id).map(|c| c.render(&permit));
        assert_eq!(cell("issued_date"), Some("04/05/2023".to_string()));
        assert_eq!(cell("permittee"), Some("Ada".to_string()));
        assert_eq!(cell("borough"), Some("N/A".to_string()));

        let empty = Permit::default();
        assert_eq!(permittee_name(&empty), "N/A");
    }
}
