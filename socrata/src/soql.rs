//! SoQL rendering of [`PermitQuery`].

use permit_finder_engine::Condition;
use permit_finder_engine::PermitQuery;
use permit_finder_engine::SortDirection;

/// Quote a string literal, doubling embedded single quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn render_condition(condition: &Condition) -> String {
    match condition {
        Condition::Equals { field, value } => format!("{field}={}", quote(value)),
        Condition::EqualsIgnoreCase { field, value } => {
            format!("upper({field})={}", quote(value))
        }
        Condition::OnOrAfter { field, date } => {
            format!("{field}>='{}T00:00:00.000'", date.format("%Y-%m-%d"))
        }
    }
}

pub fn render_where(query: &PermitQuery) -> String {
    query
        .conditions
        .iter()
        .map(render_condition)
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub fn render_order(query: &PermitQuery) -> String {
    query
        .order
        .iter()
        .map(|key| match key.direction {
            SortDirection::Ascending => format!("{} ASC", key.field),
            SortDirection::Descending => format!("{} DESC", key.field),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Query-string parameters for `query`. Empty clauses are omitted.
pub fn params(query: &PermitQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(3);
    let where_clause = render_where(query);
    if !where_clause.is_empty() {
        params.push(("$where", where_clause));
    }
    let order = render_order(query);
    if !order.is_empty() {
        params.push(("$order", order));
    }
    params.push(("$limit", query.limit.to_string()));
    params
}
