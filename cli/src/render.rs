use owo_colors::OwoColorize;
use owo_colors::Style;
use permit_finder_engine::ExternalLink;
use permit_finder_engine::PermitDetails;
use permit_finder_engine::Severity;
use permit_finder_engine::StatusMessage;
use permit_finder_engine::ViewModel;
use std::borrow::Cow;

const MAX_CELL_WIDTH: usize = 32;
const COLUMN_GAP: &str = "  ";

/// Plain-text rendering of engine views.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn status(&self, status: &StatusMessage) -> String {
        let (marker, style) = match status.severity {
            Severity::Info => ("▶", Style::new().bright_blue()),
            Severity::Success => ("✓", Style::new().bright_green()),
            Severity::Error => ("✗", Style::new().bright_red()),
        };
        format!("{} {}", self.paint(marker, style), status.text)
    }

    pub fn view(&self, view: &ViewModel) -> String {
        let mut out = format!("{}\n", self.paint(&view.title, Style::new().bold()));
        if !view.frames.is_empty() {
            out.push_str(&format!("{}\n", self.breadcrumbs(view)));
        }
        out.push('\n');
        if !view.rows.is_empty() {
            out.push_str(&self.table(view));
            out.push('\n');
        }
        out.push_str(&format!("{}\n", self.status(&view.status)));

        let filters = self.filter_summary(view);
        if !filters.is_empty() {
            out.push('\n');
            out.push_str(&filters);
        }
        out
    }

    /// `[1] Address: 100 MAIN ST > [2] Parameter: ...`, active frame in bold.
    pub fn breadcrumbs(&self, view: &ViewModel) -> String {
        view.frames
            .iter()
            .map(|crumb| {
                let text = format!("[{}] {}", crumb.index + 1, crumb.label);
                if crumb.active {
                    self.paint(&text, Style::new().bold())
                } else {
                    self.paint(&text, Style::new().dimmed())
                }
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Numbered rows under the visible column headers.
    pub fn table(&self, view: &ViewModel) -> String {
        let mut widths: Vec<usize> = std::iter::once("#".len())
            .chain(view.visible_columns.iter().map(|label| width(label.as_str())))
            .collect();
        let rows: Vec<Vec<String>> = view
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                std::iter::once((i + 1).to_string())
                    .chain(row.cells.iter().map(|cell| truncate(cell, MAX_CELL_WIDTH)))
                    .collect()
            })
            .collect();
        for row in &rows {
            for (slot, cell) in widths.iter_mut().zip(row) {
                *slot = (*slot).max(width(cell));
            }
        }

        let header: Vec<String> = std::iter::once("#".to_string())
            .chain(view.visible_columns.iter().cloned())
            .collect();
        let header = self.paint(&pad_row(&header, &widths), Style::new().bold());
        std::iter::once(header)
            .chain(rows.iter().map(|row| pad_row(row, &widths)))
            .map(|line| line + "\n")
            .collect()
    }

    pub fn filter_summary(&self, view: &ViewModel) -> String {
        view.filter_domains
            .iter()
            .filter(|domain| !domain.values.is_empty())
            .map(|domain| {
                let values = domain
                    .values
                    .iter()
                    .map(|value| {
                        if view.active_filters.is_allowed(&domain.field, value) {
                            self.paint(&format!("[x] {value}"), Style::new().bright_cyan())
                        } else {
                            value.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} ({}): {values}\n", domain.label, domain.field)
            })
            .collect()
    }

    pub fn columns(&self, view: &ViewModel) -> String {
        view.columns
            .iter()
            .map(|column| {
                let mark = if column.visible { "[x]" } else { "[ ]" };
                let pinned = if column.always_visible {
                    " always visible"
                } else {
                    ""
                };
                format!("{mark} {} ({}){pinned}\n", column.id, column.label)
            })
            .collect()
    }

    pub fn details(&self, details: &PermitDetails) -> String {
        let label_width = details
            .items
            .iter()
            .map(|item| width(&item.label))
            .max()
            .unwrap_or_default();

        let mut lines = vec![self.paint(&details.title, Style::new().bold())];
        for item in &details.items {
            let mut line = format!("  {:<label_width$}  {}", item.label, item.value);
            if item.pivotable
                && let Some(raw) = &item.raw_value
            {
                let hint = format!("pivot {} {}", item.field, quote_arg(raw));
                line.push_str(&format!("  {}", self.paint(&hint, Style::new().dimmed())));
            }
            lines.push(line);
        }
        lines.push(String::new());
        lines.extend(details.links.iter().map(|link| match link {
            ExternalLink::Link { label, url } => {
                format!("  {label}: {}", self.paint(url, Style::new().underline()))
            }
            ExternalLink::Notice { text } => {
                format!("  {}", self.paint(text, Style::new().dimmed()))
            }
        }));
        lines.iter().map(|line| format!("{line}\n")).collect()
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn truncate(text: &str, max: usize) -> String {
    if width(text) <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

/// Quote `value` for the shell when it contains whitespace or quotes.
fn quote_arg(value: &str) -> String {
    shlex::try_quote(value)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_finder_engine::DetailsLinkResolver;
    use permit_finder_engine::Permit;
    use permit_finder_engine::SearchConfig;
    use permit_finder_engine::SearchState;
    use permit_finder_engine::SessionState;
    use permit_finder_engine::build_view;
    use pretty_assertions::assert_eq;

    fn record(filing: &str, street: &str) -> Permit {
        [
            ("job_filing_number", filing),
            ("house_no", "100"),
            ("street_name", street),
            ("borough", "QUEENS"),
            ("issued_date", "2023-04-05T00:00:00.000"),
            ("owner_name", "ACME HOLDINGS LLC"),
        ]
        .into_iter()
        .collect()
    }

    fn view() -> ViewModel {
        let mut session = SessionState::default();
        session.push_frame(SearchState::exact_address(
            "100",
            "MAIN ST",
            None,
            vec![
                record("J1", "MAIN ST"),
                record("J22", "MAIN STREET EXTENSION WEST BRANCH"),
            ],
        ));
        build_view(&session, &SearchConfig::default())
    }

    #[test]
    fn plain_view_has_title_table_and_status() {
        let text = Renderer::new(false).view(&view());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Address: 100 MAIN ST");
        assert_eq!(lines[1], "[1] Address: 100 MAIN ST");
        assert!(lines[3].starts_with("#  Job Filing #  Borough  House No  Street Name"));
        assert!(lines[4].starts_with("1  J1            QUEENS   100       MAIN ST "));
        assert!(text.contains("MAIN STREET EXTENSION WEST BRAN…"));
        assert!(text.contains("04/05/2023"));
        assert!(text.contains(
            "✓ 2 permit(s) found for Address: 100 MAIN ST. Displaying up to 500 newest."
        ));
        assert!(text.contains("Borough (borough): QUEENS"));
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("abcd", 3), "ab…");
        assert_eq!(truncate("ééééé", 4), "ééé…");
    }

    #[test]
    fn details_show_pivot_hints() {
        let details = DetailsLinkResolver::default().resolve(&record("J1", "MAIN ST"));
        let text = Renderer::new(false).details(&details);
        assert!(text.starts_with("Details: J1\n"));
        assert!(text.contains("pivot owner_name 'ACME HOLDINGS LLC'"));
        assert!(!text.contains("pivot job_filing_number"));
        assert!(text.contains("DOB NOW Public Portal (Search Job #: J1): https://a810-dobnow.nyc.gov/"));
    }

    #[test]
    fn columns_list_marks_visibility() {
        let text = Renderer::new(false).columns(&view());
        assert!(text.starts_with("[x] job_filing_number (Job Filing #) always visible\n"));
        assert!(text.contains("[x] permit_status (Status)\n"));
    }
}
