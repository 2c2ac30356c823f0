//! Interactive session over one [`SearchOrchestrator`].

use crate::Printer;
use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use chrono::NaiveDate;
use permit_finder_engine::SearchOrchestrator;
use std::io::Write;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing::info;

const PROMPT: &str = "permit-finder> ";

const HELP: &str = "\
Commands:
  search HOUSE STREET... [since=YYYY-MM-DD]   exact address, then nearby
  pivot FIELD VALUE...                         permits where FIELD = VALUE
  back [N]                                     previous search, or breadcrumb N
  history                                      list breadcrumbs
  columns                                      list columns
  hide COLUMN | show COLUMN                    toggle a column
  filter FIELD VALUE... | unfilter FIELD VALUE...
                                               allow or drop a value
  clear                                        drop every value filter
  details ROW|FILING_NUMBER                    permit details and links
  view                                         print the current results
  help                                         this text
  quit                                         leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsTarget {
    /// 1-based row number as printed in the table
    Row(usize),
    FilingNumber(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search {
        house_number: String,
        street_name: String,
        since: Option<NaiveDate>,
    },
    Pivot {
        field: String,
        value: String,
    },
    /// 1-based breadcrumb number; `None` steps back one frame.
    Back(Option<usize>),
    History,
    Columns,
    Hide(String),
    Show(String),
    Filter {
        field: String,
        value: String,
        enabled: bool,
    },
    Clear,
    Details(DetailsTarget),
    View,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let words = shlex::split(line).ok_or_else(|| anyhow!("unbalanced quotes"))?;
    let Some((name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match name.as_str() {
        "search" | "s" => {
            let mut args = args.to_vec();
            let since = match args.last().and_then(|last| last.strip_prefix("since=")) {
                Some(date) => {
                    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                        .map_err(|err| anyhow!("invalid date '{date}': {err}"))?;
                    args.pop();
                    Some(date)
                }
                None => None,
            };
            let Some((house_number, street)) = args.split_first() else {
                bail!("usage: search HOUSE STREET... [since=YYYY-MM-DD]");
            };
            ShellCommand::Search {
                house_number: house_number.clone(),
                street_name: street.join(" "),
                since,
            }
        }
        "pivot" | "p" => {
            let (field, value) = field_and_value(args, "pivot FIELD VALUE...")?;
            ShellCommand::Pivot { field, value }
        }
        "filter" | "unfilter" => {
            let (field, value) = field_and_value(args, &format!("{name} FIELD VALUE..."))?;
            ShellCommand::Filter {
                field,
                value,
                enabled: name == "filter",
            }
        }
        "back" | "b" => match args {
            [] => ShellCommand::Back(None),
            [n] => ShellCommand::Back(Some(
                n.parse()
                    .map_err(|_| anyhow!("breadcrumb must be a number, got '{n}'"))?,
            )),
            _ => bail!("usage: back [N]"),
        },
        "hide" | "show" => {
            let [column] = args else {
                bail!("usage: {name} COLUMN");
            };
            if name == "hide" {
                ShellCommand::Hide(column.clone())
            } else {
                ShellCommand::Show(column.clone())
            }
        }
        "details" | "d" => {
            let [target] = args else {
                bail!("usage: details ROW|FILING_NUMBER");
            };
            match target.parse::<usize>() {
                Ok(row) => ShellCommand::Details(DetailsTarget::Row(row)),
                Err(_) => ShellCommand::Details(DetailsTarget::FilingNumber(target.clone())),
            }
        }
        "history" => ShellCommand::History,
        "columns" => ShellCommand::Columns,
        "clear" => ShellCommand::Clear,
        "view" | "v" => ShellCommand::View,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

fn field_and_value(args: &[String], usage: &str) -> Result<(String, String)> {
    match args.split_first() {
        Some((field, value)) if !value.is_empty() => Ok((field.clone(), value.join(" "))),
        _ => bail!("usage: {usage}"),
    }
}

pub async fn run(orchestrator: &SearchOrchestrator, printer: Printer) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    printer.text("Type 'help' for commands.\n");
    prompt(printer)?;
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(err) = execute(orchestrator, command, printer).await {
                    eprintln!("error: {err:#}");
                }
            }
            Err(err) => eprintln!("error: {err:#}"),
        }
        prompt(printer)?;
    }
    Ok(())
}

fn prompt(printer: Printer) -> Result<()> {
    printer.text(PROMPT);
    std::io::stdout().flush()?;
    Ok(())
}

pub async fn execute(
    orchestrator: &SearchOrchestrator,
    command: ShellCommand,
    printer: Printer,
) -> Result<()> {
    match command {
        ShellCommand::Search {
            house_number,
            street_name,
            since,
        } => {
            // The failure is already in the status line.
            if let Err(err) = orchestrator
                .run_address_search(&house_number, &street_name, since)
                .await
            {
                info!("address search failed: {err}");
            }
        }
        ShellCommand::Pivot { field, value } => {
            orchestrator
                .run_parameter_search(&field, &value, &value)
                .await?;
        }
        ShellCommand::Back(target) => {
            let len = orchestrator.history().await.len();
            let index = match target {
                Some(0) => bail!("breadcrumbs are numbered from 1"),
                Some(n) => n - 1,
                None if len >= 2 => len - 2,
                None => bail!("already at the first search"),
            };
            orchestrator.navigate_to(index).await?;
        }
        ShellCommand::History => {
            let view = orchestrator.view().await;
            if view.frames.is_empty() {
                printer.text("No searches yet.\n");
            } else {
                printer.text(&format!("{}\n", printer.renderer.breadcrumbs(&view)));
            }
            return Ok(());
        }
        ShellCommand::Columns => {
            printer.text(&printer.renderer.columns(&orchestrator.view().await));
            return Ok(());
        }
        ShellCommand::Hide(column) => {
            orchestrator.set_column_visible(&column, false).await?;
        }
        ShellCommand::Show(column) => {
            orchestrator.set_column_visible(&column, true).await?;
        }
        ShellCommand::Filter {
            field,
            value,
            enabled,
        } => {
            orchestrator
                .toggle_filter_value(&field, &value, enabled)
                .await;
        }
        ShellCommand::Clear => orchestrator.clear_filters().await,
        ShellCommand::Details(target) => {
            let details = match &target {
                DetailsTarget::Row(0) => None,
                DetailsTarget::Row(row) => orchestrator.details_for_row(row - 1).await,
                DetailsTarget::FilingNumber(filing) => orchestrator.details(filing).await,
            };
            let Some(details) = details else {
                bail!("no such permit in the current results");
            };
            return printer.details(&details);
        }
        ShellCommand::View => {}
        ShellCommand::Help => {
            printer.text(HELP);
            return Ok(());
        }
        ShellCommand::Quit => return Ok(()),
    }
    printer.view(&orchestrator.view().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(line: &str) -> ShellCommand {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn search_joins_street_words() {
        assert_eq!(
            parse("search 100 Main St"),
            ShellCommand::Search {
                house_number: "100".to_string(),
                street_name: "Main St".to_string(),
                since: None,
            }
        );
        assert_eq!(
            parse("search 12-34 \"Ocean Pkwy\" since=2022-01-31"),
            ShellCommand::Search {
                house_number: "12-34".to_string(),
                street_name: "Ocean Pkwy".to_string(),
                since: NaiveDate::from_ymd_opt(2022, 1, 31),
            }
        );
    }

    #[test]
    fn search_arguments_are_checked() {
        assert!(parse_command("search").is_err());
        assert!(parse_command("search 100 Main since=31/01/2022").is_err());
    }

    #[test]
    fn quoted_values_survive() {
        assert_eq!(
            parse("pivot owner_name \"O'NEIL LLC\""),
            ShellCommand::Pivot {
                field: "owner_name".to_string(),
                value: "O'NEIL LLC".to_string(),
            }
        );
        assert_eq!(
            parse("unfilter permit_status ISSUED"),
            ShellCommand::Filter {
                field: "permit_status".to_string(),
                value: "ISSUED".to_string(),
                enabled: false,
            }
        );
        assert!(parse_command("pivot owner_name").is_err());
        assert!(parse_command("pivot \"unterminated").is_err());
    }

    #[test]
    fn navigation_and_details_targets() {
        assert_eq!(parse("back"), ShellCommand::Back(None));
        assert_eq!(parse("back 2"), ShellCommand::Back(Some(2)));
        assert!(parse_command("back two").is_err());
        assert_eq!(parse("details 3"), ShellCommand::Details(DetailsTarget::Row(3)));
        assert_eq!(
            parse("d B00123-I1"),
            ShellCommand::Details(DetailsTarget::FilingNumber("B00123-I1".to_string()))
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("frobnicate").is_err());
        assert_eq!(parse("exit"), ShellCommand::Quit);
        assert_eq!(parse("hide borough"), ShellCommand::Hide("borough".to_string()));
    }
}
