pub mod config;
pub mod render;
pub mod shell;
mod sink;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use chrono::NaiveDate;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use config::APP_TOKEN_ENV;
use config::Overrides;
use permit_finder_engine::PermitDetails;
use permit_finder_engine::SearchOrchestrator;
use permit_finder_engine::Severity;
use permit_finder_engine::ViewModel;
use permit_finder_socrata::SocrataClient;
use render::Renderer;
use serde::Serialize;
use sink::ProgressSink;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "permit-finder",
    version,
    about = "Search NYC DOB NOW approved building permits by address"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file (defaults to $PERMIT_FINDER_HOME/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dataset resource URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Socrata app token (falls back to $PERMIT_FINDER_APP_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub app_token: Option<String>,

    /// Do not touch the network
    #[arg(long, global = true)]
    pub offline: bool,

    /// Scan twice as many neighbouring house numbers
    #[arg(long, global = true)]
    pub wide: bool,

    /// House numbers tried on each side when there is no exact match
    #[arg(long, global = true, value_name = "N")]
    pub radius: Option<u32>,

    /// Print views as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search permits at an address, falling back to nearby house numbers
    Address(AddressArgs),

    /// Search permits where a field equals a value
    Pivot(PivotArgs),

    /// Interactive session with history, filters and details
    Shell,
}

#[derive(Debug, Args)]
pub struct AddressArgs {
    /// House number, e.g. 100 or 12-34
    #[arg(value_name = "HOUSE_NUMBER")]
    pub house_number: String,

    /// Street name, e.g. "Main St"
    #[arg(value_name = "STREET", required = true, num_args = 1..)]
    pub street: Vec<String>,

    /// Only permits issued on or after this date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub since: Option<NaiveDate>,

    /// Keep only rows where FIELD equals VALUE (repeatable)
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Hide a column by id (repeatable)
    #[arg(long = "hide", value_name = "COLUMN")]
    pub hidden: Vec<String>,

    /// Print details of the permit with this filing number
    #[arg(long, value_name = "FILING_NUMBER")]
    pub details: Option<String>,
}

#[derive(Debug, Args)]
pub struct PivotArgs {
    /// Dataset field, e.g. owner_name
    #[arg(value_name = "FIELD")]
    pub field: String,

    /// Value to match exactly
    #[arg(value_name = "VALUE", required = true, num_args = 1..)]
    pub value: Vec<String>,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            app_token: self.app_token.clone(),
            offline: self.offline,
            wide: self.wide,
            radius: self.radius,
        }
    }

    fn color(&self) -> bool {
        !self.no_color
            && !self.json
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal()
    }
}

/// Writes views to stdout as text or JSON.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub renderer: Renderer,
    pub json: bool,
}

impl Printer {
    pub fn view(&self, view: &ViewModel) -> Result<()> {
        if self.json {
            return print_json(view);
        }
        print!("{}", self.renderer.view(view));
        Ok(())
    }

    pub fn details(&self, details: &PermitDetails) -> Result<()> {
        if self.json {
            return print_json(details);
        }
        print!("{}", self.renderer.details(details));
        Ok(())
    }

    pub fn text(&self, text: &str) {
        if !self.json {
            print!("{text}");
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.global.config.as_deref())?
        .with_overrides(&cli.global.overrides(), std::env::var(APP_TOKEN_ENV).ok());
    config.validate()?;

    let source = SocrataClient::new(&config.source).context("failed to create permit source")?;
    let printer = Printer {
        renderer: Renderer::new(cli.global.color()),
        json: cli.global.json,
    };
    let orchestrator = SearchOrchestrator::new(Arc::new(source), config.search)?
        .with_sink(Arc::new(ProgressSink::new(printer.renderer)));

    match cli.command {
        Command::Address(args) => run_address(&orchestrator, args, printer).await,
        Command::Pivot(args) => run_pivot(&orchestrator, args, printer).await,
        Command::Shell => shell::run(&orchestrator, printer).await,
    }
}

async fn run_address(
    orchestrator: &SearchOrchestrator,
    args: AddressArgs,
    printer: Printer,
) -> Result<()> {
    let street = args.street.join(" ");
    if let Err(err) = orchestrator
        .run_address_search(&args.house_number, &street, args.since)
        .await
    {
        let status = orchestrator.view().await.status.text;
        return Err(anyhow::Error::new(err).context(status));
    }

    for column in &args.hidden {
        orchestrator.set_column_visible(column, false).await?;
    }
    for filter in &args.filters {
        let Some((field, value)) = filter.split_once('=') else {
            bail!("invalid filter '{filter}', expected FIELD=VALUE");
        };
        orchestrator
            .toggle_filter_value(field.trim(), value.trim(), true)
            .await;
    }

    printer.view(&orchestrator.view().await)?;

    if let Some(filing) = &args.details {
        let Some(details) = orchestrator.details(filing).await else {
            bail!("no permit with filing number {filing} in the results");
        };
        printer.text("\n");
        printer.details(&details)?;
    }
    Ok(())
}

async fn run_pivot(
    orchestrator: &SearchOrchestrator,
    args: PivotArgs,
    printer: Printer,
) -> Result<()> {
    let value = args.value.join(" ");
    orchestrator
        .run_parameter_search(&args.field, &value, &value)
        .await?;
    let view = orchestrator.view().await;
    printer.view(&view)?;
    if view.rows.is_empty() && view.status.severity == Severity::Error {
        bail!("{}", view.status.text);
    }
    Ok(())
}
