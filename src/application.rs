use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{latest_week, WeeklyAggregate};
use crate::ai::{AiError, AnthropicClient, TextGenerator};
use crate::config::Settings;
use crate::error::{ReportError, Result};
use crate::ingest::{load_sales, Ingested, SkippedRow};
use crate::menu;
use crate::money::Amount;
use crate::record::SalesRecord;
use crate::report::{format_menu_report, format_weekly_report, Lang};
use crate::social::{generate_posts, ContentSummary, PostKind};
use crate::trend::{self, Change, TrendDelta};
use crate::week::Week;

pub const WEEKLY_REPORT_FILE: &str = "weekly_report.txt";
pub const WEEKLY_SUMMARY_FILE: &str = "weekly_summary.json";
pub const MENU_REPORT_FILE: &str = "menu_analysis.txt";

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
    pub lang: Lang,
}

/// Which week the weekly report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeekSelection {
    /// The week of the latest sale in the data.
    #[default]
    Latest,
    /// The week containing this date.
    Containing(NaiveDate),
    Iso(Week),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Report(WeekSelection),
    Menu,
    Social { restaurant: Option<String> },
    All { restaurant: Option<String> },
}

/// Load the input once, then run `command` and print what it produced.
pub fn run(options: &Options, command: &Command, settings: Settings) -> Result<()> {
    let data = load_sales(&options.input)?;
    fs::create_dir_all(&options.output).map_err(|e| ReportError::io(&options.output, e))?;

    match command {
        Command::Report(selection) => {
            println!("{}", weekly_report(&data, *selection, options)?);
        }
        Command::Menu => {
            println!("{}", menu_report(&data.records, options)?);
        }
        Command::Social { restaurant } => {
            let settings = override_restaurant(settings, restaurant.as_deref());
            print_posts(&social(&data.records, options, &settings)?);
        }
        Command::All { restaurant } => {
            let settings = override_restaurant(settings, restaurant.as_deref());
            println!("{}", weekly_report(&data, WeekSelection::Latest, options)?);
            println!("{}", menu_report(&data.records, options)?);
            print_posts(&social(&data.records, options, &settings)?);
        }
    }

    info!(output = %options.output.display(), "done");
    Ok(())
}

/// A `--restaurant` flag wins over the configured name.
pub fn override_restaurant(settings: Settings, restaurant: Option<&str>) -> Settings {
    match restaurant {
        Some(name) => settings.with_restaurant(name),
        None => settings,
    }
}

pub fn select_week(records: &[SalesRecord], selection: WeekSelection) -> Week {
    match selection {
        WeekSelection::Containing(date) => Week::containing(date),
        WeekSelection::Iso(week) => week,
        WeekSelection::Latest => latest_week(records)
            .unwrap_or_else(|| Week::containing(Local::now().date_naive())),
    }
}

#[derive(Serialize)]
struct SkippedEntry {
    row: usize,
    reason: String,
}

impl From<&SkippedRow> for SkippedEntry {
    fn from(skipped: &SkippedRow) -> Self {
        SkippedEntry {
            row: skipped.row,
            reason: skipped.reason.to_string(),
        }
    }
}

/// Contents of `weekly_summary.json`.
#[derive(Serialize)]
struct WeeklySummary<'a> {
    #[serde(flatten)]
    current: &'a WeeklyAggregate,
    prior_week: &'a str,
    prior_total_revenue: Amount,
    total_change: Change,
    trends: &'a [TrendDelta],
    skipped_rows: Vec<SkippedEntry>,
}

/// Build the weekly report for the selected week, write the text and JSON
/// summary to the output directory, and return the text.
pub fn weekly_report(data: &Ingested, selection: WeekSelection, options: &Options) -> Result<String> {
    let week = select_week(&data.records, selection);
    let current = WeeklyAggregate::build(&data.records, week)?;
    let prior = WeeklyAggregate::build(&data.records, week.prior())?;
    info!(
        week = %week,
        records = current.order_count,
        revenue = %current.total_revenue,
        "built weekly aggregate"
    );
    if current.is_empty() {
        warn!(week = %week, "no sales in the selected week");
    }

    let trends = trend::compare(&current, &prior);
    let summary = WeeklySummary {
        current: &current,
        prior_week: &prior.week,
        prior_total_revenue: prior.total_revenue,
        total_change: trend::total_change(&current, &prior),
        trends: &trends,
        skipped_rows: data.skipped.iter().map(SkippedEntry::from).collect(),
    };
    let mut json = serde_json::to_string_pretty(&summary)?;
    json.push('\n');

    let text = format_weekly_report(&current, &prior, options.lang);
    write_output(&options.output, WEEKLY_REPORT_FILE, &text)?;
    write_output(&options.output, WEEKLY_SUMMARY_FILE, &json)?;
    Ok(text)
}

/// Analyse the whole record set and write `menu_analysis.txt`.
pub fn menu_report(records: &[SalesRecord], options: &Options) -> Result<String> {
    let analysis = menu::analyze(records)?;
    info!(
        items = analysis.items.len(),
        recommendations = analysis.recommendations.len(),
        "menu analysis complete"
    );
    let text = format_menu_report(&analysis, options.lang);
    write_output(&options.output, MENU_REPORT_FILE, &text)?;
    Ok(text)
}

/// Generate posts with the configured API client. A missing key or a client
/// that cannot be built skips the step without failing the run.
pub fn social(
    records: &[SalesRecord],
    options: &Options,
    settings: &Settings,
) -> Result<Vec<(PostKind, String)>> {
    let client = match AnthropicClient::new(settings) {
        Ok(client) => client,
        Err(AiError::NotConfigured) => {
            warn!("{}; skipping social posts", AiError::NotConfigured);
            return Ok(Vec::new());
        }
        Err(e) => {
            warn!(error = %e, "cannot build API client; skipping social posts");
            return Ok(Vec::new());
        }
    };
    social_with(records, options, &client, &settings.restaurant)
}

/// Generate posts with `generator` and write each one that succeeded.
pub fn social_with(
    records: &[SalesRecord],
    options: &Options,
    generator: &dyn TextGenerator,
    restaurant: &str,
) -> Result<Vec<(PostKind, String)>> {
    let Some(summary) = ContentSummary::from_records(records, options.lang) else {
        warn!("no sales data; skipping social posts");
        return Ok(Vec::new());
    };

    let posts = generate_posts(&summary, generator, restaurant);
    for (kind, text) in &posts {
        write_output(&options.output, &kind.file_name(), text)?;
    }
    info!(generated = posts.len(), requested = PostKind::ALL.len(), "social posts written");
    Ok(posts)
}

fn print_posts(posts: &[(PostKind, String)]) {
    for (kind, text) in posts {
        println!("--- {} ---", kind.title());
        println!("{text}\n");
    }
}

fn write_output(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).map_err(|e| ReportError::io(&path, e))?;
    info!(path = %path.display(), "wrote output");
    Ok(path)
}
