use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use sales_digest::application::{self, Command, Options, WeekSelection};
use sales_digest::config::Settings;
use sales_digest::logging;
use sales_digest::report::Lang;
use sales_digest::week::Week;

#[derive(Parser)]
#[command(version, about = "Weekly sales reports, menu analysis and social posts")]
struct Cli {
    /// Sales CSV with date,item_name,category,quantity,unit_price columns
    #[arg(long, global = true, value_name = "FILE", default_value = "data/sales_sample.csv")]
    input: PathBuf,

    #[arg(long, global = true, value_name = "DIR", default_value = "output")]
    output: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = Lang::En)]
    lang: Lang,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Weekly summary with week-over-week trends
    Report {
        /// Report the ISO week containing this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE", conflicts_with = "week")]
        week_end: Option<NaiveDate>,
        /// Report this ISO week (YYYY-Www)
        #[arg(long, value_name = "WEEK")]
        week: Option<Week>,
    },
    /// Menu performance and recommendations over the whole file
    Menu,
    /// Social media posts written by the text-generation API
    Social {
        #[arg(long)]
        restaurant: Option<String>,
    },
    /// Report, menu analysis and social posts
    All {
        #[arg(long)]
        restaurant: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let command = match cli.cmd {
        Cmd::Report { week_end, week } => Command::Report(match (week_end, week) {
            (Some(date), _) => WeekSelection::Containing(date),
            (None, Some(week)) => WeekSelection::Iso(week),
            (None, None) => WeekSelection::Latest,
        }),
        Cmd::Menu => Command::Menu,
        Cmd::Social { restaurant } => Command::Social { restaurant },
        Cmd::All { restaurant } => Command::All { restaurant },
    };
    let options = Options {
        input: cli.input,
        output: cli.output,
        lang: cli.lang,
    };

    application::run(&options, &command, Settings::from_env())?;
    Ok(())
}
