//! Text rendering of weekly and menu reports, in English or Serbian.

use std::fmt::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use crate::aggregate::WeeklyAggregate;
use crate::chart::{bar_chart, BAR_WIDTH};
use crate::menu::{Action, MenuAnalysis, Reason};
use crate::money::Amount;
use crate::trend::{self, Change};

const RULE_WIDTH: usize = 55;
const LABEL_WIDTH: usize = 30;
const TOP_ITEMS_CHARTED: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Sr,
}

pub struct Labels {
    pub weekly_title: &'static str,
    pub total_revenue: &'static str,
    pub total_quantity: &'static str,
    pub orders: &'static str,
    pub average_order_value: &'static str,
    pub average_daily_revenue: &'static str,
    pub top_seller: &'static str,
    pub slow_mover: &'static str,
    pub rising: &'static str,
    pub falling: &'static str,
    pub new_items: &'static str,
    pub gone_items: &'static str,
    pub no_prior: &'static str,
    pub no_sales: &'static str,
    pub daily_revenue: &'static str,
    pub revenue_by_category: &'static str,
    pub top_items: &'static str,
    pub menu_title: &'static str,
    pub best_by_revenue: &'static str,
    pub worst_by_revenue: &'static str,
    pub category_breakdown: &'static str,
    pub recommendations: &'static str,
    pub promote: &'static str,
    pub discount: &'static str,
    pub remove: &'static str,
    pub sold: &'static str,
}

const EN: Labels = Labels {
    weekly_title: "Weekly Sales Report",
    total_revenue: "Total Revenue",
    total_quantity: "Total Items Sold",
    orders: "Orders",
    average_order_value: "Avg Order Value",
    average_daily_revenue: "Avg Daily Revenue",
    top_seller: "Top Seller",
    slow_mover: "Slow Mover",
    rising: "Rising Star",
    falling: "Falling",
    new_items: "New This Week",
    gone_items: "Not Sold This Week",
    no_prior: "no prior week",
    no_sales: "No sales recorded for this week.",
    daily_revenue: "Daily Revenue",
    revenue_by_category: "Revenue by Category",
    top_items: "Top Items by Revenue",
    menu_title: "Menu Performance Analysis",
    best_by_revenue: "Best Performers (Revenue)",
    worst_by_revenue: "Worst Performers (Revenue)",
    category_breakdown: "Category Revenue Breakdown",
    recommendations: "Recommendations",
    promote: "PROMOTE",
    discount: "CONSIDER DISCOUNTING",
    remove: "CONSIDER REMOVING",
    sold: "sold",
};

const SR: Labels = Labels {
    weekly_title: "Nedeljni Izveštaj Prodaje",
    total_revenue: "Ukupan Prihod",
    total_quantity: "Ukupno Prodatih Stavki",
    orders: "Porudžbine",
    average_order_value: "Prosečna Porudžbina",
    average_daily_revenue: "Prosečan Dnevni Prihod",
    top_seller: "Najprodavaniji",
    slow_mover: "Najslabiji",
    rising: "Zvezda u Usponu",
    falling: "U Padu",
    new_items: "Novo Ove Nedelje",
    gone_items: "Nije Prodato Ove Nedelje",
    no_prior: "nema prethodne nedelje",
    no_sales: "Nema zabeležene prodaje za ovu nedelju.",
    daily_revenue: "Dnevni Prihod",
    revenue_by_category: "Prihod po Kategoriji",
    top_items: "Top Stavke po Prihodu",
    menu_title: "Analiza Performansi Menija",
    best_by_revenue: "Najbolji po Prihodu",
    worst_by_revenue: "Najslabiji po Prihodu",
    category_breakdown: "Prihod po Kategoriji",
    recommendations: "Preporuke",
    promote: "PROMOVISATI",
    discount: "RAZMOTRITI POPUST",
    remove: "RAZMOTRITI UKLANJANJE",
    sold: "prodato",
};

impl Lang {
    pub fn labels(self) -> &'static Labels {
        match self {
            Lang::En => &EN,
            Lang::Sr => &SR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Sr => "sr",
        }
    }
}

fn rule(out: &mut String, ch: char) -> fmt::Result {
    writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH))
}

fn field(out: &mut String, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(out, "  {label:.<LABEL_WIDTH$} {value}")
}

fn heading(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n  {title}")?;
    writeln!(out, "  {}", "-".repeat(40))
}

fn change_text(change: Change, labels: &Labels) -> String {
    match change {
        Change::New => labels.no_prior.to_owned(),
        other => format!("{other} WoW"),
    }
}

/// Weekly summary with week-over-week comparison against `prior`.
pub fn format_weekly_report(
    aggregate: &WeeklyAggregate,
    prior: &WeeklyAggregate,
    lang: Lang,
) -> String {
    let mut out = String::new();
    // writing into a String never fails
    let _ = write_weekly_report(&mut out, aggregate, prior, lang.labels());
    out
}

fn write_weekly_report(
    out: &mut String,
    aggregate: &WeeklyAggregate,
    prior: &WeeklyAggregate,
    labels: &Labels,
) -> fmt::Result {
    rule(out, '=')?;
    writeln!(out, "  {}", labels.weekly_title)?;
    writeln!(
        out,
        "  {} - {} ({})",
        aggregate.week_start, aggregate.week_end, aggregate.week
    )?;
    rule(out, '=')?;

    if aggregate.is_empty() {
        writeln!(out, "  {}", labels.no_sales)?;
        return rule(out, '=');
    }

    let deltas = trend::compare(aggregate, prior);
    let movers = trend::movers(&deltas);
    let wow = trend::total_change(aggregate, prior);

    field(
        out,
        labels.total_revenue,
        format!("€{} ({})", aggregate.total_revenue, change_text(wow, labels)),
    )?;
    field(out, labels.total_quantity, aggregate.total_quantity)?;
    field(out, labels.orders, aggregate.order_count)?;
    field(
        out,
        labels.average_order_value,
        format!("€{}", aggregate.average_order_value),
    )?;
    field(
        out,
        labels.average_daily_revenue,
        format!("€{}", aggregate.average_daily_revenue),
    )?;
    field(out, labels.top_seller, aggregate.top_seller().unwrap_or("-"))?;
    field(out, labels.slow_mover, aggregate.slow_mover().unwrap_or("-"))?;
    if let Some(rising) = movers.rising {
        field(
            out,
            labels.rising,
            format!("{} ({})", rising.item_name, rising.change),
        )?;
    }
    if let Some(falling) = movers.falling {
        field(
            out,
            labels.falling,
            format!("{} ({})", falling.item_name, falling.change),
        )?;
    }
    // a brand new menu shows no "new" items, only a missing prior week
    if !prior.is_empty() {
        if !movers.new_items.is_empty() {
            field(out, labels.new_items, join_names(&movers.new_items))?;
        }
        if !movers.gone_items.is_empty() {
            field(out, labels.gone_items, join_names(&movers.gone_items))?;
        }
    }
    rule(out, '=')?;

    let daily: Vec<(String, Amount)> = aggregate
        .daily_revenue
        .iter()
        .map(|(day, revenue)| (day.format("%m-%d").to_string(), *revenue))
        .collect();
    let mut categories: Vec<(String, Amount)> = aggregate
        .per_category_breakdown
        .iter()
        .map(|(name, totals)| (name.clone(), totals.revenue))
        .collect();
    categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let top_items: Vec<(String, Amount)> = aggregate
        .ranked_items()
        .into_iter()
        .take(TOP_ITEMS_CHARTED)
        .map(|(name, totals)| (name.to_owned(), totals.revenue))
        .collect();

    for (title, rows) in [
        (labels.daily_revenue, daily),
        (labels.revenue_by_category, categories),
        (labels.top_items, top_items),
    ] {
        out.push('\n');
        out.push_str(&bar_chart(title, &rows, BAR_WIDTH));
    }
    Ok(())
}

fn join_names(deltas: &[&trend::TrendDelta]) -> String {
    deltas
        .iter()
        .map(|d| d.item_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn reason_text(reason: &Reason, lang: Lang) -> String {
    match (lang, reason) {
        (Lang::En, Reason::TopRevenue { revenue, quantity }) => {
            format!("Top revenue: €{revenue}, {quantity} sold")
        }
        (Lang::Sr, Reason::TopRevenue { revenue, quantity }) => {
            format!("Najveći prihod: €{revenue}, prodato {quantity}")
        }
        (Lang::En, Reason::LowVolume { revenue, quantity }) => {
            format!("Low volume ({quantity}) and low revenue (€{revenue})")
        }
        (Lang::Sr, Reason::LowVolume { revenue, quantity }) => {
            format!("Mali obim ({quantity}) i nizak prihod (€{revenue})")
        }
        (Lang::En, Reason::BelowAverage { revenue, quantity }) => {
            format!("Below average revenue (€{revenue}), decent volume ({quantity})")
        }
        (Lang::Sr, Reason::BelowAverage { revenue, quantity }) => {
            format!("Prihod ispod proseka (€{revenue}), solidan obim ({quantity})")
        }
        (Lang::En, Reason::WeekendFavourite { ratio }) => {
            format!("Sells {ratio:.1}x more on weekends, great for weekend specials")
        }
        (Lang::Sr, Reason::WeekendFavourite { ratio }) => {
            format!("Prodaje se {ratio:.1}x više vikendom, odlično za vikend specijal")
        }
    }
}

pub fn format_menu_report(analysis: &MenuAnalysis, lang: Lang) -> String {
    let mut out = String::new();
    let _ = write_menu_report(&mut out, analysis, lang);
    out
}

fn write_menu_report(out: &mut String, analysis: &MenuAnalysis, lang: Lang) -> fmt::Result {
    let labels = lang.labels();

    rule(out, '=')?;
    writeln!(out, "  {}", labels.menu_title)?;
    rule(out, '=')?;

    let item_line = |out: &mut String, name: &str, revenue: Amount, quantity: u64| {
        writeln!(
            out,
            "  {name:<25} €{revenue:>8}  ({quantity} {})",
            labels.sold
        )
    };

    heading(out, labels.best_by_revenue)?;
    for item in analysis.items.iter().take(3) {
        item_line(out, &item.item_name, item.total_revenue, item.total_quantity)?;
    }

    heading(out, labels.worst_by_revenue)?;
    let worst_from = analysis.items.len().saturating_sub(3);
    for item in &analysis.items[worst_from..] {
        item_line(out, &item.item_name, item.total_revenue, item.total_quantity)?;
    }

    heading(out, labels.category_breakdown)?;
    for category in &analysis.categories {
        writeln!(
            out,
            "  {:<20} €{:>8}  ({:.1}%)",
            category.category, category.total_revenue, category.revenue_pct
        )?;
    }

    heading(out, labels.recommendations)?;
    for rec in &analysis.recommendations {
        let action = match rec.action {
            Action::Promote => labels.promote,
            Action::Discount => labels.discount,
            Action::Remove => labels.remove,
        };
        writeln!(
            out,
            "  [{action}] {}: {}",
            rec.item_name,
            reason_text(&rec.reason, lang)
        )?;
    }

    rule(out, '=')
}
