//! Menu performance analysis over the whole sales history.
//!
//! Ranks items by revenue and volume, breaks revenue down by category,
//! tallies quantities per day of week and derives promote/discount/remove
//! recommendations from those tables.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::money::Amount;
use crate::record::SalesRecord;

/// Weekend sales above this multiple of weekday sales make a weekend special.
pub const WEEKEND_RATIO: f64 = 2.0;
/// Bottom items selling under this share of the median quantity are removal candidates.
pub const LOW_VOLUME_SHARE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemPerformance {
    pub item_name: String,
    pub category: String,
    pub total_revenue: Amount,
    pub total_quantity: u64,
    pub average_price: Amount,
    pub days_sold: u64,
    pub revenue_rank: usize,
    pub volume_rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub total_revenue: Amount,
    pub total_quantity: u64,
    pub item_count: usize,
    /// Share of all revenue, one decimal place.
    pub revenue_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Promote,
    Discount,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
    TopRevenue { revenue: Amount, quantity: u64 },
    LowVolume { revenue: Amount, quantity: u64 },
    BelowAverage { revenue: Amount, quantity: u64 },
    WeekendFavourite { ratio: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub item_name: String,
    pub reason: Reason,
}

/// Quantity sold per weekday, Monday first.
pub type WeekdayQuantities = [u64; 7];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuAnalysis {
    /// Sorted by revenue descending, then name.
    pub items: Vec<ItemPerformance>,
    /// Sorted by revenue descending, then name.
    pub categories: Vec<CategoryRevenue>,
    pub day_patterns: BTreeMap<String, WeekdayQuantities>,
    pub recommendations: Vec<Recommendation>,
}

impl MenuAnalysis {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn analyze(records: &[SalesRecord]) -> Result<MenuAnalysis> {
    let items = item_performance(records)?;
    let categories = category_revenue(records)?;
    let day_patterns = day_patterns(records);
    let recommendations = recommendations(&items, &day_patterns, &weekdays_present(records));
    Ok(MenuAnalysis {
        items,
        categories,
        day_patterns,
        recommendations,
    })
}

#[derive(Default)]
struct ItemAcc {
    category: String,
    revenue: Amount,
    quantity: u64,
    price_sum: Amount,
    rows: u64,
    days: BTreeSet<chrono::NaiveDate>,
}

pub fn item_performance(records: &[SalesRecord]) -> Result<Vec<ItemPerformance>> {
    let mut acc: BTreeMap<&str, ItemAcc> = BTreeMap::new();
    for record in records {
        let entry = acc.entry(record.item_name.as_str()).or_default();
        if entry.category.is_empty() {
            entry.category = record.category.clone();
        }
        entry.revenue = entry
            .revenue
            .checked_add(record.revenue())
            .ok_or(ReportError::Overflow("item revenue"))?;
        entry.price_sum = entry
            .price_sum
            .checked_add(record.unit_price)
            .ok_or(ReportError::Overflow("unit prices"))?;
        entry.quantity += u64::from(record.quantity);
        entry.rows += 1;
        entry.days.insert(record.date);
    }

    let mut items: Vec<ItemPerformance> = acc
        .into_iter()
        .map(|(name, acc)| ItemPerformance {
            item_name: name.to_owned(),
            category: acc.category,
            total_revenue: acc.revenue,
            total_quantity: acc.quantity,
            average_price: acc.price_sum.div_count(acc.rows),
            days_sold: acc.days.len() as u64,
            revenue_rank: 0,
            volume_rank: 0,
        })
        .collect();

    let mut by_volume: Vec<(u64, String)> = items
        .iter()
        .map(|item| (item.total_quantity, item.item_name.clone()))
        .collect();
    by_volume.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    items.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    for (idx, item) in items.iter_mut().enumerate() {
        item.revenue_rank = idx + 1;
        item.volume_rank = by_volume
            .iter()
            .position(|(_, name)| *name == item.item_name)
            .map_or(0, |pos| pos + 1);
    }
    Ok(items)
}

pub fn category_revenue(records: &[SalesRecord]) -> Result<Vec<CategoryRevenue>> {
    let mut acc: BTreeMap<&str, (Amount, u64, BTreeSet<&str>)> = BTreeMap::new();
    let mut total = Amount::ZERO;
    for record in records {
        let (revenue, quantity, items) = acc.entry(record.category.as_str()).or_default();
        *revenue = revenue
            .checked_add(record.revenue())
            .ok_or(ReportError::Overflow("category revenue"))?;
        *quantity += u64::from(record.quantity);
        items.insert(record.item_name.as_str());
        total = total
            .checked_add(record.revenue())
            .ok_or(ReportError::Overflow("total revenue"))?;
    }

    let mut categories: Vec<CategoryRevenue> = acc
        .into_iter()
        .map(|(category, (revenue, quantity, items))| CategoryRevenue {
            category: category.to_owned(),
            total_revenue: revenue,
            total_quantity: quantity,
            item_count: items.len(),
            revenue_pct: if total.is_zero() {
                0.0
            } else {
                (revenue.as_f64() / total.as_f64() * 1000.0).round() / 10.0
            },
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    Ok(categories)
}

pub fn day_patterns(records: &[SalesRecord]) -> BTreeMap<String, WeekdayQuantities> {
    let mut patterns: BTreeMap<String, WeekdayQuantities> = BTreeMap::new();
    for record in records {
        let day = record.date.weekday().num_days_from_monday() as usize;
        let row = patterns.entry(record.item_name.clone()).or_default();
        row[day] += u64::from(record.quantity);
    }
    patterns
}

// weekdays that occur anywhere in the data, Monday = 0
fn weekdays_present(records: &[SalesRecord]) -> BTreeSet<usize> {
    records
        .iter()
        .map(|r| r.date.weekday().num_days_from_monday() as usize)
        .collect()
}

pub fn recommendations(
    items: &[ItemPerformance],
    day_patterns: &BTreeMap<String, WeekdayQuantities>,
    days_present: &BTreeSet<usize>,
) -> Vec<Recommendation> {
    let mut found = Vec::new();
    if items.is_empty() {
        return found;
    }

    let third = (items.len() / 3).max(1);
    // the bottom slice never overlaps the promoted top slice
    let bottom = third.min(items.len() - third);

    for item in &items[..third] {
        found.push(Recommendation {
            action: Action::Promote,
            item_name: item.item_name.clone(),
            reason: Reason::TopRevenue {
                revenue: item.total_revenue,
                quantity: item.total_quantity,
            },
        });
    }

    let median = median_quantity(items);
    for item in &items[items.len() - bottom..] {
        let (action, reason) = if (item.total_quantity as f64) < median * LOW_VOLUME_SHARE {
            (
                Action::Remove,
                Reason::LowVolume {
                    revenue: item.total_revenue,
                    quantity: item.total_quantity,
                },
            )
        } else {
            (
                Action::Discount,
                Reason::BelowAverage {
                    revenue: item.total_revenue,
                    quantity: item.total_quantity,
                },
            )
        };
        found.push(Recommendation {
            action,
            item_name: item.item_name.clone(),
            reason,
        });
    }

    let weekend: Vec<usize> = days_present.iter().copied().filter(|d| *d >= 5).collect();
    let weekdays: Vec<usize> = days_present.iter().copied().filter(|d| *d < 5).collect();
    if weekend.is_empty() || weekdays.is_empty() {
        return found;
    }

    for (item_name, row) in day_patterns {
        let mean = |days: &[usize]| {
            days.iter().map(|d| row[*d] as f64).sum::<f64>() / days.len() as f64
        };
        let weekday_avg = mean(&weekdays);
        let divisor = if weekday_avg == 0.0 { 1.0 } else { weekday_avg };
        let ratio = mean(&weekend) / divisor;
        if ratio > WEEKEND_RATIO {
            found.push(Recommendation {
                action: Action::Promote,
                item_name: item_name.clone(),
                reason: Reason::WeekendFavourite { ratio },
            });
        }
    }

    found
}

fn median_quantity(items: &[ItemPerformance]) -> f64 {
    let mut quantities: Vec<u64> = items.iter().map(|i| i.total_quantity).collect();
    quantities.sort_unstable();
    let mid = quantities.len() / 2;
    match quantities.len() {
        0 => 0.0,
        n if n % 2 == 0 => (quantities[mid - 1] + quantities[mid]) as f64 / 2.0,
        _ => quantities[mid] as f64,
    }
}
