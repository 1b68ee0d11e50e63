use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::money::Amount;
use crate::record::SalesRecord;
use crate::week::Week;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemTotals {
    pub category: String,
    pub quantity: u64,
    pub revenue: Amount,
    pub orders: u64,
}

impl ItemTotals {
    fn add(&mut self, record: &SalesRecord) -> Result<()> {
        if self.category.is_empty() {
            self.category = record.category.clone();
        }
        self.quantity = add_count(self.quantity, record.quantity, "item quantity")?;
        self.revenue = add_amount(self.revenue, record.revenue(), "item revenue")?;
        self.orders += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub quantity: u64,
    pub revenue: Amount,
}

/// Sales totals for one ISO week.
///
/// Built fresh from a record set by [`WeeklyAggregate::build`]. All maps are
/// ordered so two builds over the same records serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyAggregate {
    pub week: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_revenue: Amount,
    /// Number of sales lines in the week.
    pub order_count: u64,
    pub total_quantity: u64,
    pub average_order_value: Amount,
    pub average_daily_revenue: Amount,
    pub active_days: u64,
    pub per_item_breakdown: BTreeMap<String, ItemTotals>,
    pub per_category_breakdown: BTreeMap<String, CategoryTotals>,
    pub daily_revenue: BTreeMap<NaiveDate, Amount>,
}

impl WeeklyAggregate {
    /// Aggregate the records falling inside `week`. Records outside it are ignored.
    pub fn build(records: &[SalesRecord], week: Week) -> Result<Self> {
        let mut total_revenue = Amount::ZERO;
        let mut order_count = 0u64;
        let mut total_quantity = 0u64;
        let mut per_item_breakdown: BTreeMap<String, ItemTotals> = BTreeMap::new();
        let mut per_category_breakdown: BTreeMap<String, CategoryTotals> = BTreeMap::new();
        let mut daily_revenue: BTreeMap<NaiveDate, Amount> = BTreeMap::new();

        for record in records.iter().filter(|r| week.contains(r.date)) {
            let revenue = record.revenue();
            total_revenue = add_amount(total_revenue, revenue, "total revenue")?;
            total_quantity = add_count(total_quantity, record.quantity, "total quantity")?;
            order_count += 1;

            per_item_breakdown
                .entry(record.item_name.clone())
                .or_default()
                .add(record)?;

            let category = per_category_breakdown
                .entry(record.category.clone())
                .or_default();
            category.quantity = add_count(category.quantity, record.quantity, "category quantity")?;
            category.revenue = add_amount(category.revenue, revenue, "category revenue")?;

            let day = daily_revenue.entry(record.date).or_insert(Amount::ZERO);
            *day = add_amount(*day, revenue, "daily revenue")?;
        }

        let active_days = daily_revenue.len() as u64;
        Ok(WeeklyAggregate {
            week: week.to_string(),
            week_start: week.start(),
            week_end: week.end(),
            total_revenue,
            order_count,
            total_quantity,
            average_order_value: total_revenue.div_count(order_count),
            average_daily_revenue: total_revenue.div_count(active_days.max(1)),
            active_days,
            per_item_breakdown,
            per_category_breakdown,
            daily_revenue,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    pub fn item_revenue(&self, item_name: &str) -> Option<Amount> {
        self.per_item_breakdown.get(item_name).map(|item| item.revenue)
    }

    /// Highest revenue; ties go to the alphabetically first item.
    pub fn top_seller(&self) -> Option<&str> {
        let mut best: Option<(&str, Amount)> = None;
        for (name, item) in &self.per_item_breakdown {
            if best.map_or(true, |(_, revenue)| item.revenue > revenue) {
                best = Some((name.as_str(), item.revenue));
            }
        }
        best.map(|(name, _)| name)
    }

    /// Lowest revenue; ties go to the alphabetically first item.
    pub fn slow_mover(&self) -> Option<&str> {
        let mut worst: Option<(&str, Amount)> = None;
        for (name, item) in &self.per_item_breakdown {
            if worst.map_or(true, |(_, revenue)| item.revenue < revenue) {
                worst = Some((name.as_str(), item.revenue));
            }
        }
        worst.map(|(name, _)| name)
    }

    /// Items by revenue descending, then name.
    pub fn ranked_items(&self) -> Vec<(&str, &ItemTotals)> {
        let mut items: Vec<(&str, &ItemTotals)> = self
            .per_item_breakdown
            .iter()
            .map(|(name, item)| (name.as_str(), item))
            .collect();
        items.sort_by(|a, b| b.1.revenue.cmp(&a.1.revenue).then_with(|| a.0.cmp(b.0)));
        items
    }

    pub fn items(&self) -> BTreeSet<&str> {
        self.per_item_breakdown.keys().map(String::as_str).collect()
    }
}

/// The ISO week holding the most recent sale, if there is any.
pub fn latest_week(records: &[SalesRecord]) -> Option<Week> {
    records.iter().map(|r| r.date).max().map(Week::containing)
}

fn add_amount(total: Amount, value: Amount, what: &'static str) -> Result<Amount> {
    total.checked_add(value).ok_or(ReportError::Overflow(what))
}

fn add_count(total: u64, value: u32, what: &'static str) -> Result<u64> {
    total
        .checked_add(u64::from(value))
        .ok_or(ReportError::Overflow(what))
}
