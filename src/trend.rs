use std::fmt::{self, Display};

use serde::Serialize;

use crate::aggregate::WeeklyAggregate;
use crate::money::Amount;

/// Week-over-week change of one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "lowercase")]
pub enum Change {
    /// No prior-period value to compare against.
    New,
    /// Sold in the prior period, absent from the current one.
    Gone,
    Percent(f64),
}

impl Change {
    pub fn between(current: Option<Amount>, prior: Option<Amount>) -> Self {
        match (current, prior) {
            (_, None) => Change::New,
            (None, Some(_)) => Change::Gone,
            (Some(current), Some(prior)) if prior.is_zero() => {
                if current.is_zero() {
                    Change::Percent(0.0)
                } else {
                    Change::New
                }
            }
            (Some(current), Some(prior)) => {
                let prior = prior.as_f64();
                Change::Percent((current.as_f64() - prior) / prior * 100.0)
            }
        }
    }

    pub fn percent(self) -> Option<f64> {
        match self {
            Change::Percent(p) => Some(p),
            _ => None,
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::New => write!(f, "new"),
            Change::Gone => write!(f, "gone"),
            Change::Percent(p) => write!(f, "{p:+.1}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDelta {
    pub item_name: String,
    pub current_period_value: Amount,
    pub prior_period_value: Option<Amount>,
    pub change: Change,
}

/// Per-item revenue deltas over every item sold in either week, by name.
pub fn compare(current: &WeeklyAggregate, prior: &WeeklyAggregate) -> Vec<TrendDelta> {
    let mut names = current.items();
    names.extend(prior.items());

    names
        .into_iter()
        .map(|name| {
            let now = current.item_revenue(name);
            let before = prior.item_revenue(name);
            TrendDelta {
                item_name: name.to_owned(),
                current_period_value: now.unwrap_or(Amount::ZERO),
                prior_period_value: before,
                change: Change::between(now, before),
            }
        })
        .collect()
}

/// Week-over-week change of total revenue. A prior week without sales
/// counts as no prior value.
pub fn total_change(current: &WeeklyAggregate, prior: &WeeklyAggregate) -> Change {
    let before = (!prior.is_empty()).then_some(prior.total_revenue);
    Change::between(Some(current.total_revenue), before)
}

#[derive(Debug, Default, PartialEq)]
pub struct Movers<'a> {
    pub rising: Option<&'a TrendDelta>,
    pub falling: Option<&'a TrendDelta>,
    pub new_items: Vec<&'a TrendDelta>,
    pub gone_items: Vec<&'a TrendDelta>,
}

/// Pick the biggest riser and faller. Ties go to the first item in `deltas`.
/// With no negative percentage the first gone item is the faller.
pub fn movers(deltas: &[TrendDelta]) -> Movers<'_> {
    let mut found = Movers::default();
    for delta in deltas {
        match delta.change {
            Change::New => found.new_items.push(delta),
            Change::Gone => found.gone_items.push(delta),
            Change::Percent(p) if p > 0.0 => {
                if found.rising.map_or(true, |best| p > percent_of(best)) {
                    found.rising = Some(delta);
                }
            }
            Change::Percent(p) if p < 0.0 => {
                if found.falling.map_or(true, |worst| p < percent_of(worst)) {
                    found.falling = Some(delta);
                }
            }
            Change::Percent(_) => {}
        }
    }
    if found.falling.is_none() {
        found.falling = found.gone_items.first().copied();
    }
    found
}

fn percent_of(delta: &TrendDelta) -> f64 {
    delta.change.percent().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::aggregate::WeeklyAggregate;
    use crate::money::Amount;
    use crate::record::SalesRecord;
    use crate::trend::{compare, movers, total_change, Change};
    use crate::week::Week;

    fn sale(date: &str, item: &str, quantity: u32, price: &str) -> SalesRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        SalesRecord::new(date, item, "Main", quantity, Amount::parse(price).unwrap()).unwrap()
    }

    fn amount(s: &str) -> Option<Amount> {
        Some(Amount::parse(s).unwrap())
    }

    fn weeks(records: &[SalesRecord]) -> (WeeklyAggregate, WeeklyAggregate) {
        let week = Week::containing(NaiveDate::from_ymd_opt(2026, 2, 16).unwrap());
        (
            WeeklyAggregate::build(records, week).unwrap(),
            WeeklyAggregate::build(records, week.prior()).unwrap(),
        )
    }

    #[test]
    fn test_change_between() {
        assert_eq!(Change::between(amount("150"), amount("100")), Change::Percent(50.0));
        assert_eq!(Change::between(amount("50"), amount("100")), Change::Percent(-50.0));
        assert_eq!(Change::between(amount("50"), None), Change::New);
        assert_eq!(Change::between(None, amount("50")), Change::Gone);
        assert_eq!(Change::between(amount("0"), amount("0")), Change::Percent(0.0));

        // zero prior revenue is "new", never an infinite percentage
        assert_eq!(Change::between(amount("20"), amount("0")), Change::New);
    }

    #[test]
    fn test_change_display() {
        assert_eq!(Change::Percent(12.345).to_string(), "+12.3%");
        assert_eq!(Change::Percent(-4.0).to_string(), "-4.0%");
        assert_eq!(Change::New.to_string(), "new");
        assert_eq!(Change::Gone.to_string(), "gone");
    }

    #[test]
    fn test_compare_weeks() {
        let records = vec![
            // prior week
            sale("2026-02-10", "Sarma", 10, "9"),
            sale("2026-02-11", "Cevapi", 10, "10"),
            sale("2026-02-12", "Baklava", 4, "3"),
            sale("2026-02-12", "Rakija", 0, "3"),
            // current week
            sale("2026-02-17", "Sarma", 5, "9"),
            sale("2026-02-18", "Cevapi", 20, "10"),
            sale("2026-02-18", "Bao Buns", 6, "7"),
            sale("2026-02-19", "Rakija", 2, "3"),
        ];
        let (current, prior) = weeks(&records);
        let deltas = compare(&current, &prior);

        let names: Vec<&str> = deltas.iter().map(|d| d.item_name.as_str()).collect();
        assert_eq!(names, vec!["Baklava", "Bao Buns", "Cevapi", "Rakija", "Sarma"]);

        assert_eq!(deltas[0].change, Change::Gone);
        assert_eq!(deltas[0].current_period_value, Amount::ZERO);
        assert_eq!(deltas[1].change, Change::New);
        assert_eq!(deltas[1].prior_period_value, None);
        assert_eq!(deltas[2].change, Change::Percent(100.0));
        assert_eq!(deltas[3].change, Change::New);
        assert_eq!(deltas[4].change, Change::Percent(-50.0));

        let found = movers(&deltas);
        assert_eq!(found.rising.map(|d| d.item_name.as_str()), Some("Cevapi"));
        assert_eq!(found.falling.map(|d| d.item_name.as_str()), Some("Sarma"));
        assert_eq!(found.new_items.len(), 2);
        assert_eq!(found.gone_items.len(), 1);

        // 90 + 100 + 12 + 0 -> 45 + 200 + 42 + 6
        assert_eq!(
            total_change(&current, &prior),
            Change::Percent((293.0 - 202.0) / 202.0 * 100.0)
        );
    }

    #[test]
    fn test_total_change_without_prior_sales() {
        let records = vec![sale("2026-02-17", "Sarma", 5, "9")];
        let (current, prior) = weeks(&records);
        assert_eq!(total_change(&current, &prior), Change::New);
        assert!(movers(&compare(&current, &prior)).rising.is_none());
    }

    #[test]
    fn test_gone_item_falls_when_nothing_drops() {
        let records = vec![
            sale("2026-02-10", "Sarma", 2, "9"),
            sale("2026-02-11", "Cevapi", 5, "10"),
            sale("2026-02-11", "Baklava", 4, "3"),
            sale("2026-02-18", "Cevapi", 6, "10"),
        ];
        let (current, prior) = weeks(&records);
        let deltas = compare(&current, &prior);
        let found = movers(&deltas);

        assert_eq!(found.rising.map(|d| d.item_name.as_str()), Some("Cevapi"));
        assert_eq!(found.falling.map(|d| d.item_name.as_str()), Some("Baklava"));
        assert_eq!(found.falling.map(|d| d.change), Some(Change::Gone));
    }
}
