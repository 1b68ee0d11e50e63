use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;

use crate::error::RowError;
use crate::money::Amount;
use crate::week;

pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "item_name", "category", "quantity", "unit_price"];

// tried in order; day-first before month-first so "17.02.2026" is unambiguous
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d.%m.%Y.", "%m/%d/%Y"];

/// One row as it appears in the sales file, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct RawSale {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub unit_price: Option<String>,
}

/// A validated sales line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub item_name: String,
    pub category: String,
    pub quantity: u32,
    pub unit_price: Amount,
    revenue: Amount,
}

impl SalesRecord {
    pub fn new(
        date: NaiveDate,
        item_name: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
        unit_price: Amount,
    ) -> Result<Self, RowError> {
        let revenue = unit_price
            .checked_mul(u64::from(quantity))
            .ok_or(RowError::RevenueOverflow)?;
        Ok(SalesRecord {
            date,
            item_name: item_name.into(),
            category: category.into(),
            quantity,
            unit_price,
            revenue,
        })
    }

    pub fn from_raw(input: RawSale) -> Result<Self, RowError> {
        let date = required(input.date, "date")?;
        let item_name = required(input.item_name, "item_name")?;
        let category = required(input.category, "category")?;
        let quantity = required(input.quantity, "quantity")?;
        let unit_price = required(input.unit_price, "unit_price")?;

        let date = parse_date(&date)
            .filter(|parsed| week::in_range(*parsed))
            .ok_or(RowError::Date(date))?;
        let quantity = parse_quantity(&quantity).ok_or(RowError::Quantity(quantity))?;
        let unit_price = Amount::parse(&unit_price).map_err(|_| RowError::Price(unit_price))?;

        SalesRecord::new(date, item_name, category, quantity, unit_price)
    }

    /// quantity × unit_price
    pub fn revenue(&self) -> Amount {
        self.revenue
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

fn required(field: Option<String>, name: &'static str) -> Result<String, RowError> {
    match field.map(|value| value.trim().to_owned()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RowError::Missing(name)),
    }
}

/// Parses a calendar date; a trailing time component is ignored.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    let day_part = s.split(['T', ' ']).next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day_part, format).ok())
}

/// Whole non-negative quantities; "10.0" is accepted as 10.
fn parse_quantity(input: &str) -> Option<u32> {
    let s = input.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let whole = match s.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return None,
        None => s,
    };
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    whole.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::error::RowError;
    use crate::money::Amount;
    use crate::record::{parse_date, RawSale, SalesRecord};

    // we use serde_json instead of parsing a csv just for testing as
    // we can use a simple json string.

    fn from_json(raw: &str) -> Result<SalesRecord, RowError> {
        let raw_sale = serde_json::from_str::<RawSale>(raw).unwrap();
        SalesRecord::from_raw(raw_sale)
    }

    #[test]
    fn test_valid_row() {
        let record = from_json(
            r#"{ "date": "2026-02-17", "item_name": " Roasted Chicken ", "category": "Main",
                 "quantity": "10", "unit_price": "8.0" }"#,
        )
        .unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
        assert_eq!(record.item_name, "Roasted Chicken");
        assert_eq!(record.category, "Main");
        assert_eq!(record.quantity, 10);
        assert_eq!(record.unit_price, Amount::parse("8").unwrap());
        assert_eq!(record.revenue(), Amount::parse("80").unwrap());
        assert!(!record.is_weekend());
    }

    #[test]
    fn test_rejected_rows() {
        let row = r#"{ "date": "2026-02-17", "item_name": "Sarma", "category": "Main",
                       "quantity": "abc", "unit_price": "8.0" }"#;
        assert_eq!(from_json(row), Err(RowError::Quantity("abc".to_owned())));

        let row = r#"{ "date": "2026-02-17", "item_name": "Sarma", "category": "Main",
                       "quantity": "-3", "unit_price": "8.0" }"#;
        assert_eq!(from_json(row), Err(RowError::Quantity("-3".to_owned())));

        let row = r#"{ "date": "2026-02-17", "item_name": "Sarma", "category": "Main",
                       "quantity": "3", "unit_price": "-8.0" }"#;
        assert_eq!(from_json(row), Err(RowError::Price("-8.0".to_owned())));

        let row = r#"{ "date": "not-a-date", "item_name": "Sarma", "category": "Main",
                       "quantity": "3", "unit_price": "8.0" }"#;
        assert_eq!(from_json(row), Err(RowError::Date("not-a-date".to_owned())));

        // parses, but its week runs past the end of the calendar
        let row = r#"{ "date": "+262142-12-31", "item_name": "Sarma", "category": "Main",
                       "quantity": "1", "unit_price": "5" }"#;
        assert_eq!(from_json(row), Err(RowError::Date("+262142-12-31".to_owned())));

        // no category supplied at all
        let row = r#"{ "date": "2026-02-17", "item_name": "Sarma",
                       "quantity": "3", "unit_price": "8.0" }"#;
        assert_eq!(from_json(row), Err(RowError::Missing("category")));

        // blank item name
        let row = r#"{ "date": "2026-02-17", "item_name": "  ", "category": "Main",
                       "quantity": "3", "unit_price": "8.0" }"#;
        assert_eq!(from_json(row), Err(RowError::Missing("item_name")));
    }

    #[test]
    fn test_quantity_with_zero_fraction() {
        let row = r#"{ "date": "2026-02-17", "item_name": "Sarma", "category": "Main",
                       "quantity": "4.0", "unit_price": "2.5" }"#;
        assert_eq!(from_json(row).unwrap().quantity, 4);

        let row = r#"{ "date": "2026-02-17", "item_name": "Sarma", "category": "Main",
                       "quantity": "4.5", "unit_price": "2.5" }"#;
        assert_eq!(from_json(row), Err(RowError::Quantity("4.5".to_owned())));
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 17);
        assert_eq!(parse_date("2026-02-17"), expected);
        assert_eq!(parse_date("2026/02/17"), expected);
        assert_eq!(parse_date("17.02.2026"), expected);
        assert_eq!(parse_date("17.02.2026."), expected);
        assert_eq!(parse_date("02/17/2026"), expected);
        assert_eq!(parse_date("2026-02-17T19:45:00"), expected);
        assert_eq!(parse_date("2026-02-17 19:45:00"), expected);
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date(""), None);
    }
}
