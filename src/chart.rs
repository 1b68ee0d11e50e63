use crate::money::Amount;

pub const BAR_WIDTH: usize = 30;

/// Render a horizontal bar chart with bars scaled to the largest value.
///
/// ```text
/// Daily Revenue
///   02-16  ##############################  180.00
///   02-17  ###############                  90.00
/// ```
pub fn bar_chart(title: &str, rows: &[(String, Amount)], width: usize) -> String {
    let mut out = format!("  {title}\n");
    let label_width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, value)| value.raw()).max().unwrap_or(0);

    for (label, value) in rows {
        let bar = "#".repeat(bar_len(value.raw(), max, width));
        out.push_str(&format!("  {label:<label_width$}  {bar:<width$}  {value:>10}\n"));
    }
    out
}

// Rounded to nearest and never wider than the chart. Falls back to float
// scaling when the exact product does not fit in a u128.
fn bar_len(value: u128, max: u128, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    let filled = match value.checked_mul(width as u128) {
        Some(scaled) => (scaled / max + u128::from(scaled % max >= max - max / 2)) as usize,
        None => (value as f64 / max as f64 * width as f64).round() as usize,
    };
    filled.min(width)
}
