// Deadline expression parsing

use chrono::{Duration, Local, NaiveDate};
use anyhow::{Context, Result};

/// Parse a deadline expression relative to the local date
pub fn parse_date_expr(expr: &str) -> Result<NaiveDate> {
    parse_date_expr_from(expr, Local::now().date_naive())
}

/// Parse a deadline expression relative to `today`
///
/// Supported forms:
/// - absolute: `2026-01-10`
/// - named: `today`, `tomorrow`, `yesterday`
/// - offsets: `+3d`, `-2d`, `+1w`
pub fn parse_date_expr_from(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    let expr = expr.trim();

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }

    match expr.to_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(sign) = expr.chars().next().filter(|c| *c == '+' || *c == '-') {
        let body = &expr[1..];
        if let Some((split, unit)) = body.char_indices().last().filter(|(split, _)| *split > 0) {
            let amount: i64 = body[..split]
                .parse()
                .with_context(|| format!("Invalid date offset: {}", expr))?;
            let days = match unit {
                'd' => Some(amount),
                'w' => amount.checked_mul(7),
                _ => anyhow::bail!("Invalid date offset unit in '{}'. Use d (days) or w (weeks).", expr),
            };
            let date = days
                .and_then(|days| if sign == '-' { days.checked_neg() } else { Some(days) })
                .and_then(Duration::try_days)
                .and_then(|offset| today.checked_add_signed(offset));
            return match date {
                Some(date) => Ok(date),
                None => anyhow::bail!("Date offset out of range: {}", expr),
            };
        }
    }

    anyhow::bail!(
        "Unsupported date expression: {}. Use YYYY-MM-DD, today, tomorrow, or an offset like +3d.",
        expr
    )
}
