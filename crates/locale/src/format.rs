//! Pure display formatting. No surface or network access.

use chrono::NaiveDate;

use crate::LocaleConfig;

/// Currency amount with symbol, thousands grouping, and two decimals,
/// e.g. `1234.5` -> `"KSh 1,234.50"`.
pub fn currency(cfg: &LocaleConfig, amount: f64) -> String {
    let rendered = format!("{:.2}", amount.abs());
    let (whole, cents) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    let sign = if amount < 0.0 { "-" } else { "" };
    format!(
        "{sign}{} {}.{cents}",
        cfg.currency_symbol,
        group_thousands(whole)
    )
}

/// Plain grouped number for dashboard counters: integers stay integers,
/// fractional values keep at most two decimals.
pub fn number(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    if magnitude.fract() == 0.0 {
        return format!("{sign}{}", group_thousands(&format!("{magnitude:.0}")));
    }
    let rendered = format!("{magnitude:.2}");
    let (whole, frac) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{sign}{}", group_thousands(whole))
    } else {
        format!("{sign}{}.{frac}", group_thousands(whole))
    }
}

/// Grouped international phone display, e.g. `"0712345678"` ->
/// `"+254 712 345 678"`. Input that does not reduce to a nine-digit
/// subscriber number is returned unchanged.
pub fn phone(cfg: &LocaleConfig, raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let country_digits = cfg.country_code.trim_start_matches('+');
    let local = digits
        .strip_prefix(country_digits)
        .or_else(|| digits.strip_prefix('0'))
        .unwrap_or(digits.as_str());
    if local.len() != 9 {
        return raw.to_string();
    }
    format!(
        "{} {} {} {}",
        cfg.country_code,
        &local[..3],
        &local[3..6],
        &local[6..9]
    )
}

/// Long-form date, e.g. `"January 1, 2024"`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
