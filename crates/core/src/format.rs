/// Currencies conventionally displayed without decimal places.
const ZERO_DECIMAL: &[&str] = &["JPY", "KRW", "VND", "IDR", "HUF", "ISK"];

/// Format a converted amount for display, e.g. `format_money(155025.0, "NGN")`
/// → `"NGN 155,025.00"`. Non-finite input renders as zero.
pub fn format_money(value: f64, code: &str) -> String {
    let code = code.to_uppercase();
    let value = if value.is_finite() { value } else { 0.0 };
    let decimals = if ZERO_DECIMAL.contains(&code.as_str()) {
        0
    } else {
        2
    };
    format!("{code} {}", group_thousands(value, decimals))
}

/// Render `value` with `decimals` fraction digits and comma-grouped
/// integer digits.
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
