/// Formats a dollar amount with thousands separators: `12345.67 -> $12,345.67`.
pub fn format_currency(value: f64) -> String {
    format!("${}", group_thousands(value, 2))
}

/// Fixed-point formatting with `,` thousands separators.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    // Sign survives rounding to zero: -0.001 -> -0.00.
    if value.is_sign_negative() && !value.is_nan() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `-150.25, -1.2 -> "-150.25 (-1.20%)"`.
pub fn format_signed_pnl(pnl: f64, pnl_pct: f64) -> String {
    format!("{pnl:+.2} ({pnl_pct:+.2}%)")
}

/// Fraction rendered as a signed percent: `0.015 -> "+1.50%"`.
pub fn format_signed_percent(fraction: f64) -> String {
    format!("{:+.2}%", fraction * 100.0)
}
