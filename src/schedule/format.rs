/// `400000.0` -> `400.000 ₫`. Đồng has no minor unit, so amounts are rounded.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} ₫", sign, grouped)
}

/// `8.0` -> `8h`, `7.5` -> `7.5h`, `7.25` -> `7.25h`.
pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}h", rounded as i64)
    } else {
        let text = format!("{:.2}", rounded);
        format!("{}h", text.trim_end_matches('0'))
    }
}
