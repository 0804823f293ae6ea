//! Number formatting for tooltips, legends and summary tables.

/// Decimal places for amounts shown with `sign`: none for plain usage,
/// four for cents, two for everything else.
pub fn currency_precision(sign: &str) -> usize {
    match sign {
        "" => 0,
        "¢" => 4,
        _ => 2,
    }
}

/// Fixed precision with `,` thousands separators.
pub fn format_number(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }

    let fixed = format!("{:.*}", precision, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_amount(sign: &str, value: f64) -> String {
    format!("{sign}{}", format_number(value, currency_precision(sign)))
}

pub fn format_percent(value: f64) -> String {
    format_number(value, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_follows_currency_sign() {
        assert_eq!(currency_precision(""), 0);
        assert_eq!(currency_precision("¢"), 4);
        assert_eq!(currency_precision("$"), 2);
        assert_eq!(currency_precision("€"), 2);
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(-4321.5, 1), "-4,321.5");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn amount_prefixes_sign() {
        assert_eq!(format_amount("$", 12.5), "$12.50");
        assert_eq!(format_amount("", 12.6), "13");
        assert_eq!(format_amount("¢", 0.25), "¢0.2500");
    }
}
