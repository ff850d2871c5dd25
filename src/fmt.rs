/// Format a float as euros, French style: 1 234,56 €
pub fn money(val: f64) -> String {
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-{grouped},{dec_part} \u{20ac}")
    } else {
        format!("{grouped},{dec_part} \u{20ac}")
    }
}

pub fn format_bytes(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Dash placeholder for empty cells.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "\u{2014}"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "1 234,56 \u{20ac}");
        assert_eq!(money(-500.00), "-500,00 \u{20ac}");
        assert_eq!(money(0.0), "0,00 \u{20ac}");
        assert_eq!(money(-0.001), "0,00 \u{20ac}");
        assert_eq!(money(1000000.99), "1 000 000,99 \u{20ac}");
        assert_eq!(money(17.99), "17,99 \u{20ac}");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "\u{2014}");
        assert_eq!(or_dash("FR"), "FR");
    }
}
