//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table, ContentArrangement};
use rust_decimal::Decimal;

use bankapp_core::domain::product::round_money;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount with two decimals and grouped thousands: `1 234 567.80`
pub fn format_money(amount: Decimal) -> String {
    let text = format!("{:.2}", round_money(amount));
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Format a rate as a percentage without trailing zeros
pub fn format_percent(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_groups_thousands() {
        assert_eq!(format_money(Decimal::new(123456780, 2)), "1 234 567.80");
        assert_eq!(format_money(Decimal::from(999)), "999.00");
        assert_eq!(format_money(Decimal::new(-100005, 1)), "-10 000.50");
        assert_eq!(format_money(Decimal::new(28950649, 3)), "28 950.65");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Decimal::new(1900, 2)), "19%");
        assert_eq!(format_percent(Decimal::new(125, 1)), "12.5%");
    }
}
