//! Culture-invariant number formatting for grid cells.
//!
//! Output never depends on the process locale: `.` is the decimal
//! separator, there is no digit grouping, and trailing fractional zeros
//! are trimmed (`1234.50` prints as `1234.5`, `600.00` as `600`).

use rust_decimal::Decimal;

/// Format a decimal amount for display.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Format an integer count for display.
pub fn format_quantity(value: u32) -> String {
    value.to_string()
}
