//! Custom Askama template filters.

use std::fmt::Display;

/// Prefix an amount with the store currency symbol.
///
/// Usage in templates: `{{ product.price|money }}` renders `$24.99`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(&value))
}

fn format_money(value: &impl Display) -> String {
    format!("${value}")
}

/// Year shown in the footer.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uniq_core::Price;

    use super::*;

    #[test]
    fn test_money_uses_two_decimals() {
        assert_eq!(format_money(&Price::parse("5.5").unwrap()), "$5.50");
        assert_eq!(format_money(&"15.50"), "$15.50");
    }
}
