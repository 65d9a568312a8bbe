use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

pub mod auth;
pub mod menu;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod restaurants;

/// Trimmed, non-empty text field.
pub(crate) fn required_text(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("The {field} field is required.")));
    }
    Ok(value.to_string())
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Exclusive upper bound of the `NUMERIC(10, 2)` money columns.
pub(crate) const AMOUNT_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Reject amounts the money columns cannot hold.
pub(crate) fn storable(value: Decimal, field: &str) -> AppResult<Decimal> {
    if value >= AMOUNT_LIMIT {
        return Err(AppError::validation(format!(
            "The {field} field must be less than {AMOUNT_LIMIT}."
        )));
    }
    Ok(value)
}

/// Non-negative amount rounded to cents.
pub(crate) fn money(value: Decimal, field: &str) -> AppResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!(
            "The {field} field must be at least 0."
        )));
    }
    storable(value.round_dp(2), field)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn text_is_trimmed_and_required() {
        assert_eq!(required_text("  Entrées ", "nom").unwrap(), "Entrées");
        assert!(matches!(
            required_text("   ", "nom"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(optional_text(Some(" ".into())), None);
    }

    #[test]
    fn money_rounds_to_cents_and_rejects_negatives() {
        let price = Decimal::from_str("12.345").unwrap();
        assert_eq!(money(price, "prix").unwrap(), Decimal::from_str("12.34").unwrap());
        assert_eq!(money(Decimal::ZERO, "prix").unwrap(), Decimal::ZERO);
        assert!(money(Decimal::from_str("-0.01").unwrap(), "prix").is_err());
    }

    #[test]
    fn money_must_fit_the_amount_columns() {
        let max = Decimal::from_str("99999999.99").unwrap();
        assert_eq!(money(max, "montant").unwrap(), max);
        assert!(matches!(
            money(AMOUNT_LIMIT, "montant"),
            Err(AppError::Validation(_))
        ));
        // Rounding up to the limit is still too large.
        assert!(money(Decimal::from_str("99999999.999").unwrap(), "prix").is_err());
    }
}
