//! Validation utilities for the Farm Ledger platform
//!
//! Field-level checks plug into `validator` derives; record-level rules
//! (expense allocation, delete guards) return plain results so the backend and
//! the browser apply the same rules.

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::ValidationError;

use crate::models::AllocationType;
use crate::money::{MAX_GEL, MAX_PRICE_PER_KG, MAX_WEIGHT_KG};

// ============================================================================
// Field validators (used by `#[validate(custom = ...)]`)
// ============================================================================

pub fn validate_positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("Value must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Value cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

fn positive_up_to(value: &Decimal, max: Decimal, code: &'static str) -> Result<(), ValidationError> {
    validate_positive_decimal(value)?;
    if *value > max {
        let mut err = ValidationError::new(code);
        err.message = Some(format!("Value must not exceed {}", max).into());
        err.add_param("max".into(), &max.to_string());
        return Err(err);
    }
    Ok(())
}

/// Positive and within NUMERIC(14,3)
pub fn validate_weight_kg(value: &Decimal) -> Result<(), ValidationError> {
    positive_up_to(value, MAX_WEIGHT_KG, "weight_range")
}

/// Positive and within NUMERIC(14,4)
pub fn validate_price_per_kg(value: &Decimal) -> Result<(), ValidationError> {
    positive_up_to(value, MAX_PRICE_PER_KG, "price_range")
}

pub fn validate_gel_amount(value: &Decimal) -> Result<(), ValidationError> {
    positive_up_to(value, MAX_GEL, "amount_range")
}

/// Lot codes are printed on bags and bin labels: 1-40 chars, no whitespace
pub fn validate_lot_code(code: &str) -> Result<(), ValidationError> {
    let code_ok = !code.is_empty()
        && code.chars().count() <= 40
        && !code.chars().any(char::is_whitespace);

    if !code_ok {
        let mut err = ValidationError::new("lot_code");
        err.message = Some("Lot code must be 1-40 characters without spaces".into());
        return Err(err);
    }
    Ok(())
}

/// Georgian tax identifiers: 9 digits for companies, 11 for individuals
pub fn validate_tax_id(tax_id: &str) -> Result<(), ValidationError> {
    let all_digits = tax_id.chars().all(|c| c.is_ascii_digit());
    if all_digits && (tax_id.len() == 9 || tax_id.len() == 11) {
        return Ok(());
    }
    let mut err = ValidationError::new("tax_id");
    err.message = Some("Tax ID must be 9 or 11 digits".into());
    Err(err)
}

// ============================================================================
// Record-level rules
// ============================================================================

/// `target_id` is present iff the allocation points at a concrete record;
/// SEASON allocations must name their season.
pub fn validate_expense_allocation(
    allocation: AllocationType,
    target_id: Option<Uuid>,
    season_id: Option<Uuid>,
) -> Result<(), &'static str> {
    match (allocation.requires_target(), target_id) {
        (true, None) => return Err("This allocation type requires a target"),
        (false, Some(_)) => return Err("GENERAL and SEASON expenses cannot have a target"),
        _ => {}
    }
    if allocation == AllocationType::Season && season_id.is_none() {
        return Err("SEASON expenses must reference a season");
    }
    Ok(())
}

/// Records that still reference a row someone wants to delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependents {
    entries: Vec<(&'static str, i64)>,
}

impl Dependents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: &'static str, count: i64) -> Self {
        self.entries.push((kind, count));
        self
    }

    /// Dependent kinds with a non-zero count
    pub fn blocking(&self) -> Vec<(&'static str, i64)> {
        self.entries.iter().copied().filter(|(_, n)| *n > 0).collect()
    }

    /// Ok when nothing references the row; otherwise a summary like `lots: 2, works: 1`
    pub fn ensure_none(&self) -> Result<(), String> {
        let blocking = self.blocking();
        if blocking.is_empty() {
            return Ok(());
        }
        Err(blocking
            .iter()
            .map(|(kind, n)| format!("{}: {}", kind, n))
            .collect::<Vec<_>>()
            .join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn positive_decimal() {
        assert!(validate_positive_decimal(&Decimal::from_str("0.001").unwrap()).is_ok());
        assert!(validate_positive_decimal(&Decimal::ZERO).is_err());
        assert!(validate_positive_decimal(&Decimal::from(-5)).is_err());
    }

    #[test]
    fn non_negative_decimal() {
        assert!(validate_non_negative_decimal(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_decimal(&Decimal::from(12)).is_ok());
        assert!(validate_non_negative_decimal(&Decimal::from(-1)).is_err());
    }

    #[test]
    fn weights_and_prices_fit_their_columns() {
        let huge = Decimal::from_str("79228162514264337593543950335").unwrap();
        assert!(validate_weight_kg(&Decimal::from(1200)).is_ok());
        assert!(validate_weight_kg(&MAX_WEIGHT_KG).is_ok());
        assert!(validate_weight_kg(&huge).is_err());
        assert!(validate_weight_kg(&Decimal::ZERO).is_err());
        assert!(validate_price_per_kg(&Decimal::new(250, 2)).is_ok());
        assert!(validate_price_per_kg(&(MAX_PRICE_PER_KG + Decimal::ONE)).is_err());
        assert!(validate_gel_amount(&(MAX_GEL + Decimal::ONE)).is_err());
    }

    #[test]
    fn lot_codes() {
        assert!(validate_lot_code("WH-2024-001").is_ok());
        assert!(validate_lot_code("").is_err());
        assert!(validate_lot_code("LOT 1").is_err());
        assert!(validate_lot_code(&"x".repeat(41)).is_err());
        assert!(validate_lot_code("ხორბალი-1").is_ok());
    }

    #[test]
    fn tax_ids() {
        assert!(validate_tax_id("204567891").is_ok());
        assert!(validate_tax_id("01024056789").is_ok());
        assert!(validate_tax_id("12345").is_err());
        assert!(validate_tax_id("20456789A").is_err());
    }

    #[test]
    fn expense_target_null_iff_general_or_season() {
        let target = Some(Uuid::new_v4());
        let season = Some(Uuid::new_v4());

        assert!(validate_expense_allocation(AllocationType::General, None, None).is_ok());
        assert!(validate_expense_allocation(AllocationType::General, target, None).is_err());
        assert!(validate_expense_allocation(AllocationType::Season, None, season).is_ok());
        assert!(validate_expense_allocation(AllocationType::Season, None, None).is_err());
        assert!(validate_expense_allocation(AllocationType::Season, target, season).is_err());

        for allocation in [AllocationType::Field, AllocationType::Work, AllocationType::Lot] {
            assert!(validate_expense_allocation(allocation, target, None).is_ok());
            assert!(validate_expense_allocation(allocation, None, season).is_err());
        }
    }

    #[test]
    fn dependents_block_delete() {
        let none = Dependents::new().with("lots", 0).with("works", 0);
        assert!(none.ensure_none().is_ok());

        let some = Dependents::new().with("lots", 2).with("works", 0);
        assert_eq!(some.ensure_none().unwrap_err(), "lots: 2");

        let both = Dependents::new().with("lots", 1).with("works", 3);
        assert_eq!(both.ensure_none().unwrap_err(), "lots: 1, works: 3");
    }
}
