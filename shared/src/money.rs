//! Money arithmetic in Georgian lari
//!
//! All amounts are `Decimal`; rounding happens once, at the point an amount
//! is stored, to whole tetri (2 decimal places), half away from zero.
//! Column bounds mirror the schema: weights NUMERIC(14,3), unit prices
//! NUMERIC(14,4), GEL amounts NUMERIC(14,2).

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for GEL amounts
pub const GEL_SCALE: u32 = 2;

/// Largest weight a movement, lot or sale can carry
pub const MAX_WEIGHT_KG: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 3); // 99_999_999_999.999

/// Largest unit price of a sale
pub const MAX_PRICE_PER_KG: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4); // 9_999_999_999.9999

/// Largest stored GEL amount
pub const MAX_GEL: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2); // 999_999_999_999.99

/// Round an amount to tetri
pub fn round_gel(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(GEL_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(GEL_SCALE);
    rounded
}

/// Total of a sale: weight × unit price, rounded to tetri
///
/// `None` when the product overflows or exceeds [`MAX_GEL`].
pub fn sale_total(weight_kg: Decimal, price_per_kg: Decimal) -> Option<Decimal> {
    let total = round_gel(weight_kg.checked_mul(price_per_kg)?);
    (total.abs() <= MAX_GEL).then_some(total)
}

/// Share of `part` in `whole` as a percentage with two decimals; `None` for an empty whole
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    Some(
        part.checked_div(whole)?
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp(2),
    )
}
