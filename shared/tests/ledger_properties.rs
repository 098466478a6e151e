//! Stock ledger property tests
//!
//! - no bin ever holds positive stock of two lots
//! - every balance equals the signed sum of the accepted movements and is never negative
//! - sale totals are exact to the tetri

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{sale_total, CreateSaleInput, LedgerViolation, MovementDraft, MovementType, StockLedger};
use validator::Validate;
use uuid::Uuid;

const BINS: u128 = 4;
const LOTS: u128 = 3;

/// Random movement over a small pool of bins and lots, so conflicts are frequent
fn movement_strategy() -> impl Strategy<Value = MovementDraft> {
    (0..4u8, 0..LOTS, 0..BINS, 0..BINS, 1..=500i64).prop_map(|(kind, lot, a, b, tenths)| {
        let lot_id = Uuid::from_u128(100 + lot);
        let bin_a = Uuid::from_u128(1 + a);
        let bin_b = Uuid::from_u128(1 + b);
        let weight = Decimal::new(tenths, 1);
        match kind {
            0 => MovementDraft::receive(lot_id, bin_a, weight),
            1 => MovementDraft::transfer(lot_id, bin_a, bin_b, weight),
            2 => MovementDraft::sale_out(lot_id, bin_a, weight),
            _ => MovementDraft::adjustment(lot_id, bin_a, if tenths % 2 == 0 { weight } else { -weight }),
        }
    })
}

proptest! {
    #[test]
    fn bins_never_hold_two_lots(movements in prop::collection::vec(movement_strategy(), 1..80)) {
        let mut ledger = StockLedger::new();
        for draft in &movements {
            let _ = ledger.apply(draft);
            for bin in 1..=BINS {
                prop_assert!(ledger.lots_in_bin(Uuid::from_u128(bin)).len() <= 1);
            }
        }
    }

    #[test]
    fn balances_equal_signed_sums(movements in prop::collection::vec(movement_strategy(), 1..80)) {
        let mut ledger = StockLedger::new();
        let mut accepted = Vec::new();
        for draft in &movements {
            if ledger.apply(draft).is_ok() {
                accepted.push(*draft);
            }
        }

        let mut expected: HashMap<(Uuid, Uuid), Decimal> = HashMap::new();
        for draft in &accepted {
            if let Some(from) = draft.from_bin_id {
                *expected.entry((from, draft.lot_id)).or_default() -= draft.weight_kg;
            }
            if let Some(to) = draft.to_bin_id {
                *expected.entry((to, draft.lot_id)).or_default() += draft.weight_kg;
            }
        }

        for ((bin, lot), kg) in expected {
            prop_assert_eq!(ledger.stock(bin, lot), kg);
            prop_assert!(kg >= Decimal::ZERO);
        }
        prop_assert_eq!(StockLedger::replay(&accepted).unwrap(), ledger);
    }

    #[test]
    fn rejected_movements_leave_ledger_untouched(movements in prop::collection::vec(movement_strategy(), 1..40)) {
        let mut ledger = StockLedger::new();
        for draft in &movements {
            let before = ledger.clone();
            if ledger.apply(draft).is_err() {
                prop_assert_eq!(&ledger, &before);
            }
        }
    }

    #[test]
    fn adding_a_second_lot_to_an_occupied_bin_fails(
        stock in 1..10_000i64,
        incoming in 1..10_000i64,
    ) {
        let (lot_1, lot_2, bin) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut ledger = StockLedger::new();
        ledger.apply(&MovementDraft::receive(lot_1, bin, Decimal::new(stock, 2))).unwrap();

        let via_receive = ledger.check(&MovementDraft::receive(lot_2, bin, Decimal::new(incoming, 2)));
        let via_adjustment = ledger.check(&MovementDraft::adjustment(lot_2, bin, Decimal::new(incoming, 2)));
        let is_mixing = |r: &Result<(), LedgerViolation>| matches!(r, Err(LedgerViolation::Mixing { .. }));
        prop_assert!(is_mixing(&via_receive));
        prop_assert!(is_mixing(&via_adjustment));
    }

    #[test]
    fn sale_total_has_two_decimals(weight in 1..1_000_000i64, price in 1..100_000i64) {
        let weight = Decimal::new(weight, 3);
        let price = Decimal::new(price, 2);
        let total = sale_total(weight, price).unwrap();

        prop_assert_eq!(total.scale(), 2);
        prop_assert!((total - weight * price).abs() <= Decimal::new(5, 3));
    }
}

#[test]
fn hundred_kg_at_two_fifty_is_two_hundred_fifty() {
    assert_eq!(sale_total(Decimal::from(100), Decimal::new(250, 2)), Some(Decimal::new(25000, 2)));
}

#[test]
fn movement_type_wire_names() {
    let json = serde_json::to_string(&MovementType::SaleOut).unwrap();
    assert_eq!(json, "\"SALE_OUT\"");
    let parsed: MovementType = serde_json::from_str("\"RECEIVE\"").unwrap();
    assert_eq!(parsed, MovementType::Receive);
}

#[test]
fn sale_larger_than_the_columns_is_a_validation_error() {
    let input: CreateSaleInput = serde_json::from_value(serde_json::json!({
        "season_id": Uuid::new_v4(),
        "lot_id": Uuid::new_v4(),
        "bin_id": Uuid::new_v4(),
        "buyer_id": Uuid::new_v4(),
        "sale_date": "2024-10-01",
        "weight_kg": "79228162514264337593543950335",
        "price_per_kg": "2"
    }))
    .unwrap();

    let errors = input.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("weight_kg"));
    assert_eq!(sale_total(input.weight_kg, input.price_per_kg), None);
}
