//! Inventory and sale rule tests
//!
//! The services run these same checks inside a transaction with the bins
//! locked; here the ledger stands in for the stock view.

use axum::http::StatusCode;
use chrono::NaiveDate;
use farm_ledger_backend::error::AppError;
use farm_ledger_backend::services::sale::plan_sale;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    sale_total, BackendErrorKind, CreateSaleInput, MovementDraft, PaymentStatus, StockLedger,
};
use uuid::Uuid;
use validator::Validate;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn lot(n: u128) -> Uuid {
    Uuid::from_u128(1_000 + n)
}

fn bin(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// Sale as the service writes it: both the sale and its SALE_OUT, or neither
fn try_sale(ledger: &mut StockLedger, sales: &mut Vec<Decimal>, input: &CreateSaleInput) -> Result<Decimal, AppError> {
    let (total_gel, draft) = plan_sale(ledger, input)?;
    sales.push(input.weight_kg);
    ledger.apply(&draft)?;
    Ok(total_gel)
}

fn sale_of(lot_id: Uuid, bin_id: Uuid, weight_kg: Decimal, price_per_kg: Decimal) -> CreateSaleInput {
    CreateSaleInput {
        farm_id: None,
        season_id: Uuid::new_v4(),
        lot_id,
        bin_id,
        buyer_id: Uuid::new_v4(),
        sale_date: NaiveDate::from_ymd_opt(2024, 9, 14).unwrap(),
        weight_kg,
        price_per_kg,
        payment_status: PaymentStatus::Unpaid,
        notes: None,
    }
}

fn sale_input(weight_kg: Decimal, price_per_kg: Decimal) -> CreateSaleInput {
    sale_of(lot(1), bin(1), weight_kg, price_per_kg)
}

// ============================================================================
// Atomic sale
// ============================================================================

proptest! {
    #[test]
    fn failed_sales_leave_no_trace(
        stocked in 1..=1_000i64,
        attempts in prop::collection::vec(1..=400i64, 1..20),
    ) {
        let mut ledger = StockLedger::new();
        ledger.apply(&MovementDraft::receive(lot(1), bin(1), Decimal::from(stocked))).unwrap();
        let mut sales = Vec::new();

        for kg in attempts {
            let before = ledger.clone();
            let sale_count = sales.len();
            let weight = Decimal::from(kg);

            match try_sale(&mut ledger, &mut sales, &sale_input(weight, dec("2.50"))) {
                Ok(total) => {
                    prop_assert_eq!(sales.len(), sale_count + 1);
                    prop_assert_eq!(total, weight * dec("2.50"));
                }
                Err(err) => {
                    prop_assert_eq!(err.code(), "INSUFFICIENT_STOCK");
                    prop_assert_eq!(sales.len(), sale_count);
                    prop_assert_eq!(ledger.rows(), before.rows());
                }
            }
        }

        let sold: Decimal = sales.iter().copied().sum();
        prop_assert_eq!(ledger.stock(bin(1), lot(1)), Decimal::from(stocked) - sold);
        prop_assert!(ledger.stock(bin(1), lot(1)) >= Decimal::ZERO);
    }

    #[test]
    fn sale_totals_round_to_two_places(weight in 1..=100_000i64, price in 1..=10_000i64) {
        let total = sale_total(Decimal::new(weight, 1), Decimal::new(price, 2));
        prop_assert!(total.is_some_and(|t| t.scale() <= 2));
    }
}

#[test]
fn selling_another_lots_bin_is_rejected() {
    let mut ledger = StockLedger::new();
    ledger.apply(&MovementDraft::receive(lot(1), bin(1), dec("500"))).unwrap();
    let mut sales = Vec::new();

    let err = try_sale(&mut ledger, &mut sales, &sale_of(lot(2), bin(1), dec("10"), dec("2"))).unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    assert!(sales.is_empty());
    assert_eq!(ledger.stock(bin(1), lot(1)), dec("500"));
}

#[test]
fn hundred_kg_at_two_fifty_is_two_hundred_fifty() {
    assert_eq!(sale_total(dec("100"), dec("2.50")), Some(dec("250.00")));
    assert_eq!(sale_total(dec("0.333"), dec("1.5")), Some(dec("0.50")));
}

#[test]
fn sale_too_large_to_store_is_a_validation_error() {
    let mut ledger = StockLedger::new();
    ledger.apply(&MovementDraft::receive(lot(1), bin(1), dec("500"))).unwrap();
    let mut sales = Vec::new();

    // past NUMERIC(14,3) before any arithmetic happens
    let huge = sale_input(dec("79228162514264337593543950335"), dec("2"));
    let err = try_sale(&mut ledger, &mut sales, &huge).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // each column fits but the total does not
    let pricey = sale_input(dec("400"), dec("9999999999.9999"));
    let err = try_sale(&mut ledger, &mut sales, &pricey).unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "price_per_kg"));

    assert!(sales.is_empty());
    assert_eq!(ledger.stock(bin(1), lot(1)), dec("500"));
}

#[test]
fn stock_past_the_column_range_is_refused() {
    let mut ledger = StockLedger::new();
    ledger.apply(&MovementDraft::receive(lot(1), bin(1), Decimal::MAX)).unwrap();

    let err: AppError = ledger
        .check(&MovementDraft::receive(lot(1), bin(1), dec("1")))
        .unwrap_err()
        .into();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(ledger.stock(bin(1), lot(1)), Decimal::MAX);
}

#[test]
fn sale_input_rejects_non_positive_amounts() {
    let err: AppError = sale_input(Decimal::ZERO, dec("2.50")).validate().unwrap_err().into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "weight_kg"));

    let err: AppError = sale_input(dec("10"), dec("-1")).validate().unwrap_err().into();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "price_per_kg"));

    assert!(sale_input(dec("10"), dec("2.50")).validate().is_ok());
}

// ============================================================================
// Transfers and removal
// ============================================================================

#[test]
fn transfer_into_an_occupied_bin_is_mixing() {
    let mut ledger = StockLedger::new();
    ledger.apply(&MovementDraft::receive(lot(1), bin(1), dec("100"))).unwrap();
    ledger.apply(&MovementDraft::receive(lot(2), bin(2), dec("100"))).unwrap();

    let err: AppError = ledger
        .check(&MovementDraft::transfer(lot(1), bin(1), bin(2), dec("10")))
        .unwrap_err()
        .into();

    assert_eq!(err.code(), "BIN_MIXING");
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        BackendErrorKind::classify(Some(err.code()), &err.to_string()),
        BackendErrorKind::Mixing
    );
}

#[test]
fn emptied_bin_accepts_a_new_lot() {
    let mut ledger = StockLedger::new();
    ledger.apply(&MovementDraft::receive(lot(1), bin(1), dec("40"))).unwrap();
    ledger.apply(&MovementDraft::transfer(lot(1), bin(1), bin(2), dec("40"))).unwrap();

    assert!(ledger.check(&MovementDraft::receive(lot(2), bin(1), dec("5"))).is_ok());
}

#[test]
fn deleting_a_receipt_that_was_sold_from_is_refused() {
    let mut ledger = StockLedger::new();
    let receipt = MovementDraft::receive(lot(1), bin(1), dec("100"));
    ledger.apply(&receipt).unwrap();
    ledger.apply(&MovementDraft::sale_out(lot(1), bin(1), dec("60"))).unwrap();

    let err: AppError = ledger.check_removal(&receipt).unwrap_err().into();
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
}

#[test]
fn deleting_a_sale_returns_its_weight() {
    let mut ledger = StockLedger::new();
    ledger.apply(&MovementDraft::receive(lot(1), bin(1), dec("100"))).unwrap();
    let sale = MovementDraft::sale_out(lot(1), bin(1), dec("60"));
    ledger.apply(&sale).unwrap();

    assert!(ledger.check_removal(&sale).is_ok());
}
