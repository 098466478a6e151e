//! Lot intake saga tests
//!
//! Runs the two-step intake against an in-memory store that enforces the
//! ledger rules, and checks that a failed receipt never leaves a lot behind.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::saga::{run_lot_intake, IntakeError, LotIntakeStore, ReceiptDraft};
use shared::{
    BackendErrorKind, CreateLotInput, LedgerViolation, LotIntakeInput, MovementDraft, ReceiptInput,
    StockLedger,
};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum StoreError {
    #[error(transparent)]
    Ledger(#[from] LedgerViolation),
    #[error("duplicate lot code {0}")]
    DuplicateCode(String),
    #[error("connection lost")]
    ConnectionLost,
}

#[derive(Default)]
struct MemoryStore {
    lots: HashMap<Uuid, String>,
    ledger: StockLedger,
    receipts: Vec<ReceiptDraft>,
    fail_delete: bool,
}

impl MemoryStore {
    fn lots_with_code(&self, code: &str) -> usize {
        self.lots.values().filter(|c| c.as_str() == code).count()
    }
}

#[async_trait]
impl LotIntakeStore for MemoryStore {
    type Lot = Uuid;
    type Movement = ReceiptDraft;
    type Error = StoreError;

    async fn insert_lot(&mut self, input: &CreateLotInput) -> Result<Uuid, StoreError> {
        if self.lots_with_code(&input.lot_code) > 0 {
            return Err(StoreError::DuplicateCode(input.lot_code.clone()));
        }
        let id = Uuid::new_v4();
        self.lots.insert(id, input.lot_code.clone());
        Ok(id)
    }

    fn lot_id(lot: &Uuid) -> Uuid {
        *lot
    }

    async fn insert_receipt(&mut self, receipt: &ReceiptDraft) -> Result<ReceiptDraft, StoreError> {
        let draft = MovementDraft::receive(receipt.lot_id, receipt.bin_id, receipt.weight_kg);
        self.ledger.apply(&draft)?;
        self.receipts.push(receipt.clone());
        Ok(receipt.clone())
    }

    async fn delete_lot(&mut self, lot_id: Uuid) -> Result<(), StoreError> {
        if self.fail_delete {
            return Err(StoreError::ConnectionLost);
        }
        self.lots.remove(&lot_id);
        Ok(())
    }
}

fn intake(code: &str, bin_id: Uuid, harvested: &str) -> LotIntakeInput {
    LotIntakeInput {
        lot: CreateLotInput {
            season_id: Uuid::new_v4(),
            lot_code: code.to_string(),
            crop_id: Uuid::new_v4(),
            variety_id: None,
            field_id: Uuid::new_v4(),
            harvested_kg: Decimal::from_str(harvested).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 9, 14).unwrap(),
            notes: None,
        },
        receipt: ReceiptInput {
            bin_id,
            weight_kg: None,
            movement_date: None,
            notes: None,
        },
    }
}

#[test]
fn successful_intake_receives_full_harvest() {
    let mut store = MemoryStore::default();
    let bin = Uuid::new_v4();
    let input = intake("WHEAT-001", bin, "1250.5");

    let outcome = tokio_test::block_on(run_lot_intake(&mut store, &input)).unwrap();

    assert_eq!(outcome.receipt.lot_id, outcome.lot);
    assert_eq!(outcome.receipt.weight_kg, Decimal::from_str("1250.5").unwrap());
    assert_eq!(outcome.receipt.movement_date, input.lot.harvest_date);
    assert_eq!(store.ledger.stock(bin, outcome.lot), Decimal::from_str("1250.5").unwrap());
    assert_eq!(store.lots_with_code("WHEAT-001"), 1);
}

#[test]
fn failed_receipt_removes_the_lot() {
    let mut store = MemoryStore::default();
    let bin = Uuid::new_v4();

    tokio_test::block_on(run_lot_intake(&mut store, &intake("CORN-001", bin, "500"))).unwrap();

    // the bin is occupied by CORN-001, so the second receipt is a mixing violation
    let err = tokio_test::block_on(run_lot_intake(&mut store, &intake("CORN-002", bin, "300")))
        .unwrap_err();

    match &err {
        IntakeError::Receipt { source, .. } => {
            assert!(matches!(source, StoreError::Ledger(LedgerViolation::Mixing { .. })));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        BackendErrorKind::from_message(&err.cause().to_string()),
        BackendErrorKind::Mixing
    );
    assert_eq!(store.lots_with_code("CORN-002"), 0);
    assert_eq!(store.lots.len(), 1);
    assert_eq!(store.receipts.len(), 1);
}

#[test]
fn failed_lot_insert_skips_the_receipt() {
    let mut store = MemoryStore::default();
    let bin_a = Uuid::new_v4();
    let bin_b = Uuid::new_v4();

    tokio_test::block_on(run_lot_intake(&mut store, &intake("GRAPE-7", bin_a, "80"))).unwrap();
    let err = tokio_test::block_on(run_lot_intake(&mut store, &intake("GRAPE-7", bin_b, "80")))
        .unwrap_err();

    assert!(matches!(err, IntakeError::Lot(StoreError::DuplicateCode(_))));
    assert_eq!(store.receipts.len(), 1);
    assert!(store.ledger.lots_in_bin(bin_b).is_empty());
}

#[test]
fn failed_compensation_is_reported() {
    let mut store = MemoryStore {
        fail_delete: true,
        ..Default::default()
    };
    let bin = Uuid::new_v4();
    let mut input = intake("BARLEY-1", bin, "10");
    input.receipt.weight_kg = Some(Decimal::ZERO);

    let err = tokio_test::block_on(run_lot_intake(&mut store, &input)).unwrap_err();

    match err {
        IntakeError::CompensationFailed {
            lot_id,
            receipt,
            compensation,
        } => {
            assert!(store.lots.contains_key(&lot_id));
            assert!(matches!(receipt, StoreError::Ledger(LedgerViolation::NonPositiveWeight(_))));
            assert!(matches!(compensation, StoreError::ConnectionLost));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn partial_receipt_weight_is_respected() {
    let mut store = MemoryStore::default();
    let bin = Uuid::new_v4();
    let mut input = intake("SUNFLOWER-3", bin, "900");
    input.receipt.weight_kg = Some(Decimal::from(850));
    input.receipt.movement_date = NaiveDate::from_ymd_opt(2024, 9, 16);

    let outcome = tokio_test::block_on(run_lot_intake(&mut store, &input)).unwrap();

    assert_eq!(outcome.receipt.weight_kg, Decimal::from(850));
    assert_eq!(
        outcome.receipt.movement_date,
        NaiveDate::from_ymd_opt(2024, 9, 16).unwrap()
    );
}
