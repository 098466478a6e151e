//! Two-step lot intake with compensating delete
//!
//! Creating a lot is a wizard with two separate writes: the lot itself, then
//! a RECEIVE movement that puts its harvest into a bin. When the second write
//! fails the first one is undone by deleting the lot, so no lot is ever left
//! without its receipt. No step is retried.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CreateLotInput, LotIntakeInput};

/// Receipt of a freshly created lot into a bin
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptDraft {
    pub lot_id: Uuid,
    pub bin_id: Uuid,
    pub weight_kg: Decimal,
    pub movement_date: NaiveDate,
    pub notes: Option<String>,
}

/// Storage the saga runs against
#[async_trait]
pub trait LotIntakeStore: Send {
    type Lot: Send;
    type Movement: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn insert_lot(&mut self, input: &CreateLotInput) -> Result<Self::Lot, Self::Error>;

    fn lot_id(lot: &Self::Lot) -> Uuid;

    async fn insert_receipt(&mut self, receipt: &ReceiptDraft) -> Result<Self::Movement, Self::Error>;

    async fn delete_lot(&mut self, lot_id: Uuid) -> Result<(), Self::Error>;
}

/// Both records written by a successful intake
#[derive(Debug, Clone, Serialize)]
pub struct LotIntakeOutcome<L, M> {
    pub lot: L,
    pub receipt: M,
}

#[derive(Debug, Error)]
pub enum IntakeError<E: std::error::Error + 'static> {
    /// Step 1 failed; nothing was written
    #[error("lot could not be created: {0}")]
    Lot(#[source] E),

    /// Step 2 failed; the lot was deleted again
    #[error("lot receipt failed, lot {lot_id} rolled back: {source}")]
    Receipt {
        lot_id: Uuid,
        #[source]
        source: E,
    },

    /// Step 2 failed and the compensating delete failed too; the lot is orphaned
    #[error("lot receipt failed ({receipt}) and lot {lot_id} could not be removed: {compensation}")]
    CompensationFailed {
        lot_id: Uuid,
        receipt: E,
        compensation: E,
    },
}

impl<E: std::error::Error + 'static> IntakeError<E> {
    /// The error that stopped the intake (the receipt failure when compensation also failed)
    pub fn cause(&self) -> &E {
        match self {
            IntakeError::Lot(e) => e,
            IntakeError::Receipt { source, .. } => source,
            IntakeError::CompensationFailed { receipt, .. } => receipt,
        }
    }

    pub fn into_cause(self) -> E {
        match self {
            IntakeError::Lot(e) => e,
            IntakeError::Receipt { source, .. } => source,
            IntakeError::CompensationFailed { receipt, .. } => receipt,
        }
    }
}

/// Resolve the receipt defaults: full harvested weight, on the harvest date
pub fn receipt_for(input: &LotIntakeInput, lot_id: Uuid) -> ReceiptDraft {
    ReceiptDraft {
        lot_id,
        bin_id: input.receipt.bin_id,
        weight_kg: input.receipt.weight_kg.unwrap_or(input.lot.harvested_kg),
        movement_date: input.receipt.movement_date.unwrap_or(input.lot.harvest_date),
        notes: input.receipt.notes.clone(),
    }
}

/// Run the intake: insert lot, insert RECEIVE, delete the lot if the receipt fails
pub async fn run_lot_intake<S>(
    store: &mut S,
    input: &LotIntakeInput,
) -> Result<LotIntakeOutcome<S::Lot, S::Movement>, IntakeError<S::Error>>
where
    S: LotIntakeStore,
{
    let lot = store.insert_lot(&input.lot).await.map_err(IntakeError::Lot)?;
    let lot_id = S::lot_id(&lot);
    let receipt = receipt_for(input, lot_id);

    match store.insert_receipt(&receipt).await {
        Ok(movement) => {
            tracing::info!(%lot_id, bin_id = %receipt.bin_id, weight_kg = %receipt.weight_kg, "lot received");
            Ok(LotIntakeOutcome {
                lot,
                receipt: movement,
            })
        }
        Err(receipt_err) => {
            tracing::warn!(%lot_id, error = %receipt_err, "lot receipt failed, removing lot");
            match store.delete_lot(lot_id).await {
                Ok(()) => Err(IntakeError::Receipt {
                    lot_id,
                    source: receipt_err,
                }),
                Err(compensation) => {
                    tracing::error!(%lot_id, error = %compensation, "could not remove lot after failed receipt");
                    Err(IntakeError::CompensationFailed {
                        lot_id,
                        receipt: receipt_err,
                        compensation,
                    })
                }
            }
        }
    }
}
