//! Lot intake over HTTP
//!
//! The lot and its RECEIVE movement are two separate requests here, so a
//! failed receipt is compensated by deleting the lot again.

use async_trait::async_trait;
use shared::saga::{run_lot_intake, IntakeError, LotIntakeOutcome, LotIntakeStore, ReceiptDraft};
use shared::{CreateLotInput, InventoryMovement, Lot, LotIntakeInput, MovementType, RecordMovementInput};
use uuid::Uuid;

use crate::client::FarmClient;
use crate::error::ClientError;
use crate::tables::Table;

/// `LotIntakeStore` backed by the table routes
pub struct LotIntake<'a> {
    client: &'a FarmClient,
}

impl<'a> LotIntake<'a> {
    pub fn new(client: &'a FarmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LotIntakeStore for LotIntake<'_> {
    type Lot = Lot;
    type Movement = InventoryMovement;
    type Error = ClientError;

    async fn insert_lot(&mut self, input: &CreateLotInput) -> Result<Lot, ClientError> {
        self.client.insert(Table::Lots, input).await
    }

    fn lot_id(lot: &Lot) -> Uuid {
        lot.id
    }

    async fn insert_receipt(&mut self, receipt: &ReceiptDraft) -> Result<InventoryMovement, ClientError> {
        let body = RecordMovementInput {
            movement_type: MovementType::Receive,
            lot_id: receipt.lot_id,
            from_bin_id: None,
            to_bin_id: Some(receipt.bin_id),
            weight_kg: receipt.weight_kg,
            movement_date: Some(receipt.movement_date),
            notes: receipt.notes.clone(),
        };
        self.client.insert(Table::InventoryMovements, &body).await
    }

    async fn delete_lot(&mut self, lot_id: Uuid) -> Result<(), ClientError> {
        self.client.delete(Table::Lots, lot_id).await
    }
}

impl FarmClient {
    /// Create a lot and receive it into a bin, deleting the lot if the receipt fails
    pub async fn create_lot_with_receipt(
        &self,
        input: &LotIntakeInput,
    ) -> Result<LotIntakeOutcome<Lot, InventoryMovement>, IntakeError<ClientError>> {
        run_lot_intake(&mut LotIntake::new(self), input).await
    }
}
