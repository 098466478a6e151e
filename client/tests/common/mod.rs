#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use farm_client::{ClientConfig, FarmClient, Session};
use rust_decimal::Decimal;
use shared::{
    CreateLotInput, InventoryMovement, Lot, LotIntakeInput, MovementType, PaymentStatus,
    ReceiptInput, Sale,
};
use uuid::Uuid;
use wiremock::MockServer;

pub const TOKEN: &str = "session-token";
pub const API_KEY: &str = "anon-key";

pub async fn signed_in(server: &MockServer) -> FarmClient {
    let client = FarmClient::new(ClientConfig::new(server.uri(), API_KEY)).unwrap();
    client.set_session(Session::new(TOKEN)).await;
    client
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn harvest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 20).unwrap()
}

pub fn intake_input(bin_id: Uuid) -> LotIntakeInput {
    LotIntakeInput {
        lot: CreateLotInput {
            season_id: Uuid::new_v4(),
            lot_code: "RK-2024-001".into(),
            crop_id: Uuid::new_v4(),
            variety_id: None,
            field_id: Uuid::new_v4(),
            harvested_kg: dec("1250.5"),
            harvest_date: harvest_date(),
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

pub fn lot(id: Uuid, input: &CreateLotInput) -> Lot {
    Lot {
        id,
        farm_id: Uuid::new_v4(),
        season_id: input.season_id,
        lot_code: input.lot_code.clone(),
        crop_id: input.crop_id,
        variety_id: input.variety_id,
        field_id: input.field_id,
        harvested_kg: input.harvested_kg,
        harvest_date: input.harvest_date,
        notes: input.notes.clone(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn receipt(lot_id: Uuid, bin_id: Uuid, weight_kg: Decimal) -> InventoryMovement {
    InventoryMovement {
        id: Uuid::new_v4(),
        farm_id: Uuid::new_v4(),
        movement_type: MovementType::Receive,
        lot_id,
        from_bin_id: None,
        to_bin_id: Some(bin_id),
        weight_kg,
        movement_date: harvest_date(),
        sale_id: None,
        notes: None,
        created_by: None,
        created_at: Utc::now(),
    }
}

pub fn sale(lot_id: Uuid, bin_id: Uuid, weight_kg: Decimal, price_per_kg: Decimal) -> Sale {
    Sale {
        id: Uuid::new_v4(),
        farm_id: Uuid::new_v4(),
        season_id: Uuid::new_v4(),
        lot_id,
        bin_id,
        buyer_id: Uuid::new_v4(),
        sale_date: harvest_date(),
        weight_kg,
        price_per_kg,
        total_gel: shared::sale_total(weight_kg, price_per_kg).unwrap(),
        payment_status: PaymentStatus::Unpaid,
        notes: None,
        created_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Error body the way the backend renders it
pub fn error_body(code: &str, message_en: &str, message_ka: &str) -> serde_json::Value {
    serde_json::json!({
        "error": { "code": code, "message_en": message_en, "message_ka": message_ka }
    })
}
