//! WebAssembly helpers for the Farm Ledger web front-end
//!
//! Exposes the pure rules the browser needs before it talks to the API:
//! - Sale totals in GEL
//! - Classification and localisation of backend errors
//! - Expense allocation checks
//! - Pre-flight check of a movement against known stock
//!
//! Amounts cross the boundary as decimal strings so nothing is lost to floats.

use std::str::FromStr;

use rust_decimal::Decimal;
use shared::{
    sale_total, AllocationType, BackendErrorKind, BinLotStock, Language, MovementDraft, StockLedger,
};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("{} is not a number: {}", field, value))
}

fn parse_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| Uuid::parse_str(v.trim()).map_err(|_| format!("{} is not a valid id", field)))
        .transpose()
}

fn sale_total_of(weight_kg: &str, price_per_kg: &str) -> Result<String, String> {
    let weight = parse_decimal("weight_kg", weight_kg)?;
    let price = parse_decimal("price_per_kg", price_per_kg)?;
    sale_total(weight, price)
        .map(|total| total.to_string())
        .ok_or_else(|| "Sale total is out of range".to_string())
}

fn kind_name(kind: BackendErrorKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "generic".to_string())
}

fn expense_allocation_check(
    allocation_type: &str,
    target_id: Option<String>,
    season_id: Option<String>,
) -> Result<(), String> {
    let allocation = allocation_type.parse::<AllocationType>()?;
    let target_id = parse_uuid("target_id", target_id)?;
    let season_id = parse_uuid("season_id", season_id)?;
    shared::validate_expense_allocation(allocation, target_id, season_id).map_err(str::to_string)
}

fn movement_check(stock_json: &str, movement_json: &str) -> Result<(), String> {
    let rows: Vec<BinLotStock> =
        serde_json::from_str(stock_json).map_err(|e| format!("Invalid stock JSON: {}", e))?;
    let draft: MovementDraft =
        serde_json::from_str(movement_json).map_err(|e| format!("Invalid movement JSON: {}", e))?;
    StockLedger::from_stock(rows)
        .and_then(|ledger| ledger.check(&draft))
        .map_err(|violation| violation.to_string())
}

/// weight × price rounded to tetri, as a decimal string
#[wasm_bindgen]
pub fn calculate_sale_total(weight_kg: &str, price_per_kg: &str) -> Result<String, JsValue> {
    sale_total_of(weight_kg, price_per_kg).map_err(|e| JsValue::from_str(&e))
}

/// Error kind (`mixing`, `insufficient_stock`, `delete_blocked`...) for an API error
#[wasm_bindgen]
pub fn classify_backend_error(code: Option<String>, message: &str) -> String {
    kind_name(BackendErrorKind::classify(code.as_deref(), message))
}

/// User-facing text for an API error; `language` is `ka` or `en`
#[wasm_bindgen]
pub fn localized_error_message(code: Option<String>, message: &str, language: &str) -> String {
    let language = Language::from_code(language).unwrap_or_default();
    BackendErrorKind::classify(code.as_deref(), message)
        .message(language)
        .to_string()
}

/// Check the target/season combination of an expense before saving it
#[wasm_bindgen]
pub fn validate_expense_allocation(
    allocation_type: &str,
    target_id: Option<String>,
    season_id: Option<String>,
) -> Result<(), JsValue> {
    expense_allocation_check(allocation_type, target_id, season_id).map_err(|e| JsValue::from_str(&e))
}

/// Check a movement against stock view rows; the error carries the
/// `BIN_MIXING` or `INSUFFICIENT_STOCK` marker
#[wasm_bindgen]
pub fn check_movement(stock_json: &str, movement_json: &str) -> Result<(), JsValue> {
    movement_check(stock_json, movement_json).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_total() {
        assert_eq!(sale_total_of("100", "2.50").unwrap(), "250.00");
        assert_eq!(sale_total_of(" 12.345 ", "1").unwrap(), "12.35");
        assert!(sale_total_of("abc", "1").is_err());
        assert_eq!(
            sale_total_of("79228162514264337593543950335", "2"),
            Err("Sale total is out of range".to_string())
        );
    }

    #[test]
    fn test_classify_backend_error() {
        assert_eq!(classify_backend_error(Some("BIN_MIXING".into()), ""), "mixing");
        assert_eq!(
            classify_backend_error(None, "ERROR: ბინში ლოტების შერევა დაუშვებელია"),
            "mixing"
        );
        assert_eq!(classify_backend_error(Some("DELETE_BLOCKED".into()), ""), "delete_blocked");
        assert_eq!(classify_backend_error(None, "something else"), "generic");
    }

    #[test]
    fn test_localized_message() {
        let ka = localized_error_message(Some("INSUFFICIENT_STOCK".into()), "", "ka");
        assert!(ka.contains("არასაკმარისი"));
        let en = localized_error_message(Some("INSUFFICIENT_STOCK".into()), "", "en");
        assert_eq!(en, "Not enough stock in the bin");
    }

    #[test]
    fn test_expense_allocation() {
        let id = Uuid::new_v4().to_string();
        assert!(expense_allocation_check("GENERAL", None, None).is_ok());
        assert!(expense_allocation_check("GENERAL", Some(id.clone()), None).is_err());
        assert!(expense_allocation_check("FIELD", Some(id.clone()), None).is_ok());
        assert!(expense_allocation_check("LOT", Some(String::new()), None).is_err());
        assert!(expense_allocation_check("SEASON", None, None).is_err());
        assert!(expense_allocation_check("SEASON", None, Some(id)).is_ok());
        assert!(expense_allocation_check("PLOT", None, None).is_err());
    }

    #[test]
    fn test_movement_check() {
        let bin = Uuid::from_u128(1);
        let (lot_a, lot_b) = (Uuid::from_u128(10), Uuid::from_u128(11));
        let stock = serde_json::to_string(&vec![BinLotStock {
            bin_id: bin,
            lot_id: lot_a,
            stock_kg: Decimal::from(50),
        }])
        .unwrap();

        let mixing = serde_json::to_string(&MovementDraft::receive(lot_b, bin, Decimal::from(5))).unwrap();
        assert!(movement_check(&stock, &mixing).unwrap_err().starts_with("BIN_MIXING"));

        let oversell = serde_json::to_string(&MovementDraft::sale_out(lot_a, bin, Decimal::from(60))).unwrap();
        assert!(movement_check(&stock, &oversell)
            .unwrap_err()
            .starts_with("INSUFFICIENT_STOCK"));

        let fine = serde_json::to_string(&MovementDraft::sale_out(lot_a, bin, Decimal::from(50))).unwrap();
        assert!(movement_check(&stock, &fine).is_ok());

        let full = serde_json::to_string(&vec![BinLotStock {
            bin_id: bin,
            lot_id: lot_a,
            stock_kg: Decimal::MAX,
        }])
        .unwrap();
        let one_more = serde_json::to_string(&MovementDraft::receive(lot_a, bin, Decimal::ONE)).unwrap();
        assert!(movement_check(&full, &one_more).unwrap_err().contains("out of range"));
    }
}
