//! Lot intake over HTTP: the lot is deleted again when its receipt fails

mod common;

use common::*;
use shared::saga::IntakeError;
use shared::BackendErrorKind;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn receipt_defaults_to_the_full_harvest() {
    let server = MockServer::start().await;
    let (lot_id, bin_id) = (Uuid::new_v4(), Uuid::new_v4());
    let input = intake_input(bin_id);

    Mock::given(method("POST"))
        .and(path("/api/v1/lots"))
        .respond_with(ResponseTemplate::new(201).set_body_json(lot(lot_id, &input.lot)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/inventory/movements"))
        .and(body_partial_json(serde_json::json!({
            "movement_type": "RECEIVE",
            "lot_id": lot_id,
            "to_bin_id": bin_id,
            "weight_kg": "1250.5",
            "movement_date": "2024-09-20",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(receipt(lot_id, bin_id, dec("1250.5"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = signed_in(&server).await;
    let outcome = client.create_lot_with_receipt(&input).await.unwrap();
    assert_eq!(outcome.lot.id, lot_id);
    assert_eq!(outcome.receipt.weight_kg, dec("1250.5"));
}

#[tokio::test]
async fn mixing_on_receipt_deletes_the_lot() {
    let server = MockServer::start().await;
    let (lot_id, bin_id) = (Uuid::new_v4(), Uuid::new_v4());
    let input = intake_input(bin_id);

    Mock::given(method("POST"))
        .and(path("/api/v1/lots"))
        .respond_with(ResponseTemplate::new(201).set_body_json(lot(lot_id, &input.lot)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/inventory/movements"))
        .respond_with(ResponseTemplate::new(422).set_body_json(error_body(
            "BIN_MIXING",
            "BIN_MIXING: bin already holds another lot",
            "ბინში ლოტების შერევა დაუშვებელია",
        )))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/v1/lots/{}", lot_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server).await;
    let err = client.create_lot_with_receipt(&input).await.unwrap_err();

    assert!(matches!(err, IntakeError::Receipt { lot_id: id, .. } if id == lot_id));
    assert_eq!(err.cause().kind(), BackendErrorKind::Mixing);
}

#[tokio::test]
async fn failed_lot_insert_sends_nothing_else() {
    let server = MockServer::start().await;
    let input = intake_input(Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/api/v1/lots"))
        .respond_with(ResponseTemplate::new(409).set_body_json(error_body(
            "DUPLICATE_ENTRY",
            "A record with this lots_farm_id_lot_code_key already exists",
            "ჩანაწერი უკვე არსებობს",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/inventory/movements"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = signed_in(&server).await;
    let err = client.create_lot_with_receipt(&input).await.unwrap_err();

    assert!(matches!(err, IntakeError::Lot(_)));
    assert_eq!(err.cause().kind(), BackendErrorKind::Duplicate);
}

#[tokio::test]
async fn failed_compensation_is_reported() {
    let server = MockServer::start().await;
    let (lot_id, bin_id) = (Uuid::new_v4(), Uuid::new_v4());
    let input = intake_input(bin_id);

    Mock::given(method("POST"))
        .and(path("/api/v1/lots"))
        .respond_with(ResponseTemplate::new(201).set_body_json(lot(lot_id, &input.lot)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/inventory/movements"))
        .respond_with(ResponseTemplate::new(500).set_body_string("connection reset"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/v1/lots/{}", lot_id)))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server).await;
    let err = client.create_lot_with_receipt(&input).await.unwrap_err();

    match err {
        IntakeError::CompensationFailed { lot_id: id, compensation, .. } => {
            assert_eq!(id, lot_id);
            assert!(matches!(compensation, farm_client::ClientError::Api { status: 503, .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}
