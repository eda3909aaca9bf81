//! End-to-end HTTP tests over the in-memory stores.
//!
//! Exercise the full flow a client sees: browse the catalog, read a
//! provider's availability, book a slot, and observe the conflict on a
//! second attempt at the same slot.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use axum_test::TestServer;
use carebook_server::{build_router, AppState};
use carebook_testing::mocks::{test_clock, InMemoryStores};
use http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

fn test_server() -> (TestServer, InMemoryStores) {
    let stores = InMemoryStores::new();
    let state = AppState::new(
        Arc::new(stores.clone()),
        Arc::new(stores.clone()),
        Arc::new(stores.clone()),
        Arc::new(test_clock()),
    );
    let server = TestServer::new(build_router(state)).expect("router must start");
    (server, stores)
}

async fn first_provider(server: &TestServer) -> Value {
    let response = server.get("/api/providers").await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["providers"][0].clone()
}

#[tokio::test]
async fn health_and_readiness_respond() {
    let (server, _stores) = test_server();

    let health = server.get("/health").await;
    health.assert_status_ok();
    let body: Value = health.json();
    assert_eq!(body["status"], "ok");

    let ready = server.get("/ready").await;
    ready.assert_status_ok();
}

#[tokio::test]
async fn provider_catalog_is_seeded_on_first_read() {
    let (server, stores) = test_server();

    let response = server.get("/api/providers").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let providers = body["providers"].as_array().unwrap();
    assert!(!providers.is_empty());
    assert_eq!(body["total"].as_u64().unwrap() as usize, providers.len());
    assert!(providers.iter().all(|p| p["name"].as_str().is_some()));

    // The seed is idempotent across reads.
    server.get("/api/providers").await.assert_status_ok();
    let again: Value = server.get("/api/providers").await.json();
    assert_eq!(again["total"], body["total"]);
    let _ = stores;
}

#[tokio::test]
async fn availability_shows_a_full_week_of_slots() {
    let (server, _stores) = test_server();
    let provider = first_provider(&server).await;
    let provider_id = provider["id"].as_str().unwrap();

    let response = server.get(&format!("/api/providers/{provider_id}/slots")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["provider_id"].as_str().unwrap(), provider_id);

    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    let total: usize = days.iter().map(|d| d["slots"].as_array().unwrap().len()).sum();
    assert_eq!(total, 21, "3 slots per day over 7 days");
}

#[tokio::test]
async fn unknown_provider_returns_not_found() {
    let (server, _stores) = test_server();
    // Seed providers so the miss is a genuine unknown id, not an empty table.
    server.get("/api/providers").await.assert_status_ok();

    let response = server
        .get(&format!("/api/providers/{}/slots", uuid::Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_a_slot_then_rebooking_it_conflicts() {
    let (server, _stores) = test_server();
    let provider = first_provider(&server).await;
    let provider_id = provider["id"].as_str().unwrap().to_string();

    let availability: Value = server
        .get(&format!("/api/providers/{provider_id}/slots"))
        .await
        .json();
    let slot_id = availability["days"][0]["slots"][0]["slot_id"]
        .as_str()
        .unwrap()
        .to_string();

    let created = server
        .post("/api/bookings")
        .json(&json!({
            "user_id": "user-1",
            "provider_id": provider_id,
            "slot_id": slot_id,
            "session_kind": "video",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["status"], "booked");
    assert_eq!(body["session_kind"], "video");
    assert_eq!(body["provider_name"], provider["name"]);

    // Same slot, different user: the claim must lose.
    let conflict = server
        .post("/api/bookings")
        .json(&json!({
            "user_id": "user-2",
            "provider_id": provider_id,
            "slot_id": slot_id,
            "session_kind": "video",
        }))
        .await;
    conflict.assert_status(StatusCode::CONFLICT);
    let body: Value = conflict.json();
    assert_eq!(body["code"], "SLOT_UNAVAILABLE");

    // The booked slot no longer shows up as available.
    let after: Value = server
        .get(&format!("/api/providers/{provider_id}/slots"))
        .await
        .json();
    let total: usize = after["days"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["slots"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 20);
}

#[tokio::test]
async fn invalid_session_kind_falls_back_to_video() {
    let (server, _stores) = test_server();
    let provider = first_provider(&server).await;
    let provider_id = provider["id"].as_str().unwrap().to_string();

    let availability: Value = server
        .get(&format!("/api/providers/{provider_id}/slots"))
        .await
        .json();
    let slot_id = availability["days"][0]["slots"][0]["slot_id"].as_str().unwrap();

    let created = server
        .post("/api/bookings")
        .json(&json!({
            "user_id": "user-1",
            "provider_id": provider_id,
            "slot_id": slot_id,
            "session_kind": "hologram",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["session_kind"], "video");
}

#[tokio::test]
async fn empty_user_id_is_rejected() {
    let (server, _stores) = test_server();
    let provider = first_provider(&server).await;
    let provider_id = provider["id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/bookings")
        .json(&json!({
            "user_id": "   ",
            "provider_id": provider_id,
            "slot_id": uuid::Uuid::new_v4(),
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn booking_list_reflects_created_bookings() {
    let (server, _stores) = test_server();
    let provider = first_provider(&server).await;
    let provider_id = provider["id"].as_str().unwrap().to_string();

    let availability: Value = server
        .get(&format!("/api/providers/{provider_id}/slots"))
        .await
        .json();
    let slots = availability["days"][0]["slots"].as_array().unwrap();
    for slot in slots.iter().take(2) {
        server
            .post("/api/bookings")
            .json(&json!({
                "user_id": "user-1",
                "provider_id": provider_id,
                "slot_id": slot["slot_id"],
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let listed = server.get("/api/bookings").add_query_param("user_id", "user-1").await;
    listed.assert_status_ok();
    let body: Value = listed.json();
    assert_eq!(body["total"], 2);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert!(bookings
        .iter()
        .all(|b| b["provider_name"] == provider["name"] && b["status"] == "booked"));

    let empty: Value = server
        .get("/api/bookings")
        .add_query_param("user_id", "user-9")
        .await
        .json();
    assert_eq!(empty["total"], 0);
}

#[tokio::test]
async fn responses_echo_a_request_id() {
    let (server, _stores) = test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().get("X-Request-ID").is_some());
}
