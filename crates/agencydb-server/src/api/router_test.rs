use std::sync::Arc;

use agencydb_core::{ApiKeyGrant, CurrentUser, InMemoryStore, Role};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::{build_app, default_rate_limit_state, AppState};
use crate::middleware::AuthState;

const ADMIN_TOKEN: &str = "admin-secret";
const AGENT_TOKEN: &str = "agent-secret";

fn open_app() -> Router {
    let auth = AuthState::from_grants(Vec::new(), true).expect("dev auth");
    build_app(
        AppState {
            store: Arc::new(InMemoryStore::new()),
        },
        auth,
        default_rate_limit_state(),
    )
}

fn keyed_app() -> Router {
    let grants = vec![
        ApiKeyGrant {
            token: ADMIN_TOKEN.to_string(),
            user: CurrentUser::new(Uuid::new_v4(), Role::Admin),
        },
        ApiKeyGrant {
            token: AGENT_TOKEN.to_string(),
            user: CurrentUser::new(Uuid::new_v4(), Role::Agent),
        },
    ];
    let auth = AuthState::from_grants(grants, false).expect("keyed auth");
    build_app(
        AppState {
            store: Arc::new(InMemoryStore::new()),
        },
        auth,
        default_rate_limit_state(),
    )
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json parse")
    };
    (status, json)
}

async fn create_proposal(app: &Router, name: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/v1/proposals",
        Some(json!({ "brand_name": name, "website": "www.acme.it" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["id"].as_str().expect("proposal id").to_string()
}

async fn create_creator(app: &Router, name: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/v1/creators",
        Some(json!({ "name": name })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["id"].as_str().expect("creator id").to_string()
}

// ---------------------------------------------------------------------------
// Health and auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public_and_reports_ok() {
    let (status, json) = send(&keyed_app(), "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn protected_routes_require_a_known_token() {
    let app = keyed_app();

    let (status, json) = send(&app, "GET", "/api/v1/proposals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/v1/proposals", None, Some("nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/v1/proposals", None, Some(AGENT_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn agents_are_refused_on_admin_endpoints() {
    let app = keyed_app();
    for uri in [
        "/api/v1/revenue",
        "/api/v1/revenue/discrepancies",
        "/api/v1/revenue/monthly-totals",
        "/api/v1/revenue/top-creators",
        "/api/v1/payments",
        "/api/v1/payments/stats?month=2024-03",
    ] {
        let (status, json) = send(&app, "GET", uri, None, Some(AGENT_TOKEN)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(json["error"]["code"], "forbidden", "{uri}");

        let (status, _) = send(&app, "GET", uri, None, Some(ADMIN_TOKEN)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn proposal_moves_then_converts_once() {
    let app = open_app();
    let id = create_proposal(&app, "Acme").await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/v1/proposals/{id}/stage"),
        Some(json!({ "stage": "WON" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["result"], "moved");
    assert_eq!(json["data"]["from"], "TO_CONTACT");
    assert_eq!(json["data"]["proposal"]["stage"], "WON");

    let (status, first) = send(
        &app,
        "POST",
        &format!("/api/v1/proposals/{id}/convert"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["result"], "created");
    assert_eq!(first["data"]["brand"]["origin_proposal_id"], id.as_str());

    let (status, second) = send(
        &app,
        "POST",
        &format!("/api/v1/proposals/{id}/convert"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["result"], "already_exists");
    assert_eq!(second["data"]["brand"]["id"], first["data"]["brand"]["id"]);

    let (_, brands) = send(&app, "GET", "/api/v1/brands?name=Acme", None, None).await;
    assert_eq!(brands["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn board_and_stats_group_by_stage() {
    let app = open_app();
    let won = create_proposal(&app, "Acme").await;
    create_proposal(&app, "Globex").await;
    send(
        &app,
        "POST",
        &format!("/api/v1/proposals/{won}/stage"),
        Some(json!({ "stage": "WON" })),
        None,
    )
    .await;

    let (status, stats) = send(&app, "GET", "/api/v1/proposals/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["total"], 2);
    assert_eq!(stats["data"]["by_stage"]["WON"], 1);
    assert_eq!(stats["data"]["by_stage"]["TO_CONTACT"], 1);
    assert_eq!(stats["data"]["by_stage"]["LOST"], 0);

    let (status, board) = send(&app, "GET", "/api/v1/proposals/board", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["data"]["columns"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn unknown_proposal_is_not_found() {
    let app = open_app();
    let id = Uuid::new_v4();

    for (method, uri, body) in [
        ("GET", format!("/api/v1/proposals/{id}"), None),
        (
            "POST",
            format!("/api/v1/proposals/{id}/stage"),
            Some(json!({ "stage": "LOST" })),
        ),
        ("POST", format!("/api/v1/proposals/{id}/convert"), None),
        ("DELETE", format!("/api/v1/proposals/{id}"), None),
    ] {
        let (status, json) = send(&app, method, &uri, body, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(json["error"]["code"], "not_found");
    }
}

#[tokio::test]
async fn invalid_proposal_input_is_rejected() {
    let app = open_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/proposals",
        Some(json!({ "brand_name": "   " })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/proposals",
        Some(json!({ "brand_name": "Acme", "website": "ftp://acme.it" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Collaborations and revenue
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_paid_collaboration_creates_its_revenue_row() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/collaborations",
        Some(json!({
            "creator_id": creator,
            "brand_name": "Acme",
            "status": "COMPLETED",
            "is_paid": true,
            "payment_amount": "500",
            "contract_signed_date": "2024-03-15",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["revenue_sync"]["status"], "synced");
    assert_eq!(json["data"]["revenue_sync"]["result"]["outcome"], "created");

    let (_, revenue) = send(
        &app,
        "GET",
        &format!("/api/v1/revenue?creator_id={creator}"),
        None,
        None,
    )
    .await;
    let rows = revenue["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["month"], "2024-03");
    assert_eq!(rows[0]["amount"], "500");
}

#[tokio::test]
async fn missing_signing_date_keeps_the_collaboration() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/collaborations",
        Some(json!({
            "creator_id": creator,
            "brand_name": "Acme",
            "status": "COMPLETED",
            "is_paid": true,
            "payment_amount": "500",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["revenue_sync"]["status"], "failed");
    assert_eq!(json["data"]["revenue_sync"]["code"], "unprocessable");

    let id = json["data"]["collaboration"]["id"]
        .as_str()
        .expect("collaboration id");
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/collaborations/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn manual_and_synced_rows_show_up_as_discrepancy() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;

    send(
        &app,
        "POST",
        "/api/v1/collaborations",
        Some(json!({
            "creator_id": creator,
            "brand_name": "Acme",
            "status": "COMPLETED",
            "is_paid": true,
            "payment_amount": "300",
            "contract_signed_date": "2024-03-20",
        })),
        None,
    )
    .await;

    for amount in ["150", "200"] {
        let (status, json) = send(
            &app,
            "PUT",
            "/api/v1/revenue",
            Some(json!({ "creator_id": creator, "month": "2024-03", "amount": amount })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
    }

    let (status, json) = send(&app, "GET", "/api/v1/revenue/discrepancies", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let found = json["data"].as_array().expect("discrepancies");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["month"], "2024-03");
    assert_eq!(found[0]["auto_total"], "300");
    assert_eq!(found[0]["manual_total"], "200");

    let (_, totals) = send(
        &app,
        "GET",
        "/api/v1/revenue/monthly-totals?months=2&until=2024-03",
        None,
        None,
    )
    .await;
    let months = totals["data"]["months"].as_array().expect("months");
    assert_eq!(months.len(), 2);
    assert_eq!(totals["data"]["previous_month"], "2024-02");
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verifying_a_payment_twice_restores_the_flag() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/payments",
        Some(json!({
            "creator_id": creator,
            "month": "2024-03",
            "amount_paid": "1200",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let id = json["data"]["id"].as_str().expect("payment id").to_string();

    let uri = format!("/api/v1/payments/{id}/verify");
    let (_, first) = send(&app, "POST", &uri, None, None).await;
    assert_eq!(first["data"]["verified"], true);
    let (_, second) = send(&app, "POST", &uri, None, None).await;
    assert_eq!(second["data"]["verified"], false);

    let (status, stats) = send(
        &app,
        "GET",
        "/api/v1/payments/stats?month=2024-03",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["total"], 1);
    assert_eq!(stats["data"]["to_verify"], 1);
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_crud_round_trip() {
    let app = open_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/creators",
        Some(json!({
            "name": "  Giulia  ",
            "full_name": "Giulia Rossi",
            "tier": "MICRO",
            "commission_pct": "20",
            "email": "giulia@example.it",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["name"], "Giulia");
    let id = json["data"]["id"].as_str().expect("creator id").to_string();
    create_creator(&app, "Marco").await;

    let (_, found) = send(&app, "GET", "/api/v1/creators?search=ROSSI", None, None).await;
    let found = found["data"].as_array().expect("creators");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], id.as_str());

    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/api/v1/creators/{id}"),
        Some(json!({ "tier": null, "notes": "prefers gaming brands" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert!(json["data"]["tier"].is_null());
    assert_eq!(json["data"]["notes"], "prefers gaming brands");
    assert_eq!(json["data"]["full_name"], "Giulia Rossi");

    let uri = format!("/api/v1/creators/{id}");
    let (status, _) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_creator_input_is_rejected() {
    let app = open_app();
    for body in [
        json!({ "name": " " }),
        json!({ "name": "Giulia", "commission_pct": "150" }),
        json!({ "name": "Giulia", "email": "not-an-address" }),
        json!({
            "name": "Giulia",
            "collaboration_start": "2024-06-01",
            "contract_end": "2024-01-01",
        }),
    ] {
        let (status, json) = send(&app, "POST", "/api/v1/creators", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");
        assert_eq!(json["error"]["code"], "validation_error");
    }
}

#[tokio::test]
async fn records_for_unknown_creators_are_rejected() {
    let app = open_app();
    let stranger = Uuid::new_v4();

    for (uri, body) in [
        (
            "/api/v1/collaborations",
            json!({ "creator_id": stranger, "brand_name": "Acme" }),
        ),
        (
            "/api/v1/payments",
            json!({ "creator_id": stranger, "month": "2024-03", "amount_paid": "100" }),
        ),
    ] {
        let (status, json) = send(&app, "POST", uri, Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {json}");
    }
}

#[tokio::test]
async fn creator_with_collaborations_cannot_be_deleted() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/collaborations",
        Some(json!({ "creator_id": creator, "brand_name": "Acme" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &app,
        "DELETE",
        &format!("/api/v1/creators/{creator}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");
}

#[tokio::test]
async fn only_admins_delete_creators() {
    let app = keyed_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/creators",
        Some(json!({ "name": "Giulia" })),
        Some(AGENT_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!(
        "/api/v1/creators/{}",
        json["data"]["id"].as_str().expect("creator id")
    );

    let (status, _) = send(&app, "DELETE", &uri, None, Some(AGENT_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &uri, None, Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn platform_fees_are_checked_against_the_catalog() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;
    let uri = format!("/api/v1/creators/{creator}/platforms");

    let (status, json) = send(
        &app,
        "PUT",
        &uri,
        Some(json!([{ "platform": "YouTube", "fees": { "stories": "100" } }])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    let (status, json) = send(
        &app,
        "PUT",
        &uri,
        Some(json!([
            { "platform": "Instagram", "tier": "MID", "fees": { "stories": "150", "post_reel": "400" } },
            { "platform": "Kick", "fees": { "fee": "90" } },
        ])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"].as_array().map(Vec::len), Some(2));

    let (status, json) = send(
        &app,
        "PUT",
        &uri,
        Some(json!([{ "platform": "TikTok", "fees": { "video": "80" } }])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");

    let (_, listed) = send(&app, "GET", &uri, None, None).await;
    let listed = listed["data"].as_array().expect("platforms");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["platform"], "TikTok");
    assert_eq!(listed[0]["fees"]["video"], "80");

    let (status, catalog) = send(&app, "GET", "/api/v1/platforms", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog["data"]["platforms"].as_array().map(Vec::len), Some(4));
    assert_eq!(catalog["data"]["other"][0]["key"], "fee");
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_roster_names_its_creators() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/events",
        Some(json!({
            "name": "Lucca Comics",
            "city": "Lucca",
            "start_date": "2024-10-30",
            "end_date": "2024-11-03",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let event = json["data"]["id"].as_str().expect("event id").to_string();

    let booking = json!({
        "creator_id": creator,
        "activities": ["SIGNING", "PANEL"],
        "fee": "300",
    });
    let uri = format!("/api/v1/events/{event}/participations");
    let (status, json) = send(&app, "POST", &uri, Some(booking.clone()), None).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let participation = json["data"]["id"].as_str().expect("participation id").to_string();

    let (status, json) = send(&app, "POST", &uri, Some(booking), None).await;
    assert_eq!(status, StatusCode::CONFLICT, "{json}");

    let (_, detail) = send(&app, "GET", &format!("/api/v1/events/{event}"), None, None).await;
    assert_eq!(detail["data"]["name"], "Lucca Comics");
    let roster = detail["data"]["participations"].as_array().expect("roster");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["creator_name"], "Giulia");
    assert_eq!(roster[0]["activities"], json!(["PANEL", "SIGNING"]));

    let (_, mine) = send(
        &app,
        "GET",
        &format!("/api/v1/creators/{creator}/events"),
        None,
        None,
    )
    .await;
    assert_eq!(mine["data"][0]["event"]["id"], event.as_str());

    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/api/v1/participations/{participation}"),
        Some(json!({ "fee": "-1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/api/v1/participations/{participation}"),
        Some(json!({ "activities": ["STAGE"], "fee": null })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["activities"], json!(["STAGE"]));
    assert!(json["data"]["fee"].is_null());

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/events/{event}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/participations/{participation}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn events_filter_by_city_and_last_day() {
    let app = open_app();
    for (name, city, start, end) in [
        ("Lucca Comics", "Lucca", "2024-10-30", Some("2024-11-03")),
        ("Romics", "Roma", "2024-04-04", None),
        ("Milan Games Week", "Milano", "2023-11-24", Some("2023-11-26")),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/events",
            Some(json!({ "name": name, "city": city, "start_date": start, "end_date": end })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&app, "GET", "/api/v1/events", None, None).await;
    let names: Vec<&str> = all["data"]
        .as_array()
        .expect("events")
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert_eq!(names, ["Lucca Comics", "Romics", "Milan Games Week"]);

    let (_, upcoming) = send(&app, "GET", "/api/v1/events?from=2024-11-01", None, None).await;
    assert_eq!(upcoming["data"].as_array().map(Vec::len), Some(1));

    let (_, roma) = send(&app, "GET", "/api/v1/events?city=Roma", None, None).await;
    assert_eq!(roma["data"][0]["name"], "Romics");
}

// ---------------------------------------------------------------------------
// Brand and collaboration edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn brands_can_be_patched_and_deleted() {
    let app = open_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/brands",
        Some(json!({ "name": "Acme" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let uri = format!(
        "/api/v1/brands/{}",
        json["data"]["id"].as_str().expect("brand id")
    );

    let (status, json) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "priority": "HIGH", "notes": "renewal in Q3" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["priority"], "HIGH");
    assert_eq!(json["data"]["notes"], "renewal in Q3");

    let (status, _) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_collaboration_drops_its_revenue_row() {
    let app = open_app();
    let creator = create_creator(&app, "Giulia").await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/collaborations",
        Some(json!({
            "creator_id": creator,
            "brand_name": "Acme",
            "status": "COMPLETED",
            "is_paid": true,
            "payment_amount": "500",
            "contract_signed_date": "2024-03-15",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let id = json["data"]["collaboration"]["id"]
        .as_str()
        .expect("collaboration id")
        .to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/collaborations/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, revenue) = send(
        &app,
        "GET",
        &format!("/api/v1/revenue?creator_id={creator}"),
        None,
        None,
    )
    .await;
    assert_eq!(revenue["data"].as_array().map(Vec::len), Some(0));
}
