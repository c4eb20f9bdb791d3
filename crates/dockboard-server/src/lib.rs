//! HTTP server assembly for dockboard.
//!
//! Exposes the JSON API from `dockboard-api` under `/api`, gated by HTTP
//! Basic auth, with request tracing on every route.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, middleware, routing::get};
use dockboard_core::store::ScheduleStore;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server.
#[derive(Clone)]
pub struct AppState<S: ScheduleStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full server router: `/healthz` open, `/api/*` Basic-auth gated.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ScheduleStore + Clone + 'static,
  S::Error: Into<dockboard_core::Error>,
{
  let api = dockboard_api::api_router(state.store.clone()).route_layer(
    middleware::from_fn_with_state(state.auth.clone(), auth::require_auth),
  );

  Router::new()
    .route("/healthz", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
  Json(json!({ "status": "ok" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use dockboard_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:               "127.0.0.1".to_string(),
        port:               8080,
        store_path:         PathBuf::from(":memory:"),
        auth_username:      "user".to_string(),
        auth_password_hash: hash.clone(),
      }),
      auth: Arc::new(AuthConfig {
        username:      "user".to_string(),
        password_hash: hash,
      }),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn request(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let auth = auth_header("user", "secret");
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, auth);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  // ── Auth boundary ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn healthz_is_open() {
    let state = make_state("secret").await;
    let resp = router(state)
      .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_requires_auth() {
    let state = make_state("secret").await;
    let resp = router(state)
      .oneshot(
        Request::builder()
          .uri("/api/drivers")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  // ── End-to-end lifecycle ───────────────────────────────────────────────────

  // 2024-01-15 is a Monday.
  const MONDAY: &str = "2024-01-15";

  async fn seed(state: &AppState<SqliteStore>) -> (Value, Value, Value, Value, Value) {
    let driver = request(
      state.clone(),
      "POST",
      "/api/drivers",
      Some(json!({"name": "J. Smith"})),
    )
    .await
    .1;
    let truck = request(
      state.clone(),
      "POST",
      "/api/trucks",
      Some(json!({"number": "88"})),
    )
    .await
    .1;
    let trailer = request(
      state.clone(),
      "POST",
      "/api/trailers",
      Some(json!({"number": "1027"})),
    )
    .await
    .1;
    let route = request(
      state.clone(),
      "POST",
      "/api/routes",
      Some(json!({"code": "R12"})),
    )
    .await
    .1;
    let loader = request(
      state.clone(),
      "POST",
      "/api/loaders",
      Some(json!({"name": "Pat Doe"})),
    )
    .await
    .1;
    (driver, truck, trailer, route, loader)
  }

  #[tokio::test]
  async fn template_edit_promotes_and_finalize_flows_to_loading_board() {
    let state = make_state("secret").await;
    let (driver, truck, trailer, route, loader) = seed(&state).await;

    // Template row for Mondays.
    let (status, template) = request(
      state.clone(),
      "POST",
      "/api/templates",
      Some(json!({
        "day_of_week": 1,
        "route_id": route["route_id"],
        "driver_id": driver["driver_id"],
        "truck_id": truck["truck_id"],
        "trailer_id": trailer["trailer_id"],
        "dispatch_time": "05:30:00",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // The Monday resolves virtual, showing the template row.
    let (status, day) =
      request(state.clone(), "GET", &format!("/api/days/{MONDAY}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["materialized"], json!(false));
    assert_eq!(day["rows"].as_array().unwrap().len(), 1);
    assert_eq!(day["rows"][0]["source"], json!("template"));
    assert_eq!(day["rows"][0]["route_code"], json!("R12"));
    assert_eq!(day["rows"][0]["dispatch_display"], json!("5:30am"));
    assert_eq!(day["rows"][0]["equipment"], json!("88-1027"));

    // Editing the backhaul promotes the day; the edit lands on the promoted
    // row and the template is untouched.
    let template_id = template["template_id"].as_str().unwrap();
    let (status, edited) = request(
      state.clone(),
      "PATCH",
      &format!("/api/days/{MONDAY}/rows/{template_id}"),
      Some(json!({"source": "template", "backhaul": "Acme Corp"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["backhaul"], json!("Acme Corp"));
    assert_eq!(edited["planning_status"], json!("draft"));
    assert_eq!(edited["modified_from_template"], json!(true));

    let (_, day) =
      request(state.clone(), "GET", &format!("/api/days/{MONDAY}"), None).await;
    assert_eq!(day["materialized"], json!(true));
    assert_eq!(day["rows"][0]["source"], json!("assignment"));
    assert_eq!(day["rows"][0]["backhaul"], json!("Acme Corp"));

    let (_, templates) =
      request(state.clone(), "GET", "/api/templates?day=1", None).await;
    assert_eq!(templates[0]["backhaul"], Value::Null);

    // Finalize, then the loading board picks the route up.
    let (status, day) = request(
      state.clone(),
      "POST",
      &format!("/api/days/{MONDAY}/finalize"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["finalized"], json!(true));

    let (status, board) =
      request(state.clone(), "GET", &format!("/api/loading/{MONDAY}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["progress"]["total"], json!(1));
    assert_eq!(board["entries"][0]["route_code"], json!("R12"));
    assert_eq!(board["entries"][0]["loading_status"], json!("not_started"));

    // First crew member flips loading status to in-progress.
    let assignment_id = edited["assignment_id"].as_str().unwrap();
    let (status, _) = request(
      state.clone(),
      "POST",
      &format!("/api/assignments/{assignment_id}/crew"),
      Some(json!({"loader_id": loader["loader_id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, board) =
      request(state.clone(), "GET", &format!("/api/loading/{MONDAY}"), None).await;
    assert_eq!(board["entries"][0]["loading_status"], json!("in_progress"));
    assert_eq!(board["entries"][0]["crew"][0]["name"], json!("Pat Doe"));
  }

  #[tokio::test]
  async fn finalize_empty_day_is_unprocessable() {
    let state = make_state("secret").await;
    let (status, body) = request(
      state.clone(),
      "POST",
      &format!("/api/days/{MONDAY}/finalize"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("finalize"));
  }

  #[tokio::test]
  async fn reset_is_refused_while_finalized() {
    let state = make_state("secret").await;
    seed(&state).await;
    request(
      state.clone(),
      "POST",
      "/api/templates",
      Some(json!({"day_of_week": 1})),
    )
    .await;
    request(state.clone(), "POST", &format!("/api/days/{MONDAY}/finalize"), None).await;

    let (status, _) = request(
      state.clone(),
      "POST",
      &format!("/api/days/{MONDAY}/reset"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unfinalize, then the reset goes through and the day is virtual again.
    request(
      state.clone(),
      "POST",
      &format!("/api/days/{MONDAY}/unfinalize"),
      None,
    )
    .await;
    let (status, body) = request(
      state.clone(),
      "POST",
      &format!("/api/days/{MONDAY}/reset"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], json!(1));

    let (_, day) =
      request(state.clone(), "GET", &format!("/api/days/{MONDAY}"), None).await;
    assert_eq!(day["materialized"], json!(false));
  }

  #[tokio::test]
  async fn dock_view_tracks_door_assignment_and_departure() {
    let state = make_state("secret").await;
    let (_, _, trailer, _, _) = seed(&state).await;

    request(
      state.clone(),
      "POST",
      "/api/templates",
      Some(json!({"day_of_week": 1, "trailer_id": trailer["trailer_id"]})),
    )
    .await;
    let (_, day) = request(
      state.clone(),
      "POST",
      &format!("/api/days/{MONDAY}/finalize"),
      None,
    )
    .await;
    let assignment_id = day["rows"][0]["id"].clone();

    // The trailer starts in the unassigned pool.
    let (_, dock) =
      request(state.clone(), "GET", &format!("/api/doors/{MONDAY}"), None).await;
    assert_eq!(dock["occupied"], json!(0));
    assert_eq!(dock["unassigned"].as_array().unwrap().len(), 1);

    // Assign it to door 7.
    let (status, door) = request(
      state.clone(),
      "POST",
      &format!("/api/doors/{MONDAY}"),
      Some(json!({
        "door_number": 7,
        "trailer_id": trailer["trailer_id"],
        "daily_assignment_id": assignment_id,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(door["move_status"], json!("at_door"));

    let (_, dock) =
      request(state.clone(), "GET", &format!("/api/doors/{MONDAY}"), None).await;
    assert_eq!(dock["occupied"], json!(1));
    assert!(dock["unassigned"].as_array().unwrap().is_empty());
    let slot = dock["doors"]
      .as_array()
      .unwrap()
      .iter()
      .find(|s| s["door_number"] == json!(7))
      .unwrap();
    assert_eq!(slot["occupant"]["trailer_number"], json!("1027"));

    // A second trailer on the same door conflicts.
    let (status, _) = request(
      state.clone(),
      "POST",
      &format!("/api/doors/{MONDAY}"),
      Some(json!({
        "door_number": 7,
        "trailer_id": trailer["trailer_id"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Departure retires the record and frees the door.
    let door_id = door["door_id"].as_str().unwrap();
    let (status, departed) = request(
      state.clone(),
      "PUT",
      &format!("/api/door-assignments/{door_id}/move-status"),
      Some(json!({"status": "departed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!departed["removed_at"].is_null());

    let (_, dock) =
      request(state.clone(), "GET", &format!("/api/doors/{MONDAY}"), None).await;
    assert_eq!(dock["occupied"], json!(0));
  }

  #[tokio::test]
  async fn storage_trailer_pins_to_its_door() {
    let state = make_state("secret").await;
    request(
      state.clone(),
      "POST",
      "/api/trailers",
      Some(json!({"number": "1007"})),
    )
    .await;

    let (status, door) = request(
      state.clone(),
      "POST",
      &format!("/api/doors/{MONDAY}/storage"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(door["door_number"], json!(4));
    assert_eq!(door["daily_assignment_id"], Value::Null);

    let (_, dock) =
      request(state.clone(), "GET", &format!("/api/doors/{MONDAY}"), None).await;
    let slot = dock["doors"]
      .as_array()
      .unwrap()
      .iter()
      .find(|s| s["door_number"] == json!(4))
      .unwrap();
    assert_eq!(slot["occupant"]["storage"], json!(true));
  }

  #[tokio::test]
  async fn planning_grid_rolls_friday_into_monday() {
    let state = make_state("secret").await;
    let (status, grid) = request(
      state.clone(),
      "GET",
      "/api/planning/workweeks?weeks=2&from=2024-01-17",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let weeks = grid.as_array().unwrap();
    assert_eq!(weeks.len(), 2);
    let friday = &weeks[0]["days"][4];
    assert_eq!(friday["date"], json!("2024-01-19"));
    assert_eq!(friday["delivery_date"], json!("2024-01-22"));
  }
}
