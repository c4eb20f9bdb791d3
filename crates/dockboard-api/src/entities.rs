//! Handlers for the reference-entity endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/drivers` etc. | Optional `?status=active\|inactive\|maintenance\|retired` |
//! | `POST` | `/drivers` etc. | Body: the entity's `New*` input |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use dockboard_core::{
  entity::{
    Driver, EntityStatus, Loader, NewDriver, NewLoader, NewRoute, NewTrailer,
    NewTruck, Route, Trailer, Truck,
  },
  store::ScheduleStore,
};
use serde::Deserialize;

use crate::error::{ApiError, store_err};

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
  pub status: Option<EntityStatus>,
}

macro_rules! entity_handlers {
  ($list:ident, $create:ident, $list_method:ident, $add_method:ident, $entity:ty, $input:ty) => {
    pub async fn $list<S>(
      State(store): State<Arc<S>>,
      Query(filter): Query<StatusFilter>,
    ) -> Result<Json<Vec<$entity>>, ApiError>
    where
      S: ScheduleStore,
      S::Error: Into<dockboard_core::Error>,
    {
      let rows = store.$list_method(filter.status).await.map_err(store_err)?;
      Ok(Json(rows))
    }

    pub async fn $create<S>(
      State(store): State<Arc<S>>,
      Json(body): Json<$input>,
    ) -> Result<impl IntoResponse, ApiError>
    where
      S: ScheduleStore,
      S::Error: Into<dockboard_core::Error>,
    {
      let row = store.$add_method(body).await.map_err(store_err)?;
      Ok((StatusCode::CREATED, Json(row)))
    }
  };
}

entity_handlers!(list_drivers, create_driver, list_drivers, add_driver, Driver, NewDriver);
entity_handlers!(list_trucks, create_truck, list_trucks, add_truck, Truck, NewTruck);
entity_handlers!(list_trailers, create_trailer, list_trailers, add_trailer, Trailer, NewTrailer);
entity_handlers!(list_loaders, create_loader, list_loaders, add_loader, Loader, NewLoader);
entity_handlers!(list_routes, create_route, list_routes, add_route, Route, NewRoute);
