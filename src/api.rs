// src/api.rs
//
// Read-only HTTP surface for frontends. The status endpoint never reports
// pipeline trouble: it answers 200 with whatever the store last published,
// a fixed-length string of '0'/'1' in slot order. The config endpoint
// serves the layout document verbatim so clients know where to draw boxes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::layout::SlotLayout;
use crate::store::StatusReader;

#[derive(Clone)]
pub struct ApiState {
    pub layout: Arc<SlotLayout>,
    pub reader: StatusReader,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub lot_id: String,
    pub status_string: String,
}

pub fn router(state: ApiState) -> Router {
    // Frontends load from arbitrary origins (LAN hosts, tunnels, file://).
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/config", get(get_config))
        .layer(cors)
        .with_state(state)
}

async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let snapshot = state.reader.read();
    Json(StatusResponse {
        lot_id: state.layout.lot_id.clone(),
        status_string: snapshot.status_string(),
    })
}

async fn get_config(State(state): State<ApiState>) -> Json<SlotLayout> {
    Json(state.layout.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ImageDimensions, Slot, SlotRect};
    use crate::store::StatusStore;
    use crate::types::OccupancySnapshot;

    fn state() -> (ApiState, StatusStore) {
        let slot = |id: u32, x: f64| Slot {
            id,
            label: format!("Slot_{id}"),
            kind: "car".to_string(),
            coordinates: SlotRect {
                x,
                y: 0.0,
                w: 10.0,
                h: 10.0,
            },
        };
        let layout = Arc::new(
            SlotLayout::new(
                "st_thomas_main",
                "St. Thomas College Main Ground",
                ImageDimensions {
                    width: 1280,
                    height: 720,
                },
                vec![slot(0, 0.0), slot(1, 20.0)],
            )
            .unwrap(),
        );
        let (store, reader) = StatusStore::new(layout.len());
        (ApiState { layout, reader }, store)
    }

    #[tokio::test]
    async fn status_endpoint_reports_the_published_string() {
        let (state, store) = state();

        let before = get_status(State(state.clone())).await.0;
        assert_eq!(before.lot_id, "st_thomas_main");
        assert_eq!(before.status_string, "00");

        store.publish(OccupancySnapshot::from_flags(vec![true, false]));
        let after = get_status(State(state)).await.0;
        assert_eq!(after.status_string, "10");
    }

    #[tokio::test]
    async fn config_endpoint_serves_the_layout_verbatim() {
        let (state, _store) = state();
        let layout = get_config(State(state.clone())).await.0;
        assert_eq!(layout, *state.layout);

        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["lot_id"], "st_thomas_main");
        assert_eq!(json["slots"][1]["coordinates"]["x"], 20.0);
    }
}
