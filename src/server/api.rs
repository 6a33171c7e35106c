//! Handlers for `/tarot/draw` and `/chat`.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::AppState;
use crate::llm::ChatRequest;
use crate::tarot::Spread;

// ── Request types ─────────────────────────────────────────────────────────────

/// Both fields stay raw strings: `count` is only meaningful for the single
/// spread and is validated there.
#[derive(Deserialize)]
pub(super) struct DrawQuery {
    count: Option<String>,
    spread: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `{"detail": msg}` with the given status.
pub(super) fn json_detail(status: StatusCode, msg: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "detail": format!("{msg}") }))).into_response()
}

/// Card count for the single spread. Absent or blank means 1; negative
/// values map to 0 so the engine reports the range error.
fn parse_count(raw: Option<&str>) -> Result<usize, String> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(1);
    }
    raw.parse::<i64>()
        .map(|n| usize::try_from(n).unwrap_or(0))
        .map_err(|_| format!("count must be an integer, got '{raw}'"))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /tarot/draw?count=&spread=
pub(super) async fn tarot_draw(
    State(state): State<AppState>,
    query: Result<Query<DrawQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => {
            warn!("tarot draw query rejected: {e}");
            return json_detail(StatusCode::BAD_REQUEST, e.body_text());
        }
    };

    let spread = query.spread.unwrap_or_else(|| "single".to_string());
    let count = match spread.parse::<Spread>() {
        Ok(Spread::Single) => match parse_count(query.count.as_deref()) {
            Ok(n) => n,
            Err(msg) => {
                warn!(%spread, "tarot draw rejected: {msg}");
                return json_detail(StatusCode::BAD_REQUEST, msg);
            }
        },
        // Fixed layouts ignore count; unknown names fail in the engine.
        _ => 0,
    };

    let drawn = {
        let mut rng = rand::thread_rng();
        state.engine.draw_spread(&spread, count, &mut rng)
    };

    match drawn {
        Ok(cards) => {
            debug!(%spread, cards = cards.len(), "tarot draw");
            Json(json!({
                "spread": spread,
                "count": cards.len(),
                "cards": cards,
            }))
            .into_response()
        }
        Err(e) => {
            warn!(%spread, count, "tarot draw rejected: {e}");
            json_detail(StatusCode::BAD_REQUEST, e)
        }
    }
}

/// POST /chat
///
/// Streams one SSE `data:` frame per event until `stream_end`. Once the body
/// has started the status is always 200; failures arrive as a
/// `completed_message`.
pub(super) async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let Some(relay) = state.relay.as_ref() else {
        warn!("chat requested but no completion provider is configured");
        return json_detail(StatusCode::SERVICE_UNAVAILABLE, "Chat client not initialized");
    };

    let events = relay
        .relay(request)
        .map(|event| Event::default().json_data(&event));

    (
        [(header::CONNECTION, "keep-alive")],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_defaults_to_one_when_absent_or_blank() {
        assert_eq!(parse_count(None), Ok(1));
        assert_eq!(parse_count(Some("")), Ok(1));
        assert_eq!(parse_count(Some("  ")), Ok(1));
    }

    #[test]
    fn count_parses_and_clamps_negative_to_zero() {
        assert_eq!(parse_count(Some("5")), Ok(5));
        assert_eq!(parse_count(Some("-2")), Ok(0));
    }

    #[test]
    fn non_integer_count_is_an_error() {
        assert_eq!(
            parse_count(Some("abc")),
            Err("count must be an integer, got 'abc'".to_string())
        );
        assert!(parse_count(Some("2.5")).is_err());
    }
}
