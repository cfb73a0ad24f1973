//! SignalR connection negotiation.
//!
//! Hands a subscribing client its channel URL and a short-lived access
//! token, optionally bound to the client's author token so user-targeted
//! sends reach that connection.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::domains::questions::error::ErrorResponse;
use crate::server::app::AxumAppState;

#[derive(Debug, Deserialize)]
pub struct NegotiateQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// GET|POST /api/negotiate?userId=...
pub async fn negotiate(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<NegotiateQuery>,
) -> Response {
    match state.signalr.negotiate(query.user_id.as_deref()) {
        Ok(info) => Json(info).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Negotiate failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    reason: None,
                }),
            )
                .into_response()
        }
    }
}
