//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use classhub_core::error::AppError;
use classhub_realtime::connection::heartbeat::run_heartbeat;
use classhub_service::RequestContext;

use crate::error::ApiError;
use crate::extractors::auth::{TokenQuery, authenticate};
use crate::state::AppState;

/// GET /ws?token=<jwt>
///
/// The token is verified before the upgrade; an unauthenticated request
/// never becomes a socket.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .ok_or_else(|| AppError::unauthorized("Missing token query parameter"))?;
    let ctx = authenticate(&state.jwt_decoder, &token)?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(socket, state, ctx)))
}

/// Drive one WebSocket connection until either side goes away or the
/// heartbeat gives up on it.
async fn handle_ws_connection(socket: WebSocket, state: AppState, ctx: RequestContext) {
    let engine = state.realtime.clone();
    let (handle, mut outbound) = engine.register(ctx);
    let conn_id = handle.id;
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Outbound: engine -> socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Inbound: socket -> engine, one frame at a time so a connection's
    // events are handled in arrival order.
    let inbound_engine = engine.clone();
    let inbound_handle = Arc::clone(&handle);
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_rx.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    inbound_engine.handle_inbound(&conn_id, text.as_str()).await;
                }
                Ok(Message::Pong(_)) => inbound_handle.record_pong().await,
                Ok(Message::Close(_)) => break,
                Ok(Message::Binary(_)) => {
                    debug!(conn_id = %conn_id, "Ignoring binary frame");
                }
                Ok(Message::Ping(_)) => {}
                Err(e) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                    break;
                }
            }
        }
    });

    let mut heartbeat = tokio::spawn(run_heartbeat(
        Arc::clone(&handle),
        engine.heartbeat_config(),
        engine.metrics(),
    ));

    tokio::select! {
        _ = &mut send_task => {}
        _ = &mut recv_task => {}
        _ = &mut heartbeat => {
            info!(conn_id = %conn_id, "Closing connection after heartbeat timeout");
        }
    }
    send_task.abort();
    recv_task.abort();
    heartbeat.abort();

    engine.unregister(&conn_id);
}
