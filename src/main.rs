//! Sketch Party 룸 서버

mod config;
mod error;
mod handlers;
mod protocol;
mod room;
mod state;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::HeaderValue,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use config::Config;
use futures::{SinkExt, StreamExt};
use handlers::{GameEngine, RoomEvent};
use protocol::{ClientMessage, ServerMessage};
use state::{AppState, Registry};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 룸 태스크
    let registry = Arc::new(Registry::new());
    let engine = GameEngine::new(&config.room, registry.clone());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(handlers::run_room(engine, events_rx));

    let state = Arc::new(AppState::new(config.clone(), registry, events_tx));
    let app = app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("🎨 Sketch Party room server started");
    tracing::info!("Address: {}", addr);
    tracing::info!("WebSocket: ws://{}/ws", addr);
    tracing::info!(room_code = %config.room.code, max_players = config.room.max_players, "Room ready");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// 라우터 설정
fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS 설정 (목록이 비어 있으면 전체 허용)
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn index_handler() -> Html<&'static str> {
    Html("<h1>Sketch Party Room Server</h1><p>WebSocket endpoint: /ws</p>")
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": "sketchparty-server",
        "roomCode": state.config.room.code,
        "connections": state.registry.len(),
        "timestamp": std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn_id = Uuid::new_v4();

    // 연결 등록
    if state
        .events
        .send(RoomEvent::Connected { conn_id, sender: tx })
        .is_err()
    {
        tracing::error!(connection = %conn_id, "Room task unavailable, closing socket");
        return;
    }

    // 송신 태스크
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to encode server message"),
            }
        }
    });

    // 수신 처리
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    if state
                        .events
                        .send(RoomEvent::Message { conn_id, message })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(connection = %conn_id, error = %e, "Malformed message dropped");
                }
            },
            Ok(Message::Binary(data)) => {
                tracing::debug!(connection = %conn_id, bytes = data.len(), "Binary frame dropped");
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!(connection = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
            _ => {}
        }
    }

    // 연결 해제
    let _ = state.events.send(RoomEvent::Disconnected { conn_id });
    send_task.abort();
}
