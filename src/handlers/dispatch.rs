//! 룸 태스크
//!
//! 모든 소켓의 이벤트를 하나의 큐로 받아 순서대로 처리한다.

use super::game::GameEngine;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::ConnectionId;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// 룸 태스크 입력 이벤트
#[derive(Debug)]
pub enum RoomEvent {
    Connected {
        conn_id: ConnectionId,
        sender: UnboundedSender<ServerMessage>,
    },
    Message {
        conn_id: ConnectionId,
        message: ClientMessage,
    },
    Disconnected {
        conn_id: ConnectionId,
    },
}

/// 큐가 닫힐 때까지 이벤트 처리
pub async fn run_room(mut engine: GameEngine, mut events: UnboundedReceiver<RoomEvent>) {
    tracing::info!("Room task started");

    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::Connected { conn_id, sender } => engine.handle_connection(conn_id, sender),
            RoomEvent::Message { conn_id, message } => {
                tracing::debug!(connection = %conn_id, command = ?message.command(), "Received message");
                engine.handle_message(conn_id, message);
            }
            RoomEvent::Disconnected { conn_id } => engine.handle_disconnect(conn_id),
        }
    }

    tracing::info!("Room task stopped");
}
