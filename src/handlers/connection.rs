//! 연결 핸들러

use super::game::GameEngine;
use crate::protocol::ServerMessage;
use crate::state::{ConnectionId, Role};
use tokio::sync::mpsc::UnboundedSender;

impl GameEngine {
    /// 새 연결 등록 (역할 미지정)
    pub fn handle_connection(&mut self, conn_id: ConnectionId, sender: UnboundedSender<ServerMessage>) {
        self.registry.register(conn_id, sender);
        tracing::info!(
            connection = %conn_id,
            connections = self.registry.len(),
            "New connection established"
        );
    }

    /// 연결 해제 처리
    pub fn handle_disconnect(&mut self, conn_id: ConnectionId) {
        let Some(conn) = self.registry.remove(conn_id) else {
            return;
        };
        let connected_secs = conn.connected_at.elapsed().as_secs();

        match conn.role {
            Role::Player(player_id) => match self.room.remove_by_connection(conn_id) {
                Some(player) => {
                    tracing::info!(
                        player_id = %player_id,
                        name = %player.name,
                        remaining = self.room.players.len(),
                        "Player left"
                    );
                    self.publish_roster();
                }
                None => {
                    tracing::debug!(player_id = %player_id, "Unseated player channel closed");
                }
            },
            Role::Host => {
                // 단계는 다음 RESET_GAME 또는 호스트 재접속 때 정리된다
                self.room.release_host();
                tracing::warn!(
                    host = %conn_id,
                    phase = ?self.room.phase,
                    "Host disconnected, roster cleared"
                );
            }
            Role::Unassigned => {}
        }

        tracing::info!(connection = %conn_id, connected_secs = connected_secs, "Connection closed");
    }
}
