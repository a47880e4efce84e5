//! 브로드캐스트 라우터

use crate::protocol::ServerMessage;
use crate::room::Room;
use crate::state::{ConnectionId, Registry};

/// 호스트에게 전송. 호스트가 없거나 닫혀 있으면 건너뜀
pub fn to_host(registry: &Registry, message: ServerMessage) {
    match registry.host() {
        Some(host_id) => {
            if !registry.send_to(host_id, message) {
                tracing::debug!(host = %host_id, "Host channel not open, message skipped");
            }
        }
        None => tracing::debug!("No host connected, message skipped"),
    }
}

/// 착석한 모든 플레이어에게 전송, 전달된 수 반환
pub fn to_players(registry: &Registry, room: &Room, message: ServerMessage) -> usize {
    let mut delivered = 0;
    for player in &room.players {
        if registry.send_to(player.connection, message.clone()) {
            delivered += 1;
        } else {
            tracing::debug!(player_id = %player.id, name = %player.name, "Player channel not open");
        }
    }
    delivered
}

/// 미지정 채널까지 포함한 모든 연결에 전송
pub fn to_everyone(registry: &Registry, message: ServerMessage) -> usize {
    registry
        .ids()
        .into_iter()
        .filter(|id| registry.send_to(*id, message.clone()))
        .count()
}

/// 특정 채널에 전송
pub fn to_connection(registry: &Registry, id: ConnectionId, message: ServerMessage) {
    if !registry.send_to(id, message) {
        tracing::debug!(connection = %id, "Channel not open, message skipped");
    }
}
