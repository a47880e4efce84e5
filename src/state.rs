//! 애플리케이션 상태 관리

use crate::config::Config;
use crate::handlers::RoomEvent;
use crate::protocol::ServerMessage;
use crate::room::PlayerId;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// 채널 식별자
pub type ConnectionId = Uuid;

/// 전역 애플리케이션 상태
pub struct AppState {
    /// 연결 레지스트리 (룸 태스크와 공유)
    pub registry: Arc<Registry>,
    /// 룸 태스크 입력 큐
    pub events: UnboundedSender<RoomEvent>,
    /// 설정
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<Registry>, events: UnboundedSender<RoomEvent>) -> Self {
        Self {
            registry,
            events,
            config: Arc::new(config),
        }
    }
}

/// 채널 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Unassigned,
    Host,
    Player(PlayerId),
}

/// 연결 정보
pub struct Connection {
    pub role: Role,
    pub sender: UnboundedSender<ServerMessage>,
    pub connected_at: Instant,
}

impl Connection {
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// 열린 채널에만 전송
    pub fn send(&self, message: ServerMessage) -> bool {
        self.is_open() && self.sender.send(message).is_ok()
    }
}

/// 연결 레지스트리
///
/// 역할 변경은 룸 태스크에서만 일어난다. HTTP 핸들러는 조회만 한다.
#[derive(Default)]
pub struct Registry {
    connections: DashMap<ConnectionId, Connection>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId, sender: UnboundedSender<ServerMessage>) {
        self.connections.insert(
            id,
            Connection {
                role: Role::Unassigned,
                sender,
                connected_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id).map(|(_, conn)| conn)
    }

    pub fn role(&self, id: ConnectionId) -> Option<Role> {
        self.connections.get(&id).map(|conn| conn.role)
    }

    pub fn set_role(&self, id: ConnectionId, role: Role) {
        if let Some(mut conn) = self.connections.get_mut(&id) {
            conn.role = role;
        }
    }

    /// 현재 호스트 채널
    pub fn host(&self) -> Option<ConnectionId> {
        self.connections
            .iter()
            .find(|entry| entry.role == Role::Host)
            .map(|entry| *entry.key())
    }

    /// 호스트 지정. 기존 호스트는 알림 없이 미지정으로 강등
    pub fn assign_host(&self, id: ConnectionId) -> Option<ConnectionId> {
        let previous = self.host().filter(|prev| *prev != id);
        if let Some(prev) = previous {
            self.set_role(prev, Role::Unassigned);
        }
        self.set_role(id, Role::Host);
        previous
    }

    pub fn send_to(&self, id: ConnectionId, message: ServerMessage) -> bool {
        self.connections
            .get(&id)
            .map(|conn| conn.send(message))
            .unwrap_or(false)
    }

    /// 모든 연결 (미지정 포함)
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }
}
