//! 에러 타입 정의

use thiserror::Error;

/// 참가 거절 사유
///
/// `Display` 문자열이 그대로 `JOIN_ERROR` 메시지로 전송된다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("Invalid room code")]
    InvalidRoomCode,
    #[error("Game already in progress")]
    GameInProgress,
    #[error("Room is full")]
    RoomFull,
    #[error("Invalid username")]
    InvalidUsername,
    #[error("Username already taken")]
    UsernameTaken,
}
