//! 환경 변수 기반 설정 관리

use std::env;

/// 기본 방 코드
pub const DEFAULT_ROOM_CODE: &str = "ABCD";
/// 방 코드 길이
pub const ROOM_CODE_LEN: usize = 4;
/// 기본 최대 인원
pub const DEFAULT_MAX_PLAYERS: usize = 6;
/// 라운드 기본 제한 시간 (초)
pub const DEFAULT_TIME_REMAINING: u32 = 60;

/// 서버 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub room: RoomConfig,
    pub log_level: String,
}

/// 방 설정
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub code: String,
    pub max_players: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            code: DEFAULT_ROOM_CODE.to_string(),
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
            room: RoomConfig {
                code: parse_room_code(env::var("ROOM_CODE").ok()),
                max_players: env::var("MAX_PLAYERS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_MAX_PLAYERS),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

/// 방 코드는 4자 고정, 그 외 값은 기본값으로 대체
fn parse_room_code(raw: Option<String>) -> String {
    raw.map(|v| v.trim().to_string())
        .filter(|code| code.chars().count() == ROOM_CODE_LEN)
        .unwrap_or_else(|| DEFAULT_ROOM_CODE.to_string())
}
