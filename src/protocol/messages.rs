//! 클라이언트-서버 메시지 프로토콜 정의

use crate::room::{Icon, PlayerId, VoteTally};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 클라이언트 → 서버 메시지
#[derive(Debug, Clone, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    // Host
    HostConnect,
    StartGame,
    StartDrawingPhase {
        category: String,
        prompt: String,
        time_remaining: u32,
    },
    StartVotingPhase,
    ShowSubmission {
        submission: Submission,
        index: usize,
        total: usize,
    },
    TimeUpdate {
        time_remaining: u32,
    },
    GameComplete,
    ResetGame,

    // Player
    JoinGame {
        room_code: String,
        username: String,
    },
    SubmitDrawing {
        drawing: String,
    },
    CastVote {
        submission_id: PlayerId,
        #[serde(default)]
        vote_type: VoteType,
    },
}

impl ClientMessage {
    /// 로그 및 가드 테이블용 명령 종류
    pub fn command(&self) -> Command {
        match self {
            Self::HostConnect => Command::HostConnect,
            Self::StartGame => Command::StartGame,
            Self::StartDrawingPhase { .. } => Command::StartDrawingPhase,
            Self::StartVotingPhase => Command::StartVotingPhase,
            Self::ShowSubmission { .. } => Command::ShowSubmission,
            Self::TimeUpdate { .. } => Command::TimeUpdate,
            Self::GameComplete => Command::GameComplete,
            Self::ResetGame => Command::ResetGame,
            Self::JoinGame { .. } => Command::JoinGame,
            Self::SubmitDrawing { .. } => Command::SubmitDrawing,
            Self::CastVote { .. } => Command::CastVote,
        }
    }
}

/// 페이로드를 제외한 명령 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    HostConnect,
    JoinGame,
    StartGame,
    StartDrawingPhase,
    SubmitDrawing,
    StartVotingPhase,
    ShowSubmission,
    CastVote,
    GameComplete,
    TimeUpdate,
    ResetGame,
}

/// 서버 → 클라이언트 메시지
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    // Lobby
    HostConnected {
        room_code: String,
        players: Vec<PlayerInfo>,
    },
    JoinSuccess {
        player: PlayerInfo,
    },
    JoinError {
        message: String,
    },
    PlayersUpdated {
        players: Vec<PlayerInfo>,
    },

    // Drawing
    DrawingPhaseStarted {
        category: String,
        prompt: String,
        time_remaining: u32,
    },
    DrawingSubmitted {
        submission: Submission,
        total_submissions: usize,
    },
    DrawingSubmittedConfirm,

    // Voting
    ShowSubmissionForVoting {
        submission: Submission,
        index: usize,
        total: usize,
        category: Option<String>,
        prompt: Option<String>,
    },
    VoteCast {
        submission_id: PlayerId,
        votes: BTreeMap<PlayerId, VoteTally>,
        all_players_voted: bool,
    },
    VoteCastConfirm,

    // Round control
    TimeUpdate {
        time_remaining: u32,
    },
    GameComplete {
        votes: BTreeMap<PlayerId, VoteTally>,
    },
    GameReset,
}

/// 공개 플레이어 정보 (채널 참조 제외)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub icon: Icon,
}

/// 그림 제출물
///
/// 작성자 정보는 제출 시점에 복사해 둔다. `drawing`은 인코딩된 이미지 그대로 보관한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub player_id: PlayerId,
    pub player_name: String,
    pub player_icon: Icon,
    pub drawing: String,
    pub category: String,
    pub prompt: String,
}

/// 투표 방향
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    #[default]
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_join_game() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "JOIN_GAME",
            "roomCode": "ABCD",
            "username": "Alice"
        }))
        .unwrap();
        match msg {
            ClientMessage::JoinGame { room_code, username } => {
                assert_eq!(room_code, "ABCD");
                assert_eq!(username, "Alice");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cast_vote_defaults_to_up() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"CAST_VOTE","submissionId":3}"#).unwrap();
        match msg {
            ClientMessage::CastVote {
                submission_id,
                vote_type,
            } => {
                assert_eq!(submission_id, PlayerId(3));
                assert_eq!(vote_type, VoteType::Up);
            }
            other => panic!("unexpected {:?}", other),
        }

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"CAST_VOTE","submissionId":3,"voteType":"down"}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::CastVote {
                vote_type: VoteType::Down,
                ..
            }
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"LAUNCH_ROCKETS"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"TIME_UPDATE"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn encodes_with_type_tag_and_camel_case_fields() {
        let value = serde_json::to_value(ServerMessage::DrawingPhaseStarted {
            category: "Breakfast".into(),
            prompt: "Pancakes".into(),
            time_remaining: 60,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "DRAWING_PHASE_STARTED",
                "category": "Breakfast",
                "prompt": "Pancakes",
                "timeRemaining": 60
            })
        );

        let value = serde_json::to_value(ServerMessage::GameReset).unwrap();
        assert_eq!(value, json!({ "type": "GAME_RESET" }));
    }

    #[test]
    fn vote_map_keys_are_player_ids() {
        let mut votes = BTreeMap::new();
        votes.insert(
            PlayerId(7),
            VoteTally {
                up: 2,
                ..Default::default()
            },
        );
        let value = serde_json::to_value(ServerMessage::VoteCast {
            submission_id: PlayerId(7),
            votes,
            all_players_voted: false,
        })
        .unwrap();
        assert_eq!(value["submissionId"], json!(7));
        assert_eq!(value["votes"]["7"]["up"], json!(2));
        assert_eq!(value["votes"]["7"]["down"], json!(0));
        assert_eq!(value["allPlayersVoted"], json!(false));
    }
}
