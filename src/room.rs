//! 방 상태 저장소
//!
//! 방 하나의 모든 게임 상태를 보관한다. 변경은 `GameEngine`만 수행한다.

use crate::config::{RoomConfig, DEFAULT_TIME_REMAINING};
use crate::error::JoinError;
use crate::protocol::{PlayerInfo, Submission, VoteType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// 이름 최대 길이 (문자 수)
pub const MAX_NAME_LEN: usize = 20;

/// 방 안에서 유일한 플레이어 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 플레이어 아이콘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Cabbage,
    Carrot,
    Crab,
    Eggplant,
    Elbow,
    Tomato,
}

impl Icon {
    pub const ALL: [Icon; 6] = [
        Icon::Cabbage,
        Icon::Carrot,
        Icon::Crab,
        Icon::Eggplant,
        Icon::Elbow,
        Icon::Tomato,
    ];
}

/// 게임 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Drawing,
    Voting,
    Complete,
}

/// 착석한 플레이어
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub icon: Icon,
    pub connection: Uuid,
}

impl Player {
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            icon: self.icon,
        }
    }
}

/// 제출물 하나에 대한 찬반 집계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub up: u32,
    pub down: u32,
    pub voted_players: BTreeSet<PlayerId>,
}

impl VoteTally {
    /// 투표 기록. 이미 투표한 플레이어면 false
    pub fn record(&mut self, voter: PlayerId, vote: VoteType) -> bool {
        if !self.voted_players.insert(voter) {
            return false;
        }
        match vote {
            VoteType::Up => self.up += 1,
            VoteType::Down => self.down += 1,
        }
        true
    }
}

/// 방 정보
#[derive(Debug)]
pub struct Room {
    pub code: String,
    pub max_players: usize,
    pub phase: Phase,
    pub started: bool,
    pub category: Option<String>,
    pub prompt: Option<String>,
    pub time_remaining: u32,
    pub players: Vec<Player>,
    pub submissions: Vec<Submission>,
    pub votes: BTreeMap<PlayerId, VoteTally>,
    next_player_id: u64,
}

impl Room {
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            code: config.code.clone(),
            max_players: config.max_players,
            phase: Phase::Lobby,
            started: false,
            category: None,
            prompt: None,
            time_remaining: DEFAULT_TIME_REMAINING,
            players: Vec::new(),
            submissions: Vec::new(),
            votes: BTreeMap::new(),
            next_player_id: 1,
        }
    }

    pub fn roster(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(Player::info).collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// 참가 검증 후 착석
    pub fn seat_player(
        &mut self,
        room_code: &str,
        name: &str,
        connection: Uuid,
    ) -> Result<&Player, JoinError> {
        if room_code != self.code {
            return Err(JoinError::InvalidRoomCode);
        }
        if self.started {
            return Err(JoinError::GameInProgress);
        }
        if self.players.len() >= self.max_players {
            return Err(JoinError::RoomFull);
        }
        let name_len = name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(JoinError::InvalidUsername);
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(JoinError::UsernameTaken);
        }

        let player = Player {
            id: PlayerId(self.next_player_id),
            name: name.to_string(),
            icon: self.next_icon(),
            connection,
        };
        self.next_player_id += 1;
        self.players.push(player);
        Ok(&self.players[self.players.len() - 1])
    }

    /// 연결에 묶인 플레이어 제거
    pub fn remove_by_connection(&mut self, connection: Uuid) -> Option<Player> {
        let index = self.players.iter().position(|p| p.connection == connection)?;
        Some(self.players.remove(index))
    }

    /// 사용 중이 아닌 첫 번째 아이콘. 모두 사용 중이면 첫 아이콘 재사용
    fn next_icon(&self) -> Icon {
        Icon::ALL
            .into_iter()
            .find(|icon| self.players.iter().all(|p| p.icon != *icon))
            .unwrap_or(Icon::ALL[0])
    }

    pub fn begin_drawing(&mut self, category: String, prompt: String, time_remaining: u32) {
        self.phase = Phase::Drawing;
        self.category = Some(category);
        self.prompt = Some(prompt);
        self.time_remaining = time_remaining;
        self.submissions.clear();
    }

    pub fn has_submitted(&self, player: PlayerId) -> bool {
        self.submissions.iter().any(|s| s.player_id == player)
    }

    /// 현재 라운드 정보로 제출물 생성 후 추가
    pub fn add_submission(&mut self, player: &Player, drawing: String) -> &Submission {
        self.submissions.push(Submission {
            player_id: player.id,
            player_name: player.name.clone(),
            player_icon: player.icon,
            drawing,
            category: self.category.clone().unwrap_or_default(),
            prompt: self.prompt.clone().unwrap_or_default(),
        });
        &self.submissions[self.submissions.len() - 1]
    }

    pub fn begin_voting(&mut self) {
        self.phase = Phase::Voting;
        self.votes.clear();
    }

    /// 제출물 투표 집계 초기화 (이미 있으면 유지)
    pub fn open_ballot(&mut self, submission: PlayerId) {
        self.votes.entry(submission).or_default();
    }

    /// 투표 기록. 이번 라운드 제출물이 아니거나 중복 투표면 false
    pub fn cast_vote(&mut self, submission: PlayerId, voter: PlayerId, vote: VoteType) -> bool {
        if !self.submissions.iter().any(|s| s.player_id == submission) {
            return false;
        }
        self.votes.entry(submission).or_default().record(voter, vote)
    }

    /// 제출자를 제외한 착석 플레이어가 모두 투표했는지
    pub fn all_voted(&self, submission: PlayerId) -> bool {
        let Some(tally) = self.votes.get(&submission) else {
            return false;
        };
        self.players
            .iter()
            .filter(|p| p.id != submission)
            .all(|p| tally.voted_players.contains(&p.id))
    }

    pub fn complete(&mut self) {
        self.phase = Phase::Complete;
    }

    /// 로비 초기 상태로 복귀. 플레이어 ID 카운터는 유지
    pub fn reset(&mut self) {
        self.phase = Phase::Lobby;
        self.started = false;
        self.category = None;
        self.prompt = None;
        self.time_remaining = DEFAULT_TIME_REMAINING;
        self.players.clear();
        self.submissions.clear();
        self.votes.clear();
    }

    /// 호스트 이탈 시 로스터와 시작 플래그만 초기화
    pub fn release_host(&mut self) {
        self.players.clear();
        self.started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(&RoomConfig::default())
    }

    #[test]
    fn seats_players_with_increasing_ids_and_distinct_icons() {
        let mut room = room();
        let a = room.seat_player("ABCD", "Alice", Uuid::new_v4()).unwrap().clone();
        let b = room.seat_player("ABCD", "Bob", Uuid::new_v4()).unwrap().clone();
        assert_eq!(a.id, PlayerId(1));
        assert_eq!(b.id, PlayerId(2));
        assert_eq!(a.icon, Icon::Cabbage);
        assert_eq!(b.icon, Icon::Carrot);
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn join_errors_leave_roster_untouched() {
        let mut room = room();
        room.seat_player("ABCD", "Alice", Uuid::new_v4()).unwrap();

        assert_eq!(
            room.seat_player("WXYZ", "Bob", Uuid::new_v4()).unwrap_err(),
            JoinError::InvalidRoomCode
        );
        assert_eq!(
            room.seat_player("ABCD", "Alice", Uuid::new_v4()).unwrap_err(),
            JoinError::UsernameTaken
        );
        assert_eq!(
            room.seat_player("ABCD", "", Uuid::new_v4()).unwrap_err(),
            JoinError::InvalidUsername
        );
        assert_eq!(
            room.seat_player("ABCD", &"x".repeat(21), Uuid::new_v4()).unwrap_err(),
            JoinError::InvalidUsername
        );
        assert!(room.seat_player("ABCD", &"x".repeat(20), Uuid::new_v4()).is_ok());

        room.started = true;
        assert_eq!(
            room.seat_player("ABCD", "Carol", Uuid::new_v4()).unwrap_err(),
            JoinError::GameInProgress
        );
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut room = room();
        room.seat_player("ABCD", "alice", Uuid::new_v4()).unwrap();
        assert!(room.seat_player("ABCD", "Alice", Uuid::new_v4()).is_ok());
    }

    #[test]
    fn full_room_rejects_join() {
        let mut room = room();
        for i in 0..6 {
            room.seat_player("ABCD", &format!("P{i}"), Uuid::new_v4()).unwrap();
        }
        assert_eq!(
            room.seat_player("ABCD", "Extra", Uuid::new_v4()).unwrap_err(),
            JoinError::RoomFull
        );
        assert_eq!(room.players.len(), 6);
    }

    #[test]
    fn freed_icon_is_reused_but_id_is_not() {
        let mut room = room();
        let conn = Uuid::new_v4();
        room.seat_player("ABCD", "Alice", conn).unwrap();
        room.seat_player("ABCD", "Bob", Uuid::new_v4()).unwrap();

        let removed = room.remove_by_connection(conn).unwrap();
        assert_eq!(removed.icon, Icon::Cabbage);

        let carol = room.seat_player("ABCD", "Carol", Uuid::new_v4()).unwrap();
        assert_eq!(carol.icon, Icon::Cabbage);
        assert_eq!(carol.id, PlayerId(3));
    }

    #[test]
    fn one_vote_per_voter_per_submission() {
        let mut room = room();
        let alice = room.seat_player("ABCD", "Alice", Uuid::new_v4()).unwrap().clone();
        room.begin_drawing("Breakfast".into(), "Pancakes".into(), 60);
        room.add_submission(&alice, "data:image/png;base64,AAAA".into());
        room.begin_voting();

        assert!(room.cast_vote(alice.id, PlayerId(9), VoteType::Up));
        assert!(!room.cast_vote(alice.id, PlayerId(9), VoteType::Down));
        assert!(room.cast_vote(alice.id, PlayerId(10), VoteType::Down));
        assert!(!room.cast_vote(PlayerId(42), PlayerId(9), VoteType::Up));

        let tally = &room.votes[&alice.id];
        assert_eq!((tally.up, tally.down), (1, 1));
        assert_eq!(tally.voted_players.len(), 2);
    }

    #[test]
    fn all_voted_ignores_submission_owner() {
        let mut room = room();
        let alice = room.seat_player("ABCD", "Alice", Uuid::new_v4()).unwrap().clone();
        let bob = room.seat_player("ABCD", "Bob", Uuid::new_v4()).unwrap().clone();
        let carol = room.seat_player("ABCD", "Carol", Uuid::new_v4()).unwrap().clone();
        room.begin_drawing("Breakfast".into(), "Pancakes".into(), 60);
        room.add_submission(&alice, "art".into());
        room.begin_voting();
        assert!(!room.all_voted(alice.id));

        room.cast_vote(alice.id, bob.id, VoteType::Up);
        assert!(!room.all_voted(alice.id));
        room.cast_vote(alice.id, carol.id, VoteType::Down);
        assert!(room.all_voted(alice.id));
    }

    #[test]
    fn reset_returns_to_lobby_and_keeps_id_counter() {
        let mut room = room();
        room.seat_player("ABCD", "Alice", Uuid::new_v4()).unwrap();
        room.started = true;
        room.begin_drawing("Breakfast".into(), "Pancakes".into(), 30);

        room.reset();
        assert_eq!(room.phase, Phase::Lobby);
        assert!(!room.started);
        assert!(room.players.is_empty());
        assert!(room.category.is_none());
        assert_eq!(room.time_remaining, DEFAULT_TIME_REMAINING);

        let bob = room.seat_player("ABCD", "Bob", Uuid::new_v4()).unwrap();
        assert_eq!(bob.id, PlayerId(2));
    }
}
