//! 게임 명령 처리기
//!
//! 모든 수신 메시지는 룸 태스크 하나에서 도착 순서대로 처리된다.
//! 각 명령은 검증 → 상태 변경 → 브로드캐스트까지 끝난 뒤 다음 명령으로 넘어간다.

use super::broadcast;
use super::guard;
use crate::config::RoomConfig;
use crate::protocol::{ClientMessage, ServerMessage, Submission, VoteType};
use crate::room::{PlayerId, Room};
use crate::state::{ConnectionId, Registry, Role};
use std::sync::Arc;

/// 방 상태와 연결 레지스트리를 묶은 명령 처리기
pub struct GameEngine {
    pub(super) room: Room,
    pub(super) registry: Arc<Registry>,
}

impl GameEngine {
    pub fn new(config: &RoomConfig, registry: Arc<Registry>) -> Self {
        Self {
            room: Room::new(config),
            registry,
        }
    }

    #[cfg(test)]
    pub fn room(&self) -> &Room {
        &self.room
    }

    /// 수신 메시지 처리
    pub fn handle_message(&mut self, conn_id: ConnectionId, msg: ClientMessage) {
        let Some(role) = self.registry.role(conn_id) else {
            tracing::debug!(connection = %conn_id, "Message from unknown connection dropped");
            return;
        };

        let command = msg.command();
        if !guard::allows(command, role, self.room.phase) {
            tracing::debug!(
                connection = %conn_id,
                command = ?command,
                role = ?role,
                phase = ?self.room.phase,
                "Command not allowed, dropped"
            );
            return;
        }

        match msg {
            ClientMessage::HostConnect => self.handle_host_connect(conn_id),
            ClientMessage::JoinGame {
                room_code,
                username,
            } => self.handle_join_game(conn_id, &room_code, &username),
            ClientMessage::StartGame => self.handle_start_game(),
            ClientMessage::StartDrawingPhase {
                category,
                prompt,
                time_remaining,
            } => self.handle_start_drawing(category, prompt, time_remaining),
            ClientMessage::SubmitDrawing { drawing } => {
                if let Role::Player(player_id) = role {
                    self.handle_submit_drawing(conn_id, player_id, drawing);
                }
            }
            ClientMessage::StartVotingPhase => self.handle_start_voting(),
            ClientMessage::ShowSubmission {
                submission,
                index,
                total,
            } => self.handle_show_submission(submission, index, total),
            ClientMessage::CastVote {
                submission_id,
                vote_type,
            } => {
                if let Role::Player(player_id) = role {
                    self.handle_cast_vote(conn_id, player_id, submission_id, vote_type);
                }
            }
            ClientMessage::GameComplete => self.handle_game_complete(),
            ClientMessage::TimeUpdate { time_remaining } => self.handle_time_update(time_remaining),
            ClientMessage::ResetGame => self.handle_reset(),
        }
    }

    fn handle_host_connect(&mut self, conn_id: ConnectionId) {
        if let Some(previous) = self.registry.assign_host(conn_id) {
            tracing::info!(previous = %previous, host = %conn_id, "Host replaced");
        }

        broadcast::to_connection(
            &self.registry,
            conn_id,
            ServerMessage::HostConnected {
                room_code: self.room.code.clone(),
                players: self.room.roster(),
            },
        );

        tracing::info!(host = %conn_id, room_code = %self.room.code, "Host connected");
    }

    fn handle_join_game(&mut self, conn_id: ConnectionId, room_code: &str, username: &str) {
        let info = match self.room.seat_player(room_code, username, conn_id) {
            Ok(player) => player.info(),
            Err(e) => {
                tracing::warn!(
                    connection = %conn_id,
                    username = %username,
                    reason = %e,
                    "Join rejected"
                );
                broadcast::to_connection(
                    &self.registry,
                    conn_id,
                    ServerMessage::JoinError {
                        message: e.to_string(),
                    },
                );
                return;
            }
        };

        self.registry.set_role(conn_id, Role::Player(info.id));

        tracing::info!(
            player_id = %info.id,
            name = %info.name,
            icon = ?info.icon,
            player_count = self.room.players.len(),
            "Player joined"
        );

        broadcast::to_connection(&self.registry, conn_id, ServerMessage::JoinSuccess { player: info });
        self.publish_roster();
    }

    fn handle_start_game(&mut self) {
        self.room.started = true;
        tracing::info!(player_count = self.room.players.len(), "Game started, lobby closed");
    }

    fn handle_start_drawing(&mut self, category: String, prompt: String, time_remaining: u32) {
        self.room.begin_drawing(category.clone(), prompt.clone(), time_remaining);

        tracing::info!(
            category = %category,
            prompt = %prompt,
            time_remaining = time_remaining,
            "Drawing phase started"
        );

        let delivered = broadcast::to_players(
            &self.registry,
            &self.room,
            ServerMessage::DrawingPhaseStarted {
                category,
                prompt,
                time_remaining,
            },
        );
        tracing::debug!(delivered = delivered, "Sent DrawingPhaseStarted");
    }

    fn handle_submit_drawing(&mut self, conn_id: ConnectionId, player_id: PlayerId, drawing: String) {
        let Some(player) = self.room.player(player_id).cloned() else {
            tracing::debug!(player_id = %player_id, "Submission from unseated player dropped");
            return;
        };
        if self.room.has_submitted(player_id) {
            tracing::debug!(player_id = %player_id, "Duplicate submission dropped");
            return;
        }

        let submission = self.room.add_submission(&player, drawing).clone();
        let total_submissions = self.room.submissions.len();

        broadcast::to_host(
            &self.registry,
            ServerMessage::DrawingSubmitted {
                submission,
                total_submissions,
            },
        );
        broadcast::to_connection(&self.registry, conn_id, ServerMessage::DrawingSubmittedConfirm);

        tracing::info!(
            player_id = %player_id,
            name = %player.name,
            total_submissions = total_submissions,
            "Drawing submitted"
        );
    }

    fn handle_start_voting(&mut self) {
        self.room.begin_voting();
        tracing::info!(submissions = self.room.submissions.len(), "Voting phase started");
    }

    fn handle_show_submission(&mut self, submission: Submission, index: usize, total: usize) {
        self.room.open_ballot(submission.player_id);

        tracing::info!(
            owner = %submission.player_id,
            index = index,
            total = total,
            "Showing submission for voting"
        );

        let message = ServerMessage::ShowSubmissionForVoting {
            submission,
            index,
            total,
            category: self.room.category.clone(),
            prompt: self.room.prompt.clone(),
        };
        broadcast::to_players(&self.registry, &self.room, message);
    }

    fn handle_cast_vote(
        &mut self,
        conn_id: ConnectionId,
        voter: PlayerId,
        submission_id: PlayerId,
        vote_type: VoteType,
    ) {
        if self.room.player(voter).is_none() {
            tracing::debug!(voter = %voter, "Vote from unseated player dropped");
            return;
        }
        if !self.room.cast_vote(submission_id, voter, vote_type) {
            tracing::debug!(
                voter = %voter,
                submission_id = %submission_id,
                "Vote rejected (unknown submission or already voted)"
            );
            return;
        }

        let all_players_voted = self.room.all_voted(submission_id);
        broadcast::to_host(
            &self.registry,
            ServerMessage::VoteCast {
                submission_id,
                votes: self.room.votes.clone(),
                all_players_voted,
            },
        );
        broadcast::to_connection(&self.registry, conn_id, ServerMessage::VoteCastConfirm);

        tracing::info!(
            voter = %voter,
            submission_id = %submission_id,
            vote = ?vote_type,
            all_players_voted = all_players_voted,
            "Vote cast"
        );
    }

    fn handle_game_complete(&mut self) {
        self.room.complete();
        broadcast::to_players(
            &self.registry,
            &self.room,
            ServerMessage::GameComplete {
                votes: self.room.votes.clone(),
            },
        );
        tracing::info!("Game complete");
    }

    fn handle_time_update(&mut self, time_remaining: u32) {
        self.room.time_remaining = time_remaining;
        broadcast::to_players(
            &self.registry,
            &self.room,
            ServerMessage::TimeUpdate { time_remaining },
        );
    }

    fn handle_reset(&mut self) {
        self.room.reset();
        let delivered = broadcast::to_everyone(&self.registry, ServerMessage::GameReset);
        tracing::info!(delivered = delivered, "Game reset");
    }

    /// 호스트에게 현재 로스터 전송
    pub(super) fn publish_roster(&self) {
        broadcast::to_host(
            &self.registry,
            ServerMessage::PlayersUpdated {
                players: self.room.roster(),
            },
        );
    }
}
