//! 명령 허용 테이블 (역할 × 단계 × 명령)

use crate::protocol::Command;
use crate::room::Phase;
use crate::state::Role;

/// 명령을 보낼 수 있는 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sender {
    /// 미지정 채널 또는 현재 호스트
    UnassignedOrHost,
    Unassigned,
    Host,
    Player,
}

/// 명령이 유효한 단계
#[derive(Debug, Clone, Copy)]
enum Phases {
    Any,
    Only(&'static [Phase]),
    Except(&'static [Phase]),
}

/// 명령별 허용 규칙
fn rule(command: Command) -> (Sender, Phases) {
    use Command::*;
    match command {
        HostConnect => (Sender::UnassignedOrHost, Phases::Any),
        JoinGame => (Sender::Unassigned, Phases::Any),
        StartGame => (Sender::Host, Phases::Any),
        // Complete는 리셋 전까지 종료 상태
        StartDrawingPhase => (Sender::Host, Phases::Except(&[Phase::Complete])),
        SubmitDrawing => (Sender::Player, Phases::Only(&[Phase::Drawing])),
        StartVotingPhase => (Sender::Host, Phases::Except(&[Phase::Complete])),
        ShowSubmission => (Sender::Host, Phases::Only(&[Phase::Voting])),
        CastVote => (Sender::Player, Phases::Only(&[Phase::Voting])),
        GameComplete => (Sender::Host, Phases::Only(&[Phase::Drawing, Phase::Voting])),
        TimeUpdate => (Sender::Host, Phases::Any),
        ResetGame => (Sender::Host, Phases::Any),
    }
}

/// 명령 허용 여부
pub fn allows(command: Command, role: Role, phase: Phase) -> bool {
    let (sender, phases) = rule(command);

    let role_ok = match (sender, role) {
        (Sender::UnassignedOrHost, Role::Unassigned | Role::Host) => true,
        (Sender::Unassigned, Role::Unassigned) => true,
        (Sender::Host, Role::Host) => true,
        (Sender::Player, Role::Player(_)) => true,
        _ => false,
    };

    let phase_ok = match phases {
        Phases::Any => true,
        Phases::Only(allowed) => allowed.contains(&phase),
        Phases::Except(denied) => !denied.contains(&phase),
    };

    role_ok && phase_ok
}
