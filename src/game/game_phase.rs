use super::player::Role;

#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum GamePhase {
    Waiting,
    RoleAssignment,
    /// Night: only werewolves are prompted
    RestrictedVote,
    /// Day: everybody is prompted
    OpenVote,
    Ended,
}

impl GamePhase {
    /// A game is running from the moment quorum is reached until it ends
    pub fn is_active(&self) -> bool {
        !matches!(self, GamePhase::Waiting | GamePhase::Ended)
    }

    pub fn is_voting(&self) -> bool {
        matches!(self, GamePhase::RestrictedVote | GamePhase::OpenVote)
    }

    /// Role whose members get this phase's prompt, `None` meaning everyone
    pub fn prompted_role(&self) -> Option<Role> {
        match self {
            GamePhase::RestrictedVote => Some(Role::Werewolf),
            _ => None,
        }
    }

    pub fn next_voting_phase(&self) -> GamePhase {
        match self {
            GamePhase::RestrictedVote => GamePhase::OpenVote,
            _ => GamePhase::RestrictedVote,
        }
    }
}
