pub mod local_player_registry;

use crate::{
    error::GameError,
    game::player::{Player, Role},
};

/// Membership and faction/alive status of everyone connected to the server.
///
/// Implementations are not synchronised themselves; the game keeps its registry behind the same
/// lock as the rest of the game state so quorum checks and tallies see one consistent view.
pub trait PlayerRegistry {
    /// Registers a new player with no role
    fn connect(&mut self, username: &str) -> Result<&Player, GameError>;

    fn get_player(&self, username: &str) -> Option<&Player>;

    /// No-op for players who are already dead
    fn mark_eliminated(&mut self, username: &str) -> Result<(), GameError>;

    fn assign_role(&mut self, username: &str, role: Role) -> Result<(), GameError>;

    /// Clears every role and revives everybody ahead of a new game
    fn reset_roles(&mut self);

    /// Players in connection order
    fn players(&self) -> &[Player];

    fn snapshot(&self) -> Vec<Player> {
        self.players().to_vec()
    }

    fn player_count(&self) -> usize {
        self.players().len()
    }

    fn any_alive(&self, role: Role) -> bool {
        self.players().iter().any(|p| p.is_alive_as(role))
    }
}
