use std::collections::HashMap;

use crate::{
    error::GameError,
    game::player::{Player, Role},
    player_registry::PlayerRegistry,
};

pub struct LocalPlayerRegistry {
    players: Vec<Player>,
    index: HashMap<String, usize>,
}

impl Default for LocalPlayerRegistry {
    fn default() -> Self {
        LocalPlayerRegistry::new()
    }
}

impl LocalPlayerRegistry {
    pub fn new() -> LocalPlayerRegistry {
        LocalPlayerRegistry {
            players: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn get_player_mut(&mut self, username: &str) -> Result<&mut Player, GameError> {
        match self.index.get(username) {
            Some(idx) => Ok(&mut self.players[*idx]),
            None => Err(GameError::UnknownPlayer(username.to_string())),
        }
    }
}

impl PlayerRegistry for LocalPlayerRegistry {
    fn connect(&mut self, username: &str) -> Result<&Player, GameError> {
        if self.index.contains_key(username) {
            return Err(GameError::UsernameTaken(username.to_string()));
        }

        let idx = self.players.len();
        self.players.push(Player::new(username));
        self.index.insert(username.to_string(), idx);

        Ok(&self.players[idx])
    }

    fn get_player(&self, username: &str) -> Option<&Player> {
        let idx = self.index.get(username)?;
        self.players.get(*idx)
    }

    fn mark_eliminated(&mut self, username: &str) -> Result<(), GameError> {
        self.get_player_mut(username)?.is_alive = false;
        Ok(())
    }

    fn assign_role(&mut self, username: &str, role: Role) -> Result<(), GameError> {
        self.get_player_mut(username)?.role = Some(role);
        Ok(())
    }

    fn reset_roles(&mut self) {
        for p in self.players.iter_mut() {
            p.role = None;
            p.is_alive = true;
        }
    }

    fn players(&self) -> &[Player] {
        &self.players
    }
}
