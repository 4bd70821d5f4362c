#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Role {
    #[display(fmt = "werewolf")]
    Werewolf,
    #[display(fmt = "villager")]
    Villager,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub username: String,
    /// `None` until roles are handed out, and for anyone who joins after that
    pub role: Option<Role>,
    pub is_alive: bool,
}

impl Player {
    pub fn new(username: impl Into<String>) -> Player {
        Player {
            username: username.into(),
            role: None,
            is_alive: true,
        }
    }

    pub fn is_participant(&self) -> bool {
        self.role.is_some()
    }

    /// Alive and holding a role in the running game
    pub fn can_vote(&self) -> bool {
        self.is_alive && self.is_participant()
    }

    pub fn is_alive_as(&self, role: Role) -> bool {
        self.is_alive && self.role == Some(role)
    }
}
