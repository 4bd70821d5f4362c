use std::{fmt, time::Duration};

use crate::game::player::Role;

/// Everything the game ever tells a player. Clients should match on the variant; the `Display`
/// rendering is for humans and keeps the wording older text clients pattern-match on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameMessage {
    Connected { username: String },
    GameStarting { grace_period: Duration },
    RoleAssigned { role: Role },
    PromptRestrictedVote,
    PromptOpenVote,
    Eliminated { username: String, role: Role },
    NoElimination,
    GameEnded { winner: Role },
}

impl GameMessage {
    pub fn voting_prompt(restricted: bool) -> GameMessage {
        if restricted {
            GameMessage::PromptRestrictedVote
        } else {
            GameMessage::PromptOpenVote
        }
    }
}

impl fmt::Display for GameMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameMessage::Connected { username } => write!(f, "You are connected as {username}!"),
            GameMessage::GameStarting { grace_period } => write!(
                f,
                "Game starting in {} seconds...",
                grace_period.as_secs()
            ),
            GameMessage::RoleAssigned { role } => write!(f, "You are a {role}."),
            GameMessage::PromptRestrictedVote => {
                write!(f, "Night begins, werewolves please vote whom to eat")
            }
            GameMessage::PromptOpenVote => {
                write!(f, "Day begins, all players vote who might be the werewolf")
            }
            GameMessage::Eliminated { username, role } => {
                write!(f, "{username} eliminated, was a {role}.")
            }
            GameMessage::NoElimination => {
                write!(f, "No elimination this round due to a tie or no votes.")
            }
            GameMessage::GameEnded {
                winner: Role::Werewolf,
            } => write!(f, "Werewolves win!"),
            GameMessage::GameEnded {
                winner: Role::Villager,
            } => write!(f, "Villagers win!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_message_names_the_faction() {
        let text = GameMessage::RoleAssigned {
            role: Role::Werewolf,
        }
        .to_string();
        assert!(text.contains("You are a"));
        assert!(text.contains("werewolf"));
    }

    #[test]
    fn prompts_are_distinguishable() {
        let night = GameMessage::voting_prompt(true).to_string().to_lowercase();
        let day = GameMessage::voting_prompt(false).to_string().to_lowercase();
        assert!(night.contains("werewolves please vote"));
        assert!(!day.contains("werewolves please vote"));
        assert!(day.contains("all players vote"));
    }

    #[test]
    fn elimination_reveals_role() {
        let text = GameMessage::Eliminated {
            username: String::from("mira"),
            role: Role::Villager,
        }
        .to_string();
        assert_eq!(text, "mira eliminated, was a villager.");
    }

    #[test]
    fn end_message_names_winner() {
        let text = GameMessage::GameEnded {
            winner: Role::Werewolf,
        }
        .to_string();
        assert_eq!(text, "Werewolves win!");
    }
}
