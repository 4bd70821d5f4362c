use crate::{
    config::GameConfig,
    error::GameError,
    mailbox::{Broadcaster, MessageStream},
    message::GameMessage,
    player_registry::{local_player_registry::LocalPlayerRegistry, PlayerRegistry},
};
use game_phase::*;
use log::{debug, error, info, warn};
use player::*;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::{sync::Notify, time::sleep};
use vote_tally::*;

pub mod game_phase;
pub mod player;
pub mod roles;
pub mod vote_tally;

/// Returns the winning faction once either faction has nobody left alive. Villagers are
/// checked first, so if both die out together the werewolves win.
pub fn get_winner<R: PlayerRegistry + ?Sized>(registry: &R) -> Option<Role> {
    let werewolves_alive = registry.any_alive(Role::Werewolf);
    let villagers_alive = registry.any_alive(Role::Villager);
    debug!("Werewolves alive: {werewolves_alive}, villagers alive: {villagers_alive}");

    if !villagers_alive {
        Some(Role::Werewolf)
    } else if !werewolves_alive {
        Some(Role::Villager)
    } else {
        None
    }
}

struct GameState {
    registry: LocalPlayerRegistry,
    tally: VoteTally,
    phase: GamePhase,
    games_started: u64,
    rng: Box<dyn RngCore + Send>,
}

impl GameState {
    fn prompted_voters(&self) -> impl Iterator<Item = &Player> {
        let role = self.phase.prompted_role();
        self.registry
            .players()
            .iter()
            .filter(move |p| p.can_vote() && (role.is_none() || p.role == role))
    }

    fn all_prompted_voted(&self) -> bool {
        self.phase.is_voting()
            && self
                .prompted_voters()
                .all(|p| self.tally.has_voted(&p.username))
    }

    /// Players whose ballots count in the current phase
    fn eligible_voters(&self, werewolf_only_night: bool) -> HashSet<String> {
        if werewolf_only_night {
            return self
                .prompted_voters()
                .map(|p| p.username.clone())
                .collect();
        }
        self.registry
            .players()
            .iter()
            .filter(|p| p.can_vote())
            .map(|p| p.username.clone())
            .collect()
    }

    fn eliminate(&mut self, username: &str) -> Result<Role, GameError> {
        let role = self
            .registry
            .get_player(username)
            .and_then(|p| p.role)
            .ok_or_else(|| GameError::UnknownPlayer(username.to_string()))?;
        self.registry.mark_eliminated(username)?;
        Ok(role)
    }
}

struct Shared {
    state: Mutex<GameState>,
    broadcaster: Broadcaster,
    config: GameConfig,
    votes_complete: Notify,
}

/// Handle to the one game this server runs. Cheap to clone; every clone drives the same game.
///
/// All registry and tally mutations go through a single lock. The task running the phase loop
/// only takes it for short critical sections and never across a voting window. Mailboxes have
/// their own per-player locks, always taken after the game lock, never before.
#[derive(Clone)]
pub struct Game {
    shared: Arc<Shared>,
}

impl Game {
    pub fn new(config: GameConfig) -> Game {
        Game::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: GameConfig, rng: impl RngCore + Send + 'static) -> Game {
        Game {
            shared: Arc::new(Shared {
                state: Mutex::new(GameState {
                    registry: LocalPlayerRegistry::new(),
                    tally: VoteTally::new(),
                    phase: GamePhase::Waiting,
                    games_started: 0,
                    rng: Box::new(rng),
                }),
                broadcaster: Broadcaster::new(),
                config,
                votes_complete: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> GamePhase {
        self.lock().phase
    }

    pub fn games_started(&self) -> u64 {
        self.lock().games_started
    }

    pub fn players(&self) -> Vec<Player> {
        self.lock().registry.snapshot()
    }

    /// Registers a player. Reaching quorum while no game is running starts one in the
    /// background, so this must be called from within a Tokio runtime.
    pub fn connect(&self, username: &str) -> Result<GameMessage, GameError> {
        let should_start = {
            let mut state = self.lock();
            if let Err(e) = state.registry.connect(username) {
                warn!("Rejected connection: {e}");
                return Err(e);
            }
            self.shared.broadcaster.open(username);
            info!("Player connected: {username}");

            let quorum_reached = state.registry.player_count() >= self.shared.config.quorum;
            if quorum_reached && !state.phase.is_active() {
                state.phase = GamePhase::RoleAssignment;
                state.games_started += 1;
                true
            } else {
                false
            }
        };

        if should_start {
            tokio::spawn(self.clone().run());
        }

        Ok(GameMessage::Connected {
            username: username.to_string(),
        })
    }

    /// Always accepted. Ballots naming someone outside the running game, or cast while no
    /// voting window is open, are dropped.
    pub fn submit_vote(&self, voter: &str, votee: &str) {
        let mut state = self.lock();

        let votee_in_game = state
            .registry
            .get_player(votee)
            .is_some_and(Player::is_participant);
        if !votee_in_game {
            warn!("Ignoring vote from {voter} for {votee}: not in the game");
            return;
        }
        if !state.tally.submit_vote(voter, votee) {
            debug!("Ignoring vote from {voter}: no voting window open");
            return;
        }
        debug!("{voter} voted for {votee}");

        if self.shared.config.early_resolve && state.all_prompted_voted() {
            self.shared.votes_complete.notify_waiters();
        }
    }

    /// The player's message stream. Ends after `disconnect` or `shutdown`. Dropping it has the
    /// same effect as `disconnect`.
    pub fn subscribe(&self, username: &str) -> Result<MessageStream, GameError> {
        if self.lock().registry.get_player(username).is_none() {
            return Err(GameError::UnknownPlayer(username.to_string()));
        }
        Ok(MessageStream::new(self.shared.broadcaster.open(username)))
    }

    /// Tears down the player's mailbox: pending messages are discarded, their stream ends and
    /// nothing more is queued for them until they subscribe again. They stay registered.
    pub fn disconnect(&self, username: &str) -> Result<(), GameError> {
        if self.lock().registry.get_player(username).is_none() {
            return Err(GameError::UnknownPlayer(username.to_string()));
        }
        self.shared.broadcaster.close(username);
        info!("Player disconnected: {username}");
        Ok(())
    }

    pub fn shutdown(&self) {
        info!("Closing all mailboxes");
        self.shared.broadcaster.close_all();
    }

    async fn run(self) {
        let grace_period = self.shared.config.grace_period;
        info!("Game starting in {} seconds...", grace_period.as_secs());
        {
            let state = self.lock();
            self.shared.broadcaster.send(
                state.registry.players(),
                &GameMessage::GameStarting { grace_period },
                None,
            );
        }
        sleep(grace_period).await;

        self.assign_roles();

        let mut phase = GamePhase::RestrictedVote;
        while !self.end_if_decided() {
            self.run_voting_phase(phase).await;
            phase = phase.next_voting_phase();
        }
    }

    fn assign_roles(&self) {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.phase = GamePhase::RoleAssignment;
        state.registry.reset_roles();

        let usernames = state
            .registry
            .players()
            .iter()
            .map(|p| p.username.clone())
            .collect::<Vec<_>>();

        for (username, role) in roles::assign_roles(&usernames, &mut *state.rng) {
            if let Err(e) = state.registry.assign_role(&username, role) {
                error!("Role assignment failed: {e}");
                continue;
            }
            debug!("{username} assigned role {role}");
            self.shared
                .broadcaster
                .send_to(&username, GameMessage::RoleAssigned { role });
        }
        info!(
            "Roles assigned: {} werewolves among {} players",
            roles::werewolf_count(usernames.len()),
            usernames.len()
        );
    }

    async fn run_voting_phase(&self, phase: GamePhase) {
        let notified = self.shared.votes_complete.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        {
            let mut state = self.lock();
            state.phase = phase;
            let round = state.tally.open_round();
            info!("{phase} round {round} begins");

            let prompt = GameMessage::voting_prompt(phase == GamePhase::RestrictedVote);
            self.shared
                .broadcaster
                .send(state.registry.players(), &prompt, phase.prompted_role());
        }

        let window = self.shared.config.vote_window;
        if self.shared.config.early_resolve {
            tokio::select! {
                _ = sleep(window) => {}
                _ = &mut notified => debug!("Every prompted player voted, closing the window"),
            }
        } else {
            sleep(window).await;
        }

        self.resolve_phase();
    }

    fn resolve_phase(&self) {
        let mut guard = self.lock();
        let state = &mut *guard;
        let voters = state.eligible_voters(self.shared.config.werewolf_only_night);

        let message = match state.tally.resolve(&voters) {
            Outcome::Eliminated(username) => match state.eliminate(&username) {
                Ok(role) => GameMessage::Eliminated { username, role },
                Err(e) => {
                    error!("Could not eliminate {username}: {e}");
                    GameMessage::NoElimination
                }
            },
            Outcome::NoElimination => GameMessage::NoElimination,
        };
        info!("{message}");

        self.shared
            .broadcaster
            .send(state.registry.players(), &message, None);
    }

    /// Ends the game if a faction has been wiped out. Returns true if it did.
    fn end_if_decided(&self) -> bool {
        let mut state = self.lock();
        let Some(winner) = get_winner(&state.registry) else {
            return false;
        };

        let message = GameMessage::GameEnded { winner };
        info!("{message}");
        self.shared
            .broadcaster
            .send(state.registry.players(), &message, None);
        state.phase = GamePhase::Ended;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Registers each player with a role, then eliminates those marked dead
    fn registry_of(players: &[(&str, Role, bool)]) -> LocalPlayerRegistry {
        let mut registry = LocalPlayerRegistry::new();
        for (name, role, is_alive) in players {
            registry.connect(name).unwrap();
            registry.assign_role(name, *role).unwrap();
            if !is_alive {
                registry.mark_eliminated(name).unwrap();
            }
        }
        registry
    }

    fn slow_config(quorum: usize) -> GameConfig {
        GameConfig {
            quorum,
            grace_period: Duration::from_secs(3600),
            ..GameConfig::default()
        }
    }

    #[test]
    fn no_winner_while_both_factions_live() {
        let registry = registry_of(&[("w", Role::Werewolf, true), ("v", Role::Villager, true)]);
        assert_eq!(get_winner(&registry), None);
    }

    #[test]
    fn villagers_win_when_werewolves_are_gone() {
        let registry = registry_of(&[("w", Role::Werewolf, false), ("v", Role::Villager, true)]);
        assert_eq!(get_winner(&registry), Some(Role::Villager));
    }

    #[test]
    fn werewolves_win_when_villagers_are_gone() {
        let registry = registry_of(&[("w", Role::Werewolf, true), ("v", Role::Villager, false)]);
        assert_eq!(get_winner(&registry), Some(Role::Werewolf));
    }

    #[test]
    fn werewolves_take_a_double_wipeout() {
        let registry = registry_of(&[("w", Role::Werewolf, false), ("v", Role::Villager, false)]);
        assert_eq!(get_winner(&registry), Some(Role::Werewolf));
    }

    #[test]
    fn late_joiners_do_not_keep_a_faction_alive() {
        let mut registry =
            registry_of(&[("w", Role::Werewolf, true), ("v", Role::Villager, false)]);
        registry.connect("late").unwrap();
        assert_eq!(get_winner(&registry), Some(Role::Werewolf));
    }

    #[tokio::test]
    async fn duplicate_connect_is_rejected() {
        let game = Game::new(slow_config(10));
        game.connect("mira").unwrap();

        assert_eq!(
            game.connect("mira"),
            Err(GameError::UsernameTaken(String::from("mira")))
        );
        assert_eq!(game.players().len(), 1);
    }

    #[tokio::test]
    async fn waiting_until_quorum() {
        let game = Game::new(slow_config(3));
        game.connect("a").unwrap();
        game.connect("b").unwrap();
        assert_eq!(game.phase(), GamePhase::Waiting);

        game.connect("c").unwrap();
        assert_eq!(game.phase(), GamePhase::RoleAssignment);
        assert_eq!(game.games_started(), 1);

        game.connect("d").unwrap();
        assert_eq!(game.games_started(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_connects_start_one_game() {
        let game = Game::new(slow_config(4));
        let connects = (0..32)
            .map(|i| {
                let game = game.clone();
                tokio::spawn(async move { game.connect(&format!("player{i}")) })
            })
            .collect::<Vec<_>>();
        for connect in connects {
            connect.await.unwrap().unwrap();
        }

        assert_eq!(game.players().len(), 32);
        assert_eq!(game.games_started(), 1);
    }

    #[tokio::test]
    async fn subscribe_requires_a_registered_player() {
        let game = Game::new(slow_config(4));
        assert!(matches!(
            game.subscribe("ghost"),
            Err(GameError::UnknownPlayer(_))
        ));

        game.connect("mira").unwrap();
        assert!(game.subscribe("mira").is_ok());
    }

    #[tokio::test]
    async fn votes_for_outsiders_are_dropped() {
        let game = Game::new(slow_config(4));
        game.connect("mira").unwrap();
        game.submit_vote("mira", "ghost");
        game.submit_vote("mira", "mira");

        assert!(game.lock().tally.is_empty());
    }

    #[tokio::test]
    async fn disconnect_requires_a_registered_player() {
        let game = Game::new(slow_config(4));
        assert_eq!(
            game.disconnect("ghost"),
            Err(GameError::UnknownPlayer(String::from("ghost")))
        );

        game.connect("mira").unwrap();
        assert_eq!(game.disconnect("mira"), Ok(()));
        assert_eq!(game.players().len(), 1);
    }

    #[tokio::test]
    async fn disconnect_ends_a_live_stream() {
        let game = Game::new(slow_config(4));
        game.connect("mira").unwrap();
        let mut messages = game.subscribe("mira").unwrap();

        game.disconnect("mira").unwrap();
        assert_eq!(messages.recv().await, None);
    }
}
