use rand::{seq::SliceRandom, Rng};

use super::player::Role;

/// One werewolf per four players, never fewer than one
pub fn werewolf_count(player_count: usize) -> usize {
    (player_count / 4).max(1)
}

/// Picks `werewolf_count` werewolves uniformly at random, everybody else is a villager.
/// The result is in the same order as `usernames`.
pub fn assign_roles<R: Rng + ?Sized>(usernames: &[String], rng: &mut R) -> Vec<(String, Role)> {
    let count = werewolf_count(usernames.len()).min(usernames.len());
    let werewolves = usernames
        .choose_multiple(rng, count)
        .collect::<Vec<_>>();

    usernames
        .iter()
        .map(|u| {
            let role = if werewolves.contains(&u) {
                Role::Werewolf
            } else {
                Role::Villager
            };
            (u.clone(), role)
        })
        .collect()
}
