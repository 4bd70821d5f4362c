use std::collections::{HashMap, HashSet};

use log::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Eliminated(String),
    NoElimination,
}

/// Ballots for the currently open voting window. One ballot per voter, last vote wins.
///
/// Every window is a numbered round. `open_round` discards whatever was left behind and
/// `resolve` closes the window, so ballots arriving between two windows never leak into the
/// next one.
#[derive(Debug)]
pub struct VoteTally {
    votes: HashMap<String, String>,
    round: u64,
    is_open: bool,
}

impl Default for VoteTally {
    fn default() -> Self {
        VoteTally::new()
    }
}

impl VoteTally {
    pub fn new() -> VoteTally {
        VoteTally {
            votes: HashMap::new(),
            round: 0,
            is_open: true,
        }
    }

    pub fn open_round(&mut self) -> u64 {
        self.round += 1;
        self.votes.clear();
        self.is_open = true;
        self.round
    }

    /// Returns false when no window is open and the ballot was ignored
    pub fn submit_vote(&mut self, voter: &str, votee: &str) -> bool {
        if !self.is_open {
            return false;
        }
        self.votes.insert(voter.to_string(), votee.to_string());
        true
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.votes.contains_key(voter)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Plurality over ballots cast by `alive_voters`. Ties and empty tallies eliminate nobody.
    /// The tally is always emptied and the window closed.
    pub fn resolve(&mut self, alive_voters: &HashSet<String>) -> Outcome {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (voter, votee) in self.votes.iter() {
            if alive_voters.contains(voter) {
                *counts.entry(votee.as_str()).or_insert(0) += 1;
            }
        }
        debug!("Round {} votes: {:?}", self.round, counts);

        let max_votes = counts.values().copied().max().unwrap_or(0);
        let mut candidates = counts
            .iter()
            .filter(|(_, count)| **count == max_votes)
            .map(|(votee, _)| *votee);

        let outcome = match (candidates.next(), candidates.next()) {
            (Some(votee), None) => Outcome::Eliminated(votee.to_string()),
            _ => Outcome::NoElimination,
        };

        self.votes.clear();
        self.is_open = false;
        outcome
    }
}
