//! Continuity between consecutive states of one session
//!
//! The engine is authoritative, but a snapshot that contradicts what the
//! player has already seen is repaired towards the earlier state: the roster
//! is fixed once known, the dead stay dead, the transcript and the round
//! summaries only grow, and the round number never goes backwards.

use std::collections::BTreeSet;

use super::game_state::{GameState, StateRepair};

impl GameState {
    /// Reconcile this state against the state it replaces.
    ///
    /// Has no effect across sessions or when `previous` has no roster yet.
    pub fn carry_forward(mut self, previous: &GameState) -> (Self, Vec<StateRepair>) {
        let mut repairs = Vec::new();
        if self.session.id != previous.session.id {
            return (self, repairs);
        }

        if !previous.characters.is_empty() {
            self.keep_roster(previous, &mut repairs);
        }

        for character in &mut self.characters {
            if character.alive && previous.is_alive(&character.name) == Some(false) {
                repairs.push(StateRepair::Resurrection(character.name.clone()));
                character.alive = false;
            }
        }
        self.rebuild_status_maps();

        if self.messages.len() < previous.messages.len() {
            repairs.push(StateRepair::TranscriptShrank {
                previous: previous.messages.len(),
                received: self.messages.len(),
            });
            self.messages = previous.messages.clone();
        }

        for (round, summary) in &previous.round_summaries {
            match self.round_summaries.get(round) {
                Some(current) if current.text == summary.text => {}
                Some(_) => {
                    repairs.push(StateRepair::RoundSummaryRewritten(*round));
                    self.round_summaries.insert(*round, summary.clone());
                }
                None => {
                    self.round_summaries.insert(*round, summary.clone());
                }
            }
        }

        if self.round_number < previous.round_number {
            repairs.push(StateRepair::RoundRegressed {
                previous: previous.round_number,
                received: self.round_number,
            });
            self.round_number = previous.round_number;
        }

        (self, repairs)
    }

    fn keep_roster(&mut self, previous: &GameState, repairs: &mut Vec<StateRepair>) {
        let known: BTreeSet<&str> = previous.characters.iter().map(|c| c.name.as_str()).collect();
        let received: BTreeSet<&str> = self.characters.iter().map(|c| c.name.as_str()).collect();
        if known == received {
            return;
        }

        let added = received
            .difference(&known)
            .map(|s| s.to_string())
            .collect();
        let missing = known
            .difference(&received)
            .map(|s| s.to_string())
            .collect();
        repairs.push(StateRepair::RosterChanged { added, missing });

        let characters = previous
            .characters
            .iter()
            .map(|prior| {
                self.character(&prior.name)
                    .cloned()
                    .unwrap_or_else(|| prior.clone())
            })
            .collect();
        self.characters = characters;
    }
}
