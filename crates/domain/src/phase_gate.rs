//! Phase gating of player actions
//!
//! A pure decision table from (phase, capabilities, target liveness) to the
//! set of actions the player may take. The same table backs both the action
//! affordances a view shows and the check run before dispatch, so the two
//! cannot disagree.
//!
//! | Phase      | Allowed                                        |
//! |------------|------------------------------------------------|
//! | Discussion | chat, one_on_one, suspect, advance             |
//! | Voting     | vote, suspect, advance (+ chat with capability) |
//! | Night      | nothing                                        |
//! | End        | nothing                                        |
//!
//! Targeted actions are further limited to living characters.

use std::collections::BTreeMap;

use crate::aggregates::{Capabilities, GameState};
use crate::error::ValidationError;
use crate::value_objects::{ActionKind, ActionSet, Phase};

/// Action gate for one reconciled state
#[derive(Debug, Clone, Copy)]
pub struct PhaseGate<'a> {
    phase: Phase,
    game_over: bool,
    capabilities: Capabilities,
    alive_by_name: &'a BTreeMap<String, bool>,
}

impl<'a> PhaseGate<'a> {
    pub fn new(
        phase: Phase,
        game_over: bool,
        capabilities: Capabilities,
        alive_by_name: &'a BTreeMap<String, bool>,
    ) -> Self {
        Self {
            phase,
            game_over,
            capabilities,
            alive_by_name,
        }
    }

    pub fn for_state(state: &'a GameState) -> Self {
        Self::new(
            state.phase(),
            state.is_game_over(),
            state.capabilities(),
            state.alive_by_name(),
        )
    }

    /// Whether the phase alone admits `kind`, ignoring any target.
    pub fn phase_permits(&self, kind: ActionKind) -> bool {
        if self.game_over {
            return false;
        }
        match self.phase {
            Phase::Night | Phase::End => false,
            Phase::Discussion => !matches!(kind, ActionKind::Vote),
            Phase::Voting => !kind.is_chat() || self.capabilities.chat_during_voting,
        }
    }

    /// Actions available now.
    ///
    /// With no target, targeted actions are listed when at least one living
    /// character could receive them. With a target, they are listed only if
    /// that character is alive.
    pub fn allowed_actions(&self, target: Option<&str>) -> ActionSet {
        ActionKind::ALL
            .into_iter()
            .filter(|kind| self.phase_permits(*kind))
            .filter(|kind| {
                if !kind.requires_target() {
                    return true;
                }
                match target {
                    Some(name) => self.alive_by_name.get(name).copied() == Some(true),
                    None => self.alive_by_name.values().any(|alive| *alive),
                }
            })
            .collect()
    }

    /// Check one action against the gate, naming the first rule it breaks.
    pub fn check(&self, kind: ActionKind, target: Option<&str>) -> Result<(), ValidationError> {
        if self.game_over {
            return Err(ValidationError::GameOver);
        }
        if !self.phase_permits(kind) {
            return Err(ValidationError::PhaseForbids {
                kind,
                phase: self.phase,
            });
        }
        if !kind.requires_target() {
            return Ok(());
        }
        let name = target.ok_or_else(|| ValidationError::missing_target(kind))?;
        match self.alive_by_name.get(name) {
            None => Err(ValidationError::UnknownTarget {
                name: name.to_string(),
            }),
            Some(false) => Err(ValidationError::DeadTarget {
                name: name.to_string(),
            }),
            Some(true) => Ok(()),
        }
    }
}

/// Permitted actions for a phase and liveness map, with default capabilities.
pub fn allowed_actions(
    phase: Phase,
    alive_by_name: &BTreeMap<String, bool>,
    target: Option<&str>,
) -> ActionSet {
    PhaseGate::new(
        phase,
        phase == Phase::End,
        Capabilities::default(),
        alive_by_name,
    )
    .allowed_actions(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BTreeMap<String, bool> {
        BTreeMap::from([
            ("Artist".to_string(), true),
            ("Chef".to_string(), true),
            ("Teacher".to_string(), false),
        ])
    }

    fn set(kinds: &[ActionKind]) -> ActionSet {
        kinds.iter().copied().collect()
    }

    #[test]
    fn discussion_allows_talk_and_suspicion() {
        assert_eq!(
            allowed_actions(Phase::Discussion, &table(), None),
            set(&[
                ActionKind::Chat,
                ActionKind::OneOnOne,
                ActionKind::Suspect,
                ActionKind::Advance
            ])
        );
    }

    #[test]
    fn voting_closes_chat_unless_capable() {
        let alive = table();
        assert_eq!(
            allowed_actions(Phase::Voting, &alive, None),
            set(&[ActionKind::Suspect, ActionKind::Vote, ActionKind::Advance])
        );

        let capable = Capabilities {
            chat_during_voting: true,
        };
        let gate = PhaseGate::new(Phase::Voting, false, capable, &alive);
        assert!(gate.allowed_actions(None).contains(&ActionKind::Chat));
        assert!(gate.allowed_actions(None).contains(&ActionKind::OneOnOne));
    }

    #[test]
    fn night_and_end_allow_nothing() {
        let alive = table();
        for phase in [Phase::Night, Phase::End] {
            assert!(allowed_actions(phase, &alive, None).is_empty());
            assert!(allowed_actions(phase, &alive, Some("Chef")).is_empty());
        }
    }

    #[test]
    fn night_never_allows_vote_suspect_or_chat() {
        let alive = table();
        let capable = Capabilities {
            chat_during_voting: true,
        };
        let gate = PhaseGate::new(Phase::Night, false, capable, &alive);
        for kind in [ActionKind::Vote, ActionKind::Suspect, ActionKind::Chat] {
            assert!(!gate.phase_permits(kind));
            assert!(matches!(
                gate.check(kind, Some("Chef")),
                Err(ValidationError::PhaseForbids { .. })
            ));
        }
    }

    #[test]
    fn dead_target_removes_targeted_actions() {
        let allowed = allowed_actions(Phase::Voting, &table(), Some("Teacher"));
        assert_eq!(allowed, set(&[ActionKind::Advance]));
    }

    #[test]
    fn check_reports_target_problems() {
        let alive = table();
        let gate = PhaseGate::new(Phase::Voting, false, Capabilities::default(), &alive);

        assert_eq!(
            gate.check(ActionKind::Vote, Some("Teacher")),
            Err(ValidationError::DeadTarget {
                name: "Teacher".into()
            })
        );
        assert_eq!(
            gate.check(ActionKind::Vote, Some("Mayor")),
            Err(ValidationError::UnknownTarget {
                name: "Mayor".into()
            })
        );
        assert_eq!(
            gate.check(ActionKind::Vote, None),
            Err(ValidationError::missing_target(ActionKind::Vote))
        );
        assert!(gate.check(ActionKind::Vote, Some("Chef")).is_ok());
    }

    #[test]
    fn nothing_is_allowed_once_the_game_is_over() {
        let alive = table();
        let gate = PhaseGate::new(Phase::Voting, true, Capabilities::default(), &alive);

        assert!(gate.allowed_actions(None).is_empty());
        assert_eq!(
            gate.check(ActionKind::Advance, None),
            Err(ValidationError::GameOver)
        );
    }

    #[test]
    fn targeted_actions_need_someone_alive() {
        let everyone_dead = BTreeMap::from([("Chef".to_string(), false)]);
        assert_eq!(
            allowed_actions(Phase::Discussion, &everyone_dead, None),
            set(&[ActionKind::Chat, ActionKind::Advance])
        );
    }
}
