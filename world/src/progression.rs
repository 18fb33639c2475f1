//! Session counters and the level/victory/defeat decision.

use lawn_defence_core::{GamePhase, Rules};

/// Counters replaced wholesale at level advance and reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GameState {
    pub(crate) lives: u32,
    pub(crate) kills: u32,
    pub(crate) level: u32,
    pub(crate) phase: GamePhase,
    pub(crate) attackers_spawned: u32,
    pub(crate) chomping: bool,
}

impl GameState {
    /// Fresh session sitting on the title screen.
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            phase: GamePhase::NotStarted,
            ..Self::for_level(1, rules)
        }
    }

    /// Counters for a level that is being played from its start.
    pub(crate) fn for_level(level: u32, rules: &Rules) -> Self {
        Self {
            lives: rules.starting_lives,
            kills: 0,
            level,
            phase: GamePhase::Playing,
            attackers_spawned: 0,
            chomping: false,
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub(crate) fn quota_reached(&self, rules: &Rules) -> bool {
        self.kills >= rules.kill_quota
    }

    pub(crate) fn record_kill(&mut self) {
        self.kills = self.kills.saturating_add(1);
    }

    /// Removes one life and returns how many remain.
    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub(crate) fn gain_life(&mut self, cap: u32) {
        self.lives = self.lives.saturating_add(1).min(cap.max(self.lives));
    }
}

/// Outcome of the end-of-tick transition check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    Continue,
    AdvanceTo(u32),
    Victory,
    Defeat,
}

/// Decides what happens once every removal of the tick has been applied.
///
/// Meeting the quota takes precedence over running out of lives in the same
/// tick.
pub(crate) fn check_transition(state: &GameState, rules: &Rules) -> Transition {
    if !state.is_playing() {
        return Transition::Continue;
    }

    if state.quota_reached(rules) {
        if state.level >= rules.final_level {
            Transition::Victory
        } else {
            Transition::AdvanceTo(state.level + 1)
        }
    } else if state.lives == 0 {
        Transition::Defeat
    } else {
        Transition::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_below_final_level_advances() {
        let rules = Rules::default();
        let mut state = GameState::for_level(2, &rules);
        state.kills = rules.kill_quota;

        assert_eq!(check_transition(&state, &rules), Transition::AdvanceTo(3));
    }

    #[test]
    fn quota_on_final_level_is_victory() {
        let rules = Rules::default();
        let mut state = GameState::for_level(3, &rules);
        state.kills = rules.kill_quota + 2;

        assert_eq!(check_transition(&state, &rules), Transition::Victory);
    }

    #[test]
    fn quota_wins_over_defeat_in_the_same_tick() {
        let rules = Rules::default();
        let mut state = GameState::for_level(1, &rules);
        state.kills = rules.kill_quota;
        state.lives = 0;

        assert_eq!(check_transition(&state, &rules), Transition::AdvanceTo(2));
    }

    #[test]
    fn zero_lives_is_defeat() {
        let rules = Rules::default();
        let mut state = GameState::for_level(1, &rules);
        for _ in 0..rules.starting_lives {
            let _ = state.lose_life();
        }

        assert_eq!(state.lose_life(), 0, "lives never underflow");
        assert_eq!(check_transition(&state, &rules), Transition::Defeat);
    }

    #[test]
    fn finished_sessions_never_transition() {
        let rules = Rules::default();
        let mut state = GameState::for_level(1, &rules);
        state.phase = GamePhase::GameOver;
        state.lives = 0;

        assert_eq!(check_transition(&state, &rules), Transition::Continue);
    }

    #[test]
    fn extra_lives_are_capped() {
        let rules = Rules::default();
        let mut state = GameState::for_level(1, &rules);
        for _ in 0..20 {
            state.gain_life(rules.max_lives);
        }
        assert_eq!(state.lives, rules.max_lives);
    }
}
