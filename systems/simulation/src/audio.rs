//! Optional audio capability driven by world events.

use lawn_defence_core::Event;

/// Sound the presentation layer may play in response to a world event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A defender was planted.
    Plant,
    /// A projectile struck an attacker.
    ProjectileHit,
    /// An area charge began its explosion.
    Explosion,
    /// An attacker crossed the left boundary.
    Scream,
    /// Start the looping chomp sound.
    ChompLoopStart,
    /// Stop the looping chomp sound.
    ChompLoopStop,
    /// A level was cleared or the game was won.
    Victory,
    /// The last life was lost.
    Lose,
    /// Background music restarts after a reset.
    MusicRestart,
}

/// Receives cues from the simulation clock.
///
/// Sinks are handed to the clock once at construction; a clock without a sink
/// simply drops cues.
pub trait AudioCues {
    /// Plays the provided cue.
    fn play(&mut self, cue: AudioCue);
}

/// Maps a world event onto the cue it triggers, if any.
#[must_use]
pub fn cue_for(event: &Event) -> Option<AudioCue> {
    match event {
        Event::PlantPlaced { .. } => Some(AudioCue::Plant),
        Event::ProjectileHit { .. } => Some(AudioCue::ProjectileHit),
        Event::ExplosionTriggered { .. } => Some(AudioCue::Explosion),
        Event::AttackerReachedBoundary { .. } => Some(AudioCue::Scream),
        Event::ChompLoopStarted => Some(AudioCue::ChompLoopStart),
        Event::ChompLoopStopped => Some(AudioCue::ChompLoopStop),
        Event::LevelAdvanced { .. } | Event::Victory => Some(AudioCue::Victory),
        Event::Defeat => Some(AudioCue::Lose),
        Event::GameReset => Some(AudioCue::MusicRestart),
        Event::GameStarted
        | Event::TimeAdvanced { .. }
        | Event::PlantRejected { .. }
        | Event::AttackerSpawned { .. }
        | Event::ProjectileFired { .. }
        | Event::AttackerEnraged { .. }
        | Event::AttackerKilled { .. }
        | Event::RewardApplied { .. }
        | Event::TargetLocked { .. }
        | Event::AttackAbandoned { .. }
        | Event::DefenderDied { .. }
        | Event::ExplosionCompleted { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawn_defence_core::{AttackerId, CellCoord, DefenderId, DefenderKind};

    #[test]
    fn planting_and_hits_have_cues() {
        assert_eq!(
            cue_for(&Event::PlantPlaced {
                defender: DefenderId::new(0),
                kind: DefenderKind::Shooter,
                cell: CellCoord::new(0, 0),
            }),
            Some(AudioCue::Plant)
        );
        assert_eq!(
            cue_for(&Event::AttackerReachedBoundary {
                attacker: AttackerId::new(3),
                lives_remaining: 2,
            }),
            Some(AudioCue::Scream)
        );
    }

    #[test]
    fn bookkeeping_events_are_silent() {
        assert_eq!(cue_for(&Event::GameStarted), None);
        assert_eq!(
            cue_for(&Event::AttackerKilled {
                attacker: AttackerId::new(1),
                kind: lawn_defence_core::AttackerKind::Basic,
            }),
            None
        );
    }
}
