//! Collision detection and damage resolution between projectiles, defenders
//! and attackers.

use lawn_defence_core::{Aabb, AttackerId, AttackerKind, DefenderId, Event, Rules};
use tracing::{debug, trace};

use crate::{
    economy::{self, Economy},
    entities::{AttackerEvent, DamageOutcome, DefenderEvent},
    progression::GameState,
    registry::EntityRegistry,
};

/// Mutable view over the state touched by the combat passes of one tick.
///
/// Every removal is recorded through the registry's deferred list; nothing is
/// dropped until the world reaps after the passes.
pub(crate) struct CombatResolver<'a> {
    registry: &'a mut EntityRegistry,
    state: &'a mut GameState,
    economy: &'a mut Economy,
    rules: &'a Rules,
}

impl<'a> CombatResolver<'a> {
    pub(crate) fn new(
        registry: &'a mut EntityRegistry,
        state: &'a mut GameState,
        economy: &'a mut Economy,
        rules: &'a Rules,
    ) -> Self {
        Self {
            registry,
            state,
            economy,
            rules,
        }
    }

    /// Runs the projectile, attacker and defender passes in order. Once the
    /// kill quota is met the remaining passes are skipped so the level
    /// transition wins over continued play.
    pub(crate) fn resolve(&mut self, out: &mut Vec<Event>) {
        self.resolve_projectiles(out);
        if self.quota_reached() {
            return;
        }
        self.resolve_attackers(out);
        if self.quota_reached() {
            return;
        }
        self.update_defenders(out);
    }

    fn quota_reached(&self) -> bool {
        self.state.quota_reached(self.rules)
    }

    fn resolve_projectiles(&mut self, out: &mut Vec<Event>) {
        for projectile_id in self.registry.projectiles.live_keys() {
            if self.quota_reached() {
                break;
            }

            let Some(projectile) = self.registry.projectiles.live_mut(projectile_id) else {
                continue;
            };
            if !projectile.advance() {
                self.registry.projectiles.mark_for_removal(projectile_id);
                continue;
            }
            let bounds = projectile.bounds();
            let damage = projectile.damage();

            let struck = self
                .registry
                .attackers
                .iter_live()
                .find(|(_, attacker)| attacker.bounds().intersects(&bounds))
                .map(|(id, _)| id);
            let Some(attacker_id) = struck else {
                continue;
            };

            self.registry.projectiles.mark_for_removal(projectile_id);
            out.push(Event::ProjectileHit {
                projectile: projectile_id,
                attacker: attacker_id,
            });

            let Some(attacker) = self.registry.attackers.live_mut(attacker_id) else {
                continue;
            };
            match attacker.take_damage(damage) {
                DamageOutcome::Wounded => {}
                DamageOutcome::Enraged => {
                    debug!(attacker = attacker_id.get(), "attacker enraged");
                    out.push(Event::AttackerEnraged {
                        attacker: attacker_id,
                    });
                }
                DamageOutcome::Killed => {
                    let kind = attacker.kind();
                    let reward = attacker.reward();
                    self.score_kill(attacker_id, kind, out);
                    if let Some(reward) = reward {
                        economy::apply_reward(
                            reward,
                            self.economy,
                            self.state,
                            self.registry,
                            self.rules,
                        );
                        debug!(attacker = attacker_id.get(), ?reward, "reward applied");
                        out.push(Event::RewardApplied {
                            attacker: attacker_id,
                            reward,
                        });
                    }
                }
            }
        }
    }

    fn resolve_attackers(&mut self, out: &mut Vec<Event>) {
        for attacker_id in self.registry.attackers.live_keys() {
            let Some(attacker) = self.registry.attackers.live_mut(attacker_id) else {
                continue;
            };

            match attacker.advance(&self.registry.defenders) {
                AttackerEvent::Idle => {}
                AttackerEvent::ReachedBoundary => {
                    self.registry.attackers.mark_for_removal(attacker_id);
                    let lives_remaining = self.state.lose_life();
                    debug!(
                        attacker = attacker_id.get(),
                        lives_remaining, "attacker reached the left boundary"
                    );
                    out.push(Event::AttackerReachedBoundary {
                        attacker: attacker_id,
                        lives_remaining,
                    });
                }
                AttackerEvent::TargetLocked(defender) => {
                    trace!(
                        attacker = attacker_id.get(),
                        defender = defender.get(),
                        "target locked"
                    );
                    out.push(Event::TargetLocked {
                        attacker: attacker_id,
                        defender,
                    });
                }
                AttackerEvent::TargetLost => {
                    out.push(Event::AttackAbandoned {
                        attacker: attacker_id,
                    });
                }
                AttackerEvent::Strike { target, damage } => {
                    let Some(defender) = self.registry.defenders.live_mut(target) else {
                        continue;
                    };
                    if defender.take_damage(damage) {
                        let cell = defender.cell();
                        attacker.release_target();
                        self.registry.defenders.mark_for_removal(target);
                        debug!(defender = target.get(), ?cell, "defender died");
                        out.push(Event::DefenderDied {
                            defender: target,
                            cell,
                        });
                    }
                }
            }
        }
    }

    fn update_defenders(&mut self, out: &mut Vec<Event>) {
        let level = self.state.level;
        for defender_id in self.registry.defenders.live_keys() {
            if self.quota_reached() {
                break;
            }

            let Some(defender) = self.registry.defenders.live_mut(defender_id) else {
                continue;
            };

            match defender.update(level) {
                DefenderEvent::Idle => {}
                DefenderEvent::SpawnedProjectile(projectile) => {
                    let projectile = self.registry.insert_projectile(projectile);
                    out.push(Event::ProjectileFired {
                        projectile,
                        defender: defender_id,
                    });
                }
                DefenderEvent::Exploding => {
                    debug!(defender = defender_id.get(), "explosion triggered");
                    out.push(Event::ExplosionTriggered {
                        defender: defender_id,
                    });
                }
                DefenderEvent::ExplosionComplete(area) => self.detonate(defender_id, area, out),
            }
        }
    }

    /// Destroys every attacker overlapping `area` and retires the charge.
    fn detonate(&mut self, defender_id: DefenderId, area: Aabb, out: &mut Vec<Event>) {
        let victims: Vec<(AttackerId, AttackerKind)> = self
            .registry
            .attackers
            .iter_live()
            .filter(|(_, attacker)| attacker.bounds().intersects(&area))
            .map(|(id, attacker)| (id, attacker.kind()))
            .collect();

        for (attacker_id, kind) in &victims {
            self.score_kill(*attacker_id, *kind, out);
        }

        self.registry.defenders.mark_for_removal(defender_id);
        let kills = u32::try_from(victims.len()).unwrap_or(u32::MAX);
        debug!(defender = defender_id.get(), kills, "explosion completed");
        out.push(Event::ExplosionCompleted {
            defender: defender_id,
            kills,
        });
    }

    fn score_kill(&mut self, attacker_id: AttackerId, kind: AttackerKind, out: &mut Vec<Event>) {
        self.registry.attackers.mark_for_removal(attacker_id);
        self.state.record_kill();
        trace!(
            attacker = attacker_id.get(),
            kills = self.state.kills,
            "attacker killed"
        );
        out.push(Event::AttackerKilled {
            attacker: attacker_id,
            kind,
        });
    }
}
