//! Defender, attacker and projectile state machines.
//!
//! Each entity advances itself once per tick and reports what happened through
//! a closed event type. The combat resolver owns every consequence that
//! reaches beyond the entity itself.

use glam::Vec2;
use lawn_defence_core::{
    Aabb, AttackerBehavior, AttackerId, AttackerKind, AttackerSnapshot, CellCoord,
    DefenderDetail, DefenderId, DefenderKind, DefenderSnapshot, Lane, ProjectileId,
    ProjectileSnapshot, RewardKind, ATTACKER_ENTRY_X, PLAYFIELD_WIDTH,
};

use crate::registry::Slots;

pub(crate) const SHOOTER_HEALTH: f32 = 300.0;
pub(crate) const SHOOTER_COOLDOWN_TICKS: u32 = 30;
const PROJECTILE_MUZZLE_OFFSET: f32 = 30.0;

const ARMING_FRAMES: u32 = 7;
const ARMING_FRAME_TICKS: u32 = 4;
const EXPLOSION_GROWTH: f32 = 10.0;
const EXPLOSION_MAX_SIZE: f32 = 160.0;
const EXPLOSION_MARGIN: f32 = 20.0;

pub(crate) const ATTACK_PREPARATION_TICKS: u32 = 30;
pub(crate) const ATTACK_CADENCE_TICKS: u32 = 60;
const ENRAGE_THRESHOLD_RATIO: f32 = 0.5;

const PROJECTILE_SPEED: f32 = 5.0;
const PROJECTILE_BASE_DAMAGE: f32 = 5.0;
const PROJECTILE_SIZE: Vec2 = Vec2::new(28.0, 28.0);

/// Outcome of a defender's self-update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DefenderEvent {
    Idle,
    SpawnedProjectile(Projectile),
    Exploding,
    /// The explosion reached full size; attackers inside the area die.
    ExplosionComplete(Aabb),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DefenderState {
    Shooter {
        health: f32,
        cooldown: u32,
        cooldown_max: u32,
    },
    AreaCharge(ChargePhase),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ChargePhase {
    Arming { frame: u32, counter: u32 },
    Exploding { size: f32 },
    Spent,
}

/// Stationary defender occupying one grid cell.
#[derive(Clone, Debug)]
pub(crate) struct Defender {
    kind: DefenderKind,
    cell: CellCoord,
    position: Vec2,
    state: DefenderState,
}

impl Defender {
    pub(crate) fn plant(kind: DefenderKind, cell: CellCoord) -> Self {
        let state = match kind {
            DefenderKind::Shooter => DefenderState::Shooter {
                health: SHOOTER_HEALTH,
                cooldown: 0,
                cooldown_max: SHOOTER_COOLDOWN_TICKS,
            },
            DefenderKind::AreaCharge => {
                DefenderState::AreaCharge(ChargePhase::Arming { frame: 0, counter: 0 })
            }
        };
        Self {
            kind,
            cell,
            position: cell.center(),
            state,
        }
    }

    pub(crate) fn kind(&self) -> DefenderKind {
        self.kind
    }

    pub(crate) fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.kind.sprite_size())
    }

    /// Applies incoming damage and reports whether the defender died.
    /// Area charges never take damage.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        match &mut self.state {
            DefenderState::Shooter { health, .. } => {
                *health = (*health - amount).max(0.0);
                *health <= 0.0
            }
            DefenderState::AreaCharge(_) => false,
        }
    }

    /// Shortens the shooter's cooldown, never below `floor`.
    pub(crate) fn boost_fire_rate(&mut self, by: u32, floor: u32) {
        if let DefenderState::Shooter { cooldown_max, .. } = &mut self.state {
            *cooldown_max = cooldown_max.saturating_sub(by).max(floor);
        }
    }

    pub(crate) fn update(&mut self, level: u32) -> DefenderEvent {
        let cell = self.cell;
        let muzzle = self.position + Vec2::new(PROJECTILE_MUZZLE_OFFSET, 0.0);
        match &mut self.state {
            DefenderState::Shooter {
                cooldown,
                cooldown_max,
                ..
            } => {
                *cooldown = cooldown.saturating_sub(1);
                if *cooldown == 0 {
                    *cooldown = *cooldown_max;
                    return DefenderEvent::SpawnedProjectile(Projectile::fired_from(
                        muzzle, level,
                    ));
                }
                DefenderEvent::Idle
            }
            DefenderState::AreaCharge(phase) => match *phase {
                ChargePhase::Arming { frame, counter } => {
                    let mut frame = frame;
                    let mut counter = counter + 1;
                    if counter >= ARMING_FRAME_TICKS {
                        counter = 0;
                        frame += 1;
                    }
                    if frame >= ARMING_FRAMES - 1 {
                        *phase = ChargePhase::Exploding { size: 0.0 };
                        DefenderEvent::Exploding
                    } else {
                        *phase = ChargePhase::Arming { frame, counter };
                        DefenderEvent::Idle
                    }
                }
                ChargePhase::Exploding { size } => {
                    let size = size + EXPLOSION_GROWTH;
                    if size >= EXPLOSION_MAX_SIZE {
                        *phase = ChargePhase::Spent;
                        DefenderEvent::ExplosionComplete(cell.bounds().expanded(EXPLOSION_MARGIN))
                    } else {
                        *phase = ChargePhase::Exploding { size };
                        DefenderEvent::Idle
                    }
                }
                ChargePhase::Spent => DefenderEvent::Idle,
            },
        }
    }

    pub(crate) fn snapshot(&self, id: DefenderId) -> DefenderSnapshot {
        let detail = match self.state {
            DefenderState::Shooter {
                health,
                cooldown,
                cooldown_max,
            } => DefenderDetail::Shooter {
                health,
                cooldown,
                cooldown_max,
            },
            DefenderState::AreaCharge(ChargePhase::Arming { frame, .. }) => {
                DefenderDetail::AreaCharge {
                    arming_frame: frame,
                    exploded: false,
                    explosion_size: 0.0,
                }
            }
            DefenderState::AreaCharge(ChargePhase::Exploding { size }) => {
                DefenderDetail::AreaCharge {
                    arming_frame: ARMING_FRAMES - 1,
                    exploded: true,
                    explosion_size: size,
                }
            }
            DefenderState::AreaCharge(ChargePhase::Spent) => DefenderDetail::AreaCharge {
                arming_frame: ARMING_FRAMES - 1,
                exploded: true,
                explosion_size: EXPLOSION_MAX_SIZE,
            },
        };
        DefenderSnapshot {
            id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            detail,
        }
    }
}

/// Outcome of an attacker's update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum AttackerEvent {
    Idle,
    ReachedBoundary,
    TargetLocked(DefenderId),
    TargetLost,
    Strike { target: DefenderId, damage: f32 },
}

/// Result of damage delivered to an attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Wounded,
    /// The hit was absorbed by the switch to enraged figures.
    Enraged,
    Killed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Behavior {
    Walking,
    Preparing { remaining: u32 },
    Attacking { cadence: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Enrage {
    speed: f32,
    damage: f32,
    active: bool,
}

/// Mobile attacker walking right to left along a lane.
#[derive(Clone, Debug)]
pub(crate) struct Attacker {
    kind: AttackerKind,
    lane: Lane,
    position: Vec2,
    health: f32,
    damage: f32,
    speed: f32,
    enrage: Option<Enrage>,
    behavior: Behavior,
    target: Option<DefenderId>,
    reward: Option<RewardKind>,
}

impl Attacker {
    /// Creates an attacker at the right edge of its lane with level-scaled figures.
    pub(crate) fn spawn(
        kind: AttackerKind,
        lane: Lane,
        reward: Option<RewardKind>,
        level: u32,
    ) -> Self {
        let stats = kind.stats();
        let steps = level.saturating_sub(1) as f32;
        let strength = 1.0 + steps * 0.2;
        let pace = 0.8 + steps * 0.1;
        Self {
            kind,
            lane,
            position: Vec2::new(ATTACKER_ENTRY_X, lane.center_y()),
            health: stats.health * strength,
            damage: stats.damage * strength,
            speed: stats.speed * pace,
            enrage: stats.enraged.map(|enraged| Enrage {
                speed: enraged.speed * strength,
                damage: enraged.damage * strength,
                active: false,
            }),
            behavior: Behavior::Walking,
            target: None,
            reward,
        }
    }

    pub(crate) fn kind(&self) -> AttackerKind {
        self.kind
    }

    pub(crate) fn reward(&self) -> Option<RewardKind> {
        self.reward
    }

    pub(crate) fn behavior(&self) -> AttackerBehavior {
        match self.behavior {
            Behavior::Walking => AttackerBehavior::Walking,
            Behavior::Preparing { .. } => AttackerBehavior::AttackPreparing,
            Behavior::Attacking { .. } => AttackerBehavior::Attacking,
        }
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.kind.stats().size)
    }

    /// Applies projectile damage.
    ///
    /// An intact enrageable attacker whose health would drop to or below half
    /// of its class's base health switches to its enraged figures instead, and
    /// the triggering hit is absorbed by the switch.
    pub(crate) fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        let threshold = self.kind.stats().health * ENRAGE_THRESHOLD_RATIO;
        if let Some(enrage) = self.enrage.as_mut() {
            if !enrage.active && self.health - amount <= threshold {
                enrage.active = true;
                self.speed = enrage.speed;
                self.damage = enrage.damage;
                return DamageOutcome::Enraged;
            }
        }

        self.health -= amount;
        if self.health <= 0.0 {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Drops the current target and resumes walking.
    pub(crate) fn release_target(&mut self) {
        self.target = None;
        self.behavior = Behavior::Walking;
    }

    pub(crate) fn advance(&mut self, defenders: &Slots<DefenderId, Defender>) -> AttackerEvent {
        match self.behavior {
            Behavior::Walking => self.walk(defenders),
            Behavior::Preparing { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.behavior = if remaining == 0 {
                    Behavior::Attacking {
                        cadence: ATTACK_CADENCE_TICKS,
                    }
                } else {
                    Behavior::Preparing { remaining }
                };
                AttackerEvent::Idle
            }
            Behavior::Attacking { cadence } => {
                let target = self.target.filter(|id| {
                    defenders
                        .live(*id)
                        .map_or(false, |defender| defender.kind().is_targetable())
                });
                let Some(target) = target else {
                    self.release_target();
                    return AttackerEvent::TargetLost;
                };

                let cadence = cadence.saturating_sub(1);
                if cadence == 0 {
                    self.behavior = Behavior::Attacking {
                        cadence: ATTACK_CADENCE_TICKS,
                    };
                    AttackerEvent::Strike {
                        target,
                        damage: self.damage,
                    }
                } else {
                    self.behavior = Behavior::Attacking { cadence };
                    AttackerEvent::Idle
                }
            }
        }
    }

    fn walk(&mut self, defenders: &Slots<DefenderId, Defender>) -> AttackerEvent {
        self.position.x -= self.speed;
        if self.position.x <= -self.kind.stats().size.x {
            return AttackerEvent::ReachedBoundary;
        }

        let bounds = self.bounds();
        let locked = defenders
            .iter_live()
            .filter(|(_, defender)| defender.kind().is_targetable())
            .find(|(_, defender)| defender.bounds().intersects(&bounds))
            .map(|(id, _)| id);

        match locked {
            Some(id) => {
                self.target = Some(id);
                self.behavior = Behavior::Preparing {
                    remaining: ATTACK_PREPARATION_TICKS,
                };
                AttackerEvent::TargetLocked(id)
            }
            None => AttackerEvent::Idle,
        }
    }

    pub(crate) fn snapshot(&self, id: AttackerId) -> AttackerSnapshot {
        AttackerSnapshot {
            id,
            kind: self.kind,
            lane: self.lane,
            position: self.position,
            health: self.health,
            speed: self.speed,
            damage: self.damage,
            behavior: self.behavior(),
            target: self.target,
            enraged: self.enrage.map_or(false, |enrage| enrage.active),
            reward: self.reward,
        }
    }

    #[cfg(test)]
    pub(crate) fn place_at(&mut self, x: f32) {
        self.position.x = x;
    }
}

/// Projectile travelling right along a row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Projectile {
    position: Vec2,
    damage: f32,
}

impl Projectile {
    pub(crate) fn fired_from(position: Vec2, level: u32) -> Self {
        Self {
            position,
            damage: PROJECTILE_BASE_DAMAGE + level.saturating_sub(1) as f32,
        }
    }

    pub(crate) fn damage(&self) -> f32 {
        self.damage
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::from_top_left(self.position, PROJECTILE_SIZE)
    }

    /// Moves the projectile and reports whether it is still inside the playfield.
    pub(crate) fn advance(&mut self) -> bool {
        self.position.x += PROJECTILE_SPEED;
        self.position.x <= PLAYFIELD_WIDTH
    }

    pub(crate) fn snapshot(&self, id: ProjectileId) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id,
            position: self.position,
            damage: self.damage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shooter_health_never_drops_below_zero() {
        let mut shooter = Defender::plant(DefenderKind::Shooter, CellCoord::new(0, 0));

        assert!(!shooter.take_damage(100.0));
        assert!(!shooter.take_damage(100.0));
        assert!(shooter.take_damage(150.0));

        match shooter.snapshot(DefenderId::new(0)).detail {
            DefenderDetail::Shooter { health, .. } => assert_eq!(health, 0.0),
            other => panic!("unexpected detail: {other:?}"),
        }
    }

    #[test]
    fn area_charge_is_invulnerable() {
        let mut charge = Defender::plant(DefenderKind::AreaCharge, CellCoord::new(1, 1));
        assert!(!charge.take_damage(10_000.0));
    }

    #[test]
    fn shooter_fires_on_first_update_then_waits_for_cooldown() {
        let mut shooter = Defender::plant(DefenderKind::Shooter, CellCoord::new(0, 0));

        let first = shooter.update(1);
        let DefenderEvent::SpawnedProjectile(projectile) = first else {
            panic!("expected a projectile, got {first:?}");
        };
        assert_eq!(projectile.bounds().min(), Vec2::new(110.0, 180.0));

        for _ in 1..SHOOTER_COOLDOWN_TICKS {
            assert_eq!(shooter.update(1), DefenderEvent::Idle);
        }
        assert!(matches!(
            shooter.update(1),
            DefenderEvent::SpawnedProjectile(_)
        ));
    }

    #[test]
    fn fire_rate_boost_is_floored() {
        let mut shooter = Defender::plant(DefenderKind::Shooter, CellCoord::new(0, 0));
        for _ in 0..5 {
            shooter.boost_fire_rate(5, 15);
        }
        match shooter.snapshot(DefenderId::new(0)).detail {
            DefenderDetail::Shooter { cooldown_max, .. } => assert_eq!(cooldown_max, 15),
            other => panic!("unexpected detail: {other:?}"),
        }
    }

    #[test]
    fn area_charge_arms_then_explodes_over_its_cell() {
        let cell = CellCoord::new(2, 1);
        let mut charge = Defender::plant(DefenderKind::AreaCharge, cell);
        let mut ticks = 0;

        loop {
            ticks += 1;
            if charge.update(1) == DefenderEvent::Exploding {
                break;
            }
            assert!(ticks < 100, "charge never armed");
        }
        assert_eq!(ticks, 24);

        let mut growth_ticks = 0;
        let area = loop {
            growth_ticks += 1;
            if let DefenderEvent::ExplosionComplete(area) = charge.update(1) {
                break area;
            }
            assert!(growth_ticks < 100, "explosion never completed");
        };
        assert_eq!(growth_ticks, 16);
        assert_eq!(area.min(), Vec2::new(300.0, 220.0));
        assert_eq!(area.max(), Vec2::new(500.0, 380.0));
    }

    #[test]
    fn attackers_scale_with_level() {
        let first = Attacker::spawn(AttackerKind::Basic, Lane::new(0), None, 1);
        let third = Attacker::spawn(AttackerKind::Basic, Lane::new(0), None, 3);

        let first = first.snapshot(AttackerId::new(0));
        let third = third.snapshot(AttackerId::new(1));
        assert_eq!(first.health, 150.0);
        assert!((third.health - 210.0).abs() < 1e-3);
        assert!((third.damage - 140.0).abs() < 1e-3);
        assert!((first.speed - 0.64).abs() < 1e-6);
        assert!((third.speed - 0.8).abs() < 1e-6);
    }

    #[test]
    fn enrageable_switches_once_and_absorbs_the_triggering_hit() {
        let mut attacker = Attacker::spawn(AttackerKind::Enrageable, Lane::new(1), None, 1);
        let enraged = AttackerKind::Enrageable.stats().enraged.expect("enraged stats");

        for _ in 0..14 {
            assert_eq!(attacker.take_damage(5.0), DamageOutcome::Wounded);
        }
        // 80 health left: the next hit would land on the 75 threshold.
        assert_eq!(attacker.take_damage(5.0), DamageOutcome::Enraged);
        let snapshot = attacker.snapshot(AttackerId::new(0));
        assert_eq!(snapshot.health, 80.0);
        assert!(snapshot.enraged);
        assert_eq!(snapshot.speed, enraged.speed);
        assert_eq!(snapshot.damage, enraged.damage);

        let mut outcomes = Vec::new();
        for _ in 0..16 {
            outcomes.push(attacker.take_damage(5.0));
        }
        assert!(!outcomes.contains(&DamageOutcome::Enraged));
        assert_eq!(outcomes.last(), Some(&DamageOutcome::Killed));
        assert_eq!(attacker.snapshot(AttackerId::new(0)).speed, enraged.speed);
    }

    #[test]
    fn basic_attacker_dies_after_thirty_level_one_hits() {
        let mut attacker = Attacker::spawn(AttackerKind::Basic, Lane::new(0), None, 1);
        let damage = Projectile::fired_from(Vec2::ZERO, 1).damage();

        for _ in 0..29 {
            assert_eq!(attacker.take_damage(damage), DamageOutcome::Wounded);
        }
        assert_eq!(attacker.take_damage(damage), DamageOutcome::Killed);
    }

    #[test]
    fn projectile_leaves_play_past_the_right_edge() {
        let mut projectile = Projectile::fired_from(Vec2::new(790.0, 180.0), 2);
        assert_eq!(projectile.damage(), 6.0);
        assert!(projectile.advance());
        assert!(projectile.advance());
        assert!(!projectile.advance());
    }
}
