#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lawn Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! collaborators (rendering, audio) to react to. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lawn Defence.";

/// Width of the playfield measured in pixels.
pub const PLAYFIELD_WIDTH: f32 = 800.0;
/// Height of the playfield measured in pixels.
pub const PLAYFIELD_HEIGHT: f32 = 600.0;
/// Number of plantable grid columns.
pub const GRID_COLUMNS: u32 = 5;
/// Number of plantable grid rows.
pub const GRID_ROWS: u32 = 5;
/// Width of a single grid cell in pixels.
pub const CELL_WIDTH: f32 = 160.0;
/// Height of a single grid cell in pixels.
pub const CELL_HEIGHT: f32 = 120.0;
/// Vertical pixel offset of the grid's top edge.
pub const GRID_TOP: f32 = 120.0;
/// Number of lanes attackers travel along.
pub const LANE_COUNT: u32 = 4;
/// Horizontal pixel coordinate at which attackers enter the playfield.
pub const ATTACKER_ENTRY_X: f32 = PLAYFIELD_WIDTH + 50.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Leaves the title screen and begins play.
    Start,
    /// Returns a finished session (defeat or victory) to the title screen.
    Reset,
    /// Requests planting a defender into a grid cell.
    Plant {
        /// Cell the defender should occupy.
        cell: CellCoord,
        /// Which defender kinds may be bought, in order of preference.
        preference: PlantPreference,
    },
    /// Advances the simulation clock and accrues passive resources.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new attacker enters the playfield.
    SpawnAttacker {
        /// Class of the attacker.
        kind: AttackerKind,
        /// Lane the attacker walks along.
        lane: Lane,
        /// Reward granted when the attacker dies, if it carries one.
        reward: Option<RewardKind>,
    },
    /// Runs the combat passes, the deferred reap and the level transition check.
    ResolveCombat,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Play began from the title screen.
    GameStarted,
    /// The session returned to the title screen with all state cleared.
    GameReset,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a defender was bought and planted.
    PlantPlaced {
        /// Identifier assigned to the defender.
        defender: DefenderId,
        /// Kind of defender that was planted.
        kind: DefenderKind,
        /// Cell the defender occupies.
        cell: CellCoord,
    },
    /// Reports that a planting command was rejected.
    PlantRejected {
        /// Cell requested by the command.
        cell: CellCoord,
        /// Specific reason the command was rejected.
        reason: PlantRejection,
    },
    /// Confirms that an attacker entered the playfield.
    AttackerSpawned {
        /// Identifier assigned to the attacker.
        attacker: AttackerId,
        /// Class of the attacker.
        kind: AttackerKind,
        /// Lane the attacker walks along.
        lane: Lane,
        /// Reward carried by the attacker, if any.
        reward: Option<RewardKind>,
    },
    /// A shooter emitted a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Shooter that fired it.
        defender: DefenderId,
    },
    /// A projectile struck an attacker and was consumed.
    ProjectileHit {
        /// Projectile that struck.
        projectile: ProjectileId,
        /// Attacker that was struck.
        attacker: AttackerId,
    },
    /// An enrageable attacker switched irreversibly to its enraged figures.
    AttackerEnraged {
        /// Attacker that became enraged.
        attacker: AttackerId,
    },
    /// An attacker died, either from projectile damage or an explosion.
    AttackerKilled {
        /// Attacker that died.
        attacker: AttackerId,
        /// Class of the attacker.
        kind: AttackerKind,
    },
    /// A reward carried by a dying attacker was paid out.
    RewardApplied {
        /// Attacker that carried the reward.
        attacker: AttackerId,
        /// Effect that was applied.
        reward: RewardKind,
    },
    /// An attacker walked past the left boundary and cost a life.
    AttackerReachedBoundary {
        /// Attacker that escaped.
        attacker: AttackerId,
        /// Lives left after the decrement.
        lives_remaining: u32,
    },
    /// An attacker locked onto a defender and began preparing its attack.
    TargetLocked {
        /// Attacker that locked on.
        attacker: AttackerId,
        /// Defender being attacked.
        defender: DefenderId,
    },
    /// An attacker lost its target and resumed walking.
    AttackAbandoned {
        /// Attacker that resumed walking.
        attacker: AttackerId,
    },
    /// A defender's health reached zero.
    DefenderDied {
        /// Defender that died.
        defender: DefenderId,
        /// Cell the defender occupied.
        cell: CellCoord,
    },
    /// An area charge finished arming and started its explosion.
    ExplosionTriggered {
        /// Area charge that detonated.
        defender: DefenderId,
    },
    /// An explosion reached full size and destroyed the attackers it covered.
    ExplosionCompleted {
        /// Area charge that detonated.
        defender: DefenderId,
        /// Number of attackers destroyed.
        kills: u32,
    },
    /// The kill quota was met below the final level.
    LevelAdvanced {
        /// Level that became active.
        level: u32,
    },
    /// The kill quota was met on the final level.
    Victory,
    /// All lives were lost.
    Defeat,
    /// At least one attacker started attacking a defender.
    ChompLoopStarted,
    /// No attacker is attacking any longer.
    ChompLoopStopped,
}

/// Unique identifier assigned to a defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenderId(u32);

impl DefenderId {
    /// Creates a new defender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttackerId(u32);

impl AttackerId {
    /// Creates a new attacker identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single plantable grid cell expressed as column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Pixel rectangle covered by the cell.
    #[must_use]
    pub fn bounds(self) -> Aabb {
        let top_left = Vec2::new(
            self.column as f32 * CELL_WIDTH,
            GRID_TOP + self.row as f32 * CELL_HEIGHT,
        );
        Aabb::from_top_left(top_left, Vec2::new(CELL_WIDTH, CELL_HEIGHT))
    }

    /// Pixel position at the centre of the cell, where defenders stand.
    #[must_use]
    pub fn center(self) -> Vec2 {
        self.bounds().center()
    }
}

/// Horizontal track an attacker walks along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lane(u32);

impl Lane {
    /// Creates a lane wrapper around the provided index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying lane index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Vertical pixel coordinate of the lane's centre line.
    ///
    /// Lane `n` lines up with grid row `n`.
    #[must_use]
    pub fn center_y(self) -> f32 {
        GRID_TOP + CELL_HEIGHT / 2.0 + self.0 as f32 * CELL_HEIGHT
    }
}

/// Axis-aligned bounding box in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    /// Builds a box of `size` centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Builds a box of `size` whose upper-left corner is `top_left`.
    #[must_use]
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self {
            min: top_left,
            max: top_left + size,
        }
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Lower-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Centre point of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Grows the box by `margin` pixels on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// Reports whether the two boxes overlap. Boxes that merely touch along an
    /// edge do not overlap.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Stationary defenders that can be planted into the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenderKind {
    /// Fires a projectile down its row whenever its cooldown expires.
    Shooter,
    /// Arms itself, then destroys every attacker around its cell. Invulnerable.
    AreaCharge,
}

impl DefenderKind {
    /// Size of the defender's collision box in pixels.
    #[must_use]
    pub const fn sprite_size(self) -> Vec2 {
        match self {
            Self::Shooter => Vec2::new(70.0, 72.0),
            Self::AreaCharge => Vec2::new(112.0, 81.0),
        }
    }

    /// Reports whether attackers may lock onto the defender.
    #[must_use]
    pub const fn is_targetable(self) -> bool {
        match self {
            Self::Shooter => true,
            Self::AreaCharge => false,
        }
    }
}

/// Classes of attackers produced by the spawn director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackerKind {
    /// Plain attacker with default figures.
    Basic,
    /// Slower, sturdier attacker.
    Armored,
    /// Attacker that permanently speeds up and hits harder once badly wounded.
    Enrageable,
}

impl AttackerKind {
    /// Every attacker class in spawn-table order.
    pub const ALL: [AttackerKind; 3] = [Self::Basic, Self::Armored, Self::Enrageable];

    /// Unscaled behaviour table for the class.
    #[must_use]
    pub const fn stats(self) -> AttackerStats {
        match self {
            Self::Basic => AttackerStats {
                health: 150.0,
                damage: 100.0,
                speed: 0.8,
                enraged: None,
                size: Vec2::new(80.0, 120.0),
            },
            Self::Armored => AttackerStats {
                health: 250.0,
                damage: 80.0,
                speed: 0.6,
                enraged: None,
                size: Vec2::new(80.0, 130.0),
            },
            Self::Enrageable => AttackerStats {
                health: 150.0,
                damage: 120.0,
                speed: 0.7,
                enraged: Some(EnragedStats {
                    speed: 1.2,
                    damage: 180.0,
                }),
                size: Vec2::new(90.0, 130.0),
            },
        }
    }
}

/// Per-class figures before level scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackerStats {
    /// Starting health.
    pub health: f32,
    /// Damage dealt per strike.
    pub damage: f32,
    /// Pixels travelled per tick.
    pub speed: f32,
    /// Figures used once enraged, for classes that can enrage.
    pub enraged: Option<EnragedStats>,
    /// Size of the collision box in pixels.
    pub size: Vec2,
}

/// Replacement figures for an enraged attacker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnragedStats {
    /// Pixels travelled per tick once enraged.
    pub speed: f32,
    /// Damage dealt per strike once enraged.
    pub damage: f32,
}

/// Bonus effects granted when a reward-carrying attacker dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardKind {
    /// Adds resource to the balance.
    BonusResource,
    /// Shortens every live shooter's cooldown.
    FireRateBoost,
    /// Grants an extra life.
    ExtraLife,
}

impl RewardKind {
    /// Every reward kind.
    pub const ALL: [RewardKind; 3] = [Self::BonusResource, Self::FireRateBoost, Self::ExtraLife];
}

/// Behaviour state of an attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackerBehavior {
    /// Moving left and looking for a defender to attack.
    Walking,
    /// Locked onto a defender, waiting out the preparation delay.
    AttackPreparing,
    /// Striking its target on a fixed cadence.
    Attacking,
}

/// Phase of the overall session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen; waiting for a start command.
    NotStarted,
    /// Simulation is running.
    Playing,
    /// All lives were lost; waiting for a reset command.
    GameOver,
    /// The final level was cleared; waiting for a reset command.
    Victory,
}

/// Which defender kinds a planting command may buy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlantPreference {
    /// Buy a shooter when affordable and under the limit, otherwise an area charge.
    ShooterFirst,
    /// Buy exactly this kind or nothing.
    Only(DefenderKind),
}

/// Reasons a planting command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlantRejection {
    /// The simulation is not in the playing phase.
    NotPlaying,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell already holds a defender.
    Occupied,
    /// The balance does not cover any permitted purchase.
    InsufficientResources,
    /// The shooter limit is reached and no alternative was affordable.
    ShooterLimit,
}

/// Tunable numbers that govern a session.
///
/// Every field has a default, so partial rules files only need to name the
/// figures they change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Kills required to finish a level.
    pub kill_quota: u32,
    /// Level whose quota ends the game in victory.
    pub final_level: u32,
    /// Lives granted at the start of every level.
    pub starting_lives: u32,
    /// Upper bound for lives gained through rewards.
    pub max_lives: u32,
    /// Resource balance at the start of a session.
    pub starting_resource: f32,
    /// Upper bound for the resource balance.
    pub resource_cap: f32,
    /// Passive resource gained per tick at level one.
    pub base_accrual: f32,
    /// Resource carried into the next level on top of the balance.
    pub level_bonus_resource: f32,
    /// Resource granted by a `BonusResource` reward.
    pub reward_bonus_resource: f32,
    /// Maximum number of concurrently live shooters.
    pub max_shooters: usize,
    /// Ticks removed from every shooter's cooldown by a `FireRateBoost` reward.
    pub fire_rate_boost: u32,
    /// Shortest cooldown a `FireRateBoost` reward can produce.
    pub min_shooter_cooldown: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            kill_quota: 50,
            final_level: 3,
            starting_lives: 5,
            max_lives: 10,
            starting_resource: 0.0,
            resource_cap: 10.0,
            base_accrual: 0.0125,
            level_bonus_resource: 2.0,
            reward_bonus_resource: 2.0,
            max_shooters: 5,
            fire_rate_boost: 5,
            min_shooter_cooldown: 15,
        }
    }
}

/// Immutable representation of the session counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameStateSnapshot {
    /// Current resource balance.
    pub resource: f32,
    /// Lives remaining.
    pub lives: u32,
    /// Kills scored during the current level.
    pub kills: u32,
    /// Kills required to finish the level.
    pub kill_quota: u32,
    /// Current level, starting at one.
    pub level: u32,
    /// Phase of the session.
    pub phase: GamePhase,
    /// Attackers spawned during the current level.
    pub attackers_spawned: u32,
    /// Indicates whether any attacker is currently attacking.
    pub chomping: bool,
}

/// Kind-specific state exposed in a [`DefenderSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefenderDetail {
    /// Shooter health and cooldown.
    Shooter {
        /// Remaining health.
        health: f32,
        /// Ticks until the next shot.
        cooldown: u32,
        /// Cooldown restored after each shot.
        cooldown_max: u32,
    },
    /// Area charge arming and explosion progress.
    AreaCharge {
        /// Arming animation frame reached so far.
        arming_frame: u32,
        /// Indicates whether the charge has detonated.
        exploded: bool,
        /// Current explosion edge length in pixels.
        explosion_size: f32,
    },
}

/// Immutable representation of a single defender.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderSnapshot {
    /// Identifier allocated to the defender.
    pub id: DefenderId,
    /// Kind of defender.
    pub kind: DefenderKind,
    /// Cell occupied by the defender.
    pub cell: CellCoord,
    /// Pixel position of the defender's centre.
    pub position: Vec2,
    /// Kind-specific state.
    pub detail: DefenderDetail,
}

/// Immutable representation of a single attacker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackerSnapshot {
    /// Identifier allocated to the attacker.
    pub id: AttackerId,
    /// Class of the attacker.
    pub kind: AttackerKind,
    /// Lane the attacker walks along.
    pub lane: Lane,
    /// Pixel position of the attacker's centre.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Current speed in pixels per tick.
    pub speed: f32,
    /// Current damage per strike.
    pub damage: f32,
    /// Behaviour state.
    pub behavior: AttackerBehavior,
    /// Defender the attacker is locked onto, if any.
    pub target: Option<DefenderId>,
    /// Indicates whether the attacker switched to its enraged figures.
    pub enraged: bool,
    /// Reward carried by the attacker, if any.
    pub reward: Option<RewardKind>,
}

/// Immutable representation of a single projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Pixel position of the projectile's upper-left corner.
    pub position: Vec2,
    /// Damage dealt on impact.
    pub damage: f32,
}

/// Read-only snapshot describing all live defenders.
#[derive(Clone, Debug, Default)]
pub struct DefenderView {
    snapshots: Vec<DefenderSnapshot>,
}

impl DefenderView {
    /// Creates a new defender view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenderSnapshot> {
        self.snapshots.iter()
    }

    /// Number of defenders captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenderSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all live attackers.
#[derive(Clone, Debug, Default)]
pub struct AttackerView {
    snapshots: Vec<AttackerSnapshot>,
}

impl AttackerView {
    /// Creates a new attacker view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AttackerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AttackerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of attackers captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AttackerSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all live projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the plantable grid's occupancy table.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major slice.
    #[must_use]
    pub fn new(cells: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Reports whether the cell holds a defender. Cells outside the grid are
    /// never occupied.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|occupied| **occupied).count()
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Aabb, AttackerKind, CellCoord, Lane, PlantRejection, Rules};
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_center_matches_pixel_layout() {
        assert_eq!(CellCoord::new(0, 0).center(), Vec2::new(80.0, 180.0));
        assert_eq!(CellCoord::new(2, 1).center(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn lanes_line_up_with_grid_rows() {
        for row in 0..4 {
            assert_eq!(Lane::new(row).center_y(), CellCoord::new(0, row).center().y);
        }
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let left = Aabb::from_top_left(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let right = Aabb::from_top_left(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        let overlapping = Aabb::from_top_left(Vec2::new(9.5, 9.5), Vec2::new(10.0, 10.0));

        assert!(!left.intersects(&right));
        assert!(left.intersects(&overlapping));
        assert!(overlapping.intersects(&left));
    }

    #[test]
    fn expanded_box_grows_on_every_side() {
        let cell = CellCoord::new(1, 0).bounds().expanded(20.0);
        assert_eq!(cell.min(), Vec2::new(140.0, 100.0));
        assert_eq!(cell.max(), Vec2::new(340.0, 260.0));
    }

    #[test]
    fn only_enrageable_attackers_carry_enraged_figures() {
        assert!(AttackerKind::Basic.stats().enraged.is_none());
        assert!(AttackerKind::Armored.stats().enraged.is_none());
        let enraged = AttackerKind::Enrageable.stats().enraged.expect("enraged stats");
        assert!(enraged.speed > AttackerKind::Enrageable.stats().speed);
        assert!(enraged.damage > AttackerKind::Enrageable.stats().damage);
    }

    #[test]
    fn plant_rejection_round_trips_through_bincode() {
        assert_round_trip(&PlantRejection::ShooterLimit);
    }

    #[test]
    fn rules_round_trip_through_bincode() {
        assert_round_trip(&Rules::default());
    }
}
