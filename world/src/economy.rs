//! Resource balance, purchase costs and reward payouts.

use lawn_defence_core::{DefenderKind, PlantPreference, PlantRejection, RewardKind, Rules};

use crate::{progression::GameState, registry::EntityRegistry};

/// Resource balance bounded to `[0, cap]`.
#[derive(Clone, Debug)]
pub(crate) struct Economy {
    balance: f32,
    cap: f32,
}

impl Economy {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self::with_balance(rules.starting_resource, rules.resource_cap)
    }

    pub(crate) fn with_balance(balance: f32, cap: f32) -> Self {
        let cap = cap.max(0.0);
        Self {
            balance: balance.clamp(0.0, cap),
            cap,
        }
    }

    pub(crate) fn balance(&self) -> f32 {
        self.balance
    }

    /// Passive income for one tick. Never lowers the balance.
    pub(crate) fn accrue(&mut self, level: u32, base: f32) {
        if self.balance < self.cap {
            self.balance = (self.balance + accrual_rate(level, base)).min(self.cap);
        }
    }

    pub(crate) fn credit(&mut self, amount: f32) {
        self.balance = (self.balance + amount).clamp(0.0, self.cap);
    }

    fn debit(&mut self, amount: u32) {
        self.balance = (self.balance - amount as f32).max(0.0);
    }
}

pub(crate) fn accrual_rate(level: u32, base: f32) -> f32 {
    base * (1.0 + level.saturating_sub(1) as f32 * 0.2)
}

/// Price of a shooter at the given level.
pub(crate) fn shooter_cost(level: u32) -> u32 {
    let discount = i64::from(level.saturating_sub(1)) / 2;
    u32::try_from((2 - discount).max(1)).unwrap_or(1)
}

/// Price of an area charge at the given level.
pub(crate) fn area_charge_cost(level: u32) -> u32 {
    let discount = i64::from(level.saturating_sub(1));
    u32::try_from((5 - discount).max(3)).unwrap_or(3)
}

/// Picks the defender a planting command buys and debits its cost.
pub(crate) fn purchase(
    economy: &mut Economy,
    level: u32,
    preference: PlantPreference,
    live_shooters: usize,
    rules: &Rules,
) -> Result<DefenderKind, PlantRejection> {
    let balance = economy.balance();
    let shooter_price = shooter_cost(level);
    let charge_price = area_charge_cost(level);
    let shooter_allowed = live_shooters < rules.max_shooters;
    let affordable = |price: u32| balance >= price as f32;

    let (kind, price) = match preference {
        PlantPreference::ShooterFirst => {
            if shooter_allowed && affordable(shooter_price) {
                (DefenderKind::Shooter, shooter_price)
            } else if affordable(charge_price) {
                (DefenderKind::AreaCharge, charge_price)
            } else if !shooter_allowed && affordable(shooter_price) {
                return Err(PlantRejection::ShooterLimit);
            } else {
                return Err(PlantRejection::InsufficientResources);
            }
        }
        PlantPreference::Only(DefenderKind::Shooter) => {
            if !shooter_allowed {
                return Err(PlantRejection::ShooterLimit);
            }
            if !affordable(shooter_price) {
                return Err(PlantRejection::InsufficientResources);
            }
            (DefenderKind::Shooter, shooter_price)
        }
        PlantPreference::Only(DefenderKind::AreaCharge) => {
            if !affordable(charge_price) {
                return Err(PlantRejection::InsufficientResources);
            }
            (DefenderKind::AreaCharge, charge_price)
        }
    };

    economy.debit(price);
    Ok(kind)
}

/// Pays out the reward carried by a dead attacker.
pub(crate) fn apply_reward(
    reward: RewardKind,
    economy: &mut Economy,
    state: &mut GameState,
    registry: &mut EntityRegistry,
    rules: &Rules,
) {
    match reward {
        RewardKind::BonusResource => economy.credit(rules.reward_bonus_resource),
        RewardKind::FireRateBoost => {
            for defender in registry.defenders.iter_live_mut() {
                defender.boost_fire_rate(rules.fire_rate_boost, rules.min_shooter_cooldown);
            }
        }
        RewardKind::ExtraLife => state.gain_life(rules.max_lives),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costs_fall_with_level_down_to_their_floors() {
        assert_eq!(
            (1..=6).map(shooter_cost).collect::<Vec<_>>(),
            vec![2, 2, 1, 1, 1, 1]
        );
        assert_eq!(
            (1..=6).map(area_charge_cost).collect::<Vec<_>>(),
            vec![5, 4, 3, 3, 3, 3]
        );
    }

    #[test]
    fn accrual_is_clamped_to_the_cap() {
        let mut economy = Economy::with_balance(9.995, 10.0);
        economy.accrue(1, 0.0125);
        assert_eq!(economy.balance(), 10.0);
        economy.accrue(3, 0.0125);
        assert_eq!(economy.balance(), 10.0);
    }

    #[test]
    fn accrual_rate_scales_with_level() {
        assert!((accrual_rate(1, 0.0125) - 0.0125).abs() < 1e-7);
        assert!((accrual_rate(3, 0.0125) - 0.0175).abs() < 1e-7);
    }

    #[test]
    fn shooter_costing_two_is_rejected_with_balance_one() {
        let rules = Rules::default();
        let mut economy = Economy::with_balance(1.0, 10.0);

        let result = purchase(&mut economy, 1, PlantPreference::ShooterFirst, 0, &rules);

        assert_eq!(result, Err(PlantRejection::InsufficientResources));
        assert_eq!(economy.balance(), 1.0);
    }

    #[test]
    fn shooter_first_falls_back_to_area_charge_at_the_limit() {
        let rules = Rules::default();
        let mut economy = Economy::with_balance(6.0, 10.0);

        let result = purchase(&mut economy, 1, PlantPreference::ShooterFirst, 5, &rules);

        assert_eq!(result, Ok(DefenderKind::AreaCharge));
        assert_eq!(economy.balance(), 1.0);
    }

    #[test]
    fn shooter_limit_is_reported_when_nothing_else_fits() {
        let rules = Rules::default();
        let mut economy = Economy::with_balance(3.0, 10.0);

        assert_eq!(
            purchase(&mut economy, 1, PlantPreference::ShooterFirst, 5, &rules),
            Err(PlantRejection::ShooterLimit)
        );
        assert_eq!(
            purchase(
                &mut economy,
                1,
                PlantPreference::Only(DefenderKind::Shooter),
                5,
                &rules
            ),
            Err(PlantRejection::ShooterLimit)
        );
        assert_eq!(economy.balance(), 3.0);
    }

    #[test]
    fn credit_never_exceeds_the_cap() {
        let mut economy = Economy::with_balance(9.0, 10.0);
        economy.credit(2.0);
        assert_eq!(economy.balance(), 10.0);
    }
}
