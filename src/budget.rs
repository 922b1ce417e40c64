use crate::unit::Currency;
use serde::{Deserialize, Serialize};

/// Cost of an action in both currencies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCost {
    pub structure: f32,
    pub unit: f32,
}

impl UnitCost {
    pub fn structure(amount: f32) -> Self {
        UnitCost {
            structure: amount,
            unit: 0.0,
        }
    }

    pub fn unit(amount: f32) -> Self {
        UnitCost {
            structure: 0.0,
            unit: amount,
        }
    }

    pub fn get(&self, currency: Currency) -> f32 {
        match currency {
            Currency::Structure => self.structure,
            Currency::Unit => self.unit,
        }
    }

    pub fn scaled(&self, count: u32) -> Self {
        UnitCost {
            structure: self.structure * count as f32,
            unit: self.unit * count as f32,
        }
    }
}

/// Two independent non-negative counters.
///
/// Every spend is conditional on sufficient balance; a failed spend leaves
/// both counters untouched.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    structure: f32,
    unit: f32,
}

impl Budget {
    pub fn new(structure: f32, unit: f32) -> Self {
        Budget {
            structure: structure.max(0.0),
            unit: unit.max(0.0),
        }
    }

    pub fn get(&self, currency: Currency) -> f32 {
        match currency {
            Currency::Structure => self.structure,
            Currency::Unit => self.unit,
        }
    }

    pub fn can_afford(&self, cost: &UnitCost) -> bool {
        self.structure >= cost.structure && self.unit >= cost.unit
    }

    pub fn try_spend(&mut self, cost: &UnitCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.structure -= cost.structure;
        self.unit -= cost.unit;
        true
    }

    /// Largest multiple of `cost` that the budget covers.
    pub fn affordable_count(&self, cost: &UnitCost) -> u32 {
        let by = |have: f32, need: f32| {
            if need > 0.0 {
                (have / need).floor() as u32
            } else {
                u32::MAX
            }
        };
        by(self.structure, cost.structure).min(by(self.unit, cost.unit))
    }

    pub fn credit(&mut self, currency: Currency, amount: f32) {
        let amount = amount.max(0.0);
        match currency {
            Currency::Structure => self.structure += amount,
            Currency::Unit => self.unit += amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_spend_consumes_nothing() {
        let mut budget = Budget::new(3.0, 1.0);
        assert!(!budget.try_spend(&UnitCost::structure(4.0)));
        assert_eq!(budget, Budget::new(3.0, 1.0));
        assert!(budget.try_spend(&UnitCost::structure(2.0)));
        assert_eq!(budget.get(Currency::Structure), 1.0);
        assert_eq!(budget.get(Currency::Unit), 1.0);
    }

    #[test]
    fn credit_only_adds() {
        let mut budget = Budget::new(0.0, 0.0);
        budget.credit(Currency::Structure, 1.5);
        budget.credit(Currency::Structure, -4.0);
        assert_eq!(budget.get(Currency::Structure), 1.5);
    }

    #[test]
    fn affordable_count_ignores_free_currency() {
        let budget = Budget::new(0.0, 7.5);
        assert_eq!(budget.affordable_count(&UnitCost::unit(3.0)), 2);
        assert_eq!(budget.affordable_count(&UnitCost::structure(1.0)), 0);
        assert_eq!(budget.affordable_count(&UnitCost::default()), u32::MAX);
    }
}
