//! Per-slot calorie budget
//!
//! Each slot gets `round(daily * share)`; the last slot (dinner) takes whatever
//! is left so the four targets always add up to the daily total.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::MealSlot;

/// Calorie target for every meal slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTargets(BTreeMap<MealSlot, i64>);

impl SlotTargets {
    pub fn get(&self, slot: MealSlot) -> i64 {
        self.0.get(&slot).copied().unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, i64)> + '_ {
        self.0.iter().map(|(slot, kcal)| (*slot, *kcal))
    }

    /// Build from persisted values, allocating any slot that is missing
    pub fn from_partial(daily: i64, known: &BTreeMap<MealSlot, i64>) -> Self {
        if MealSlot::ALL.iter().all(|s| known.contains_key(s)) {
            return SlotTargets(known.clone());
        }
        BudgetAllocator::allocate(daily)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetAllocator;

impl BudgetAllocator {
    pub fn allocate(daily_calorie_target: i64) -> SlotTargets {
        let (last, rest) = match MealSlot::ALL.split_last() {
            Some(split) => split,
            None => return SlotTargets(BTreeMap::new()),
        };

        let mut targets = BTreeMap::new();
        let mut assigned = 0;
        for slot in rest {
            let kcal = round_percent(daily_calorie_target, slot.percent());
            assigned += kcal;
            targets.insert(*slot, kcal);
        }
        targets.insert(*last, daily_calorie_target - assigned);

        SlotTargets(targets)
    }
}

/// `value * percent / 100`, rounded half away from zero in exact integer math
fn round_percent(value: i64, percent: i64) -> i64 {
    let scaled = value * percent;
    if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    }
}
