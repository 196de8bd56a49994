#![deny(warnings)]

//! Aggregation and progress helpers for the guild shipbuilding tracker.
//!
//! This module provides pure functions over the ledger state for:
//! - Summing every member's holdings into per-resource totals
//! - Crafting availability of recipe-derived materials (bottleneck ingredient)
//! - Progress of each target: have/need, shortfall and a ratio clamped to [0, 1]

use guild_core::{Holdings, Ingredient, ResourceName, Target};
use guild_ledger::{LedgerStore, MemberLedger};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub mod report;

pub use report::{build_report, MemberRow, MemberTable, ProgressReport, TierReport};

/// Guild-wide held quantity per base resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Totals(BTreeMap<ResourceName, u64>);

impl Totals {
    /// Total for `resource`; 0 when nobody reported it.
    pub fn get(&self, resource: &str) -> u64 {
        self.0.get(resource).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceName, u64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }
}

/// Elementwise sum of member holdings, saturating at `u64::MAX`.
///
/// Example:
/// let t = totals([&alice, &bob]);
/// assert_eq!(t.get("강철괴"), 150);
pub fn totals<'a, I>(entries: I) -> Totals
where
    I: IntoIterator<Item = &'a Holdings>,
{
    let mut sums: BTreeMap<ResourceName, u64> = BTreeMap::new();
    for holdings in entries {
        for (resource, qty) in holdings {
            let slot = sums.entry(resource.clone()).or_insert(0);
            *slot = slot.saturating_add(*qty);
        }
    }
    Totals(sums)
}

/// Totals over every entry in the ledger.
pub fn ledger_totals<S: LedgerStore>(ledger: &MemberLedger<S>) -> Totals {
    totals(ledger.all().values())
}

/// Progress ratio `have / need` clamped to 1.0; a zero need counts as done.
pub fn progress_ratio(have: u64, need: u64) -> f64 {
    if need == 0 {
        return 1.0;
    }
    (have as f64 / need as f64).min(1.0)
}

/// Units of a derived target craftable from `totals`, with the index of the
/// bottleneck ingredient (first lowest in recipe order).
///
/// Empty totals, or an empty recipe, yield `(0, None)`.
pub fn craftable_units(recipe: &[Ingredient], totals: &Totals) -> (u64, Option<usize>) {
    if totals.is_empty() {
        return (0, None);
    }
    let mut best: Option<(usize, u64)> = None;
    for (idx, ing) in recipe.iter().enumerate() {
        let units = totals
            .get(ing.resource.as_str())
            .checked_div(ing.per_unit)
            .unwrap_or(0);
        match best {
            Some((_, lowest)) if lowest <= units => {}
            _ => best = Some((idx, units)),
        }
    }
    match best {
        Some((idx, units)) => (units, Some(idx)),
        None => (0, None),
    }
}

/// Kind of target a progress row describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Direct,
    Derived,
}

/// Per-ingredient breakdown of a derived target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IngredientProgress {
    pub resource: ResourceName,
    pub per_unit: u64,
    /// Guild-wide total held.
    pub held: u64,
    /// Output units this ingredient alone allows.
    pub craftable: u64,
    /// Quantity needed for the full target (`per_unit * need`).
    pub required: u64,
    /// Quantity needed for what is still missing (`per_unit * shortfall`).
    pub remaining: u64,
}

/// Progress of one target material.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Progress {
    pub label: String,
    pub kind: TargetKind,
    pub have: u64,
    pub need: u64,
    pub shortfall: u64,
    /// In [0, 1].
    pub ratio: f64,
    /// Empty for direct targets.
    pub ingredients: Vec<IngredientProgress>,
    pub bottleneck: Option<ResourceName>,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.shortfall == 0
    }
}

/// Compute progress of `target` against guild totals.
pub fn progress(target: &Target, totals: &Totals) -> Progress {
    let need = target.need();
    match target {
        Target::Direct { resource, .. } => {
            let have = totals.get(resource.as_str());
            Progress {
                label: target.label().to_string(),
                kind: TargetKind::Direct,
                have,
                need,
                shortfall: need.saturating_sub(have),
                ratio: progress_ratio(have, need),
                ingredients: Vec::new(),
                bottleneck: None,
            }
        }
        Target::Derived { recipe, .. } => {
            let (have, bottleneck) = craftable_units(recipe, totals);
            let shortfall = need.saturating_sub(have);
            let ingredients = recipe
                .iter()
                .map(|ing| {
                    let held = totals.get(ing.resource.as_str());
                    IngredientProgress {
                        resource: ing.resource.clone(),
                        per_unit: ing.per_unit,
                        held,
                        craftable: held.checked_div(ing.per_unit).unwrap_or(0),
                        required: ing.per_unit.saturating_mul(need),
                        remaining: ing.per_unit.saturating_mul(shortfall),
                    }
                })
                .collect();
            debug!(material = target.label(), have, need, "derived availability");
            Progress {
                label: target.label().to_string(),
                kind: TargetKind::Derived,
                have,
                need,
                shortfall,
                ratio: progress_ratio(have, need),
                ingredients,
                bottleneck: bottleneck.map(|idx| recipe[idx].resource.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guild_core::Catalog;
    use proptest::prelude::*;

    fn holdings(items: &[(&str, u64)]) -> Holdings {
        items.iter().map(|(r, q)| (ResourceName::from(*r), *q)).collect()
    }

    fn tar() -> Target {
        Target::Derived {
            label: "타르".to_string(),
            need: 200,
            recipe: vec![
                Ingredient { resource: "통나무".into(), per_unit: 50 },
                Ingredient { resource: "점토".into(), per_unit: 25 },
            ],
        }
    }

    #[test]
    fn totals_sum_across_members() {
        let alice = holdings(&[("강철괴", 100)]);
        let bob = holdings(&[("강철괴", 50), ("점토", 5)]);
        let t = totals([&alice, &bob]);
        assert_eq!(t.get("강철괴"), 150);
        assert_eq!(t.get("점토"), 5);
        assert_eq!(t.get("통나무"), 0);
    }

    #[test]
    fn totals_saturate() {
        let a = holdings(&[("점토", u64::MAX)]);
        let b = holdings(&[("점토", 10)]);
        assert_eq!(totals([&a, &b]).get("점토"), u64::MAX);
    }

    #[test]
    fn ledger_totals_from_saved_entries() {
        let mut ledger = MemberLedger::new(&Catalog::shipbuilding());
        assert!(ledger_totals(&ledger).is_empty());
        ledger.upsert("Alice", [("강철괴", 100)]).unwrap();
        ledger.upsert("Bob", [("강철괴", 50)]).unwrap();
        let t = ledger_totals(&ledger);
        assert_eq!(t.get("강철괴"), 150);
        assert_eq!(t.len(), 7);
    }

    #[test]
    fn derived_have_is_bottleneck() {
        let t = totals([&holdings(&[("통나무", 100), ("점토", 100)])]);
        let p = progress(&tar(), &t);
        assert_eq!(p.have, 2);
        assert_eq!(p.shortfall, 198);
        assert_eq!(p.bottleneck, Some(ResourceName::from("통나무")));
        assert_eq!(p.ingredients[0].craftable, 2);
        assert_eq!(p.ingredients[1].craftable, 4);
        assert_eq!(p.ingredients[0].required, 10_000);
        assert_eq!(p.ingredients[1].required, 5_000);
        assert_eq!(p.ingredients[0].remaining, 50 * 198);
    }

    #[test]
    fn bottleneck_tie_takes_first_in_recipe() {
        let t = totals([&holdings(&[("통나무", 50), ("점토", 25)])]);
        let p = progress(&tar(), &t);
        assert_eq!(p.have, 1);
        assert_eq!(p.bottleneck, Some(ResourceName::from("통나무")));
    }

    #[test]
    fn empty_ledger_has_nothing() {
        let t = Totals::default();
        let p = progress(&tar(), &t);
        assert_eq!(p.have, 0);
        assert_eq!(p.bottleneck, None);
        assert_eq!(p.ratio, 0.0);
        let d = progress(&Target::Direct { resource: "점토".into(), need: 10 }, &t);
        assert_eq!(d.have, 0);
        assert_eq!(d.shortfall, 10);
    }

    #[test]
    fn direct_ratio_clamped() {
        let t = totals([&holdings(&[("강철괴", 3000)])]);
        let p = progress(&Target::Direct { resource: "강철괴".into(), need: 1500 }, &t);
        assert_eq!(p.have, 3000);
        assert_eq!(p.ratio, 1.0);
        assert_eq!(p.shortfall, 0);
        assert!(p.is_complete());
        assert!(p.ingredients.is_empty());
    }

    #[test]
    fn zero_need_is_done() {
        assert_eq!(progress_ratio(0, 0), 1.0);
        let p = progress(
            &Target::Direct { resource: "점토".into(), need: 0 },
            &Totals::default(),
        );
        assert_eq!(p.ratio, 1.0);
        assert_eq!(p.shortfall, 0);
    }

    proptest! {
        #[test]
        fn ratio_in_unit_interval(have in 0u64..1_000_000, need in 0u64..1_000_000) {
            let r = progress_ratio(have, need);
            prop_assert!((0.0..=1.0).contains(&r));
            if need > 0 && have >= need {
                prop_assert_eq!(r, 1.0);
            }
        }

        #[test]
        fn derived_have_is_min_of_floors(logs in 0u64..100_000, clay in 0u64..100_000) {
            let t = totals([&holdings(&[("통나무", logs), ("점토", clay)])]);
            let p = progress(&tar(), &t);
            prop_assert_eq!(p.have, (logs / 50).min(clay / 25));
            prop_assert!(p.have + p.shortfall >= 200);
        }

        #[test]
        fn totals_order_independent(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let x = holdings(&[("강철괴", a)]);
            let y = holdings(&[("강철괴", b)]);
            prop_assert_eq!(totals([&x, &y]), totals([&y, &x]));
        }
    }
}
