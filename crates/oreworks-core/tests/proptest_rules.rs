//! Property-based tests for the Oreworks rule engine.
//!
//! Uses proptest to generate byproduct lists, prefix amounts and material
//! attributes, then verify the invariants the rule pass relies on.

use oreworks_core::byproduct::{ByproductSelector, probe};
use oreworks_core::catalog::{MaterialCatalog, PrefixCatalog, PrefixDef};
use oreworks_core::id::{M, MaterialId};
use oreworks_core::material::{Kind, MaterialKind};
use oreworks_core::prefix::OrePrefix;
use oreworks_core::recipe::RecipeMap;
use oreworks_core::rules::{shaping, wire};
use oreworks_core::test_utils::*;
use oreworks_core::unification::ItemKey;
use oreworks_core::run_all_rules;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// One material of every kind, in `Kind` order.
fn kinds_catalog() -> MaterialCatalog {
    let mut b = MaterialCatalog::builder();
    b.register("marker", 1, MaterialKind::Marker);
    b.register("fluid", 1, MaterialKind::Fluid);
    b.register("dust", 1, MaterialKind::dust());
    b.register("solid", 1, MaterialKind::solid());
    b.register("gem", 1, MaterialKind::gem());
    b.register("metal", 1, MaterialKind::metal());
    b.build().unwrap()
}

const KINDS: [Kind; 6] = [
    Kind::Marker,
    Kind::Fluid,
    Kind::Dust,
    Kind::Solid,
    Kind::Gem,
    Kind::Metal,
];

fn arb_kind() -> impl Strategy<Value = Kind> {
    (0..KINDS.len()).prop_map(|i| KINDS[i])
}

fn arb_candidates() -> impl Strategy<Value = Vec<MaterialId>> {
    proptest::collection::vec(0..6u32, 0..8).prop_map(|ids| ids.into_iter().map(MaterialId).collect())
}

/// Multiples of `M / 72` so that whole, fractional and oversized amounts
/// all come up.
fn arb_amount() -> impl Strategy<Value = u64> {
    (1..=72u64 * 80).prop_map(|k| k * (M / 72))
}

fn wire_units(key: &ItemKey, count: u32) -> u32 {
    match key {
        ItemKey::Unified { prefix, .. } => prefix.wire_size().unwrap_or(0) * count,
        _ => 0,
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// The selector either finds the first matching candidate in wrap order
    /// or reports that none matches.
    #[test]
    fn probe_finds_first_match_in_wrap_order(
        candidates in arb_candidates(),
        index in 0..12usize,
        expected in arb_kind(),
    ) {
        let catalog = kinds_catalog();
        let fits = |id: MaterialId| catalog.get(id).unwrap().is_a(expected);

        match probe(&catalog, &candidates, index, expected) {
            Some(found) => {
                prop_assert!(fits(candidates[found]));
                let n = candidates.len();
                let start = index.min(n - 1);
                let mut i = start;
                while i != found {
                    prop_assert!(!fits(candidates[i]));
                    i = (i + 1) % n;
                }
            }
            None => prop_assert!(!candidates.iter().any(|&id| fits(id))),
        }
    }

    /// Selection always terminates and returns a material of the expected
    /// kind unless it fell back to the sentinel.
    #[test]
    fn selector_falls_back_only_when_nothing_matches(
        candidates in arb_candidates(),
        index in 0..12usize,
        expected in arb_kind(),
    ) {
        let base = kinds_catalog();
        let mut b = MaterialCatalog::builder();
        for m in base.iter() {
            b.register(&m.name, m.mass, m.kind.clone());
        }
        let primary = b.register("primary", 1, MaterialKind::metal());
        b.mutate("primary", |m| {
            if let Some(d) = m.dust_mut() {
                d.ore_byproducts = candidates.clone();
            }
        }).unwrap();
        let catalog = b.build().unwrap();
        let sentinel = catalog.id("marker");
        let selector = ByproductSelector::new(sentinel);

        let chosen = selector.select(&catalog, catalog.get(primary).unwrap(), index, expected);
        let any_match = candidates.iter().any(|&id| catalog.get(id).unwrap().is_a(expected));
        if any_match {
            prop_assert!(chosen.is_a(expected));
            prop_assert!(candidates.contains(&chosen.id));
        } else {
            prop_assert_eq!(Some(chosen.id), sentinel);
        }
    }

    /// Shaping emits nothing for amounts that are not whole multiples of `M`
    /// in `1..=64`, and something for whole block amounts in range.
    #[test]
    fn shaping_abstains_outside_whole_amounts(amount in arb_amount()) {
        let mut defs: Vec<PrefixDef> = PrefixCatalog::standard().iter().cloned().collect();
        for def in &mut defs {
            if def.prefix == OrePrefix::Block {
                def.material_amount = amount;
            }
        }
        let f = Fixture::new(standard_materials(), PrefixCatalog::new(defs).unwrap());
        let (registry, result) = f.apply(shaping::shaping, OrePrefix::Block, "copper");
        prop_assert!(result.is_ok());

        let whole = amount % M == 0 && (1..=64).contains(&(amount / M));
        prop_assert_eq!(shaping::shaping_amount(amount).is_some(), whole);
        if !whole {
            prop_assert!(registry.is_empty());
        } else {
            // A copper plate can always be formed from a whole block amount.
            prop_assert!(registry.count(RecipeMap::Extruder) > 0);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    /// Every wire craft that only moves wire between sizes consumes as many
    /// single-wire units as it produces.
    #[test]
    fn wire_crafts_conserve_units(
        prefix_index in 0..OrePrefix::WIRES.len(),
        material in prop::sample::select(vec!["copper", "tin"]),
    ) {
        let prefix = OrePrefix::WIRES[prefix_index];
        let f = standard_catalogs();
        let (registry, result) = f.apply(wire::wire, prefix, material);
        prop_assert!(result.is_ok());

        for recipe in registry.recipes() {
            let consumed: u32 = recipe.inputs.iter().map(|s| wire_units(&s.key, s.count)).sum();
            let produced: u32 = recipe
                .outputs
                .iter()
                .map(|o| wire_units(&o.stack.key, o.stack.count))
                .sum();
            let repacks = matches!(recipe.map, RecipeMap::CraftingShapeless | RecipeMap::Assembler)
                && consumed > 0
                && produced > 0;
            if repacks {
                prop_assert_eq!(consumed, produced, "{:?}", recipe.name);
            }
        }
    }
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn standard_pass_hash_is_stable() {
    let f = standard_catalogs();
    let a = run_all_rules(&f.materials, &f.prefixes).unwrap();
    let b = run_all_rules(&f.materials, &f.prefixes).unwrap();
    assert_eq!(a.registry.graph_hash(), b.registry.graph_hash());
    assert_eq!(a.registry.len(), b.registry.len());
}
