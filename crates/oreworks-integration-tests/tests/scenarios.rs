//! End-to-end rule passes over the sample data directory.
//!
//! Each test loads `data/` through the data crate, runs the standard rule
//! set once and checks one processing chain in the resulting recipe graph.

use std::path::PathBuf;
use std::sync::OnceLock;

use oreworks_core::id::{L, M};
use oreworks_core::prefix::OrePrefix;
use oreworks_core::recipe::{RecipeDescriptor, RecipeMap, RecipeProperty};
use oreworks_core::registry::RecipeMapRegistry;
use oreworks_core::runner::RulePass;
use oreworks_core::unification::{ItemKey, ItemStack, Part};
use oreworks_data::{CatalogData, load_catalogs};

// ===========================================================================
// Helpers
// ===========================================================================

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn load() -> CatalogData {
    init_tracing();
    load_catalogs(&data_dir()).unwrap()
}

/// One pass shared by every test in this file.
fn pass() -> &'static (CatalogData, RulePass) {
    static PASS: OnceLock<(CatalogData, RulePass)> = OnceLock::new();
    PASS.get_or_init(|| {
        let data = load();
        let pass = data.runner().run(&data.materials, &data.prefixes).unwrap();
        (data, pass)
    })
}

fn item(data: &CatalogData, prefix: OrePrefix, material: &str) -> ItemKey {
    ItemKey::Unified {
        prefix,
        material: data.materials.id(material).unwrap(),
    }
}

/// Recipes in `map` whose first input is `key`.
fn consuming<'a>(
    registry: &'a RecipeMapRegistry,
    map: RecipeMap,
    key: ItemKey,
) -> Vec<&'a RecipeDescriptor> {
    registry
        .recipes_in(map)
        .filter(|r| r.inputs.first().is_some_and(|s| s.key == key))
        .collect()
}

// ===========================================================================
// Pass as a whole
// ===========================================================================

#[test]
fn sample_data_runs_clean() {
    let (data, pass) = pass();
    assert_eq!(data.materials.len(), 22);
    assert!(pass.skipped.is_empty(), "{:?}", pass.skipped);
    assert!(pass.registry.len() > 300);
    for map in [
        RecipeMap::Macerator,
        RecipeMap::Smelting,
        RecipeMap::BlastFurnace,
        RecipeMap::Extruder,
        RecipeMap::Assembler,
        RecipeMap::CraftingShaped,
        RecipeMap::CraftingShapeless,
    ] {
        assert!(pass.registry.count(map) > 0, "{map}");
    }
}

// ===========================================================================
// Dust smelting
// ===========================================================================

#[test]
fn copper_dust_smelts_once_and_compresses() {
    let (data, pass) = pass();
    let dust = item(data, OrePrefix::Dust, "copper");

    let smelt = consuming(&pass.registry, RecipeMap::Smelting, dust);
    assert_eq!(smelt.len(), 1);
    assert_eq!(
        smelt[0].primary_output().unwrap().key,
        item(data, OrePrefix::Ingot, "copper")
    );

    let press = consuming(&pass.registry, RecipeMap::Compressor, dust);
    assert_eq!(press.len(), 1);
    assert_eq!(
        press[0].primary_output().unwrap().key,
        item(data, OrePrefix::Plate, "copper")
    );

    assert!(consuming(&pass.registry, RecipeMap::BlastFurnace, dust).is_empty());
}

#[test]
fn tungsten_dust_needs_the_blast_furnace() {
    let (data, pass) = pass();
    let dust = item(data, OrePrefix::Dust, "tungsten");

    let blast = consuming(&pass.registry, RecipeMap::BlastFurnace, dust);
    assert_eq!(blast.len(), 1);
    let recipe = blast[0];
    assert_eq!(recipe.duration, 200 * 3422 / 50);
    assert_eq!(recipe.energy_rate, 120);
    assert_eq!(recipe.property(RecipeProperty::Temperature), Some(3422));
    assert_eq!(
        recipe.primary_output().unwrap().key,
        item(data, OrePrefix::IngotHot, "tungsten")
    );

    assert!(consuming(&pass.registry, RecipeMap::Smelting, dust).is_empty());
    let freeze = consuming(
        &pass.registry,
        RecipeMap::VacuumFreezer,
        item(data, OrePrefix::IngotHot, "tungsten"),
    );
    assert_eq!(freeze.len(), 1);
}

// ===========================================================================
// Cables
// ===========================================================================

#[test]
fn cable_insulation_follows_voltage_tier() {
    let (data, pass) = pass();
    let reg = &pass.registry;
    let rubber = data.materials.id("rubber").unwrap();

    // 32 V copper is wrapped in cloth.
    assert!(reg.named(RecipeMap::CraftingShapeless, "copper_cable_single").is_some());
    let copper_wire = item(data, OrePrefix::WireGtSingle, "copper");
    assert!(
        consuming(reg, RecipeMap::Assembler, copper_wire)
            .iter()
            .all(|r| r.fluid_inputs.is_empty())
    );
    let packed = consuming(reg, RecipeMap::Packer, copper_wire);
    assert_eq!(packed.len(), 1);
    assert!(packed[0].inputs.contains(&ItemStack::part(Part::BlackCarpet, 1)));

    // 8 V tin and 128 V silver take rubber.
    for name in ["tin", "silver"] {
        let wire = item(data, OrePrefix::WireGtSingle, name);
        assert!(
            reg.named(RecipeMap::CraftingShapeless, &format!("{name}_cable_single"))
                .is_none()
        );
        let coated: Vec<_> = consuming(reg, RecipeMap::Assembler, wire)
            .into_iter()
            .filter(|r| !r.fluid_inputs.is_empty())
            .collect();
        assert_eq!(coated.len(), 1, "{name}");
        assert_eq!(coated[0].fluid_inputs[0].material, rubber);
        assert_eq!(coated[0].fluid_inputs[0].amount, L);
        assert!(consuming(reg, RecipeMap::Packer, wire).is_empty());
    }
}

// ===========================================================================
// Byproducts
// ===========================================================================

#[test]
fn ore_chain_byproducts_skip_wrong_kinds() {
    let (data, pass) = pass();
    let reg = &pass.registry;

    // Iron lists oxygen first; dust stages wrap past it to tin.
    let crushed = consuming(reg, RecipeMap::Macerator, item(data, OrePrefix::Crushed, "iron"));
    assert_eq!(crushed.len(), 1);
    assert_eq!(crushed[0].outputs[1].stack.key, item(data, OrePrefix::Dust, "tin"));

    // The impure dust centrifuge accepts fluids and takes oxygen.
    let spun = consuming(reg, RecipeMap::Centrifuge, item(data, OrePrefix::DustImpure, "iron"));
    assert_eq!(spun.len(), 1);
    assert_eq!(
        spun[0].fluid_outputs[0].material,
        data.materials.id("oxygen").unwrap()
    );

    // Tin has no candidates and falls back to stone.
    let tin = consuming(reg, RecipeMap::Macerator, item(data, OrePrefix::Crushed, "tin"));
    assert_eq!(tin[0].outputs[1].stack.key, item(data, OrePrefix::Dust, "stone"));
}

// ===========================================================================
// Shaping
// ===========================================================================

#[test]
fn shaping_only_starts_from_whole_amounts() {
    let (_, pass) = pass();
    for recipe in pass.registry.recipes_in(RecipeMap::Extruder) {
        let ItemKey::Unified { prefix, .. } = recipe.inputs[0].key else {
            panic!("extruder input is not a unified item: {recipe:?}");
        };
        let amount = prefix.standard_amount();
        assert_eq!(amount % M, 0, "{prefix}");
        assert!((1..=64).contains(&(amount / M)), "{prefix}");
    }
}

// ===========================================================================
// Wires
// ===========================================================================

fn wire_units(stack: &ItemStack) -> u32 {
    match stack.key {
        ItemKey::Unified { prefix, .. } => prefix.wire_size().unwrap_or(0) * stack.count,
        _ => 0,
    }
}

#[test]
fn wire_packing_conserves_quantity() {
    let (_, pass) = pass();
    let mut checked = 0;
    for recipe in pass.registry.recipes_in(RecipeMap::CraftingShapeless) {
        let consumed: u32 = recipe.inputs.iter().map(wire_units).sum();
        let produced: u32 = recipe.outputs.iter().map(|o| wire_units(&o.stack)).sum();
        if consumed > 0 && produced > 0 {
            assert_eq!(consumed, produced, "{:?}", recipe.name);
            checked += 1;
        }
    }
    // Three cabled metals, five unpack and six pack recipes each.
    assert_eq!(checked, 3 * 11);
}

// ===========================================================================
// Determinism and snapshots
// ===========================================================================

#[test]
fn repeated_loads_give_identical_graphs() {
    let (_, first) = pass();
    let data = load();
    let second = data.runner().run(&data.materials, &data.prefixes).unwrap();
    assert_eq!(first.registry.graph_hash(), second.registry.graph_hash());
    let a: Vec<_> = first.registry.recipes().collect();
    let b: Vec<_> = second.registry.recipes().collect();
    assert_eq!(a, b);
}

#[test]
fn snapshot_restores_the_full_graph() {
    let (_, pass) = pass();
    let bytes = pass.registry.to_snapshot().unwrap();
    let restored = RecipeMapRegistry::from_snapshot(&bytes).unwrap();
    assert_eq!(restored.len(), pass.registry.len());
    assert_eq!(restored.graph_hash(), pass.registry.graph_hash());
}
