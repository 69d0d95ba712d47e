//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::{MaterialCatalog, MaterialCatalogBuilder, PrefixCatalog};
use crate::config::EngineConfig;
use crate::id::MaterialId;
use crate::material::{DustProps, Material, MaterialFlag, MaterialKind, MaterialStack, MetalProps, SolidProps};
use crate::prefix::OrePrefix;
use crate::recipe::RecipeError;
use crate::registry::RecipeMapRegistry;
use crate::rules::{RuleContext, RuleFn};
use crate::unification::{ItemKey, UnificationTable};

// ===========================================================================
// Fixture
// ===========================================================================

/// Catalogs plus the unification table generated from them.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub materials: MaterialCatalog,
    pub prefixes: PrefixCatalog,
    pub items: UnificationTable,
}

impl Fixture {
    pub fn new(materials: MaterialCatalog, prefixes: PrefixCatalog) -> Self {
        let items = UnificationTable::generate(&materials, &prefixes);
        Self {
            materials,
            prefixes,
            items,
        }
    }

    pub fn id(&self, name: &str) -> MaterialId {
        self.materials
            .id(name)
            .unwrap_or_else(|| panic!("no material named '{name}' in the fixture"))
    }

    pub fn material(&self, name: &str) -> &Material {
        self.materials
            .by_name(name)
            .unwrap_or_else(|| panic!("no material named '{name}' in the fixture"))
    }
}

pub fn unified(prefix: OrePrefix, material: MaterialId) -> ItemKey {
    ItemKey::Unified { prefix, material }
}

// ===========================================================================
// Material constructors
// ===========================================================================

pub fn metal(temperature: u32) -> MaterialKind {
    MaterialKind::Metal(
        DustProps::default(),
        SolidProps::default(),
        MetalProps {
            blast_furnace_temperature: temperature,
            ..MetalProps::default()
        },
    )
}

fn flags(b: &mut MaterialCatalogBuilder, name: &str, flags: &[MaterialFlag]) {
    b.mutate(name, |m| m.flags.extend(flags.iter().copied()))
        .unwrap_or_else(|e| panic!("{e}"));
}

fn edit(b: &mut MaterialCatalogBuilder, name: &str, f: impl FnOnce(&mut Material)) {
    b.mutate(name, f).unwrap_or_else(|e| panic!("{e}"));
}

fn stack(b: &MaterialCatalogBuilder, name: &str, amount: u64) -> MaterialStack {
    let material = b.id(name).unwrap_or_else(|| panic!("unregistered '{name}'"));
    MaterialStack { material, amount }
}

/// A small catalog covering every rule family.
///
/// - `copper`: furnace metal, ore, 32 V cable (cloth-wrapped), byproduct gold
/// - `tin`: furnace metal, 8 V cable (rubber-insulated)
/// - `tungsten`: mass 200, blast temperature 3422, gets a hot ingot
/// - `iron`: tool material with most shapes, polarizes into `magnetic_iron`
/// - `steel`: tool material used for drill and wrench parts
/// - `ruby`: crystallisable gem, centrifuges into aluminium, chrome, oxygen
/// - `diamond`: non-crystallisable gem tool material
/// - reserved: stone, water, distilled_water, rubber, soldering_alloy,
///   dark_ash, wood, titanium; plus glowstone for the default blacklist
pub fn standard_materials() -> MaterialCatalog {
    use MaterialFlag as F;

    let mut b = MaterialCatalog::builder();

    // Reserved and auxiliary materials.
    b.register("stone", 20, MaterialKind::dust());
    b.register("water", 18, MaterialKind::Fluid);
    b.register("distilled_water", 18, MaterialKind::Fluid);
    b.register("oxygen", 16, MaterialKind::Fluid);
    b.register("rubber", 38, MaterialKind::solid());
    b.register("soldering_alloy", 112, metal(0));
    b.register("dark_ash", 24, MaterialKind::dust());
    b.register("wood", 12, MaterialKind::solid());
    b.register("glowstone", 24, MaterialKind::dust());
    b.register("titanium", 47, metal(1941));
    b.register("steel", 55, metal(1000));
    b.register("aluminium", 27, metal(1700));
    b.register("chrome", 52, metal(1700));
    b.register("gold", 196, metal(0));

    // Primary test materials.
    b.register("copper", 63, metal(0));
    b.register("tin", 118, metal(0));
    b.register("tungsten", 200, metal(3422));
    b.register("iron", 55, metal(0));
    b.register("magnetic_iron", 55, metal(0));
    b.register("ruby", 154, MaterialKind::gem());
    b.register("diamond", 12, MaterialKind::gem());

    flags(&mut b, "rubber", &[F::GeneratePlate, F::GenerateFluid, F::NoSmashing, F::Flammable]);
    flags(&mut b, "wood", &[F::GeneratePlate, F::GenerateRod, F::Flammable]);
    flags(&mut b, "titanium", &[F::GeneratePlate, F::GenerateRod, F::GenerateLongRod, F::GenerateRotor]);
    flags(
        &mut b,
        "steel",
        &[F::GeneratePlate, F::GenerateRod, F::GenerateRing, F::GenerateBoltScrew, F::GenerateGear],
    );
    flags(&mut b, "aluminium", &[F::GeneratePlate]);
    flags(&mut b, "gold", &[F::GeneratePlate, F::GenerateFoil]);
    flags(
        &mut b,
        "copper",
        &[
            F::GeneratePlate,
            F::GenerateOre,
            F::GenerateRod,
            F::GenerateFoil,
            F::GenerateFineWire,
            F::GenerateRing,
        ],
    );
    flags(&mut b, "tin", &[F::GeneratePlate, F::GenerateOre]);
    flags(&mut b, "tungsten", &[F::GeneratePlate, F::GenerateFoil]);
    flags(
        &mut b,
        "iron",
        &[
            F::GeneratePlate,
            F::GenerateDense,
            F::GenerateRod,
            F::GenerateLongRod,
            F::GenerateBoltScrew,
            F::GenerateRing,
            F::GenerateSpring,
            F::GenerateGear,
            F::GenerateSmallGear,
            F::GenerateFrame,
            F::GenerateOre,
        ],
    );
    flags(&mut b, "magnetic_iron", &[F::GeneratePlate, F::GenerateRod]);
    flags(
        &mut b,
        "ruby",
        &[
            F::GeneratePlate,
            F::GenerateLens,
            F::GenerateOre,
            F::Crystallisable,
            F::DecompositionByCentrifuging,
        ],
    );
    flags(&mut b, "diamond", &[F::GeneratePlate, F::GenerateLens]);

    let gold = b.id("gold");
    let tin = b.id("tin");
    let magnetic_iron = b.id("magnetic_iron");
    let wood = b.id("wood");
    let ruby_components = vec![
        stack(&b, "aluminium", 2),
        stack(&b, "chrome", 1),
        stack(&b, "oxygen", 3),
    ];

    edit(&mut b, "copper", |m| {
        if let Some(d) = m.dust_mut() {
            d.ore_byproducts.extend(gold);
        }
        if let Some(metal) = m.metal_mut() {
            metal.cable_voltage = Some(32);
        }
    });
    edit(&mut b, "tin", |m| {
        if let Some(metal) = m.metal_mut() {
            metal.cable_voltage = Some(8);
        }
    });
    edit(&mut b, "iron", |m| {
        if let Some(d) = m.dust_mut() {
            d.ore_byproducts.extend(tin);
        }
        if let Some(s) = m.solid_mut() {
            s.tool_durability = 256;
            s.handle_material = wood;
        }
        if let Some(metal) = m.metal_mut() {
            metal.magnetic_material = magnetic_iron;
        }
    });
    edit(&mut b, "steel", |m| {
        if let Some(s) = m.solid_mut() {
            s.tool_durability = 512;
        }
    });
    edit(&mut b, "titanium", |m| {
        if let Some(s) = m.solid_mut() {
            s.tool_durability = 1600;
        }
    });
    edit(&mut b, "diamond", |m| {
        if let Some(s) = m.solid_mut() {
            s.tool_durability = 1280;
        }
    });
    edit(&mut b, "ruby", |m| m.components = ruby_components);

    b.build().unwrap_or_else(|e| panic!("standard test catalog: {e}"))
}

pub fn standard_catalogs() -> Fixture {
    Fixture::new(standard_materials(), PrefixCatalog::standard())
}

// ===========================================================================
// Rule helpers
// ===========================================================================

impl Fixture {
    /// Run one rule against one material with the default configuration.
    pub fn apply(
        &self,
        rule: RuleFn,
        prefix: OrePrefix,
        material: &str,
    ) -> (RecipeMapRegistry, Result<(), RecipeError>) {
        self.apply_with(&EngineConfig::default(), rule, prefix, material)
    }

    pub fn apply_with(
        &self,
        config: &EngineConfig,
        rule: RuleFn,
        prefix: OrePrefix,
        material: &str,
    ) -> (RecipeMapRegistry, Result<(), RecipeError>) {
        let m = self.material(material);
        let mut registry = RecipeMapRegistry::new();
        let result = {
            let mut ctx = RuleContext::new(
                &self.materials,
                &self.prefixes,
                &self.items,
                config,
                &mut registry,
            );
            rule(&mut ctx, prefix, m)
        };
        (registry, result)
    }
}

/// Run one rule against one material of the standard catalogs.
pub fn try_apply_rule(
    rule: RuleFn,
    prefix: OrePrefix,
    material: &str,
) -> (Fixture, RecipeMapRegistry, Result<(), RecipeError>) {
    let fixture = standard_catalogs();
    let (registry, result) = fixture.apply(rule, prefix, material);
    (fixture, registry, result)
}

/// [`try_apply_rule`], panicking if the rule fails.
pub fn apply_rule(rule: RuleFn, prefix: OrePrefix, material: &str) -> (Fixture, RecipeMapRegistry) {
    let (fixture, registry, result) = try_apply_rule(rule, prefix, material);
    if let Err(e) = result {
        panic!("rule failed for {prefix}:{material}: {e}");
    }
    (fixture, registry)
}
