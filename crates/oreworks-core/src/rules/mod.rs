//! Processing rules.
//!
//! A rule is a plain function of `(context, prefix, material)` that emits
//! zero or more recipe descriptors through the context. Rules abstain by
//! returning `Ok(())` without emitting anything; an `InvalidRecipe` error
//! skips the rest of that rule for that material; any other error aborts the
//! whole pass.
//!
//! [`RuleSet::standard`] wires every rule to the prefixes it handles.

pub mod forming;
pub mod ore;
pub mod shaping;
pub mod tools;
pub mod wire;

use std::collections::HashMap;

use crate::byproduct::ByproductSelector;
use crate::catalog::{MaterialCatalog, PrefixCatalog};
use crate::config::{EngineConfig, Reserved};
use crate::id::MaterialId;
use crate::material::{Kind, Material, MaterialStack};
use crate::prefix::OrePrefix;
use crate::recipe::{RecipeBuilder, RecipeError, RecipeMap};
use crate::registry::RecipeSink;
use crate::unification::{Artifact, FluidStack, UnificationTable};

pub type RuleFn = fn(&mut RuleContext<'_>, OrePrefix, &Material) -> Result<(), RecipeError>;

/// A named rule function. The name shows up in logs and faults.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: RuleFn,
}

impl Rule {
    pub const fn new(name: &'static str, apply: RuleFn) -> Self {
        Self { name, apply }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Ordered rules per prefix.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    table: HashMap<OrePrefix, Vec<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules to a prefix's list.
    pub fn register(&mut self, prefix: OrePrefix, rules: &[Rule]) {
        self.table.entry(prefix).or_default().extend_from_slice(rules);
    }

    pub fn rules_for(&self, prefix: OrePrefix) -> &[Rule] {
        self.table.get(&prefix).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The full standard dispatch table.
    pub fn standard() -> Self {
        use OrePrefix as P;

        let polarizing = Rule::new("polarizing", shaping::polarizing);
        let shaping = Rule::new("shaping", shaping::shaping);
        let mut set = RuleSet::new();

        set.register(P::Plate, &[Rule::new("plate", forming::plate), polarizing]);
        set.register(P::PlateDense, &[Rule::new("dense_plate", forming::dense_plate), polarizing]);
        set.register(P::Stick, &[Rule::new("stick", forming::stick), polarizing]);
        set.register(P::StickLong, &[Rule::new("long_stick", forming::long_stick), polarizing]);
        set.register(P::Ingot, &[Rule::new("ingot", shaping::ingot), polarizing, shaping]);
        set.register(P::Nugget, &[Rule::new("nugget", forming::nugget), polarizing]);
        set.register(P::Compressed, &[Rule::new("compressed", forming::compressed)]);
        set.register(P::TurbineBlade, &[Rule::new("turbine_blade", forming::turbine_blade)]);
        set.register(P::Rotor, &[Rule::new("rotor", forming::rotor), polarizing]);
        set.register(P::Bolt, &[Rule::new("bolt", forming::bolt), polarizing]);
        set.register(P::Screw, &[Rule::new("screw", forming::screw), polarizing]);
        set.register(P::WireFine, &[Rule::new("fine_wire", forming::fine_wire), polarizing]);
        set.register(P::Foil, &[Rule::new("foil", forming::foil), polarizing]);
        set.register(P::Lens, &[Rule::new("lens", forming::lens)]);
        set.register(P::Block, &[Rule::new("block", forming::block)]);
        set.register(P::FrameGt, &[Rule::new("frame", forming::frame)]);

        for &prefix in OrePrefix::ALL.iter().filter(|p| p.is_ore()) {
            set.register(prefix, &[Rule::new("ore", ore::ore)]);
        }
        set.register(P::Crushed, &[Rule::new("crushed", ore::crushed)]);
        set.register(P::CrushedPurified, &[Rule::new("purified", ore::purified)]);
        set.register(P::CrushedCentrifuged, &[Rule::new("centrifuged", ore::centrifuged)]);
        set.register(P::Crystalline, &[Rule::new("crystalline", ore::crystalline)]);
        set.register(
            P::Dust,
            &[
                Rule::new("dust", ore::dust),
                Rule::new("decomposition", ore::decomposition),
                shaping,
            ],
        );
        for prefix in [P::DustImpure, P::DustPure, P::DustRefined] {
            set.register(prefix, &[Rule::new("impure_dust", ore::impure_dust)]);
        }
        set.register(P::DustSmall, &[Rule::new("small_dust", forming::small_dust)]);
        set.register(P::DustTiny, &[Rule::new("tiny_dust", forming::tiny_dust)]);
        set.register(P::Gear, &[Rule::new("gear", forming::gear)]);
        set.register(P::GearSmall, &[Rule::new("gear", forming::gear)]);
        for prefix in OrePrefix::GEM_ORDER {
            set.register(prefix, &[Rule::new("gem", shaping::gem)]);
        }
        for prefix in OrePrefix::WIRES {
            set.register(prefix, &[Rule::new("wire", wire::wire)]);
        }
        for &prefix in OrePrefix::ALL.iter().filter(|p| p.is_tool_head()) {
            set.register(prefix, &[Rule::new("tool_head", tools::tool_head)]);
        }

        let crushing = Rule::new("crushing", ore::crushing);
        for &prefix in OrePrefix::ALL.iter().filter(|p| p.is_crushable()) {
            set.register(prefix, &[crushing]);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Rule context
// ---------------------------------------------------------------------------

/// Everything a rule can see and the sink it emits into.
pub struct RuleContext<'a> {
    pub materials: &'a MaterialCatalog,
    pub prefixes: &'a PrefixCatalog,
    pub items: &'a UnificationTable,
    pub config: &'a EngineConfig,
    pub reserved: Reserved,
    byproducts: ByproductSelector,
    sink: &'a mut dyn RecipeSink,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        materials: &'a MaterialCatalog,
        prefixes: &'a PrefixCatalog,
        items: &'a UnificationTable,
        config: &'a EngineConfig,
        sink: &'a mut dyn RecipeSink,
    ) -> Self {
        let reserved = config.resolve(materials);
        Self {
            materials,
            prefixes,
            items,
            config,
            reserved,
            byproducts: ByproductSelector::new(reserved.stone),
            sink,
        }
    }

    /// Start a descriptor for `map`.
    pub fn recipe(&mut self, map: RecipeMap) -> RecipeBuilder<'_> {
        RecipeBuilder::new(&mut *self.sink, self.items, map)
    }

    pub fn material(&self, id: MaterialId) -> Result<&'a Material, RecipeError> {
        self.materials.get(id).ok_or(RecipeError::UnknownMaterial(id))
    }

    pub fn has(&self, prefix: OrePrefix, material: MaterialId) -> bool {
        self.items.contains(prefix, material)
    }

    pub fn get(&self, prefix: OrePrefix, material: MaterialId) -> Artifact {
        self.items.get(prefix, material)
    }

    pub fn get_n(&self, prefix: OrePrefix, material: MaterialId, count: u32) -> Artifact {
        self.items.resolve(prefix, material, count)
    }

    pub fn dust(&self, material: MaterialId, amount: u64) -> Artifact {
        self.items.dust_for_amount(material, amount)
    }

    pub fn fluid(&self, material: MaterialId, amount: u32) -> Option<FluidStack> {
        self.items.fluid(material, amount)
    }

    /// Fluid of an optional reserved material.
    pub fn reserved_fluid(&self, material: Option<MaterialId>, amount: u32) -> Option<FluidStack> {
        material.and_then(|id| self.fluid(id, amount))
    }

    /// Byproduct of `primary` for the ore-chain stage at `index`.
    pub fn byproduct(
        &self,
        primary: &Material,
        index: usize,
        expected: Kind,
    ) -> Result<&'a Material, RecipeError> {
        let primary = self.material(primary.id)?;
        Ok(self.byproducts.select(self.materials, primary, index, expected))
    }

    pub fn amount(&self, prefix: OrePrefix) -> u64 {
        self.prefixes.material_amount(prefix)
    }

    pub fn secondary(&self, prefix: OrePrefix) -> Option<MaterialStack> {
        self.prefixes.get(prefix).and_then(|d| d.secondary)
    }

    /// Handle material for tools made of `material`.
    pub fn handle(&self, material: &Material) -> Option<MaterialId> {
        material
            .as_solid()
            .and_then(|s| s.handle_material)
            .or(self.reserved.wood)
    }
}

/// Clamp a computed count into a stack size.
pub(crate) fn count(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_order() {
        let set = RuleSet::standard();
        let names: Vec<&str> = set.rules_for(OrePrefix::Ingot).iter().map(|r| r.name).collect();
        assert_eq!(names, ["ingot", "polarizing", "shaping", "crushing"]);

        let names: Vec<&str> = set.rules_for(OrePrefix::Dust).iter().map(|r| r.name).collect();
        assert_eq!(names, ["dust", "decomposition", "shaping"]);
    }

    #[test]
    fn crushing_is_appended_last() {
        let set = RuleSet::standard();
        for &prefix in OrePrefix::ALL.iter().filter(|p| p.is_crushable()) {
            let rules = set.rules_for(prefix);
            assert_eq!(rules.last().map(|r| r.name), Some("crushing"), "{prefix}");
        }
    }

    #[test]
    fn every_ore_variant_has_the_ore_rule() {
        let set = RuleSet::standard();
        for &prefix in OrePrefix::ALL.iter().filter(|p| p.is_ore()) {
            assert_eq!(set.rules_for(prefix).len(), 1);
        }
    }

    #[test]
    fn unregistered_prefix_has_no_rules() {
        let set = RuleSet::standard();
        assert!(set.rules_for(OrePrefix::IngotHot).is_empty());
        assert!(set.rules_for(OrePrefix::Plank).is_empty());
    }
}
