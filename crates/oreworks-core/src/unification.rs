//! Canonical item resolution.
//!
//! The unification table records which `(prefix, material)` pairs have an
//! item and which materials have a fluid form. Rules ask it for artifacts;
//! a missing pair resolves to [`Artifact::Empty`] rather than an error, and
//! rules decide whether that means "skip this recipe" or "drop this
//! optional output".

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{MaterialCatalog, PrefixCatalog};
use crate::id::{M, MaterialId};
use crate::material::MaterialFlag;
use crate::prefix::OrePrefix;

// ---------------------------------------------------------------------------
// Item keys
// ---------------------------------------------------------------------------

/// Non-unified parts: molds, extruder shapes and plain crafting materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    MoldIngot,
    MoldNugget,
    MoldPlate,
    MoldBlock,
    MoldGear,
    MoldGearSmall,
    ExtruderIngot,
    ExtruderBlock,
    ExtruderPlate,
    ExtruderRod,
    ExtruderWire,
    ExtruderBolt,
    ExtruderRing,
    ExtruderGear,
    ExtruderSword,
    ExtruderPickaxe,
    ExtruderShovel,
    ExtruderAxe,
    ExtruderHoe,
    ExtruderHammer,
    ExtruderFile,
    ExtruderSaw,
    BlackCarpet,
    String,
}

/// Crafting-grid tools. They are catalysts: never consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftingTool {
    Hammer,
    File,
    Saw,
    Wrench,
    Mortar,
    WireCutter,
    Screwdriver,
}

/// Crafted items that carry a head material and optionally a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Sword,
    Pickaxe,
    Shovel,
    UniversalSpade,
    Axe,
    Hoe,
    Sense,
    Plow,
    Saw,
    HardHammer,
    File,
    Wrench,
    Screwdriver,
    Knife,
    ButcheryKnife,
    Plunger,
    WireCutter,
    BranchCutter,
    Turbine,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Sword => "sword",
            ToolKind::Pickaxe => "pickaxe",
            ToolKind::Shovel => "shovel",
            ToolKind::UniversalSpade => "universal_spade",
            ToolKind::Axe => "axe",
            ToolKind::Hoe => "hoe",
            ToolKind::Sense => "sense",
            ToolKind::Plow => "plow",
            ToolKind::Saw => "saw",
            ToolKind::HardHammer => "hammer",
            ToolKind::File => "file",
            ToolKind::Wrench => "wrench",
            ToolKind::Screwdriver => "screwdriver",
            ToolKind::Knife => "knife",
            ToolKind::ButcheryKnife => "butchery_knife",
            ToolKind::Plunger => "plunger",
            ToolKind::WireCutter => "wire_cutter",
            ToolKind::BranchCutter => "branch_cutter",
            ToolKind::Turbine => "turbine",
        }
    }
}

/// Identity of an item, independent of stack size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKey {
    Unified {
        prefix: OrePrefix,
        material: MaterialId,
    },
    Part(Part),
    GridTool(CraftingTool),
    Tool {
        kind: ToolKind,
        material: MaterialId,
        handle: Option<MaterialId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub key: ItemKey,
    pub count: u32,
}

impl ItemStack {
    pub fn new(key: ItemKey, count: u32) -> Self {
        Self { key, count }
    }

    pub fn part(part: Part, count: u32) -> Self {
        Self::new(ItemKey::Part(part), count)
    }

    pub fn grid_tool(tool: CraftingTool) -> Self {
        Self::new(ItemKey::GridTool(tool), 1)
    }

    pub fn tool(kind: ToolKind, material: MaterialId, handle: Option<MaterialId>) -> Self {
        Self::new(
            ItemKey::Tool {
                kind,
                material,
                handle,
            },
            1,
        )
    }
}

impl std::fmt::Display for ItemStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.key {
            ItemKey::Unified { prefix, material } => {
                write!(f, "{}x {prefix}:{material}", self.count)
            }
            ItemKey::Part(part) => write!(f, "{}x {part:?}", self.count),
            ItemKey::GridTool(tool) => write!(f, "{tool:?}"),
            ItemKey::Tool { kind, material, .. } => write!(f, "{}:{material}", kind.name()),
        }
    }
}

/// Result of resolving a `(prefix, material)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Stack(ItemStack),
    Empty,
}

impl Artifact {
    pub fn is_empty(&self) -> bool {
        matches!(self, Artifact::Empty)
    }

    pub fn stack(&self) -> Option<&ItemStack> {
        match self {
            Artifact::Stack(stack) => Some(stack),
            Artifact::Empty => None,
        }
    }

    pub fn count(&self) -> u32 {
        self.stack().map_or(0, |s| s.count)
    }

    /// Same item with a different count. A zero count is empty.
    pub fn with_count(self, count: u32) -> Artifact {
        match self {
            Artifact::Stack(stack) if count > 0 => Artifact::Stack(ItemStack { count, ..stack }),
            _ => Artifact::Empty,
        }
    }
}

impl From<ItemStack> for Artifact {
    fn from(stack: ItemStack) -> Self {
        if stack.count == 0 {
            Artifact::Empty
        } else {
            Artifact::Stack(stack)
        }
    }
}

/// A fluid volume in millibuckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FluidStack {
    pub material: MaterialId,
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// Unification table
// ---------------------------------------------------------------------------

/// Canonical item resolver.
#[derive(Debug, Clone, Default)]
pub struct UnificationTable {
    items: HashSet<(OrePrefix, MaterialId)>,
    fluids: HashSet<MaterialId>,
}

impl UnificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate from prefix generation conditions. Materials flagged
    /// `NO_UNIFICATION` get no canonical items; their fluid still exists.
    pub fn generate(materials: &MaterialCatalog, prefixes: &PrefixCatalog) -> Self {
        let mut table = Self::new();
        for material in materials.iter() {
            if material.has_fluid() {
                table.fluids.insert(material.id);
            }
            if material.has(MaterialFlag::NoUnification) {
                continue;
            }
            for def in prefixes.iter() {
                if def.generate.holds(material) {
                    table.items.insert((def.prefix, material.id));
                }
            }
        }
        debug!(
            items = table.items.len(),
            fluids = table.fluids.len(),
            "unification table generated"
        );
        table
    }

    pub fn register(&mut self, prefix: OrePrefix, material: MaterialId) {
        self.items.insert((prefix, material));
    }

    /// Remove a pair. Returns whether it was present.
    pub fn unregister(&mut self, prefix: OrePrefix, material: MaterialId) -> bool {
        self.items.remove(&(prefix, material))
    }

    pub fn register_fluid(&mut self, material: MaterialId) {
        self.fluids.insert(material);
    }

    pub fn contains(&self, prefix: OrePrefix, material: MaterialId) -> bool {
        self.items.contains(&(prefix, material))
    }

    /// `count` items of `prefix` made of `material`, or `Empty`.
    pub fn resolve(&self, prefix: OrePrefix, material: MaterialId, count: u32) -> Artifact {
        if count == 0 || !self.contains(prefix, material) {
            return Artifact::Empty;
        }
        Artifact::Stack(ItemStack::new(ItemKey::Unified { prefix, material }, count))
    }

    pub fn get(&self, prefix: OrePrefix, material: MaterialId) -> Artifact {
        self.resolve(prefix, material, 1)
    }

    /// Express `amount` (in units of `M`) as whole dust, small dust or tiny
    /// dust, in that order of preference. `Empty` if none divides evenly or
    /// the chosen shape doesn't exist for the material.
    pub fn dust_for_amount(&self, material: MaterialId, amount: u64) -> Artifact {
        let shapes = [
            (OrePrefix::Dust, M),
            (OrePrefix::DustSmall, M / 4),
            (OrePrefix::DustTiny, M / 9),
        ];
        if amount == 0 {
            return Artifact::Empty;
        }
        for (prefix, unit) in shapes {
            if amount % unit == 0 {
                let count = u32::try_from(amount / unit).unwrap_or(u32::MAX);
                return self.resolve(prefix, material, count);
            }
        }
        Artifact::Empty
    }

    /// `amount` millibuckets of the material's fluid, if it has one.
    pub fn fluid(&self, material: MaterialId, amount: u32) -> Option<FluidStack> {
        (amount > 0 && self.fluids.contains(&material)).then_some(FluidStack { material, amount })
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;

    fn table() -> (MaterialCatalog, UnificationTable) {
        let mut b = MaterialCatalog::builder();
        b.register("copper", 63, MaterialKind::metal());
        b.register("water", 18, MaterialKind::Fluid);
        b.register("hidden", 10, MaterialKind::metal());
        b.mutate("hidden", |m| {
            m.flags.insert(MaterialFlag::NoUnification);
        })
        .unwrap();
        let catalog = b.build().unwrap();
        let table = UnificationTable::generate(&catalog, &PrefixCatalog::standard());
        (catalog, table)
    }

    #[test]
    fn generated_entries_follow_conditions() {
        let (catalog, table) = table();
        let cu = catalog.id("copper").unwrap();
        assert!(table.contains(OrePrefix::Ingot, cu));
        assert!(table.contains(OrePrefix::DustTiny, cu));
        assert!(!table.contains(OrePrefix::Plate, cu));
        assert!(!table.contains(OrePrefix::Gem, cu));
    }

    #[test]
    fn no_unification_excludes_items_but_keeps_fluid() {
        let (catalog, table) = table();
        let hidden = catalog.id("hidden").unwrap();
        assert!(table.get(OrePrefix::Ingot, hidden).is_empty());
        assert!(table.fluid(hidden, 144).is_some());
    }

    #[test]
    fn resolve_with_zero_count_is_empty() {
        let (catalog, table) = table();
        let cu = catalog.id("copper").unwrap();
        assert!(table.resolve(OrePrefix::Ingot, cu, 0).is_empty());
        assert_eq!(table.resolve(OrePrefix::Ingot, cu, 3).count(), 3);
    }

    #[test]
    fn dust_for_amount_picks_largest_even_shape() {
        let (catalog, table) = table();
        let cu = catalog.id("copper").unwrap();
        let key = |a: Artifact| a.stack().map(|s| (s.key, s.count));

        assert_eq!(
            key(table.dust_for_amount(cu, 2 * M)),
            Some((ItemKey::Unified { prefix: OrePrefix::Dust, material: cu }, 2))
        );
        assert_eq!(
            key(table.dust_for_amount(cu, M / 2)),
            Some((ItemKey::Unified { prefix: OrePrefix::DustSmall, material: cu }, 2))
        );
        assert_eq!(
            key(table.dust_for_amount(cu, M / 9)),
            Some((ItemKey::Unified { prefix: OrePrefix::DustTiny, material: cu }, 1))
        );
        assert!(table.dust_for_amount(cu, 0).is_empty());
        assert!(table.dust_for_amount(cu, 7).is_empty());
    }

    #[test]
    fn fluid_lookup() {
        let (catalog, table) = table();
        let water = catalog.id("water").unwrap();
        assert_eq!(
            table.fluid(water, 1000),
            Some(FluidStack { material: water, amount: 1000 })
        );
        assert!(table.fluid(water, 0).is_none());
        assert!(table.get(OrePrefix::Dust, water).is_empty());
    }

    #[test]
    fn unregister_removes_pair() {
        let (catalog, mut table) = table();
        let cu = catalog.id("copper").unwrap();
        assert!(table.unregister(OrePrefix::Nugget, cu));
        assert!(!table.unregister(OrePrefix::Nugget, cu));
        assert!(table.get(OrePrefix::Nugget, cu).is_empty());
    }

    #[test]
    fn artifact_with_count() {
        let stack = ItemStack::part(Part::BlackCarpet, 1);
        let artifact = Artifact::from(stack);
        assert_eq!(artifact.with_count(5).count(), 5);
        assert!(artifact.with_count(0).is_empty());
        assert!(Artifact::Empty.with_count(2).is_empty());
    }
}
