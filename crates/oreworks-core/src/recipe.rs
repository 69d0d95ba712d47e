//! Recipe descriptors and the fluent builder rules use to emit them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::MaterialId;
use crate::material::TypeMismatch;
use crate::prefix::OrePrefix;
use crate::registry::{RecipeSink, RegistryError};
use crate::unification::{Artifact, CraftingTool, FluidStack, ItemStack, UnificationTable};

// ---------------------------------------------------------------------------
// Recipe maps
// ---------------------------------------------------------------------------

/// A named recipe collection for one machine class or crafting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeMap {
    Macerator,
    ForgeHammer,
    OreWasher,
    ThermalCentrifuge,
    ChemicalBath,
    Centrifuge,
    Electrolyzer,
    ElectromagneticSeparator,
    Autoclave,
    Implosion,
    BlastFurnace,
    VacuumFreezer,
    Compressor,
    Bender,
    Lathe,
    Cutter,
    Extruder,
    AlloySmelter,
    FluidSolidifier,
    Wiremill,
    Polarizer,
    Assembler,
    Packer,
    Unpacker,
    Sifter,
    /// Plain furnace smelting.
    Smelting,
    CraftingShaped,
    CraftingShapeless,
}

impl RecipeMap {
    pub const ALL: [RecipeMap; 28] = [
        RecipeMap::Macerator,
        RecipeMap::ForgeHammer,
        RecipeMap::OreWasher,
        RecipeMap::ThermalCentrifuge,
        RecipeMap::ChemicalBath,
        RecipeMap::Centrifuge,
        RecipeMap::Electrolyzer,
        RecipeMap::ElectromagneticSeparator,
        RecipeMap::Autoclave,
        RecipeMap::Implosion,
        RecipeMap::BlastFurnace,
        RecipeMap::VacuumFreezer,
        RecipeMap::Compressor,
        RecipeMap::Bender,
        RecipeMap::Lathe,
        RecipeMap::Cutter,
        RecipeMap::Extruder,
        RecipeMap::AlloySmelter,
        RecipeMap::FluidSolidifier,
        RecipeMap::Wiremill,
        RecipeMap::Polarizer,
        RecipeMap::Assembler,
        RecipeMap::Packer,
        RecipeMap::Unpacker,
        RecipeMap::Sifter,
        RecipeMap::Smelting,
        RecipeMap::CraftingShaped,
        RecipeMap::CraftingShapeless,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecipeMap::Macerator => "macerator",
            RecipeMap::ForgeHammer => "forge_hammer",
            RecipeMap::OreWasher => "ore_washer",
            RecipeMap::ThermalCentrifuge => "thermal_centrifuge",
            RecipeMap::ChemicalBath => "chemical_bath",
            RecipeMap::Centrifuge => "centrifuge",
            RecipeMap::Electrolyzer => "electrolyzer",
            RecipeMap::ElectromagneticSeparator => "electromagnetic_separator",
            RecipeMap::Autoclave => "autoclave",
            RecipeMap::Implosion => "implosion_compressor",
            RecipeMap::BlastFurnace => "blast_furnace",
            RecipeMap::VacuumFreezer => "vacuum_freezer",
            RecipeMap::Compressor => "compressor",
            RecipeMap::Bender => "bender",
            RecipeMap::Lathe => "lathe",
            RecipeMap::Cutter => "cutter",
            RecipeMap::Extruder => "extruder",
            RecipeMap::AlloySmelter => "alloy_smelter",
            RecipeMap::FluidSolidifier => "fluid_solidifier",
            RecipeMap::Wiremill => "wiremill",
            RecipeMap::Polarizer => "polarizer",
            RecipeMap::Assembler => "assembler",
            RecipeMap::Packer => "packer",
            RecipeMap::Unpacker => "unpacker",
            RecipeMap::Sifter => "sifter",
            RecipeMap::Smelting => "smelting",
            RecipeMap::CraftingShaped => "crafting_shaped",
            RecipeMap::CraftingShapeless => "crafting_shapeless",
        }
    }

    /// Crafting-grid maps carry no duration or energy.
    pub fn is_crafting(self) -> bool {
        matches!(self, RecipeMap::CraftingShaped | RecipeMap::CraftingShapeless)
    }

    /// Duration and energy rate a descriptor starts with before a rule sets
    /// its own.
    pub fn defaults(self) -> (u32, u32) {
        match self {
            RecipeMap::Macerator => (150, 8),
            RecipeMap::ForgeHammer => (100, 16),
            RecipeMap::OreWasher => (400, 16),
            RecipeMap::ThermalCentrifuge => (400, 60),
            RecipeMap::ChemicalBath => (400, 30),
            RecipeMap::Centrifuge => (200, 5),
            RecipeMap::Electrolyzer => (200, 30),
            RecipeMap::ElectromagneticSeparator => (200, 24),
            RecipeMap::Autoclave => (2000, 24),
            RecipeMap::Implosion => (20, 30),
            RecipeMap::BlastFurnace => (400, 120),
            RecipeMap::VacuumFreezer => (200, 120),
            RecipeMap::Compressor => (400, 2),
            RecipeMap::Bender => (200, 24),
            RecipeMap::Lathe => (200, 16),
            RecipeMap::Cutter => (200, 30),
            RecipeMap::Extruder => (200, 30),
            RecipeMap::AlloySmelter => (200, 16),
            RecipeMap::FluidSolidifier => (100, 8),
            RecipeMap::Wiremill => (200, 8),
            RecipeMap::Polarizer => (100, 16),
            RecipeMap::Assembler => (200, 24),
            RecipeMap::Packer => (100, 8),
            RecipeMap::Unpacker => (100, 8),
            RecipeMap::Sifter => (800, 16),
            RecipeMap::Smelting | RecipeMap::CraftingShaped | RecipeMap::CraftingShapeless => {
                (0, 0)
            }
        }
    }
}

impl std::fmt::Display for RecipeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Machine-specific recipe parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeProperty {
    /// Programmed-circuit configuration that selects between recipes with
    /// the same inputs.
    Circuit,
    /// Minimum blast furnace temperature, in kelvin.
    Temperature,
    /// Explosive charges consumed by the implosion compressor.
    Explosives,
}

/// Output with an optional chance in hundredths of a percent (10000 = always).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeOutput {
    pub stack: ItemStack,
    pub chance: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDescriptor {
    pub map: RecipeMap,
    /// Stable name; crafting recipes always have one.
    pub name: Option<String>,
    pub inputs: Vec<ItemStack>,
    pub fluid_inputs: Vec<FluidStack>,
    pub outputs: Vec<RecipeOutput>,
    pub fluid_outputs: Vec<FluidStack>,
    /// Items required but not consumed.
    pub catalysts: Vec<ItemStack>,
    pub duration: u32,
    pub energy_rate: u32,
    pub properties: BTreeMap<RecipeProperty, u32>,
}

/// What makes two descriptors in the same map the same recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecipeKey {
    Named(String),
    Signature {
        inputs: Vec<ItemStack>,
        fluid_inputs: Vec<FluidStack>,
        catalysts: Vec<ItemStack>,
        properties: BTreeMap<RecipeProperty, u32>,
    },
}

impl std::fmt::Display for RecipeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeKey::Named(name) => f.write_str(name),
            RecipeKey::Signature { inputs, .. } => {
                let parts: Vec<String> = inputs.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl RecipeDescriptor {
    pub fn new(map: RecipeMap) -> Self {
        let (duration, energy_rate) = map.defaults();
        Self {
            map,
            name: None,
            inputs: Vec::new(),
            fluid_inputs: Vec::new(),
            outputs: Vec::new(),
            fluid_outputs: Vec::new(),
            catalysts: Vec::new(),
            duration,
            energy_rate,
            properties: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> RecipeKey {
        match &self.name {
            Some(name) => RecipeKey::Named(name.clone()),
            None => RecipeKey::Signature {
                inputs: self.inputs.clone(),
                fluid_inputs: self.fluid_inputs.clone(),
                catalysts: self.catalysts.clone(),
                properties: self.properties.clone(),
            },
        }
    }

    /// Structural checks every committed descriptor must pass.
    pub fn check(&self) -> Result<(), InvalidReason> {
        if self.outputs.is_empty() && self.fluid_outputs.is_empty() {
            return Err(InvalidReason::NoOutputs);
        }
        if self.inputs.is_empty() && self.fluid_inputs.is_empty() {
            return Err(InvalidReason::NoInputs);
        }
        let zero_item = self
            .inputs
            .iter()
            .chain(self.catalysts.iter())
            .chain(self.outputs.iter().map(|o| &o.stack))
            .any(|s| s.count == 0);
        let zero_fluid = self
            .fluid_inputs
            .iter()
            .chain(self.fluid_outputs.iter())
            .any(|f| f.amount == 0);
        if zero_item || zero_fluid {
            return Err(InvalidReason::ZeroQuantity);
        }
        if self.outputs.iter().any(|o| o.chance.is_some_and(|c| c == 0 || c > 10_000)) {
            return Err(InvalidReason::BadChance);
        }
        if self.map.is_crafting() && self.name.is_none() {
            return Err(InvalidReason::UnnamedCrafting);
        }
        Ok(())
    }

    pub fn property(&self, property: RecipeProperty) -> Option<u32> {
        self.properties.get(&property).copied()
    }

    /// Convenience for queries: the first output stack.
    pub fn primary_output(&self) -> Option<&ItemStack> {
        self.outputs.first().map(|o| &o.stack)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("recipe has no outputs")]
    NoOutputs,
    #[error("recipe has no inputs")]
    NoInputs,
    #[error("missing artifact for {0}")]
    MissingArtifact(String),
    #[error("missing fluid for {0}")]
    MissingFluid(MaterialId),
    #[error("zero-sized stack")]
    ZeroQuantity,
    #[error("chance outside 1..=10000")]
    BadChance,
    #[error("crafting recipe without a name")]
    UnnamedCrafting,
}

/// Errors a rule can raise. Only [`RecipeError::InvalidRecipe`] is
/// recoverable; everything else aborts the pass.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("invalid {map} recipe: {reason}")]
    InvalidRecipe { map: RecipeMap, reason: InvalidReason },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),
    #[error("unknown material reference {0}")]
    UnknownMaterial(MaterialId),
}

impl RecipeError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RecipeError::InvalidRecipe { .. })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates one descriptor. Nothing reaches the sink until [`submit`];
/// dropping the builder discards the recipe.
///
/// Inputs and outputs are taken as [`Artifact`]s. A mandatory slot given
/// `Empty` poisons the builder and `submit` reports `InvalidRecipe`; the
/// `*_if_present` variants silently drop `Empty` instead.
///
/// [`submit`]: RecipeBuilder::submit
#[must_use = "a recipe builder does nothing until submitted"]
pub struct RecipeBuilder<'a> {
    sink: &'a mut dyn RecipeSink,
    items: &'a UnificationTable,
    recipe: RecipeDescriptor,
    missing: Option<InvalidReason>,
}

impl<'a> RecipeBuilder<'a> {
    pub fn new(sink: &'a mut dyn RecipeSink, items: &'a UnificationTable, map: RecipeMap) -> Self {
        Self {
            sink,
            items,
            recipe: RecipeDescriptor::new(map),
            missing: None,
        }
    }

    fn poison(&mut self, reason: InvalidReason) {
        if self.missing.is_none() {
            self.missing = Some(reason);
        }
    }

    fn missing_item(&mut self, slot: &str) {
        let reason = InvalidReason::MissingArtifact(format!("{} {slot}", self.recipe.map));
        self.poison(reason);
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.recipe.name = Some(name.into());
        self
    }

    /// `count` canonical items of `prefix` in `material`.
    pub fn input(mut self, prefix: OrePrefix, material: MaterialId, count: u32) -> Self {
        match self.items.resolve(prefix, material, count) {
            Artifact::Stack(stack) => self.recipe.inputs.push(stack),
            Artifact::Empty => {
                let reason = InvalidReason::MissingArtifact(format!("{prefix}:{material}"));
                self.poison(reason);
            }
        }
        self
    }

    pub fn input_artifact(mut self, artifact: Artifact) -> Self {
        match artifact {
            Artifact::Stack(stack) => self.recipe.inputs.push(stack),
            Artifact::Empty => self.missing_item("input"),
        }
        self
    }

    pub fn input_stack(mut self, stack: ItemStack) -> Self {
        self.recipe.inputs.push(stack);
        self
    }

    pub fn fluid_input(mut self, fluid: Option<FluidStack>, material: MaterialId) -> Self {
        match fluid {
            Some(fluid) => self.recipe.fluid_inputs.push(fluid),
            None => self.poison(InvalidReason::MissingFluid(material)),
        }
        self
    }

    pub fn output(mut self, artifact: Artifact) -> Self {
        match artifact {
            Artifact::Stack(stack) => self.recipe.outputs.push(RecipeOutput { stack, chance: None }),
            Artifact::Empty => self.missing_item("output"),
        }
        self
    }

    pub fn output_if_present(mut self, artifact: Artifact) -> Self {
        if let Artifact::Stack(stack) = artifact {
            self.recipe.outputs.push(RecipeOutput { stack, chance: None });
        }
        self
    }

    pub fn output_stack(mut self, stack: ItemStack) -> Self {
        self.recipe.outputs.push(RecipeOutput { stack, chance: None });
        self
    }

    pub fn chanced_output(mut self, artifact: Artifact, chance: u32) -> Self {
        match artifact {
            Artifact::Stack(stack) => self.recipe.outputs.push(RecipeOutput {
                stack,
                chance: Some(chance),
            }),
            Artifact::Empty => self.missing_item("chanced output"),
        }
        self
    }

    pub fn chanced_output_if_present(mut self, artifact: Artifact, chance: u32) -> Self {
        if let Artifact::Stack(stack) = artifact {
            self.recipe.outputs.push(RecipeOutput {
                stack,
                chance: Some(chance),
            });
        }
        self
    }

    pub fn fluid_output(mut self, fluid: Option<FluidStack>, material: MaterialId) -> Self {
        match fluid {
            Some(fluid) => self.recipe.fluid_outputs.push(fluid),
            None => self.poison(InvalidReason::MissingFluid(material)),
        }
        self
    }

    pub fn fluid_output_if_present(mut self, fluid: Option<FluidStack>) -> Self {
        self.recipe.fluid_outputs.extend(fluid);
        self
    }

    /// Required but not consumed.
    pub fn not_consumed(mut self, stack: ItemStack) -> Self {
        self.recipe.catalysts.push(stack);
        self
    }

    /// Crafting-grid tools the recipe needs.
    pub fn grid_tools(mut self, tools: &[CraftingTool]) -> Self {
        self.recipe
            .catalysts
            .extend(tools.iter().map(|&tool| ItemStack::grid_tool(tool)));
        self
    }

    pub fn duration(mut self, ticks: u64) -> Self {
        self.recipe.duration = u32::try_from(ticks.max(1)).unwrap_or(u32::MAX);
        self
    }

    pub fn energy_rate(mut self, eu_per_tick: u32) -> Self {
        self.recipe.energy_rate = eu_per_tick;
        self
    }

    pub fn property(mut self, property: RecipeProperty, value: u32) -> Self {
        self.recipe.properties.insert(property, value);
        self
    }

    pub fn circuit(self, configuration: u32) -> Self {
        self.property(RecipeProperty::Circuit, configuration)
    }

    pub fn blast_temperature(self, kelvin: u32) -> Self {
        self.property(RecipeProperty::Temperature, kelvin)
    }

    pub fn explosives(self, charges: u32) -> Self {
        self.property(RecipeProperty::Explosives, charges)
    }

    /// Validate and hand the descriptor to the sink.
    pub fn submit(self) -> Result<(), RecipeError> {
        let map = self.recipe.map;
        if let Some(reason) = self.missing {
            return Err(RecipeError::InvalidRecipe { map, reason });
        }
        self.recipe
            .check()
            .map_err(|reason| RecipeError::InvalidRecipe { map, reason })?;
        self.sink.commit(self.recipe)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MaterialCatalog, PrefixCatalog};
    use crate::material::MaterialKind;
    use crate::registry::RecipeMapRegistry;
    use crate::unification::{CraftingTool, Part};

    fn setup() -> (MaterialId, UnificationTable) {
        let mut b = MaterialCatalog::builder();
        let cu = b.register("copper", 63, MaterialKind::metal());
        let catalog = b.build().unwrap();
        (cu, UnificationTable::generate(&catalog, &PrefixCatalog::standard()))
    }

    #[test]
    fn builder_commits_descriptor() {
        let (cu, items) = setup();
        let mut registry = RecipeMapRegistry::new();
        RecipeBuilder::new(&mut registry, &items, RecipeMap::Macerator)
            .input(OrePrefix::Ingot, cu, 1)
            .output(items.get(OrePrefix::Dust, cu))
            .duration(63)
            .submit()
            .unwrap();

        assert_eq!(registry.len(), 1);
        let recipe = registry.recipes().next().unwrap();
        assert_eq!(recipe.duration, 63);
        assert_eq!(recipe.energy_rate, 8);
    }

    #[test]
    fn empty_mandatory_output_is_invalid() {
        let (cu, items) = setup();
        let mut registry = RecipeMapRegistry::new();
        let err = RecipeBuilder::new(&mut registry, &items, RecipeMap::Bender)
            .input(OrePrefix::Ingot, cu, 1)
            .output(items.get(OrePrefix::Plate, cu))
            .submit()
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_input_is_invalid() {
        let (cu, items) = setup();
        let mut registry = RecipeMapRegistry::new();
        let err = RecipeBuilder::new(&mut registry, &items, RecipeMap::Lathe)
            .input(OrePrefix::Gem, cu, 1)
            .output(items.get(OrePrefix::Stick, cu))
            .submit()
            .unwrap_err();
        assert!(matches!(
            err,
            RecipeError::InvalidRecipe { reason: InvalidReason::MissingArtifact(_), .. }
        ));
    }

    #[test]
    fn optional_outputs_are_dropped_when_empty() {
        let (cu, items) = setup();
        let mut registry = RecipeMapRegistry::new();
        RecipeBuilder::new(&mut registry, &items, RecipeMap::Macerator)
            .input(OrePrefix::Ingot, cu, 1)
            .output(items.get(OrePrefix::Dust, cu))
            .chanced_output_if_present(items.get(OrePrefix::Gem, cu), 1000)
            .submit()
            .unwrap();
        assert_eq!(registry.recipes().next().unwrap().outputs.len(), 1);
    }

    #[test]
    fn crafting_recipe_requires_name() {
        let (cu, items) = setup();
        let mut registry = RecipeMapRegistry::new();
        let err = RecipeBuilder::new(&mut registry, &items, RecipeMap::CraftingShapeless)
            .input(OrePrefix::Ingot, cu, 1)
            .not_consumed(ItemStack::grid_tool(CraftingTool::Mortar))
            .output(items.get(OrePrefix::Dust, cu))
            .submit()
            .unwrap_err();
        assert!(matches!(
            err,
            RecipeError::InvalidRecipe { reason: InvalidReason::UnnamedCrafting, .. }
        ));
    }

    #[test]
    fn dropped_builder_leaves_sink_untouched() {
        let (cu, items) = setup();
        let mut registry = RecipeMapRegistry::new();
        {
            let _builder = RecipeBuilder::new(&mut registry, &items, RecipeMap::Extruder)
                .input(OrePrefix::Ingot, cu, 1)
                .not_consumed(ItemStack::part(Part::ExtruderRod, 1));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn key_prefers_name() {
        let mut recipe = RecipeDescriptor::new(RecipeMap::CraftingShaped);
        recipe.name = Some("plate_copper".to_string());
        assert_eq!(recipe.key(), RecipeKey::Named("plate_copper".to_string()));
        recipe.name = None;
        assert!(matches!(recipe.key(), RecipeKey::Signature { .. }));
    }

    #[test]
    fn duration_is_at_least_one_tick() {
        let (cu, items) = setup();
        let mut registry = RecipeMapRegistry::new();
        RecipeBuilder::new(&mut registry, &items, RecipeMap::Macerator)
            .input(OrePrefix::Nugget, cu, 1)
            .output(items.get(OrePrefix::DustTiny, cu))
            .duration(0)
            .submit()
            .unwrap();
        assert_eq!(registry.recipes().next().unwrap().duration, 1);
    }
}
