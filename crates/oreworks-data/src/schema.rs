//! Serde data file structs for the material and prefix catalogs.
//!
//! These structs define the on-disk format. Material references are plain
//! names; the loader resolves them to ids once every material is known.
//! Kind-specific attributes live in optional blocks (`dust`, `solid`,
//! `gem`, `metal`) next to the material's `kind` tag.

use serde::Deserialize;

use oreworks_core::material::{Kind, MaterialFlag};
use oreworks_core::prefix::{Condition, OrePrefix};

// ===========================================================================
// Materials
// ===========================================================================

/// A material definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialData {
    pub name: String,
    pub mass: u64,
    pub kind: Kind,
    #[serde(default)]
    pub flags: Vec<MaterialFlag>,
    #[serde(default)]
    pub components: Vec<ComponentData>,
    #[serde(default)]
    pub dust: Option<DustData>,
    #[serde(default)]
    pub solid: Option<SolidData>,
    #[serde(default)]
    pub gem: Option<GemData>,
    #[serde(default)]
    pub metal: Option<MetalData>,
}

/// An amount of a named material, in short tuple form or with explicit
/// fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ComponentData {
    /// Short form: `("oxygen", 3)`.
    Short(String, u64),
    Full { material: String, amount: u64 },
}

impl ComponentData {
    pub fn material(&self) -> &str {
        match self {
            ComponentData::Short(name, _) => name,
            ComponentData::Full { material, .. } => material,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            ComponentData::Short(_, amount) | ComponentData::Full { amount, .. } => *amount,
        }
    }
}

fn default_one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct DustData {
    #[serde(default)]
    pub ore_byproducts: Vec<String>,
    #[serde(default = "default_one")]
    pub byproduct_multiplier: u32,
    #[serde(default = "default_one")]
    pub ore_multiplier: u32,
    #[serde(default = "default_one")]
    pub smelting_multiplier: u32,
    #[serde(default)]
    pub direct_smelting: Option<String>,
    #[serde(default)]
    pub washed_in: Option<String>,
    #[serde(default)]
    pub separated_onto: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolidData {
    #[serde(default)]
    pub handle_material: Option<String>,
    #[serde(default)]
    pub macerate_into: Option<String>,
    #[serde(default)]
    pub tool_durability: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GemData {
    /// Lowest tier first. Omitted means the standard five tiers.
    #[serde(default)]
    pub purity_tiers: Option<Vec<OrePrefix>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetalData {
    #[serde(default)]
    pub blast_furnace_temperature: u32,
    #[serde(default)]
    pub smelt_into: Option<String>,
    #[serde(default)]
    pub magnetic_material: Option<String>,
    #[serde(default)]
    pub cable_voltage: Option<u64>,
}

// ===========================================================================
// Prefixes
// ===========================================================================

/// A prefix definition. Omitted fields take the shape's standard values.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefixData {
    pub name: OrePrefix,
    #[serde(default)]
    pub material_amount: Option<u64>,
    #[serde(default)]
    pub secondary: Option<ComponentData>,
    #[serde(default)]
    pub generate: Option<Condition>,
}

// ===========================================================================
// TOML wrappers (TOML does not support top-level arrays)
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TomlMaterials {
    pub materials: Vec<MaterialData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlPrefixes {
    pub prefixes: Vec<PrefixData>,
}

// ===========================================================================
// Tests
// ===========================================================================
