//! Attribute model for materials.
//!
//! A material is a name, a mass, a set of generation flags, a list of
//! chemical components and a [`MaterialKind`] that carries the kind-specific
//! attribute blocks. Kinds form a fixed hierarchy:
//!
//! ```text
//! Marker
//! Fluid <- Dust <- Solid <- { Gem, Metal }
//! ```
//!
//! Every field that points at another material is a [`MaterialId`]; lookups
//! go through the catalog.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::MaterialId;
use crate::prefix::OrePrefix;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Generation and processing flags a material may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialFlag {
    NoSmashing,
    NoWorking,
    NoSmelting,
    NoUnification,
    Flammable,
    Explosive,
    MortarGrindable,
    SmeltIntoFluid,
    DecompositionByElectrolyzing,
    DecompositionByCentrifuging,
    Crystallisable,
    HighSifterOutput,
    GeneratePlate,
    GenerateDense,
    GenerateRod,
    GenerateLongRod,
    GenerateBoltScrew,
    GenerateRing,
    GenerateFoil,
    GenerateFineWire,
    GenerateGear,
    GenerateSmallGear,
    GenerateFrame,
    GenerateSpring,
    GenerateRotor,
    GenerateLens,
    GenerateOre,
    GenerateFluid,
}

// ---------------------------------------------------------------------------
// Kind hierarchy
// ---------------------------------------------------------------------------

/// The structural kind of a material, without its attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Marker,
    Fluid,
    Dust,
    Solid,
    Gem,
    Metal,
}

impl Kind {
    /// The kind this one specializes, if any.
    pub fn parent(self) -> Option<Kind> {
        match self {
            Kind::Marker | Kind::Fluid => None,
            Kind::Dust => Some(Kind::Fluid),
            Kind::Solid => Some(Kind::Dust),
            Kind::Gem | Kind::Metal => Some(Kind::Solid),
        }
    }

    /// True if `self` is `expected` or a specialization of it.
    pub fn is_a(self, expected: Kind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == expected {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Marker => "marker",
            Kind::Fluid => "fluid",
            Kind::Dust => "dust",
            Kind::Solid => "solid",
            Kind::Gem => "gem",
            Kind::Metal => "metal",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Attribute blocks
// ---------------------------------------------------------------------------

/// Attributes shared by every dust-capable material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustProps {
    /// Ordered byproduct candidates used by the ore chain.
    pub ore_byproducts: Vec<MaterialId>,
    pub byproduct_multiplier: u32,
    pub ore_multiplier: u32,
    pub smelting_multiplier: u32,
    pub direct_smelting: Option<MaterialId>,
    /// Fluid the crushed ore is bathed in for the chemical-bath route.
    pub washed_in: Option<MaterialId>,
    /// Material the magnetic separator pulls out of pure dust.
    pub separated_onto: Option<MaterialId>,
}

impl Default for DustProps {
    fn default() -> Self {
        Self {
            ore_byproducts: Vec::new(),
            byproduct_multiplier: 1,
            ore_multiplier: 1,
            smelting_multiplier: 1,
            direct_smelting: None,
            washed_in: None,
            separated_onto: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolidProps {
    /// Handle used for crafted tools. Falls back to the reserved wood material.
    pub handle_material: Option<MaterialId>,
    /// Material produced when this one is crushed. Defaults to itself.
    pub macerate_into: Option<MaterialId>,
    /// Zero means the material cannot be made into tools.
    pub tool_durability: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemProps {
    /// Gem quality ladder, lowest first.
    pub purity_tiers: Vec<OrePrefix>,
}

impl Default for GemProps {
    fn default() -> Self {
        Self {
            purity_tiers: OrePrefix::GEM_ORDER.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetalProps {
    /// Zero means the metal smelts in an ordinary furnace.
    pub blast_furnace_temperature: u32,
    /// Defaults to the metal itself.
    pub smelt_into: Option<MaterialId>,
    pub magnetic_material: Option<MaterialId>,
    /// Cable voltage in EU/t; `None` means no wires or cables are generated.
    pub cable_voltage: Option<u64>,
}

/// Kind tag plus the attribute blocks that kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialKind {
    Marker,
    Fluid,
    Dust(DustProps),
    Solid(DustProps, SolidProps),
    Gem(DustProps, SolidProps, GemProps),
    Metal(DustProps, SolidProps, MetalProps),
}

impl MaterialKind {
    pub fn kind(&self) -> Kind {
        match self {
            MaterialKind::Marker => Kind::Marker,
            MaterialKind::Fluid => Kind::Fluid,
            MaterialKind::Dust(..) => Kind::Dust,
            MaterialKind::Solid(..) => Kind::Solid,
            MaterialKind::Gem(..) => Kind::Gem,
            MaterialKind::Metal(..) => Kind::Metal,
        }
    }

    /// A metal with default attribute blocks.
    pub fn metal() -> Self {
        MaterialKind::Metal(DustProps::default(), SolidProps::default(), MetalProps::default())
    }

    /// A gem with default attribute blocks.
    pub fn gem() -> Self {
        MaterialKind::Gem(DustProps::default(), SolidProps::default(), GemProps::default())
    }

    pub fn solid() -> Self {
        MaterialKind::Solid(DustProps::default(), SolidProps::default())
    }

    pub fn dust() -> Self {
        MaterialKind::Dust(DustProps::default())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A typed accessor was used on a material of an incompatible kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("material '{material}' is a {actual}, expected a {expected}")]
pub struct TypeMismatch {
    pub material: String,
    pub expected: Kind,
    pub actual: Kind,
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// An amount of some material, in units of [`M`](crate::id::M) for
/// components and prefix secondaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialStack {
    pub material: MaterialId,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Mass used to scale processing durations.
    pub mass: u64,
    pub flags: BTreeSet<MaterialFlag>,
    /// Chemical composition; counts are whole units.
    pub components: Vec<MaterialStack>,
    pub kind: MaterialKind,
}

impl Material {
    pub fn new(id: MaterialId, name: impl Into<String>, mass: u64, kind: MaterialKind) -> Self {
        Self {
            id,
            name: name.into(),
            mass,
            flags: BTreeSet::new(),
            components: Vec::new(),
            kind,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    pub fn is_a(&self, expected: Kind) -> bool {
        self.kind().is_a(expected)
    }

    pub fn has(&self, flag: MaterialFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// True if any of `flags` is set.
    pub fn has_any(&self, flags: &[MaterialFlag]) -> bool {
        flags.iter().any(|f| self.flags.contains(f))
    }

    // -- optional views ----------------------------------------------------

    pub fn as_dust(&self) -> Option<&DustProps> {
        match &self.kind {
            MaterialKind::Dust(d)
            | MaterialKind::Solid(d, _)
            | MaterialKind::Gem(d, _, _)
            | MaterialKind::Metal(d, _, _) => Some(d),
            MaterialKind::Marker | MaterialKind::Fluid => None,
        }
    }

    pub fn as_solid(&self) -> Option<&SolidProps> {
        match &self.kind {
            MaterialKind::Solid(_, s) | MaterialKind::Gem(_, s, _) | MaterialKind::Metal(_, s, _) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn as_gem(&self) -> Option<&GemProps> {
        match &self.kind {
            MaterialKind::Gem(_, _, g) => Some(g),
            _ => None,
        }
    }

    pub fn as_metal(&self) -> Option<&MetalProps> {
        match &self.kind {
            MaterialKind::Metal(_, _, m) => Some(m),
            _ => None,
        }
    }

    // -- mutable views, for the builder's mutate phase ---------------------

    pub fn dust_mut(&mut self) -> Option<&mut DustProps> {
        match &mut self.kind {
            MaterialKind::Dust(d)
            | MaterialKind::Solid(d, _)
            | MaterialKind::Gem(d, _, _)
            | MaterialKind::Metal(d, _, _) => Some(d),
            MaterialKind::Marker | MaterialKind::Fluid => None,
        }
    }

    pub fn solid_mut(&mut self) -> Option<&mut SolidProps> {
        match &mut self.kind {
            MaterialKind::Solid(_, s) | MaterialKind::Gem(_, s, _) | MaterialKind::Metal(_, s, _) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn metal_mut(&mut self) -> Option<&mut MetalProps> {
        match &mut self.kind {
            MaterialKind::Metal(_, _, m) => Some(m),
            _ => None,
        }
    }

    // -- checked views -----------------------------------------------------

    fn mismatch(&self, expected: Kind) -> TypeMismatch {
        TypeMismatch {
            material: self.name.clone(),
            expected,
            actual: self.kind(),
        }
    }

    pub fn dust(&self) -> Result<&DustProps, TypeMismatch> {
        self.as_dust().ok_or_else(|| self.mismatch(Kind::Dust))
    }

    pub fn solid(&self) -> Result<&SolidProps, TypeMismatch> {
        self.as_solid().ok_or_else(|| self.mismatch(Kind::Solid))
    }

    pub fn gem(&self) -> Result<&GemProps, TypeMismatch> {
        self.as_gem().ok_or_else(|| self.mismatch(Kind::Gem))
    }

    pub fn metal(&self) -> Result<&MetalProps, TypeMismatch> {
        self.as_metal().ok_or_else(|| self.mismatch(Kind::Metal))
    }

    // -- derived attributes ------------------------------------------------

    /// Material this one smelts into. Metals may redirect; everything else
    /// smelts into itself.
    pub fn smelt_into(&self) -> MaterialId {
        self.as_metal()
            .and_then(|m| m.smelt_into)
            .unwrap_or(self.id)
    }

    /// Material produced when this one is crushed.
    pub fn macerate_into(&self) -> MaterialId {
        self.as_solid()
            .and_then(|s| s.macerate_into)
            .unwrap_or(self.id)
    }

    pub fn blast_furnace_temperature(&self) -> u32 {
        self.as_metal().map_or(0, |m| m.blast_furnace_temperature)
    }

    /// Whether the material has a liquid form.
    pub fn has_fluid(&self) -> bool {
        matches!(self.kind(), Kind::Fluid | Kind::Metal)
            || self.has_any(&[MaterialFlag::SmeltIntoFluid, MaterialFlag::GenerateFluid])
    }

    pub fn is_tool_material(&self) -> bool {
        self.as_solid().is_some_and(|s| s.tool_durability > 0)
    }

    /// Non-metals and metals whose blast temperature does not exceed `limit`
    /// smelt in an ordinary furnace.
    pub fn uses_normal_furnace(&self, limit: u32) -> bool {
        self.as_metal()
            .is_none_or(|m| m.blast_furnace_temperature <= limit)
    }

    /// Sum of component amounts.
    pub fn component_total(&self) -> u64 {
        self.components
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.amount))
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Voltage tiers
// ---------------------------------------------------------------------------

/// Upper voltage bound of each tier, ULV through MAX.
pub const VOLTAGE_TIERS: [u64; 9] = [8, 32, 128, 512, 2048, 8192, 32768, 131072, 524288];

/// Index of the first tier whose bound covers `voltage`; voltages above
/// every bound land in the last tier.
pub fn voltage_tier(voltage: u64) -> usize {
    VOLTAGE_TIERS
        .iter()
        .position(|&bound| voltage <= bound)
        .unwrap_or(VOLTAGE_TIERS.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copper() -> Material {
        Material::new(MaterialId(0), "copper", 63, MaterialKind::metal())
    }

    #[test]
    fn kind_hierarchy() {
        assert!(Kind::Metal.is_a(Kind::Solid));
        assert!(Kind::Metal.is_a(Kind::Dust));
        assert!(Kind::Metal.is_a(Kind::Fluid));
        assert!(Kind::Gem.is_a(Kind::Solid));
        assert!(!Kind::Gem.is_a(Kind::Metal));
        assert!(!Kind::Dust.is_a(Kind::Solid));
        assert!(!Kind::Marker.is_a(Kind::Fluid));
        assert!(Kind::Fluid.is_a(Kind::Fluid));
    }

    #[test]
    fn typed_accessors() {
        let cu = copper();
        assert!(cu.metal().is_ok());
        assert!(cu.solid().is_ok());
        assert!(cu.gem().is_err());

        let water = Material::new(MaterialId(1), "water", 18, MaterialKind::Fluid);
        let err = water.dust().unwrap_err();
        assert_eq!(err.expected, Kind::Dust);
        assert_eq!(err.actual, Kind::Fluid);
        assert_eq!(err.material, "water");
    }

    #[test]
    fn derived_targets_default_to_self() {
        let cu = copper();
        assert_eq!(cu.smelt_into(), cu.id);
        assert_eq!(cu.macerate_into(), cu.id);

        let mut iron = Material::new(MaterialId(2), "wrought_iron", 56, MaterialKind::metal());
        if let MaterialKind::Metal(_, _, metal) = &mut iron.kind {
            metal.smelt_into = Some(MaterialId(3));
        }
        assert_eq!(iron.smelt_into(), MaterialId(3));
    }

    #[test]
    fn has_any_is_disjunction() {
        let mut cu = copper();
        cu.flags.insert(MaterialFlag::Flammable);
        assert!(cu.has_any(&[MaterialFlag::Explosive, MaterialFlag::Flammable]));
        assert!(!cu.has_any(&[MaterialFlag::Explosive, MaterialFlag::NoSmelting]));
        assert!(!cu.has_any(&[]));
    }

    #[test]
    fn fluid_presence() {
        assert!(copper().has_fluid());
        let mut redstone = Material::new(MaterialId(4), "redstone", 80, MaterialKind::dust());
        assert!(!redstone.has_fluid());
        redstone.flags.insert(MaterialFlag::SmeltIntoFluid);
        assert!(redstone.has_fluid());
    }

    #[test]
    fn furnace_selection() {
        let mut tungsten = Material::new(MaterialId(5), "tungsten", 200, MaterialKind::metal());
        if let MaterialKind::Metal(_, _, metal) = &mut tungsten.kind {
            metal.blast_furnace_temperature = 3422;
        }
        assert!(!tungsten.uses_normal_furnace(0));
        assert!(tungsten.uses_normal_furnace(4000));
        assert!(copper().uses_normal_furnace(0));
    }

    #[test]
    fn voltage_tier_boundaries() {
        assert_eq!(voltage_tier(1), 0);
        assert_eq!(voltage_tier(8), 0);
        assert_eq!(voltage_tier(9), 1);
        assert_eq!(voltage_tier(32), 1);
        assert_eq!(voltage_tier(128), 2);
        assert_eq!(voltage_tier(10_000_000), 8);
    }
}
