//! Engine configuration.
//!
//! Everything here has a default; a host only overrides what differs.
//! Loaded from `config.{ron,toml,json}` by the data crate.

use serde::{Deserialize, Serialize};

use crate::catalog::MaterialCatalog;
use crate::id::MaterialId;
use crate::prefix::OrePrefix;

/// Names of the materials rules refer to directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedNames {
    /// Byproduct fallback and ore-washing residue.
    pub stone: String,
    pub water: String,
    pub distilled_water: String,
    /// Cable insulation.
    pub rubber: String,
    pub soldering_alloy: String,
    pub dark_ash: String,
    pub steel: String,
    /// Default tool handle.
    pub wood: String,
    pub titanium: String,
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self {
            stone: "stone".to_string(),
            water: "water".to_string(),
            distilled_water: "distilled_water".to_string(),
            rubber: "rubber".to_string(),
            soldering_alloy: "soldering_alloy".to_string(),
            dark_ash: "dark_ash".to_string(),
            steel: "steel".to_string(),
            wood: "wood".to_string(),
            titanium: "titanium".to_string(),
        }
    }
}

/// A `(prefix, material)` pair excluded from a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub prefix: OrePrefix,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reserved: ReservedNames,
    /// Pairs the crushing and block rules skip.
    pub crushing_blacklist: Vec<Exclusion>,
    /// Metals with a blast temperature at or below this smelt in a furnace.
    pub furnace_temperature_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reserved: ReservedNames::default(),
            crushing_blacklist: vec![Exclusion {
                prefix: OrePrefix::Block,
                material: "glowstone".to_string(),
            }],
            furnace_temperature_limit: 0,
        }
    }
}

impl EngineConfig {
    pub fn is_blacklisted(&self, prefix: OrePrefix, material: &str) -> bool {
        self.crushing_blacklist
            .iter()
            .any(|e| e.prefix == prefix && e.material == material)
    }

    /// Resolve reserved names against a catalog. Absent materials stay
    /// `None` and the rules that need them skip.
    pub fn resolve(&self, catalog: &MaterialCatalog) -> Reserved {
        let r = &self.reserved;
        Reserved {
            stone: catalog.id(&r.stone),
            water: catalog.id(&r.water),
            distilled_water: catalog.id(&r.distilled_water),
            rubber: catalog.id(&r.rubber),
            soldering_alloy: catalog.id(&r.soldering_alloy),
            dark_ash: catalog.id(&r.dark_ash),
            steel: catalog.id(&r.steel),
            wood: catalog.id(&r.wood),
            titanium: catalog.id(&r.titanium),
        }
    }
}

/// Reserved materials resolved for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reserved {
    pub stone: Option<MaterialId>,
    pub water: Option<MaterialId>,
    pub distilled_water: Option<MaterialId>,
    pub rubber: Option<MaterialId>,
    pub soldering_alloy: Option<MaterialId>,
    pub dark_ash: Option<MaterialId>,
    pub steel: Option<MaterialId>,
    pub wood: Option<MaterialId>,
    pub titanium: Option<MaterialId>,
}
