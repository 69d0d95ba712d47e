//! Ore prefixes: the shapes a material can take.
//!
//! Each prefix has a canonical camelCase name (`plateDense`, `wireGtSingle`),
//! a standard material amount in units of [`M`] and a standard generation
//! [`Condition`] deciding which materials get an item of that shape. The
//! prefix catalog can override both per run.

use serde::{Deserialize, Serialize};

use crate::id::M;
use crate::material::{Kind, Material, MaterialFlag};

macro_rules! ore_prefixes {
    ($($variant:ident => $name:literal, $amount:expr;)*) => {
        /// A shape a material can take.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum OrePrefix {
            $($variant,)*
        }

        impl OrePrefix {
            /// Every prefix, in processing order.
            pub const ALL: &'static [OrePrefix] = &[$(OrePrefix::$variant,)*];

            /// Canonical name, as used in data files and recipe names.
            pub fn name(self) -> &'static str {
                match self {
                    $(OrePrefix::$variant => $name,)*
                }
            }

            /// Standard amount of material one item of this shape holds.
            pub fn standard_amount(self) -> u64 {
                match self {
                    $(OrePrefix::$variant => $amount,)*
                }
            }

            pub fn parse(name: &str) -> Option<OrePrefix> {
                match name {
                    $($name => Some(OrePrefix::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

ore_prefixes! {
    Ore => "ore", M;
    OreBasalt => "oreBasalt", M;
    OreBlackgranite => "oreBlackgranite", M;
    OreEndstone => "oreEndstone", M;
    OreGravel => "oreGravel", M;
    OreNetherrack => "oreNetherrack", M;
    OreMarble => "oreMarble", M;
    OreRedgranite => "oreRedgranite", M;
    OreSand => "oreSand", M;
    Crushed => "crushed", M;
    CrushedPurified => "crushedPurified", M;
    CrushedCentrifuged => "crushedCentrifuged", M;
    Crystalline => "crystalline", M;
    DustImpure => "dustImpure", M;
    DustPure => "dustPure", M;
    DustRefined => "dustRefined", M;
    Dust => "dust", M;
    DustSmall => "dustSmall", M / 4;
    DustTiny => "dustTiny", M / 9;
    IngotHot => "ingotHot", M;
    Ingot => "ingot", M;
    Nugget => "nugget", M / 9;
    Block => "block", M * 9;
    Plank => "plank", M;
    Compressed => "compressed", M;
    GemChipped => "gemChipped", M / 4;
    GemFlawed => "gemFlawed", M / 2;
    Gem => "gem", M;
    GemFlawless => "gemFlawless", M * 2;
    GemExquisite => "gemExquisite", M * 4;
    Crystal => "crystal", M;
    Lens => "lens", M * 3 / 4;
    Plate => "plate", M;
    PlateDense => "plateDense", M * 9;
    Foil => "foil", M / 4;
    Stick => "stick", M / 2;
    StickLong => "stickLong", M;
    Bolt => "bolt", M / 8;
    Screw => "screw", M / 9;
    Ring => "ring", M / 4;
    Spring => "spring", M;
    SpringSmall => "springSmall", M / 4;
    Gear => "gear", M * 4;
    GearSmall => "gearSmall", M;
    FrameGt => "frameGt", M * 2;
    Rotor => "rotor", M * 4 + M / 4;
    TurbineBlade => "turbineBlade", M * 6;
    WireFine => "wireFine", M / 8;
    WireGtSingle => "wireGtSingle", M / 2;
    WireGtDouble => "wireGtDouble", M;
    WireGtQuadruple => "wireGtQuadruple", M * 2;
    WireGtOctal => "wireGtOctal", M * 4;
    WireGtTwelve => "wireGtTwelve", M * 6;
    WireGtHex => "wireGtHex", M * 8;
    CableGtSingle => "cableGtSingle", M / 2;
    CableGtDouble => "cableGtDouble", M;
    CableGtQuadruple => "cableGtQuadruple", M * 2;
    CableGtOctal => "cableGtOctal", M * 4;
    CableGtTwelve => "cableGtTwelve", M * 6;
    CableGtHex => "cableGtHex", M * 8;
    ToolHeadSword => "toolHeadSword", M * 2;
    ToolHeadPickaxe => "toolHeadPickaxe", M * 3;
    ToolHeadShovel => "toolHeadShovel", M;
    ToolHeadUniversalSpade => "toolHeadUniversalSpade", M * 3;
    ToolHeadAxe => "toolHeadAxe", M * 3;
    ToolHeadHoe => "toolHeadHoe", M * 2;
    ToolHeadSense => "toolHeadSense", M * 3;
    ToolHeadPlow => "toolHeadPlow", M * 4;
    ToolHeadSaw => "toolHeadSaw", M * 2;
    ToolHeadHammer => "toolHeadHammer", M * 6;
    ToolHeadFile => "toolHeadFile", M * 2;
    ToolHeadDrill => "toolHeadDrill", M * 4;
    ToolHeadChainsaw => "toolHeadChainsaw", M * 4;
    ToolHeadWrench => "toolHeadWrench", M * 4;
    ToolHeadBuzzSaw => "toolHeadBuzzSaw", M * 4;
    ToolHeadScrewdriver => "toolHeadScrewdriver", M;
}

impl OrePrefix {
    /// Gem quality ladder, lowest first.
    pub const GEM_ORDER: [OrePrefix; 5] = [
        OrePrefix::GemChipped,
        OrePrefix::GemFlawed,
        OrePrefix::Gem,
        OrePrefix::GemFlawless,
        OrePrefix::GemExquisite,
    ];

    /// Bare wire ladder, thinnest first.
    pub const WIRES: [OrePrefix; 6] = [
        OrePrefix::WireGtSingle,
        OrePrefix::WireGtDouble,
        OrePrefix::WireGtQuadruple,
        OrePrefix::WireGtOctal,
        OrePrefix::WireGtTwelve,
        OrePrefix::WireGtHex,
    ];

    pub fn is_ore(self) -> bool {
        matches!(
            self,
            OrePrefix::Ore
                | OrePrefix::OreBasalt
                | OrePrefix::OreBlackgranite
                | OrePrefix::OreEndstone
                | OrePrefix::OreGravel
                | OrePrefix::OreNetherrack
                | OrePrefix::OreMarble
                | OrePrefix::OreRedgranite
                | OrePrefix::OreSand
        )
    }

    pub fn is_gem_tier(self) -> bool {
        Self::GEM_ORDER.contains(&self)
    }

    /// `dust`, `dustSmall`, `dustTiny` and the dirty dust stages.
    pub fn is_dust_family(self) -> bool {
        self.name().starts_with("dust")
    }

    pub fn is_tool_head(self) -> bool {
        self.name().starts_with("toolHead")
    }

    /// Number of single wires this wire prefix is worth.
    pub fn wire_size(self) -> Option<u32> {
        match self {
            OrePrefix::WireGtSingle => Some(1),
            OrePrefix::WireGtDouble => Some(2),
            OrePrefix::WireGtQuadruple => Some(4),
            OrePrefix::WireGtOctal => Some(8),
            OrePrefix::WireGtTwelve => Some(12),
            OrePrefix::WireGtHex => Some(16),
            _ => None,
        }
    }

    /// Insulated counterpart of a bare wire prefix.
    pub fn cable(self) -> Option<OrePrefix> {
        match self {
            OrePrefix::WireGtSingle => Some(OrePrefix::CableGtSingle),
            OrePrefix::WireGtDouble => Some(OrePrefix::CableGtDouble),
            OrePrefix::WireGtQuadruple => Some(OrePrefix::CableGtQuadruple),
            OrePrefix::WireGtOctal => Some(OrePrefix::CableGtOctal),
            OrePrefix::WireGtTwelve => Some(OrePrefix::CableGtTwelve),
            OrePrefix::WireGtHex => Some(OrePrefix::CableGtHex),
            _ => None,
        }
    }

    /// Prefixes whose items can be crushed back into dust.
    pub fn is_crushable(self) -> bool {
        matches!(
            self,
            OrePrefix::Ingot
                | OrePrefix::Nugget
                | OrePrefix::Block
                | OrePrefix::Plate
                | OrePrefix::PlateDense
                | OrePrefix::Foil
                | OrePrefix::Stick
                | OrePrefix::StickLong
                | OrePrefix::Bolt
                | OrePrefix::Screw
                | OrePrefix::Ring
                | OrePrefix::Spring
                | OrePrefix::SpringSmall
                | OrePrefix::Gear
                | OrePrefix::GearSmall
                | OrePrefix::FrameGt
                | OrePrefix::Rotor
                | OrePrefix::Lens
                | OrePrefix::Crystal
                | OrePrefix::WireFine
                | OrePrefix::GemChipped
                | OrePrefix::GemFlawed
                | OrePrefix::Gem
                | OrePrefix::GemFlawless
                | OrePrefix::GemExquisite
                | OrePrefix::TurbineBlade
        ) || self.wire_size().is_some()
            || self.cable().is_some()
            || self.is_tool_head()
    }

    /// Standard rule for which materials get an item of this shape.
    pub fn standard_condition(self) -> Condition {
        use Condition as C;
        use MaterialFlag as F;
        use OrePrefix as P;

        let ore = || C::All(vec![C::IsKind(Kind::Dust), C::HasFlag(F::GenerateOre)]);
        match self {
            p if p.is_ore() => ore(),
            P::Crushed
            | P::CrushedPurified
            | P::CrushedCentrifuged
            | P::DustImpure
            | P::DustPure
            | P::DustRefined => ore(),
            P::Crystalline => C::All(vec![C::IsKind(Kind::Gem), C::HasFlag(F::GenerateOre)]),
            P::Dust | P::DustSmall | P::DustTiny => C::IsKind(Kind::Dust),
            P::Ingot | P::Nugget => C::IsKind(Kind::Metal),
            P::IngotHot => C::BlastTemperatureAbove(1750),
            P::Block => C::Any(vec![C::IsKind(Kind::Metal), C::IsKind(Kind::Gem)]),
            P::Plank | P::Compressed | P::Crystal => C::Never,
            p if p.is_gem_tier() => C::IsKind(Kind::Gem),
            P::Lens => C::All(vec![C::IsKind(Kind::Gem), C::HasFlag(F::GenerateLens)]),
            P::Plate => C::HasFlag(F::GeneratePlate),
            P::PlateDense => C::HasFlag(F::GenerateDense),
            P::Foil => C::HasFlag(F::GenerateFoil),
            P::Stick => C::HasFlag(F::GenerateRod),
            P::StickLong => C::HasFlag(F::GenerateLongRod),
            P::Bolt | P::Screw => C::HasFlag(F::GenerateBoltScrew),
            P::Ring => C::HasFlag(F::GenerateRing),
            P::Spring | P::SpringSmall => C::HasFlag(F::GenerateSpring),
            P::Gear => C::HasFlag(F::GenerateGear),
            P::GearSmall => C::HasFlag(F::GenerateSmallGear),
            P::FrameGt => C::HasFlag(F::GenerateFrame),
            P::Rotor => C::HasFlag(F::GenerateRotor),
            P::TurbineBlade => C::All(vec![C::IsToolMaterial, C::HasFlag(F::GenerateRotor)]),
            P::WireFine => C::HasFlag(F::GenerateFineWire),
            p if p.wire_size().is_some() => C::HasCable,
            P::CableGtSingle
            | P::CableGtDouble
            | P::CableGtQuadruple
            | P::CableGtOctal
            | P::CableGtTwelve
            | P::CableGtHex => C::HasCable,
            p if p.is_tool_head() => C::All(vec![
                C::IsToolMaterial,
                C::Not(Box::new(C::HasFlag(F::NoSmashing))),
            ]),
            _ => C::Never,
        }
    }
}

impl std::fmt::Display for OrePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Generation conditions
// ---------------------------------------------------------------------------

/// Predicate over a material deciding whether a prefix generates an item
/// for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Always,
    Never,
    IsKind(Kind),
    HasFlag(MaterialFlag),
    /// Metal with a cable voltage.
    HasCable,
    IsToolMaterial,
    /// Metal whose blast temperature is strictly above the bound.
    BlastTemperatureAbove(u32),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn holds(&self, material: &Material) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::IsKind(kind) => material.is_a(*kind),
            Condition::HasFlag(flag) => material.has(*flag),
            Condition::HasCable => material
                .as_metal()
                .is_some_and(|m| m.cable_voltage.is_some()),
            Condition::IsToolMaterial => material.is_tool_material(),
            Condition::BlastTemperatureAbove(bound) => material
                .as_metal()
                .is_some_and(|m| m.blast_furnace_temperature > *bound),
            Condition::All(all) => all.iter().all(|c| c.holds(material)),
            Condition::Any(any) => any.iter().any(|c| c.holds(material)),
            Condition::Not(inner) => !inner.holds(material),
        }
    }
}
