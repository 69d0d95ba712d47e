//! Bare wire ladders and their cable insulation.

use crate::id::L;
use crate::material::{Kind, Material, MaterialFlag, voltage_tier};
use crate::prefix::OrePrefix;
use crate::recipe::{RecipeError, RecipeMap};
use crate::unification::{CraftingTool, ItemStack, Part};

use super::RuleContext;

/// Voltage tier whose cables are wrapped in cloth instead of rubber.
const CLOTH_TIER: usize = 1;

fn label(prefix: OrePrefix) -> &'static str {
    match prefix {
        OrePrefix::WireGtDouble => "double",
        OrePrefix::WireGtQuadruple => "quad",
        OrePrefix::WireGtOctal => "octal",
        OrePrefix::WireGtTwelve => "twelve",
        OrePrefix::WireGtHex => "hex",
        _ => "single",
    }
}

/// Layers of insulation a cable of this wire size needs.
fn insulation(prefix: OrePrefix) -> u32 {
    match prefix {
        OrePrefix::WireGtSingle | OrePrefix::WireGtDouble => 1,
        OrePrefix::WireGtQuadruple => 2,
        OrePrefix::WireGtOctal => 3,
        OrePrefix::WireGtTwelve => 4,
        _ => 5,
    }
}

/// Smaller wires that pack into one of `prefix`.
fn packs(prefix: OrePrefix) -> &'static [(&'static str, &'static [(OrePrefix, u32)])] {
    use OrePrefix as P;
    match prefix {
        P::WireGtDouble => &[("single_to_double", &[(P::WireGtSingle, 2)])],
        P::WireGtQuadruple => &[
            ("double_to_quad", &[(P::WireGtDouble, 2)]),
            ("single_to_quad", &[(P::WireGtSingle, 4)]),
        ],
        P::WireGtOctal => &[("quad_to_octal", &[(P::WireGtQuadruple, 2)])],
        P::WireGtTwelve => &[(
            "quad_and_octal_to_twelve",
            &[(P::WireGtOctal, 1), (P::WireGtQuadruple, 1)],
        )],
        P::WireGtHex => &[("octal_to_hex", &[(P::WireGtOctal, 2)])],
        _ => &[],
    }
}

/// Assembler duration for bundling singles into each larger wire.
const BUNDLES: [(OrePrefix, u64); 5] = [
    (OrePrefix::WireGtDouble, 150),
    (OrePrefix::WireGtQuadruple, 200),
    (OrePrefix::WireGtOctal, 300),
    (OrePrefix::WireGtTwelve, 400),
    (OrePrefix::WireGtHex, 500),
];

pub fn wire(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(size) = prefix.wire_size() else {
        return Ok(());
    };
    if !m.is_a(Kind::Metal) {
        return Ok(());
    }
    let Some(voltage) = m.as_metal().and_then(|metal| metal.cable_voltage) else {
        return Ok(());
    };

    if voltage_tier(voltage) == CLOTH_TIER {
        cloth_wrap(ctx, prefix, m)?;
    } else {
        rubber_insulate(ctx, prefix, m)?;
    }

    if size == 1 {
        return single(ctx, prefix, m);
    }

    let singles = ctx.get_n(OrePrefix::WireGtSingle, m.id, size);
    ctx.recipe(RecipeMap::CraftingShapeless)
        .named(format!("{}_wire_{}_to_single", m.name, label(prefix)))
        .input(prefix, m.id, 1)
        .output(singles)
        .submit()?;

    let wire = ctx.get(prefix, m.id);
    for &(name, parts) in packs(prefix) {
        let mut recipe = ctx
            .recipe(RecipeMap::CraftingShapeless)
            .named(format!("{}_wire_{name}", m.name));
        for &(part, n) in parts {
            recipe = recipe.input(part, m.id, n);
        }
        recipe.output(wire).submit()?;
    }
    Ok(())
}

fn cable_name(prefix: OrePrefix) -> OrePrefix {
    prefix.cable().unwrap_or(OrePrefix::CableGtSingle)
}

fn cloth_wrap(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let n = insulation(prefix);
    let cable = ctx.get(cable_name(prefix), m.id);
    let wire = ctx.get(prefix, m.id);
    let carpet = ItemStack::part(Part::BlackCarpet, n);

    ctx.recipe(RecipeMap::CraftingShapeless)
        .named(format!("{}_cable_{}", m.name, label(prefix)))
        .input(prefix, m.id, 1)
        .input_stack(carpet)
        .input_stack(ItemStack::part(Part::String, 1))
        .output(cable)
        .submit()?;
    ctx.recipe(RecipeMap::Packer)
        .input(prefix, m.id, 1)
        .input_stack(carpet)
        .output(cable)
        .duration(100)
        .energy_rate(8)
        .submit()?;
    ctx.recipe(RecipeMap::Unpacker)
        .input(cable_name(prefix), m.id, 1)
        .output(wire)
        .output_stack(carpet)
        .duration(100)
        .energy_rate(8)
        .submit()
}

fn rubber_insulate(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(rubber) = ctx.reserved.rubber else {
        return Ok(());
    };
    let n = insulation(prefix);
    let Some(coating) = ctx.fluid(rubber, L * n) else {
        return Ok(());
    };
    let cable = ctx.get(cable_name(prefix), m.id);
    let wire = ctx.get(prefix, m.id);
    let sheets = ctx.get_n(OrePrefix::Plate, rubber, n);

    ctx.recipe(RecipeMap::Assembler)
        .circuit(24)
        .input(prefix, m.id, 1)
        .fluid_input(Some(coating), rubber)
        .output(cable)
        .duration(150)
        .energy_rate(8)
        .submit()?;
    ctx.recipe(RecipeMap::Unpacker)
        .input(cable_name(prefix), m.id, 1)
        .output(wire)
        .output_if_present(sheets)
        .duration(100)
        .energy_rate(8)
        .submit()
}

/// Single wires also bend into springs, draw into fine wire, come off the
/// wiremill from ingots and bundle into every larger size.
fn single(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let wire = ctx.get(prefix, m.id);

    if !m.has(MaterialFlag::NoSmashing) {
        let springs = ctx.get_n(OrePrefix::SpringSmall, m.id, 2);
        if !springs.is_empty() {
            ctx.recipe(RecipeMap::Bender)
                .input(prefix, m.id, 1)
                .output(springs)
                .duration(100)
                .energy_rate(8)
                .submit()?;
        }
        let fine = ctx.get_n(OrePrefix::WireFine, m.id, 4);
        if !fine.is_empty() {
            ctx.recipe(RecipeMap::Wiremill)
                .input(prefix, m.id, 1)
                .output(fine)
                .duration(200)
                .energy_rate(8)
                .submit()?;
        }
        if ctx.has(OrePrefix::Ingot, m.id) {
            ctx.recipe(RecipeMap::Wiremill)
                .input(OrePrefix::Ingot, m.id, 1)
                .output(wire.with_count(2))
                .duration(100)
                .energy_rate(4)
                .submit()?;
        }
    }

    if !m.has(MaterialFlag::NoWorking) && ctx.has(OrePrefix::Plate, m.id) {
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("{}_wire_single", m.name))
            .input(OrePrefix::Plate, m.id, 1)
            .not_consumed(ItemStack::grid_tool(CraftingTool::WireCutter))
            .output(wire)
            .submit()?;
    }

    for (bundle, ticks) in BUNDLES {
        let Some(k) = bundle.wire_size() else {
            continue;
        };
        let product = ctx.get(bundle, m.id);
        ctx.recipe(RecipeMap::Assembler)
            .circuit(k)
            .input(prefix, m.id, k)
            .output(product)
            .duration(ticks)
            .energy_rate(8)
            .submit()?;
    }
    Ok(())
}
