//! Ore chain: raw ore through crushed, purified and centrifuged stages down
//! to dust, plus dust smelting, decomposition and universal crushing.

use crate::id::{L, M};
use crate::material::{Kind, Material, MaterialFlag};
use crate::prefix::OrePrefix;
use crate::recipe::{RecipeError, RecipeMap};
use crate::unification::{Artifact, CraftingTool, ItemStack};

use super::{RuleContext, count};

/// Crush any eligible shape back into the dust it was made of, plus the
/// prefix's secondary material if it has one.
pub fn crushing(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) || ctx.config.is_blacklisted(prefix, &m.name) {
        return Ok(());
    }
    let amount = ctx.amount(prefix);
    let dust = ctx.dust(m.id, amount);
    if dust.is_empty() {
        return Ok(());
    }
    let secondary = ctx
        .secondary(prefix)
        .map_or(Artifact::Empty, |s| ctx.dust(s.material, s.amount));
    ctx.recipe(RecipeMap::Macerator)
        .input(prefix, m.id, 1)
        .output(dust)
        .output_if_present(secondary)
        .duration((amount.saturating_mul(20) / M).max(1))
        .submit()
}

/// Raw ore: hammer and macerator into crushed ore, furnace straight to the
/// smelting product.
pub fn ore(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(dust) = m.as_dust() else {
        return Ok(());
    };
    let target = match dust.direct_smelting {
        Some(id) => ctx.material(id)?,
        None => ctx.material(m.id)?,
    };
    let product_prefix = match target.kind() {
        Kind::Metal => OrePrefix::Ingot,
        Kind::Gem => OrePrefix::Gem,
        _ => OrePrefix::Dust,
    };
    let product = ctx.get_n(product_prefix, target.id, dust.smelting_multiplier);
    let crushed = ctx.get_n(OrePrefix::Crushed, m.id, dust.ore_multiplier);
    let dust_stack = ctx.get(OrePrefix::Dust, m.id);

    if !crushed.is_empty() {
        ctx.recipe(RecipeMap::ForgeHammer)
            .input(prefix, m.id, 1)
            .output(crushed)
            .duration(40)
            .energy_rate(16)
            .submit()?;
        ctx.recipe(RecipeMap::Macerator)
            .input(prefix, m.id, 1)
            .output(crushed.with_count(crushed.count().saturating_mul(2)))
            .chanced_output_if_present(dust_stack, 1000)
            .duration(200)
            .energy_rate(24)
            .submit()?;
    }

    if !product.is_empty() && m.uses_normal_furnace(ctx.config.furnace_temperature_limit) {
        ctx.recipe(RecipeMap::Smelting)
            .input(prefix, m.id, 1)
            .output(product)
            .submit()?;
    }
    Ok(())
}

pub fn crushed(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(dust) = m.as_dust() else {
        return Ok(());
    };
    let mut impure = ctx.get(OrePrefix::DustImpure, m.id);
    if impure.is_empty() {
        impure = ctx.get(OrePrefix::Dust, m.id);
    }
    let byproduct = ctx.byproduct(m, 0, Kind::Dust)?;
    let multiplier = dust.byproduct_multiplier;
    let byproduct_dust = ctx.get_n(OrePrefix::Dust, byproduct.id, multiplier);
    let byproduct_tiny = ctx.get_n(OrePrefix::DustTiny, byproduct.id, multiplier);
    let purified = ctx.get(OrePrefix::CrushedPurified, m.id);
    let centrifuged = ctx.get(OrePrefix::CrushedCentrifuged, m.id);
    let stone_dust = ctx
        .reserved
        .stone
        .map_or(Artifact::Empty, |stone| ctx.get(OrePrefix::Dust, stone));

    ctx.recipe(RecipeMap::ForgeHammer)
        .input(prefix, m.id, 1)
        .output(impure)
        .duration(10)
        .energy_rate(16)
        .submit()?;
    ctx.recipe(RecipeMap::Macerator)
        .input(prefix, m.id, 1)
        .output(impure)
        .chanced_output_if_present(byproduct_dust, 1000)
        .duration(100)
        .energy_rate(24)
        .submit()?;

    if !purified.is_empty() {
        let washers = [
            (ctx.reserved_fluid(ctx.reserved.water, 1000), None),
            (ctx.reserved_fluid(ctx.reserved.distilled_water, 1000), Some(300)),
        ];
        for (fluid, duration) in washers {
            let Some(fluid) = fluid else { continue };
            let mut builder = ctx
                .recipe(RecipeMap::OreWasher)
                .input(prefix, m.id, 1)
                .fluid_input(Some(fluid), fluid.material)
                .output(purified)
                .output_if_present(byproduct_tiny)
                .output_if_present(stone_dust);
            if let Some(ticks) = duration {
                builder = builder.duration(ticks);
            }
            builder.submit()?;
        }
    }

    if !centrifuged.is_empty() {
        ctx.recipe(RecipeMap::ThermalCentrifuge)
            .input(prefix, m.id, 1)
            .output(centrifuged)
            .output_if_present(byproduct_tiny)
            .output_if_present(stone_dust)
            .duration(m.mass.saturating_mul(20))
            .submit()?;
    }

    if let Some(bath) = dust.washed_in {
        let fluid = ctx.fluid(bath, 1000);
        let washing = ctx.byproduct(m, 3, Kind::Dust)?;
        let washing_dust = ctx.get_n(OrePrefix::Dust, washing.id, multiplier);
        if !purified.is_empty() {
            ctx.recipe(RecipeMap::ChemicalBath)
                .input(prefix, m.id, 1)
                .fluid_input(fluid, bath)
                .output(purified)
                .chanced_output_if_present(washing_dust, 7000)
                .chanced_output_if_present(stone_dust, 4000)
                .duration(800)
                .energy_rate(8)
                .submit()?;
        }
    }

    ctx.recipe(RecipeMap::CraftingShapeless)
        .named(format!("crushed_ore_to_dust_{}", m.name))
        .input(prefix, m.id, 1)
        .not_consumed(ItemStack::grid_tool(CraftingTool::Hammer))
        .output(impure)
        .submit()?;

    furnace_shortcut(ctx, prefix, m, 8, 10)
}

pub fn purified(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) {
        return Ok(());
    }
    let pure = ctx.get(OrePrefix::DustPure, m.id);
    let centrifuged = ctx.get(OrePrefix::CrushedCentrifuged, m.id);
    let byproduct = ctx.byproduct(m, 1, Kind::Dust)?;
    let byproduct_tiny = ctx.get(OrePrefix::DustTiny, byproduct.id);

    if !pure.is_empty() {
        ctx.recipe(RecipeMap::ForgeHammer)
            .input(prefix, m.id, 1)
            .output(pure)
            .duration(20)
            .energy_rate(16)
            .submit()?;
        ctx.recipe(RecipeMap::Macerator)
            .input(prefix, m.id, 1)
            .output(pure)
            .chanced_output_if_present(byproduct_tiny, 1000)
            .duration(40)
            .energy_rate(16)
            .submit()?;
        ctx.recipe(RecipeMap::CraftingShapeless)
            .named(format!("purified_ore_to_dust_{}", m.name))
            .input(prefix, m.id, 1)
            .not_consumed(ItemStack::grid_tool(CraftingTool::Hammer))
            .output(pure)
            .submit()?;
    }

    if !centrifuged.is_empty() {
        ctx.recipe(RecipeMap::ThermalCentrifuge)
            .input(prefix, m.id, 1)
            .output(centrifuged)
            .output_if_present(byproduct_tiny)
            .duration(m.mass.saturating_mul(20))
            .energy_rate(60)
            .submit()?;
    }

    if m.is_a(Kind::Gem) {
        let chances: [u32; 6] = if m.has(MaterialFlag::HighSifterOutput) {
            [300, 1200, 4500, 1400, 2800, 3500]
        } else {
            [100, 400, 1500, 2000, 4000, 5000]
        };
        let products = [
            ctx.get(OrePrefix::GemExquisite, m.id),
            ctx.get(OrePrefix::GemFlawless, m.id),
            ctx.get(OrePrefix::Gem, m.id),
            ctx.get(OrePrefix::GemFlawed, m.id),
            ctx.get(OrePrefix::GemChipped, m.id),
            pure,
        ];
        let mut builder = ctx.recipe(RecipeMap::Sifter).input(prefix, m.id, 1);
        for (product, chance) in products.into_iter().zip(chances) {
            builder = builder.chanced_output_if_present(product, chance);
        }
        builder.duration(800).energy_rate(16).submit()?;
    }

    furnace_shortcut(ctx, prefix, m, 7, 8)
}

pub fn centrifuged(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) {
        return Ok(());
    }
    let dust = ctx.get(OrePrefix::Dust, m.id);
    let byproduct = ctx.byproduct(m, 2, Kind::Dust)?;
    let byproduct_small = ctx.get(OrePrefix::DustSmall, byproduct.id);

    ctx.recipe(RecipeMap::ForgeHammer)
        .input(prefix, m.id, 1)
        .output(dust)
        .duration(20)
        .energy_rate(16)
        .submit()?;
    ctx.recipe(RecipeMap::Macerator)
        .input(prefix, m.id, 1)
        .output(dust)
        .chanced_output_if_present(byproduct_small, 1000)
        .duration(40)
        .energy_rate(16)
        .submit()?;
    ctx.recipe(RecipeMap::CraftingShapeless)
        .named(format!("centrifuged_ore_to_dust_{}", m.name))
        .input(prefix, m.id, 1)
        .not_consumed(ItemStack::grid_tool(CraftingTool::Hammer))
        .output(dust)
        .submit()?;

    furnace_shortcut(ctx, prefix, m, 7, 8)
}

pub fn crystalline(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Solid) {
        return Ok(());
    }
    let dust = ctx.get(OrePrefix::Dust, m.macerate_into());

    ctx.recipe(RecipeMap::ForgeHammer)
        .input(prefix, m.id, 1)
        .output(dust)
        .duration(10)
        .energy_rate(10)
        .submit()?;
    ctx.recipe(RecipeMap::Macerator)
        .input(prefix, m.id, 1)
        .output(dust)
        .duration(20)
        .energy_rate(16)
        .submit()?;

    furnace_shortcut(ctx, prefix, m, 9, 9)
}

/// Impure, pure and refined dust: centrifuge out the stage's byproduct;
/// pure dust also goes through the magnetic separator when the material
/// names a separated material.
pub fn impure_dust(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(props) = m.as_dust() else {
        return Ok(());
    };
    let dust = ctx.get(OrePrefix::Dust, m.id);

    if prefix == OrePrefix::DustPure {
        if let Some(separated) = props.separated_onto {
            let separated = ctx.material(separated)?;
            let small = ctx.get(OrePrefix::DustSmall, separated.id);
            ctx.recipe(RecipeMap::ElectromagneticSeparator)
                .input(prefix, m.id, 1)
                .output(dust)
                .chanced_output_if_present(small, 4000)
                .duration(separated.mass)
                .energy_rate(24)
                .submit()?;
        }
    }

    let index = match prefix {
        OrePrefix::DustRefined => 2,
        OrePrefix::DustPure => 1,
        _ => 0,
    };
    let byproduct = ctx.byproduct(m, index, Kind::Fluid)?;
    let (tiny, fluid) = if byproduct.is_a(Kind::Dust) {
        (ctx.get(OrePrefix::DustTiny, byproduct.id), None)
    } else {
        (Artifact::Empty, ctx.fluid(byproduct.id, L / 9))
    };
    ctx.recipe(RecipeMap::Centrifuge)
        .input(prefix, m.id, 1)
        .output(dust)
        .output_if_present(tiny)
        .fluid_output_if_present(fluid)
        .duration(m.mass.saturating_mul(4))
        .energy_rate(24)
        .submit()?;

    furnace_shortcut(ctx, prefix, m, 9, 9)
}

/// Plain dust: gems crystallise or implode, metals smelt or go to the blast
/// furnace, plate-forming non-gems compress into plates.
pub fn dust(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) {
        return Ok(());
    }
    let mut smelted_as_metal = false;

    if m.is_a(Kind::Gem) {
        gem_dust(ctx, prefix, m)?;
    } else if let Some(metal) = m.as_metal() {
        if !m.has_any(&[MaterialFlag::Flammable, MaterialFlag::NoSmelting]) {
            smelted_as_metal = true;
            metal_dust(ctx, prefix, m, metal.blast_furnace_temperature)?;
        }
    }

    if !m.is_a(Kind::Gem)
        && m.has(MaterialFlag::GeneratePlate)
        && !m.has_any(&[MaterialFlag::Explosive, MaterialFlag::NoSmashing])
    {
        let plate = ctx.get(OrePrefix::Plate, m.id);
        ctx.recipe(RecipeMap::Compressor)
            .input(prefix, m.id, 1)
            .output(plate)
            .submit()?;
    }

    if smelted_as_metal {
        return Ok(());
    }
    furnace_shortcut(ctx, prefix, m, 9, 9)
}

fn gem_dust(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let gem = ctx.get(OrePrefix::Gem, m.id);
    if gem.is_empty() {
        return Ok(());
    }
    if m.has(MaterialFlag::Crystallisable) {
        let autoclaves = [
            (ctx.reserved_fluid(ctx.reserved.water, 200), 7000, 2000),
            (ctx.reserved_fluid(ctx.reserved.distilled_water, 200), 9000, 1500),
        ];
        for (fluid, chance, duration) in autoclaves {
            let Some(fluid) = fluid else { continue };
            ctx.recipe(RecipeMap::Autoclave)
                .input(prefix, m.id, 1)
                .fluid_input(Some(fluid), fluid.material)
                .chanced_output(gem, chance)
                .duration(duration)
                .energy_rate(24)
                .submit()?;
        }
    } else if !m.has_any(&[MaterialFlag::Explosive, MaterialFlag::NoSmashing]) {
        ctx.recipe(RecipeMap::Implosion)
            .input(prefix, m.id, 4)
            .output(gem.with_count(3))
            .explosives(4)
            .submit()?;
    }
    Ok(())
}

fn metal_dust(
    ctx: &mut RuleContext<'_>,
    prefix: OrePrefix,
    m: &Material,
    temperature: u32,
) -> Result<(), RecipeError> {
    let hot = ctx.has(OrePrefix::IngotHot, m.id);
    let ingot = ctx.get(if hot { OrePrefix::IngotHot } else { OrePrefix::Ingot }, m.id);
    let nugget = ctx.get(OrePrefix::Nugget, m.id);
    let tiny_exists = ctx.has(OrePrefix::DustTiny, m.id);

    if temperature <= ctx.config.furnace_temperature_limit {
        ctx.recipe(RecipeMap::Smelting)
            .input(prefix, m.id, 1)
            .output(ingot)
            .submit()?;
        if tiny_exists && !nugget.is_empty() {
            ctx.recipe(RecipeMap::Smelting)
                .input(OrePrefix::DustTiny, m.id, 1)
                .output(nugget)
                .submit()?;
        }
        return Ok(());
    }

    let duration = (m.mass.saturating_mul(u64::from(temperature)) / 50).max(1);
    ctx.recipe(RecipeMap::BlastFurnace)
        .input(prefix, m.id, 1)
        .output(ingot)
        .duration(duration)
        .energy_rate(120)
        .blast_temperature(temperature)
        .submit()?;
    if hot {
        let cold = ctx.get(OrePrefix::Ingot, m.id);
        ctx.recipe(RecipeMap::VacuumFreezer)
            .input(OrePrefix::IngotHot, m.id, 1)
            .output(cold)
            .duration(u64::from(temperature / 16))
            .submit()?;
    } else if tiny_exists && !nugget.is_empty() {
        ctx.recipe(RecipeMap::BlastFurnace)
            .input(OrePrefix::DustTiny, m.id, 1)
            .output(nugget)
            .duration((duration / 9).max(1))
            .energy_rate(120)
            .blast_temperature(temperature)
            .submit()?;
    }
    Ok(())
}

/// Split a compound into its components.
pub fn decomposition(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let electrolyzing = m.has(MaterialFlag::DecompositionByElectrolyzing);
    if m.is_a(Kind::Marker)
        || m.components.is_empty()
        || !(electrolyzing || m.has(MaterialFlag::DecompositionByCentrifuging))
    {
        return Ok(());
    }
    let total = m.component_total();
    let mut outputs = Vec::new();
    let mut fluid_outputs = Vec::new();
    for component in &m.components {
        let material = ctx.material(component.material)?;
        if material.is_a(Kind::Dust) {
            outputs.push(ctx.get_n(OrePrefix::Dust, material.id, count(component.amount)));
        } else if material.is_a(Kind::Fluid) {
            let amount = count(u64::from(L).saturating_mul(component.amount));
            fluid_outputs.push((ctx.fluid(material.id, amount), material.id));
        }
    }
    let fluid_input = ctx.fluid(m.id, count(u64::from(L).saturating_mul(total)));

    let mut builder = if electrolyzing {
        let slots = m.components.len().min(4) as u32;
        ctx.recipe(RecipeMap::Electrolyzer)
            .duration(m.mass.saturating_mul(total).saturating_mul(8))
            .energy_rate(slots * 30)
    } else {
        ctx.recipe(RecipeMap::Centrifuge)
            .duration(m.mass.saturating_mul(total).saturating_mul(2))
            .energy_rate(30)
    };
    for output in outputs {
        builder = builder.output(output);
    }
    for (fluid, material) in fluid_outputs {
        builder = builder.fluid_output(fluid, material);
    }
    builder = if prefix == OrePrefix::Dust {
        builder.input(prefix, m.id, count(total))
    } else {
        builder.fluid_input(fluid_input, m.id)
    };
    builder.submit()
}

/// Furnace shortcut from an ore-chain stage straight to the metal.
///
/// Smelts into `direct_smelting` when that is a metal (worth `mixed`
/// nuggets) or into the material itself when it is a metal (worth `pure`
/// nuggets). Whole ingots are produced when the nugget count divides by
/// nine.
pub fn furnace_shortcut(
    ctx: &mut RuleContext<'_>,
    prefix: OrePrefix,
    m: &Material,
    mixed: u32,
    pure: u32,
) -> Result<(), RecipeError> {
    let Some(props) = m.as_dust() else {
        return Ok(());
    };
    let direct = match props.direct_smelting {
        Some(id) => Some(ctx.material(id)?).filter(|d| d.is_a(Kind::Metal)),
        None => None,
    };
    let (target, nuggets) = match direct {
        Some(target) => (target, mixed),
        None if m.is_a(Kind::Metal) => (ctx.material(m.id)?, pure),
        None => return Ok(()),
    };
    if !target.uses_normal_furnace(ctx.config.furnace_temperature_limit)
        || target.has(MaterialFlag::NoSmelting)
    {
        return Ok(());
    }
    let product = if nuggets % 9 == 0 {
        ctx.get_n(OrePrefix::Ingot, target.id, nuggets / 9)
    } else {
        ctx.get_n(OrePrefix::Nugget, target.id, nuggets)
    };
    if product.is_empty() {
        return Ok(());
    }
    ctx.recipe(RecipeMap::Smelting)
        .input(prefix, m.id, 1)
        .output(product)
        .submit()
}
