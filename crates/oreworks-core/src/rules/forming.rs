//! Metalworking shapes: plates, rods, bolts and screws, foil, gears,
//! frames, blocks, rotors, and the dust and nugget size conversions.

use crate::id::L;
use crate::material::{Kind, Material, MaterialFlag};
use crate::prefix::OrePrefix;
use crate::recipe::{RecipeError, RecipeMap};
use crate::unification::{Artifact, CraftingTool as T, ItemStack, Part, ToolKind};

use super::{RuleContext, tools};

pub fn plate(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Solid) || !m.has(MaterialFlag::GeneratePlate) {
        return Ok(());
    }
    let plate = ctx.get(prefix, m.id);

    if m.has_fluid() {
        let molten = ctx.fluid(m.id, L);
        ctx.recipe(RecipeMap::FluidSolidifier)
            .not_consumed(ItemStack::part(Part::MoldPlate, 1))
            .fluid_input(molten, m.id)
            .output(plate)
            .duration(40)
            .energy_rate(8)
            .submit()?;
    }

    if !m.has(MaterialFlag::NoSmashing) {
        if ctx.has(OrePrefix::Ingot, m.id) {
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("ingot_to_plate_{}", m.name))
                .input(OrePrefix::Ingot, m.id, 2)
                .grid_tools(&[T::Hammer])
                .output(plate)
                .submit()?;
        }
        if ctx.has(OrePrefix::Gem, m.id) {
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("gem_to_plate_{}", m.name))
                .input(OrePrefix::Gem, m.id, 1)
                .grid_tools(&[T::Hammer])
                .output(plate)
                .submit()?;
        }
    }

    if m.has(MaterialFlag::MortarGrindable) {
        let dust = ctx.get(OrePrefix::Dust, m.id);
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("plate_to_dust_{}", m.name))
            .input(prefix, m.id, 1)
            .grid_tools(&[T::Mortar])
            .output(dust)
            .submit()?;
    }
    Ok(())
}

pub fn dense_plate(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if m.has(MaterialFlag::NoSmashing) {
        return Ok(());
    }
    let dense = ctx.get(prefix, m.id);
    ctx.recipe(RecipeMap::Bender)
        .circuit(2)
        .input(OrePrefix::Plate, m.id, 9)
        .output(dense)
        .duration(m.mass.saturating_mul(9))
        .energy_rate(96)
        .submit()
}

/// Rods: lathe from ingots, cut into bolts, hammer into long rods, draw into
/// fine wire, plus the rod-based hand tools.
pub fn stick(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) {
        return Ok(());
    }
    let stick = ctx.get(prefix, m.id);

    if !m.has(MaterialFlag::NoWorking) {
        if m.is_a(Kind::Metal) {
            let shavings = ctx.get_n(OrePrefix::DustSmall, m.macerate_into(), 2);
            ctx.recipe(RecipeMap::Lathe)
                .input(OrePrefix::Ingot, m.id, 1)
                .output(stick)
                .output_if_present(shavings)
                .duration(m.mass.saturating_mul(5))
                .energy_rate(16)
                .submit()?;
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("stick_{}", m.name))
                .input(OrePrefix::Ingot, m.id, 1)
                .grid_tools(&[T::File])
                .output(stick)
                .submit()?;
        }
        if m.is_a(Kind::Solid) {
            tools::stick_tools(ctx, prefix, m)?;
        }
        if m.has(MaterialFlag::GenerateBoltScrew) {
            let bolt = ctx.get(OrePrefix::Bolt, m.id);
            ctx.recipe(RecipeMap::Cutter)
                .input(prefix, m.id, 1)
                .output(bolt.with_count(4))
                .duration(m.mass.saturating_mul(2))
                .energy_rate(4)
                .submit()?;
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("bolt_{}", m.name))
                .input(prefix, m.id, 1)
                .grid_tools(&[T::Saw])
                .output(bolt.with_count(2))
                .submit()?;
        }
    }

    if !m.has(MaterialFlag::NoSmashing) && m.has(MaterialFlag::GenerateLongRod) {
        let long = ctx.get(OrePrefix::StickLong, m.id);
        ctx.recipe(RecipeMap::ForgeHammer)
            .input(prefix, m.id, 2)
            .output(long)
            .duration(m.mass)
            .energy_rate(16)
            .submit()?;
    }

    if m.has(MaterialFlag::GenerateFineWire) {
        let fine = ctx.get_n(OrePrefix::WireFine, m.id, 4);
        ctx.recipe(RecipeMap::Wiremill)
            .input(prefix, m.id, 1)
            .output(fine)
            .duration(50)
            .energy_rate(4)
            .submit()?;
    }
    Ok(())
}

pub fn long_stick(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) {
        return Ok(());
    }
    let long = ctx.get(prefix, m.id);
    let sticks = ctx.get_n(OrePrefix::Stick, m.id, 2);

    if !m.has(MaterialFlag::NoWorking) {
        ctx.recipe(RecipeMap::Cutter)
            .input(prefix, m.id, 1)
            .output(sticks)
            .duration(m.mass)
            .energy_rate(4)
            .submit()?;
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("stick_long_{}", m.name))
            .input(prefix, m.id, 1)
            .grid_tools(&[T::Saw])
            .output(sticks)
            .submit()?;
        let cut_gems = [
            (OrePrefix::GemFlawless, "flawless", 1),
            (OrePrefix::GemExquisite, "exquisite", 2),
        ];
        for (gem, label, n) in cut_gems {
            if !ctx.has(gem, m.id) {
                continue;
            }
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("stick_long_gem_{label}_{}", m.name))
                .input(gem, m.id, 1)
                .grid_tools(&[T::Saw, T::File])
                .output(sticks.with_count(n))
                .submit()?;
        }
    }

    if !m.has(MaterialFlag::NoSmashing) {
        let spring = ctx.get(OrePrefix::Spring, m.id);
        if !spring.is_empty() {
            ctx.recipe(RecipeMap::Bender)
                .circuit(1)
                .input(prefix, m.id, 1)
                .output(spring)
                .duration(200)
                .energy_rate(16)
                .submit()?;
        }
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("stick_long_sticks_{}", m.name))
            .input(OrePrefix::Stick, m.id, 2)
            .grid_tools(&[T::Hammer])
            .output(long)
            .submit()?;
    }
    Ok(())
}

pub fn nugget(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let whole = match m.kind() {
        Kind::Metal => OrePrefix::Ingot,
        Kind::Gem => OrePrefix::Gem,
        _ => return Ok(()),
    };
    if !ctx.has(whole, m.id) {
        return Ok(());
    }
    let nuggets = ctx.get_n(prefix, m.id, 9);
    let unit = ctx.get(whole, m.id);

    ctx.recipe(RecipeMap::CraftingShapeless)
        .named(format!("nugget_disassembling_{}", m.name))
        .input(whole, m.id, 1)
        .output(nuggets)
        .submit()?;
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("nugget_assembling_{}", m.name))
        .input(prefix, m.id, 9)
        .output(unit)
        .submit()?;

    if whole == OrePrefix::Ingot {
        let molten = ctx.fluid(m.id, L);
        ctx.recipe(RecipeMap::FluidSolidifier)
            .not_consumed(ItemStack::part(Part::MoldNugget, 1))
            .fluid_input(molten, m.id)
            .output(nuggets)
            .duration(m.mass)
            .energy_rate(8)
            .submit()?;
    }
    Ok(())
}

pub fn small_dust(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    dust_split(ctx, prefix, m, "small", 4)
}

pub fn tiny_dust(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    dust_split(ctx, prefix, m, "tiny", 9)
}

/// One dust into `n` pieces and back.
fn dust_split(
    ctx: &mut RuleContext<'_>,
    prefix: OrePrefix,
    m: &Material,
    label: &str,
    n: u32,
) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) {
        return Ok(());
    }
    let pieces = ctx.get_n(prefix, m.id, n);
    let dust = ctx.get(OrePrefix::Dust, m.id);
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("{label}_dust_disassembling_{}", m.name))
        .input(OrePrefix::Dust, m.id, 1)
        .output(pieces)
        .submit()?;
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("{label}_dust_assembling_{}", m.name))
        .input(prefix, m.id, n)
        .output(dust)
        .submit()
}

pub fn block(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Dust) || ctx.config.is_blacklisted(prefix, &m.name) {
        return Ok(());
    }
    let block = ctx.get(prefix, m.id);

    if m.has(MaterialFlag::SmeltIntoFluid) {
        let molten = ctx.fluid(m.id, L * 9);
        ctx.recipe(RecipeMap::FluidSolidifier)
            .not_consumed(ItemStack::part(Part::MoldBlock, 1))
            .fluid_input(molten, m.id)
            .output(block)
            .duration(m.mass)
            .energy_rate(8)
            .submit()?;
    }

    if m.has(MaterialFlag::GeneratePlate) {
        let plates = ctx.get_n(OrePrefix::Plate, m.id, 9);
        ctx.recipe(RecipeMap::Cutter)
            .input(prefix, m.id, 1)
            .output(plates)
            .duration(m.mass.saturating_mul(8))
            .energy_rate(30)
            .submit()?;
    }

    let unit = match m.kind() {
        Kind::Gem => OrePrefix::Gem,
        Kind::Metal => OrePrefix::Ingot,
        _ => OrePrefix::Dust,
    };
    if !ctx.has(unit, m.id) {
        return Ok(());
    }
    let units = ctx.get_n(unit, m.id, 9);
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("block_compress_{}", m.name))
        .input(unit, m.id, 9)
        .output(block)
        .submit()?;
    ctx.recipe(RecipeMap::CraftingShapeless)
        .named(format!("block_decompress_{}", m.name))
        .input(prefix, m.id, 1)
        .output(units)
        .submit()
}

pub fn frame(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Metal)
        || !m.has(MaterialFlag::GeneratePlate)
        || !m.has(MaterialFlag::GenerateRod)
    {
        return Ok(());
    }
    let frames = ctx.get_n(prefix, m.id, 4);
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("frame_{}", m.name))
        .input(OrePrefix::Plate, m.id, 3)
        .input(OrePrefix::Stick, m.id, 5)
        .grid_tools(&[T::Wrench])
        .output(frames)
        .submit()
}

pub fn bolt(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Metal) || m.has(MaterialFlag::NoWorking) || !ctx.has(OrePrefix::Screw, m.id) {
        return Ok(());
    }
    let bolt = ctx.get(prefix, m.id);
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("bolt_from_screw_{}", m.name))
        .input(OrePrefix::Screw, m.id, 1)
        .grid_tools(&[T::File])
        .output(bolt)
        .submit()?;
    ctx.recipe(RecipeMap::Cutter)
        .input(OrePrefix::Screw, m.id, 1)
        .output(bolt)
        .duration(20)
        .energy_rate(24)
        .submit()
}

pub fn screw(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Metal) || m.has(MaterialFlag::NoWorking) {
        return Ok(());
    }
    let screw = ctx.get(prefix, m.id);
    ctx.recipe(RecipeMap::Lathe)
        .input(OrePrefix::Bolt, m.id, 1)
        .output(screw)
        .duration((m.mass / 8).max(1))
        .energy_rate(4)
        .submit()?;
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("screw_{}", m.name))
        .input(OrePrefix::Bolt, m.id, 1)
        .grid_tools(&[T::File])
        .output(screw)
        .submit()
}

pub fn foil(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Metal) || m.has(MaterialFlag::NoSmashing) {
        return Ok(());
    }
    let foil = ctx.get_n(prefix, m.id, 4);
    ctx.recipe(RecipeMap::Bender)
        .circuit(0)
        .input(OrePrefix::Plate, m.id, 1)
        .output(foil)
        .duration(m.mass)
        .energy_rate(24)
        .submit()
}

pub fn fine_wire(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Metal)
        || m.has_any(&[MaterialFlag::NoWorking, MaterialFlag::NoUnification])
        || !ctx.has(OrePrefix::Foil, m.id)
    {
        return Ok(());
    }
    let fine = ctx.get(prefix, m.id);
    ctx.recipe(RecipeMap::CraftingShapeless)
        .named(format!("fine_wire_{}", m.name))
        .input(OrePrefix::Foil, m.id, 1)
        .grid_tools(&[T::WireCutter])
        .output(fine)
        .submit()
}

/// Gears and small gears share one rule; the prefix picks the variant.
pub fn gear(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let small = prefix == OrePrefix::GearSmall;
    let flag = if small { MaterialFlag::GenerateSmallGear } else { MaterialFlag::GenerateGear };
    if !m.is_a(Kind::Solid) || !m.has(flag) {
        return Ok(());
    }
    let gear = ctx.get(prefix, m.id);

    if m.has(MaterialFlag::SmeltIntoFluid) {
        let (mold, units, ticks) = if small {
            (Part::MoldGearSmall, 1, 20)
        } else {
            (Part::MoldGear, 4, 100)
        };
        let molten = ctx.fluid(m.id, L * units);
        ctx.recipe(RecipeMap::FluidSolidifier)
            .not_consumed(ItemStack::part(mold, 1))
            .fluid_input(molten, m.id)
            .output(gear)
            .duration(ticks)
            .energy_rate(8)
            .submit()?;
    }

    if small {
        if m.is_a(Kind::Metal) && !m.has(MaterialFlag::NoSmashing) {
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("small_gear_{}", m.name))
                .input(OrePrefix::Plate, m.id, 1)
                .grid_tools(&[T::Hammer])
                .output(gear)
                .submit()?;
        }
        return Ok(());
    }
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("gear_{}", m.name))
        .input(OrePrefix::Plate, m.id, 4)
        .input(OrePrefix::Stick, m.id, 4)
        .grid_tools(&[T::Wrench])
        .output(gear)
        .submit()
}

pub fn compressed(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Solid)
        || !m.has(MaterialFlag::GeneratePlate)
        || !ctx.has(OrePrefix::Plank, m.id)
    {
        return Ok(());
    }
    let compressed = ctx.get(prefix, m.id);
    let ash = ctx
        .reserved
        .dark_ash
        .map_or(Artifact::Empty, |ash| ctx.get(OrePrefix::DustTiny, ash));
    ctx.recipe(RecipeMap::Implosion)
        .input(OrePrefix::Plank, m.id, 2)
        .output(compressed)
        .output_if_present(ash)
        .explosives(2)
        .submit()
}

pub fn lens(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Gem) {
        return Ok(());
    }
    let lens = ctx.get(prefix, m.id);
    let shavings = ctx.get(OrePrefix::DustSmall, m.id);
    ctx.recipe(RecipeMap::Lathe)
        .input(OrePrefix::Plate, m.id, 1)
        .output(lens)
        .output_if_present(shavings)
        .duration(m.mass / 2)
        .energy_rate(16)
        .submit()
}

pub fn rotor(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Solid)
        || m.has_any(&[MaterialFlag::NoUnification, MaterialFlag::NoWorking])
        || !ctx.has(OrePrefix::Plate, m.id)
        || !ctx.has(OrePrefix::Ring, m.id)
    {
        return Ok(());
    }
    let rotor = ctx.get(prefix, m.id);

    if ctx.has(OrePrefix::Screw, m.id) {
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("rotor_{}", m.name))
            .input(OrePrefix::Plate, m.id, 4)
            .input(OrePrefix::Ring, m.id, 1)
            .input(OrePrefix::Screw, m.id, 1)
            .grid_tools(&[T::Hammer, T::File, T::Screwdriver])
            .output(rotor)
            .submit()?;
    }

    let Some(solder) = ctx.reserved_fluid(ctx.reserved.soldering_alloy, 32) else {
        return Ok(());
    };
    ctx.recipe(RecipeMap::Assembler)
        .input(OrePrefix::Plate, m.id, 4)
        .input(OrePrefix::Ring, m.id, 1)
        .fluid_input(Some(solder), solder.material)
        .output(rotor)
        .duration(240)
        .energy_rate(24)
        .submit()
}

/// Turbine blades assemble onto a titanium long rod.
pub fn turbine_blade(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Solid) {
        return Ok(());
    }
    if let Some(titanium) = ctx.reserved.titanium {
        if ctx.has(OrePrefix::StickLong, titanium) {
            ctx.recipe(RecipeMap::Assembler)
                .input(prefix, m.id, 8)
                .input(OrePrefix::StickLong, titanium, 1)
                .output_stack(ItemStack::tool(ToolKind::Turbine, m.id, None))
                .duration(320)
                .energy_rate(400)
                .submit()?;
        }
    }

    if !ctx.has(OrePrefix::Plate, m.id) || !ctx.has(OrePrefix::Screw, m.id) {
        return Ok(());
    }
    let blade = ctx.get(prefix, m.id);
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("turbine_blade_{}", m.name))
        .input(OrePrefix::Plate, m.id, 3)
        .input(OrePrefix::Screw, m.id, 2)
        .grid_tools(&[T::File, T::Screwdriver])
        .output(blade)
        .submit()
}
