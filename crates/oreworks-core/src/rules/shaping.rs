//! Ingot and gem processing, polarizing, and extruder / alloy-smelter
//! shaping of base shapes into everything else.

use crate::id::{L, M};
use crate::material::{Kind, Material, MaterialFlag};
use crate::prefix::OrePrefix;
use crate::recipe::{RecipeError, RecipeMap};
use crate::unification::{Artifact, CraftingTool, ItemStack, Part, ToolKind};

use super::{RuleContext, count};

pub fn ingot(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Metal) {
        return Ok(());
    }
    let ingot = ctx.get(prefix, m.id);
    let smashable = !m.has(MaterialFlag::NoSmashing);

    if m.has(MaterialFlag::MortarGrindable) {
        let dust = ctx.get(OrePrefix::Dust, m.id);
        ctx.recipe(RecipeMap::CraftingShapeless)
            .named(format!("mortar_grind_{}", m.name))
            .input(prefix, m.id, 1)
            .not_consumed(ItemStack::grid_tool(CraftingTool::Mortar))
            .output(dust)
            .submit()?;
    }

    if smashable {
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("wrench_{}", m.name))
            .input(prefix, m.id, 6)
            .not_consumed(ItemStack::grid_tool(CraftingTool::Hammer))
            .output_stack(ItemStack::tool(ToolKind::Wrench, m.id, None))
            .submit()?;
    }

    let molten = ctx.fluid(m.id, L);
    ctx.recipe(RecipeMap::FluidSolidifier)
        .not_consumed(ItemStack::part(Part::MoldIngot, 1))
        .fluid_input(molten, m.id)
        .output(ingot)
        .duration(20)
        .energy_rate(8)
        .submit()?;

    if !smashable || !m.has(MaterialFlag::GeneratePlate) {
        return Ok(());
    }
    let plate = ctx.get(OrePrefix::Plate, m.id);
    ctx.recipe(RecipeMap::Bender)
        .circuit(0)
        .input(prefix, m.id, 1)
        .output(plate)
        .duration(m.mass.saturating_mul(2) / 3)
        .energy_rate(24)
        .submit()?;
    ctx.recipe(RecipeMap::ForgeHammer)
        .input(prefix, m.id, 3)
        .output(plate.with_count(2))
        .duration(m.mass / 2)
        .energy_rate(16)
        .submit()?;

    if m.has(MaterialFlag::GenerateDense) {
        let dense = ctx.get(OrePrefix::PlateDense, m.id);
        ctx.recipe(RecipeMap::Bender)
            .circuit(5)
            .input(prefix, m.id, 9)
            .output(dense)
            .duration(m.mass.saturating_mul(9))
            .energy_rate(96)
            .submit()?;
        ctx.recipe(RecipeMap::Bender)
            .circuit(5)
            .input(OrePrefix::Plate, m.id, 9)
            .output(dense)
            .duration(m.mass.saturating_mul(3) / 2)
            .energy_rate(96)
            .submit()?;
    }
    Ok(())
}

/// Gem tiers: grind to dust, hammer down one tier, lathe into rods.
pub fn gem(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(props) = m.as_gem() else {
        return Ok(());
    };
    let amount = ctx.amount(prefix);
    let crushed = ctx.dust(m.id, amount);

    if m.has(MaterialFlag::MortarGrindable) {
        ctx.recipe(RecipeMap::CraftingShapeless)
            .named(format!("gem_to_dust_{prefix}_{}", m.name))
            .input(prefix, m.id, 1)
            .not_consumed(ItemStack::grid_tool(CraftingTool::Mortar))
            .output(crushed)
            .submit()?;
    }

    if !m.has(MaterialFlag::NoSmashing) {
        let lower = props
            .purity_tiers
            .iter()
            .position(|&tier| tier == prefix)
            .and_then(|i| i.checked_sub(1))
            .map(|i| props.purity_tiers[i]);
        if let Some(lower) = lower {
            let halves = ctx.get_n(lower, m.id, 2);
            ctx.recipe(RecipeMap::CraftingShapeless)
                .named(format!("gem_to_gem_{lower}_{}", m.name))
                .input(prefix, m.id, 1)
                .not_consumed(ItemStack::grid_tool(CraftingTool::Hammer))
                .output(halves)
                .submit()?;
            ctx.recipe(RecipeMap::ForgeHammer)
                .input(prefix, m.id, 1)
                .output(halves)
                .duration(20)
                .energy_rate(16)
                .submit()?;
        }
    }

    if m.has(MaterialFlag::NoWorking) {
        return Ok(());
    }
    let (rods, remainder) = if m.has(MaterialFlag::GenerateLongRod) && amount >= 2 * M {
        let n = count(amount / (2 * M));
        (ctx.get_n(OrePrefix::StickLong, m.id, n), amount % (2 * M))
    } else if amount >= M {
        (ctx.get_n(OrePrefix::Stick, m.id, count(amount / M)), amount % M)
    } else {
        return Ok(());
    };
    if rods.is_empty() {
        return Ok(());
    }
    let leftover = ctx.dust(m.id, remainder);
    ctx.recipe(RecipeMap::Lathe)
        .input(prefix, m.id, 1)
        .output(rods)
        .output_if_present(leftover)
        .duration(m.mass)
        .energy_rate(16)
        .submit()
}

/// Magnetize into the material's magnetic variant; smelting reverses it.
pub fn polarizing(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(magnetic) = m.as_metal().and_then(|metal| metal.magnetic_material) else {
        return Ok(());
    };
    let plain = ctx.get(prefix, m.id);
    let magnetized = ctx.get(prefix, magnetic);
    if magnetized.is_empty() {
        return Ok(());
    }
    ctx.recipe(RecipeMap::Polarizer)
        .input(prefix, m.id, 1)
        .output(magnetized)
        .duration(16)
        .energy_rate(16)
        .submit()?;
    ctx.recipe(RecipeMap::Smelting)
        .input(prefix, magnetic, 1)
        .output(plain)
        .submit()
}

// ---------------------------------------------------------------------------
// Shaping
// ---------------------------------------------------------------------------

/// Tool heads the extruder can form, with the base units each consumes.
const EXTRUDED_HEADS: [(OrePrefix, Part, u64); 8] = [
    (OrePrefix::ToolHeadSword, Part::ExtruderSword, 2),
    (OrePrefix::ToolHeadPickaxe, Part::ExtruderPickaxe, 3),
    (OrePrefix::ToolHeadShovel, Part::ExtruderShovel, 1),
    (OrePrefix::ToolHeadAxe, Part::ExtruderAxe, 3),
    (OrePrefix::ToolHeadHoe, Part::ExtruderHoe, 2),
    (OrePrefix::ToolHeadHammer, Part::ExtruderHammer, 6),
    (OrePrefix::ToolHeadFile, Part::ExtruderFile, 2),
    (OrePrefix::ToolHeadSaw, Part::ExtruderSaw, 2),
];

/// One extruder or alloy-smelter step over the shaped input.
struct Step {
    map: RecipeMap,
    shape: Part,
    inputs: u32,
    product: Artifact,
    duration: u64,
    energy: u32,
}

fn form(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material, step: Step) -> Result<(), RecipeError> {
    if step.product.is_empty() {
        return Ok(());
    }
    ctx.recipe(step.map)
        .input(prefix, m.id, step.inputs)
        .not_consumed(ItemStack::part(step.shape, 1))
        .output(step.product)
        .duration(step.duration)
        .energy_rate(step.energy)
        .submit()
}

/// Normalized shaping amount of a prefix: its material amount in whole base
/// units, or `None` when it isn't a whole number in `1..=64`.
pub fn shaping_amount(material_amount: u64) -> Option<u64> {
    let amount = material_amount / M;
    (material_amount % M == 0 && (1..=64).contains(&amount)).then_some(amount)
}

/// Re-form a metal shape into every other shape its smelting target has.
pub fn shaping(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    let Some(amount) = shaping_amount(ctx.amount(prefix)) else {
        return Ok(());
    };
    let Some(metal) = m.as_metal() else {
        return Ok(());
    };
    if m.has(MaterialFlag::NoSmelting) {
        return Ok(());
    }
    let mut voltage: u32 = if metal.blast_furnace_temperature >= 2800 { 64 } else { 16 };
    if m.has(MaterialFlag::NoSmashing) {
        voltage /= 4;
    } else if prefix.is_dust_family() {
        return Ok(());
    }

    let target = ctx.material(m.smelt_into())?;
    let a = count(amount);
    let scaled = |k: u64| m.mass.saturating_mul(k).saturating_mul(amount).max(amount);

    if ctx.has(OrePrefix::Block, target.id) {
        let block = ctx.get_n(OrePrefix::Block, target.id, a);
        form(ctx, prefix, m, Step {
            map: RecipeMap::Extruder,
            shape: Part::ExtruderBlock,
            inputs: 9,
            product: block,
            duration: 10 * amount,
            energy: 8 * voltage,
        })?;
        form(ctx, prefix, m, Step {
            map: RecipeMap::AlloySmelter,
            shape: Part::MoldBlock,
            inputs: 9,
            product: block,
            duration: 5 * amount,
            energy: 4 * voltage,
        })?;
    }

    if target.id != m.id {
        let ingot = ctx.get_n(OrePrefix::Ingot, target.id, a);
        form(ctx, prefix, m, Step {
            map: RecipeMap::Extruder,
            shape: Part::ExtruderIngot,
            inputs: 1,
            product: ingot,
            duration: 10,
            energy: 4 * voltage,
        })?;
    }

    let singles = [
        (OrePrefix::Stick, Part::ExtruderRod, 2, 6),
        (OrePrefix::WireGtSingle, Part::ExtruderWire, 2, 6),
        (OrePrefix::Bolt, Part::ExtruderBolt, 8, 8),
        (OrePrefix::Ring, Part::ExtruderRing, 4, 6),
    ];
    for (shape_prefix, shape, per_unit, energy) in singles {
        if amount * per_unit > 64 {
            continue;
        }
        let product = ctx.get_n(shape_prefix, target.id, count(amount * per_unit));
        form(ctx, prefix, m, Step {
            map: RecipeMap::Extruder,
            shape,
            inputs: 1,
            product,
            duration: scaled(2),
            energy: energy * voltage,
        })?;
    }

    if amount * 4 <= 64
        && !m.has(MaterialFlag::NoSmashing)
        && ctx.has(OrePrefix::Ring, m.id)
        && ctx.has(OrePrefix::Stick, m.id)
    {
        let ring = ctx.get(OrePrefix::Ring, m.id);
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("ring_{}", m.name))
            .input(OrePrefix::Stick, m.id, 1)
            .not_consumed(ItemStack::grid_tool(CraftingTool::Hammer))
            .output(ring)
            .submit()?;
    }

    if target.is_tool_material() && !target.has(MaterialFlag::NoSmashing) {
        for (head, shape, units) in EXTRUDED_HEADS {
            let product = ctx.get_n(head, target.id, a);
            form(ctx, prefix, m, Step {
                map: RecipeMap::Extruder,
                shape,
                inputs: count(units),
                product,
                duration: scaled(units),
                energy: 8 * voltage,
            })?;
        }
    }

    if target.has(MaterialFlag::GenerateGear) {
        let gear = ctx.get_n(OrePrefix::Gear, target.id, a);
        form(ctx, prefix, m, Step {
            map: RecipeMap::Extruder,
            shape: Part::ExtruderGear,
            inputs: 4,
            product: gear,
            duration: scaled(5),
            energy: 8 * voltage,
        })?;
        form(ctx, prefix, m, Step {
            map: RecipeMap::AlloySmelter,
            shape: Part::MoldGear,
            inputs: 8,
            product: gear,
            duration: scaled(10),
            energy: 2 * voltage,
        })?;
    }

    if target.has(MaterialFlag::GeneratePlate) {
        let plate = ctx.get_n(OrePrefix::Plate, target.id, a);
        form(ctx, prefix, m, Step {
            map: RecipeMap::Extruder,
            shape: Part::ExtruderPlate,
            inputs: 1,
            product: plate,
            duration: scaled(1),
            energy: 8 * voltage,
        })?;
        form(ctx, prefix, m, Step {
            map: RecipeMap::AlloySmelter,
            shape: Part::MoldPlate,
            inputs: 2,
            product: plate,
            duration: scaled(2),
            energy: 2 * voltage,
        })?;
    }
    Ok(())
}
