//! Tool heads and the hand tools crafted from rods.

use crate::id::MaterialId;
use crate::material::{Kind, Material, MaterialFlag};
use crate::prefix::OrePrefix;
use crate::recipe::{RecipeError, RecipeMap};
use crate::unification::{CraftingTool as T, ItemStack, ToolKind};

use super::RuleContext;

/// How a head is forged from plates and ingots, and the tool it becomes.
struct Head {
    tool: ToolKind,
    plates: u32,
    ingots: u32,
    grid: &'static [T],
}

const fn head(tool: ToolKind, plates: u32, ingots: u32, grid: &'static [T]) -> Head {
    Head {
        tool,
        plates,
        ingots,
        grid,
    }
}

fn hand_head(prefix: OrePrefix) -> Option<Head> {
    use OrePrefix as P;
    let head = match prefix {
        P::ToolHeadAxe => head(ToolKind::Axe, 2, 1, &[T::Hammer, T::File]),
        P::ToolHeadHoe => head(ToolKind::Hoe, 1, 1, &[T::Hammer, T::File]),
        P::ToolHeadPickaxe => head(ToolKind::Pickaxe, 1, 2, &[T::File, T::Hammer]),
        P::ToolHeadPlow => head(ToolKind::Plow, 4, 0, &[T::Hammer, T::File]),
        P::ToolHeadSaw => head(ToolKind::Saw, 2, 0, &[T::File, T::Hammer]),
        P::ToolHeadSense => head(ToolKind::Sense, 2, 1, &[T::Hammer, T::File]),
        P::ToolHeadShovel => head(ToolKind::Shovel, 1, 0, &[T::File, T::Hammer]),
        P::ToolHeadSword => head(ToolKind::Sword, 2, 0, &[T::File, T::Hammer]),
        P::ToolHeadUniversalSpade => head(ToolKind::UniversalSpade, 3, 3, &[T::Hammer]),
        P::ToolHeadHammer => head(ToolKind::HardHammer, 0, 6, &[T::Hammer]),
        P::ToolHeadFile => head(ToolKind::File, 2, 0, &[T::Hammer]),
        _ => return None,
    };
    Some(head)
}

/// Steel parts an electric tool head needs beside its own plates.
struct ElectricHead {
    name: &'static str,
    plates: u32,
    steel: &'static [(OrePrefix, u32)],
    grid: &'static [T],
}

fn electric_head(prefix: OrePrefix) -> Option<ElectricHead> {
    use OrePrefix as P;
    let head = match prefix {
        P::ToolHeadDrill => ElectricHead {
            name: "drill_head",
            plates: 4,
            steel: &[(P::Plate, 4)],
            grid: &[T::Hammer],
        },
        P::ToolHeadChainsaw => ElectricHead {
            name: "chainsaw_head",
            plates: 2,
            steel: &[(P::Plate, 4), (P::Ring, 2)],
            grid: &[T::Hammer],
        },
        P::ToolHeadWrench => ElectricHead {
            name: "wrench_head",
            plates: 4,
            steel: &[(P::Ring, 1), (P::Screw, 2)],
            grid: &[T::Hammer, T::Screwdriver],
        },
        P::ToolHeadBuzzSaw => ElectricHead {
            name: "buzzsaw_head",
            plates: 4,
            steel: &[],
            grid: &[T::Wrench, T::Hammer, T::File, T::WireCutter],
        },
        _ => return None,
    };
    Some(head)
}

/// Tool heads: the head itself from plates, ingots or gems, and the finished
/// tool from head and handle rod.
pub fn tool_head(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
    if !m.is_a(Kind::Solid) {
        return Ok(());
    }
    if let Some(electric) = electric_head(prefix) {
        return electric_parts(ctx, prefix, m, &electric);
    }
    let Some(shape) = hand_head(prefix) else {
        return Ok(());
    };
    let head_item = ctx.get(prefix, m.id);
    let metal = m.is_a(Kind::Metal);

    if let Some(handle) = handle_stick(ctx, m)? {
        ctx.recipe(RecipeMap::CraftingShapeless)
            .named(format!("{}_{}_{}", shape.tool.name(), m.name, handle.name))
            .input(prefix, m.id, 1)
            .input(OrePrefix::Stick, handle.id, 1)
            .output_stack(ItemStack::tool(shape.tool, m.id, Some(handle.id)))
            .submit()?;

        if metal && shape.tool == ToolKind::HardHammer && ctx.has(OrePrefix::Ingot, m.id) {
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("hammer_{}", m.name))
                .input(OrePrefix::Ingot, m.id, 6)
                .input(OrePrefix::Stick, handle.id, 1)
                .output_stack(ItemStack::tool(ToolKind::HardHammer, m.id, Some(handle.id)))
                .submit()?;
        }
        if metal && shape.tool == ToolKind::File && ctx.has(OrePrefix::Plate, m.id) {
            ctx.recipe(RecipeMap::CraftingShaped)
                .named(format!("file_{}", m.name))
                .input(OrePrefix::Plate, m.id, 2)
                .input(OrePrefix::Stick, handle.id, 1)
                .output_stack(ItemStack::tool(ToolKind::File, m.id, Some(handle.id)))
                .submit()?;
        }
    }

    let name = format!("head_{}_{}", shape.tool.name(), m.name);
    if metal && m.has(MaterialFlag::GeneratePlate) {
        let mut recipe = ctx.recipe(RecipeMap::CraftingShaped).named(name);
        if shape.plates > 0 {
            recipe = recipe.input(OrePrefix::Plate, m.id, shape.plates);
        }
        if shape.ingots > 0 {
            recipe = recipe.input(OrePrefix::Ingot, m.id, shape.ingots);
        }
        recipe.grid_tools(shape.grid).output(head_item).submit()
    } else if m.is_a(Kind::Gem) && ctx.has(OrePrefix::Gem, m.id) {
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(name)
            .input(OrePrefix::Gem, m.id, shape.plates + shape.ingots)
            .grid_tools(shape.grid)
            .output(head_item)
            .submit()
    } else {
        Ok(())
    }
}

fn electric_parts(
    ctx: &mut RuleContext<'_>,
    prefix: OrePrefix,
    m: &Material,
    head: &ElectricHead,
) -> Result<(), RecipeError> {
    let Some(steel) = ctx.reserved.steel else {
        return Ok(());
    };
    let parts_exist = ctx.has(OrePrefix::Plate, m.id)
        && head.steel.iter().all(|&(part, _)| ctx.has(part, steel));
    if !parts_exist {
        return Ok(());
    }
    let head_item = ctx.get(prefix, m.id);
    let mut recipe = ctx
        .recipe(RecipeMap::CraftingShaped)
        .named(format!("{}_{}", head.name, m.name))
        .input(OrePrefix::Plate, m.id, head.plates);
    for &(part, n) in head.steel {
        recipe = recipe.input(part, steel, n);
    }
    recipe.grid_tools(head.grid).output(head_item).submit()
}

/// The handle material with a rod to fit, if any.
fn handle_stick<'a>(ctx: &RuleContext<'a>, m: &Material) -> Result<Option<&'a Material>, RecipeError> {
    let Some(id) = ctx.handle(m) else {
        return Ok(None);
    };
    if !ctx.has(OrePrefix::Stick, id) {
        return Ok(None);
    }
    ctx.material(id).map(Some)
}

// ---------------------------------------------------------------------------
// Rod tools
// ---------------------------------------------------------------------------

/// Hand tools built around this material's rods. Only tool materials get
/// them.
pub(super) fn stick_tools(
    ctx: &mut RuleContext<'_>,
    prefix: OrePrefix,
    m: &Material,
) -> Result<(), RecipeError> {
    if !m.is_tool_material() {
        return Ok(());
    }
    let has_plate = ctx.has(OrePrefix::Plate, m.id);

    if let Some(rubber) = ctx.reserved.rubber.filter(|&r| ctx.has(OrePrefix::Plate, r)) {
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("plunger_{}", m.name))
            .input(prefix, m.id, 2)
            .input(OrePrefix::Plate, rubber, 3)
            .grid_tools(&[T::WireCutter, T::File])
            .output_stack(ItemStack::tool(ToolKind::Plunger, m.id, None))
            .submit()?;
    }

    if let Some(handle) = handle_stick(ctx, m)? {
        ctx.recipe(RecipeMap::CraftingShaped)
            .named(format!("screwdriver_{}_{}", m.name, handle.name))
            .input(prefix, m.id, 2)
            .input(OrePrefix::Stick, handle.id, 1)
            .grid_tools(&[T::File, T::Hammer])
            .output_stack(ItemStack::tool(ToolKind::Screwdriver, m.id, Some(handle.id)))
            .submit()?;
        if has_plate {
            knives(ctx, m, handle.id)?;
        }
    }

    if !m.has(MaterialFlag::GenerateBoltScrew) || !has_plate || !ctx.has(OrePrefix::Screw, m.id) {
        return Ok(());
    }
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("wire_cutter_{}", m.name))
        .input(OrePrefix::Plate, m.id, 3)
        .input(OrePrefix::Screw, m.id, 1)
        .input(prefix, m.id, 2)
        .grid_tools(&[T::File, T::Hammer, T::Screwdriver])
        .output_stack(ItemStack::tool(ToolKind::WireCutter, m.id, None))
        .submit()?;
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("branch_cutter_{}", m.name))
        .input(OrePrefix::Plate, m.id, 4)
        .input(OrePrefix::Screw, m.id, 1)
        .input(prefix, m.id, 2)
        .grid_tools(&[T::File, T::Screwdriver])
        .output_stack(ItemStack::tool(ToolKind::BranchCutter, m.id, None))
        .submit()
}

fn knives(ctx: &mut RuleContext<'_>, m: &Material, handle: MaterialId) -> Result<(), RecipeError> {
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("knife_{}", m.name))
        .input(OrePrefix::Plate, m.id, 1)
        .input(OrePrefix::Stick, handle, 1)
        .grid_tools(&[T::File, T::Hammer])
        .output_stack(ItemStack::tool(ToolKind::Knife, m.id, Some(handle)))
        .submit()?;
    ctx.recipe(RecipeMap::CraftingShaped)
        .named(format!("butchery_knife_{}", m.name))
        .input(OrePrefix::Plate, m.id, 4)
        .input(OrePrefix::Stick, handle, 1)
        .grid_tools(&[T::File, T::Hammer])
        .output_stack(ItemStack::tool(ToolKind::ButcheryKnife, m.id, Some(handle)))
        .submit()
}
