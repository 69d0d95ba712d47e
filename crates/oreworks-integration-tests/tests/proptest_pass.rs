//! Property-based tests over full rule passes on the sample data.
//!
//! Hosts may remove entries from the resolver before a pass. Whatever is
//! removed, the pass must finish, and the graph must never mention an item
//! the resolver does not know.

use std::path::PathBuf;
use std::sync::OnceLock;

use oreworks_core::id::MaterialId;
use oreworks_core::prefix::OrePrefix;
use oreworks_core::unification::{ItemKey, ItemStack, UnificationTable};
use oreworks_data::{CatalogData, load_catalogs};
use proptest::prelude::*;

fn data() -> &'static CatalogData {
    static DATA: OnceLock<CatalogData> = OnceLock::new();
    DATA.get_or_init(|| {
        load_catalogs(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")).unwrap()
    })
}

/// Every `(prefix, material)` pair the sample data generates.
fn known_pairs() -> Vec<(OrePrefix, MaterialId)> {
    let data = data();
    let table = UnificationTable::generate(&data.materials, &data.prefixes);
    let mut pairs = Vec::new();
    for def in data.prefixes.iter() {
        for m in data.materials.iter() {
            if table.contains(def.prefix, m.id) {
                pairs.push((def.prefix, m.id));
            }
        }
    }
    pairs
}

fn mentions(stacks: &[ItemStack], removed: ItemKey) -> bool {
    stacks.iter().any(|s| s.key == removed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn removed_items_never_appear(pick in any::<prop::sample::Index>()) {
        let data = data();
        let pairs = known_pairs();
        let (prefix, material) = pairs[pick.index(pairs.len())];
        let removed = ItemKey::Unified { prefix, material };

        let mut items = UnificationTable::generate(&data.materials, &data.prefixes);
        prop_assert!(items.unregister(prefix, material));

        let pass = data.runner().run_with(&data.materials, &data.prefixes, items);
        prop_assert!(pass.is_ok(), "{:?}", pass.as_ref().err());
        let pass = pass.unwrap();

        for recipe in pass.registry.recipes() {
            let outputs: Vec<ItemStack> = recipe.outputs.iter().map(|o| o.stack).collect();
            prop_assert!(!mentions(&recipe.inputs, removed), "{:?}", recipe);
            prop_assert!(!mentions(&outputs, removed), "{:?}", recipe);
            prop_assert!(!mentions(&recipe.catalysts, removed), "{:?}", recipe);
        }
    }
}
