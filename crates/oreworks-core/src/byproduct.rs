//! Byproduct selection for the ore chain.
//!
//! Each processing stage asks for the byproduct at a fixed index of the
//! material's candidate list. If the candidate at that index is the wrong
//! kind, the walk continues to the end of the list and wraps around to the
//! start, stopping before revisiting the first probe.

use crate::catalog::MaterialCatalog;
use crate::id::MaterialId;
use crate::material::{Kind, Material};

/// Position in `candidates` of the first material of kind `expected`,
/// starting at `index` (clamped to the last candidate) and wrapping around.
/// Visits each candidate at most once.
pub fn probe(
    catalog: &MaterialCatalog,
    candidates: &[MaterialId],
    index: usize,
    expected: Kind,
) -> Option<usize> {
    let n = candidates.len();
    if n == 0 {
        return None;
    }
    let start = index.min(n - 1);
    (0..n)
        .map(|step| (start + step) % n)
        .find(|&i| catalog.get(candidates[i]).is_some_and(|m| m.is_a(expected)))
}

/// Picks a byproduct for a primary material, falling back to a sentinel.
#[derive(Debug, Clone, Copy)]
pub struct ByproductSelector {
    sentinel: Option<MaterialId>,
}

impl ByproductSelector {
    pub fn new(sentinel: Option<MaterialId>) -> Self {
        Self { sentinel }
    }

    /// The byproduct of `primary` for the stage at `index`. Returns the
    /// sentinel when no candidate matches, or `primary` itself when the
    /// sentinel is not in the catalog.
    pub fn select<'a>(
        &self,
        catalog: &'a MaterialCatalog,
        primary: &'a Material,
        index: usize,
        expected: Kind,
    ) -> &'a Material {
        let candidates = primary
            .as_dust()
            .map_or(&[][..], |d| d.ore_byproducts.as_slice());
        probe(catalog, candidates, index, expected)
            .and_then(|i| catalog.get(candidates[i]))
            .or_else(|| self.sentinel.and_then(|id| catalog.get(id)))
            .unwrap_or(primary)
    }
}
