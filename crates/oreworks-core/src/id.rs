use serde::{Deserialize, Serialize};

/// Base material unit: the amount of material in one ingot, dust or gem.
pub const M: u64 = 3_628_800;

/// Fluid volume (in millibuckets) that corresponds to one unit `M` of material.
pub const L: u32 = 144;

/// Identifies a material in the catalog. Cheap to copy and compare.
///
/// Material fields that point at other materials (`smelt_into`,
/// `macerate_into`, ...) hold a `MaterialId` and are resolved through the
/// catalog at rule-execution time, so self-references and cycles never
/// create ownership loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_id_equality() {
        let a = MaterialId(0);
        let b = MaterialId(0);
        let c = MaterialId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn material_ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(MaterialId(0), "copper");
        map.insert(MaterialId(1), "tin");
        assert_eq!(map[&MaterialId(0)], "copper");
    }

    #[test]
    fn unit_constants() {
        assert_eq!(M % 4, 0);
        assert_eq!(M % 9, 0);
        assert_eq!(L / 9, 16);
    }
}
