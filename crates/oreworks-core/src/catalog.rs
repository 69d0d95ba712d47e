//! Material and prefix catalogs.
//!
//! Both catalogs are built once and then frozen. The material catalog uses
//! the same three-phase lifecycle as every other registry in this crate:
//! register materials (ids are handed out in order), mutate them by name
//! once every id exists, then `build()` validates all cross references.

use std::collections::{HashMap, HashSet};

use crate::id::MaterialId;
use crate::material::{Material, MaterialKind, MaterialStack};
use crate::prefix::{Condition, OrePrefix};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate material name: {0}")]
    DuplicateMaterial(String),
    #[error("material not found: {0}")]
    NotFound(String),
    #[error("material '{material}' field '{field}' references unknown material {target}")]
    DanglingReference {
        material: String,
        field: &'static str,
        target: MaterialId,
    },
    #[error("prefix '{0}' is defined more than once")]
    DuplicatePrefix(OrePrefix),
    #[error("prefix '{prefix}' secondary references unknown material {target}")]
    DanglingSecondary { prefix: OrePrefix, target: MaterialId },
}

// ---------------------------------------------------------------------------
// Material catalog
// ---------------------------------------------------------------------------

/// Builder for an immutable [`MaterialCatalog`].
#[derive(Debug, Default)]
pub struct MaterialCatalogBuilder {
    materials: Vec<Material>,
    name_to_id: HashMap<String, MaterialId>,
    duplicates: Vec<String>,
}

impl MaterialCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: register a material. Returns its id.
    pub fn register(&mut self, name: &str, mass: u64, kind: MaterialKind) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        if self.name_to_id.insert(name.to_string(), id).is_some() {
            self.duplicates.push(name.to_string());
        }
        self.materials.push(Material::new(id, name, mass, kind));
        id
    }

    /// Phase 2: mutate a registered material by name.
    pub fn mutate<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut Material),
    {
        let id = self
            .name_to_id
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        f(&mut self.materials[id.0 as usize]);
        Ok(())
    }

    pub fn id(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    /// Phase 3: validate references and freeze.
    pub fn build(self) -> Result<MaterialCatalog, CatalogError> {
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(CatalogError::DuplicateMaterial(name));
        }
        let count = self.materials.len();
        for material in &self.materials {
            for (field, target) in references(material) {
                if target.0 as usize >= count {
                    return Err(CatalogError::DanglingReference {
                        material: material.name.clone(),
                        field,
                        target,
                    });
                }
            }
        }
        Ok(MaterialCatalog {
            materials: self.materials,
            name_to_id: self.name_to_id,
        })
    }
}

/// Every material id a material points at, tagged with the field name.
fn references(material: &Material) -> Vec<(&'static str, MaterialId)> {
    let mut refs: Vec<(&'static str, MaterialId)> = material
        .components
        .iter()
        .map(|c| ("components", c.material))
        .collect();
    if let Some(dust) = material.as_dust() {
        refs.extend(dust.ore_byproducts.iter().map(|&id| ("ore_byproducts", id)));
        refs.extend(dust.direct_smelting.map(|id| ("direct_smelting", id)));
        refs.extend(dust.washed_in.map(|id| ("washed_in", id)));
        refs.extend(dust.separated_onto.map(|id| ("separated_onto", id)));
    }
    if let Some(solid) = material.as_solid() {
        refs.extend(solid.handle_material.map(|id| ("handle_material", id)));
        refs.extend(solid.macerate_into.map(|id| ("macerate_into", id)));
    }
    if let Some(metal) = material.as_metal() {
        refs.extend(metal.smelt_into.map(|id| ("smelt_into", id)));
        refs.extend(metal.magnetic_material.map(|id| ("magnetic_material", id)));
    }
    refs
}

/// Immutable, ordered collection of materials.
#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    materials: Vec<Material>,
    name_to_id: HashMap<String, MaterialId>,
}

impl MaterialCatalog {
    pub fn builder() -> MaterialCatalogBuilder {
        MaterialCatalogBuilder::new()
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn id(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Material> {
        self.id(name).and_then(|id| self.get(id))
    }

    /// Materials in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Prefix catalog
// ---------------------------------------------------------------------------

/// Per-run definition of a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixDef {
    pub prefix: OrePrefix,
    /// Material held by one item of this shape, in units of `M`.
    pub material_amount: u64,
    /// Extra material released when the item is crushed.
    pub secondary: Option<MaterialStack>,
    pub generate: Condition,
}

impl PrefixDef {
    /// The standard definition of `prefix`.
    pub fn standard(prefix: OrePrefix) -> Self {
        Self {
            prefix,
            material_amount: prefix.standard_amount(),
            secondary: None,
            generate: prefix.standard_condition(),
        }
    }
}

/// Ordered prefix definitions. The runner visits prefixes in this order.
#[derive(Debug, Clone)]
pub struct PrefixCatalog {
    defs: Vec<PrefixDef>,
    index: HashMap<OrePrefix, usize>,
}

impl PrefixCatalog {
    pub fn new(defs: Vec<PrefixDef>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if index.insert(def.prefix, i).is_some() {
                return Err(CatalogError::DuplicatePrefix(def.prefix));
            }
        }
        Ok(Self { defs, index })
    }

    /// Every prefix with its standard amount and generation condition.
    pub fn standard() -> Self {
        let defs: Vec<PrefixDef> = OrePrefix::ALL.iter().map(|&p| PrefixDef::standard(p)).collect();
        let index = defs.iter().enumerate().map(|(i, d)| (d.prefix, i)).collect();
        Self { defs, index }
    }

    pub fn get(&self, prefix: OrePrefix) -> Option<&PrefixDef> {
        self.index.get(&prefix).map(|&i| &self.defs[i])
    }

    /// Material amount of `prefix`, falling back to its standard amount.
    pub fn material_amount(&self, prefix: OrePrefix) -> u64 {
        self.get(prefix)
            .map_or(prefix.standard_amount(), |d| d.material_amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrefixDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Check secondary references against a material catalog.
    pub fn validate(&self, materials: &MaterialCatalog) -> Result<(), CatalogError> {
        let known: HashSet<MaterialId> = materials.iter().map(|m| m.id).collect();
        for def in &self.defs {
            if let Some(secondary) = def.secondary {
                if !known.contains(&secondary.material) {
                    return Err(CatalogError::DanglingSecondary {
                        prefix: def.prefix,
                        target: secondary.material,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::M;
    use crate::material::{MaterialFlag, MaterialKind};

    fn setup_builder() -> MaterialCatalogBuilder {
        let mut b = MaterialCatalogBuilder::new();
        b.register("copper", 63, MaterialKind::metal());
        b.register("stone", 20, MaterialKind::dust());
        b
    }

    #[test]
    fn register_and_build() {
        let catalog = setup_builder().build().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.id("copper"), Some(MaterialId(0)));
        assert_eq!(catalog.by_name("stone").unwrap().mass, 20);
        assert!(catalog.by_name("unobtainium").is_none());
    }

    #[test]
    fn mutate_by_name() {
        let mut b = setup_builder();
        let stone = b.id("stone").unwrap();
        b.mutate("copper", |m| {
            m.flags.insert(MaterialFlag::GeneratePlate);
            if let MaterialKind::Metal(dust, _, _) = &mut m.kind {
                dust.ore_byproducts.push(stone);
            }
        })
        .unwrap();
        let catalog = b.build().unwrap();
        let cu = catalog.by_name("copper").unwrap();
        assert!(cu.has(MaterialFlag::GeneratePlate));
        assert_eq!(cu.as_dust().unwrap().ore_byproducts, vec![stone]);
    }

    #[test]
    fn mutate_nonexistent_fails() {
        let mut b = setup_builder();
        match b.mutate("unobtainium", |_| {}) {
            Err(CatalogError::NotFound(name)) => assert_eq!(name, "unobtainium"),
            other => panic!("expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn duplicate_name_fails() {
        let mut b = setup_builder();
        b.register("copper", 63, MaterialKind::metal());
        assert!(matches!(b.build(), Err(CatalogError::DuplicateMaterial(n)) if n == "copper"));
    }

    #[test]
    fn dangling_reference_fails() {
        let mut b = setup_builder();
        b.mutate("copper", |m| {
            if let MaterialKind::Metal(_, _, metal) = &mut m.kind {
                metal.smelt_into = Some(MaterialId(99));
            }
        })
        .unwrap();
        match b.build() {
            Err(CatalogError::DanglingReference { field, target, .. }) => {
                assert_eq!(field, "smelt_into");
                assert_eq!(target, MaterialId(99));
            }
            other => panic!("expected DanglingReference, got: {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_allowed() {
        let mut b = setup_builder();
        b.mutate("copper", |m| {
            if let MaterialKind::Metal(_, solid, _) = &mut m.kind {
                solid.macerate_into = Some(MaterialId(0));
            }
        })
        .unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn standard_prefix_catalog_covers_every_prefix() {
        let prefixes = PrefixCatalog::standard();
        assert_eq!(prefixes.len(), OrePrefix::ALL.len());
        assert_eq!(prefixes.material_amount(OrePrefix::Gear), 4 * M);
        let first = prefixes.iter().next().unwrap();
        assert_eq!(first.prefix, OrePrefix::Ore);
    }

    #[test]
    fn duplicate_prefix_fails() {
        let defs = vec![PrefixDef::standard(OrePrefix::Dust), PrefixDef::standard(OrePrefix::Dust)];
        assert!(matches!(
            PrefixCatalog::new(defs),
            Err(CatalogError::DuplicatePrefix(OrePrefix::Dust))
        ));
    }

    #[test]
    fn secondary_must_reference_known_material() {
        let catalog = setup_builder().build().unwrap();
        let mut ore = PrefixDef::standard(OrePrefix::Ore);
        ore.secondary = Some(MaterialStack { material: MaterialId(7), amount: M });
        let prefixes = PrefixCatalog::new(vec![ore]).unwrap();
        assert!(prefixes.validate(&catalog).is_err());
    }
}
