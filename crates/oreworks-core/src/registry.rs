//! Recipe map registry: where committed descriptors live.
//!
//! Recipes are keyed by `(map, name)` when named and by `(map, input
//! signature)` otherwise. Committing a descriptor identical to one already
//! stored is a no-op; committing a different descriptor under an existing
//! key is a collision.

use std::collections::HashMap;

use tracing::debug;

use crate::recipe::{InvalidReason, RecipeDescriptor, RecipeKey, RecipeMap};

/// Destination for finished descriptors.
pub trait RecipeSink {
    fn commit(&mut self, recipe: RecipeDescriptor) -> Result<(), RegistryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{map} recipe '{key}' collides with a different recipe")]
    Collision { map: RecipeMap, key: String },
    #[error("malformed {map} recipe: {reason}")]
    Malformed { map: RecipeMap, reason: InvalidReason },
}

/// In-memory recipe store, in commit order.
#[derive(Debug, Default, Clone)]
pub struct RecipeMapRegistry {
    recipes: Vec<RecipeDescriptor>,
    index: HashMap<(RecipeMap, RecipeKey), usize>,
    resubmits: usize,
}

impl RecipeMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recipe, in commit order.
    pub fn recipes(&self) -> impl Iterator<Item = &RecipeDescriptor> {
        self.recipes.iter()
    }

    /// Recipes of one map, in commit order.
    pub fn recipes_in(&self, map: RecipeMap) -> impl Iterator<Item = &RecipeDescriptor> {
        self.recipes.iter().filter(move |r| r.map == map)
    }

    pub fn named(&self, map: RecipeMap, name: &str) -> Option<&RecipeDescriptor> {
        self.index
            .get(&(map, RecipeKey::Named(name.to_string())))
            .map(|&i| &self.recipes[i])
    }

    pub fn get(&self, map: RecipeMap, key: &RecipeKey) -> Option<&RecipeDescriptor> {
        self.index.get(&(map, key.clone())).map(|&i| &self.recipes[i])
    }

    pub fn count(&self, map: RecipeMap) -> usize {
        self.recipes_in(map).count()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// How many identical descriptors were committed and ignored.
    pub fn resubmits(&self) -> usize {
        self.resubmits
    }
}

impl RecipeSink for RecipeMapRegistry {
    fn commit(&mut self, recipe: RecipeDescriptor) -> Result<(), RegistryError> {
        recipe.check().map_err(|reason| RegistryError::Malformed {
            map: recipe.map,
            reason,
        })?;
        let slot = (recipe.map, recipe.key());
        if let Some(&existing) = self.index.get(&slot) {
            if self.recipes[existing] == recipe {
                self.resubmits += 1;
                debug!(map = %recipe.map, key = %slot.1, "identical recipe resubmitted");
                return Ok(());
            }
            return Err(RegistryError::Collision {
                map: recipe.map,
                key: slot.1.to_string(),
            });
        }
        self.index.insert(slot, self.recipes.len());
        self.recipes.push(recipe);
        Ok(())
    }
}
