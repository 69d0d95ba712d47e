//! Binary snapshots of a finished recipe registry and a structural hash for
//! comparing passes.
//!
//! Snapshots are `bitcode` with a versioned header. Decoding re-commits
//! every descriptor, so a snapshot that would not have been accepted by the
//! registry in the first place is rejected.

use serde::{Deserialize, Serialize};

use crate::recipe::RecipeDescriptor;
use crate::registry::{RecipeMapRegistry, RecipeSink, RegistryError};
use crate::unification::{FluidStack, ItemKey, ItemStack};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a recipe registry snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x04E5_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("header claims {expected} recipes, payload has {actual}")]
    CountMismatch { expected: u64, actual: u64 },
    #[error("snapshot recipe rejected: {0}")]
    Rejected(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    pub recipes: u64,
}

impl SnapshotHeader {
    pub fn new(recipes: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            recipes,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistrySnapshot {
    header: SnapshotHeader,
    recipes: Vec<RecipeDescriptor>,
}

impl RecipeMapRegistry {
    /// Encode every recipe, in commit order.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = RegistrySnapshot {
            header: SnapshotHeader::new(self.len() as u64),
            recipes: self.recipes().cloned().collect(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    pub fn from_snapshot(data: &[u8]) -> Result<Self, DeserializeError> {
        let snapshot: RegistrySnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        let actual = snapshot.recipes.len() as u64;
        if actual != snapshot.header.recipes {
            return Err(DeserializeError::CountMismatch {
                expected: snapshot.header.recipes,
                actual,
            });
        }

        let mut registry = RecipeMapRegistry::new();
        for recipe in snapshot.recipes {
            registry.commit(recipe)?;
        }
        Ok(registry)
    }

    /// Order-sensitive structural hash of the registry.
    pub fn graph_hash(&self) -> u64 {
        let mut h = GraphHash::new();
        h.write_u64(self.len() as u64);
        for recipe in self.recipes() {
            h.write_recipe(recipe);
        }
        h.finish()
    }
}

// ---------------------------------------------------------------------------
// Graph hash
// ---------------------------------------------------------------------------

/// FNV-1a (64-bit). Not cryptographic.
struct GraphHash(u64);

impl GraphHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write(s.as_bytes());
    }

    fn write_key(&mut self, key: &ItemKey) {
        match *key {
            ItemKey::Unified { prefix, material } => {
                self.write_u32(0);
                self.write_str(prefix.name());
                self.write_u32(material.0);
            }
            ItemKey::Part(part) => {
                self.write_u32(1);
                self.write_u32(part as u32);
            }
            ItemKey::GridTool(tool) => {
                self.write_u32(2);
                self.write_u32(tool as u32);
            }
            ItemKey::Tool {
                kind,
                material,
                handle,
            } => {
                self.write_u32(3);
                self.write_str(kind.name());
                self.write_u32(material.0);
                self.write_u32(handle.map_or(u32::MAX, |h| h.0));
            }
        }
    }

    fn write_stacks(&mut self, stacks: &[ItemStack]) {
        self.write_u64(stacks.len() as u64);
        for stack in stacks {
            self.write_key(&stack.key);
            self.write_u32(stack.count);
        }
    }

    fn write_fluids(&mut self, fluids: &[FluidStack]) {
        self.write_u64(fluids.len() as u64);
        for fluid in fluids {
            self.write_u32(fluid.material.0);
            self.write_u32(fluid.amount);
        }
    }

    fn write_recipe(&mut self, recipe: &RecipeDescriptor) {
        self.write_str(recipe.map.name());
        match &recipe.name {
            Some(name) => self.write_str(name),
            None => self.write_u32(0),
        }
        self.write_stacks(&recipe.inputs);
        self.write_fluids(&recipe.fluid_inputs);
        self.write_u64(recipe.outputs.len() as u64);
        for output in &recipe.outputs {
            self.write_key(&output.stack.key);
            self.write_u32(output.stack.count);
            self.write_u32(output.chance.unwrap_or(0));
        }
        self.write_fluids(&recipe.fluid_outputs);
        self.write_stacks(&recipe.catalysts);
        self.write_u32(recipe.duration);
        self.write_u32(recipe.energy_rate);
        for (property, value) in &recipe.properties {
            self.write_u32(*property as u32);
            self.write_u32(*value);
        }
    }

    fn finish(self) -> u64 {
        self.0
    }
}
