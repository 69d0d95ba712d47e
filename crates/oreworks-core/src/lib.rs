//! Oreworks Core -- a deterministic rule engine that turns a material
//! catalog and an item-shape catalog into a recipe graph.
//!
//! Every material carries physical attributes (mass, blast temperature,
//! components) and capability flags; every prefix names a shape (ingot,
//! plate, dust, wire, tool head) with a material amount. A single pass of
//! the rule runner visits each `(prefix, material)` pair that has an item
//! and lets the prefix's rules emit recipe descriptors into a registry.
//!
//! # Pass Pipeline
//!
//! 1. **Catalogs** -- [`catalog::MaterialCatalogBuilder`] registers and
//!    mutates materials, then validates cross-references on `build`.
//! 2. **Unification** -- [`unification::UnificationTable::generate`] decides
//!    which `(prefix, material)` pairs exist.
//! 3. **Rules** -- [`runner::RuleRunner`] walks prefixes, materials and rules
//!    in catalog order; rules emit through [`recipe::RecipeBuilder`].
//! 4. **Registry** -- [`registry::RecipeMapRegistry`] deduplicates identical
//!    descriptors and rejects conflicting ones.
//!
//! ```rust,ignore
//! let pass = oreworks_core::run_all_rules(&materials, &prefixes)?;
//! for recipe in pass.registry.recipes_in(RecipeMap::BlastFurnace) {
//!     println!("{recipe:?}");
//! }
//! ```
//!
//! # Key Types
//!
//! - [`material::Material`] -- Kind-tagged attribute record with flags.
//! - [`prefix::OrePrefix`] -- Item shapes, their standard amounts and
//!   generation conditions.
//! - [`unification::Artifact`] -- A resolved item stack or `Empty`.
//! - [`byproduct::ByproductSelector`] -- Cyclic byproduct choice with a
//!   sentinel fallback.
//! - [`rules::RuleSet`] -- Ordered rules per prefix.
//! - [`snapshot`] -- Versioned registry snapshots via bitcode.

pub mod byproduct;
pub mod catalog;
pub mod config;
pub mod id;
pub mod material;
pub mod prefix;
pub mod recipe;
pub mod registry;
pub mod rules;
pub mod runner;
pub mod snapshot;
pub mod unification;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use runner::{RuleEngineFault, RulePass, RuleRunner, run_all_rules};
