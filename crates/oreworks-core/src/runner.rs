//! The rule runner: one deterministic pass over every `(prefix, material)`
//! pair the unification table knows.
//!
//! Order is fixed: prefixes in catalog order, then materials in catalog
//! order, then the prefix's rules in registration order. An
//! `InvalidRecipe` from a rule is logged, recorded as skipped and the pass
//! continues with the next rule. Any other error aborts the pass and the
//! partially built registry is discarded.

use tracing::{debug, error, info, warn};

use crate::catalog::{MaterialCatalog, PrefixCatalog};
use crate::config::EngineConfig;
use crate::prefix::OrePrefix;
use crate::recipe::{InvalidReason, RecipeError, RecipeMap};
use crate::registry::{RecipeMapRegistry, RecipeSink};
use crate::rules::{RuleContext, RuleSet};
use crate::unification::UnificationTable;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// A rule invocation that produced an invalid recipe and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    pub rule: &'static str,
    pub prefix: OrePrefix,
    pub material: String,
    pub map: RecipeMap,
    pub reason: InvalidReason,
}

/// Fatal pass abort.
#[derive(Debug, thiserror::Error)]
#[error("rule '{rule}' failed on {prefix}:{material}: {source}")]
pub struct RuleEngineFault {
    pub rule: &'static str,
    pub prefix: OrePrefix,
    pub material: String,
    #[source]
    pub source: RecipeError,
}

/// A completed pass.
#[derive(Debug, Clone)]
pub struct RulePass {
    pub registry: RecipeMapRegistry,
    /// The resolver the pass ran against.
    pub items: UnificationTable,
    pub skipped: Vec<SkippedRule>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RuleRunner {
    rules: RuleSet,
    config: EngineConfig,
}

impl Default for RuleRunner {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleRunner {
    pub fn new(rules: RuleSet, config: EngineConfig) -> Self {
        Self { rules, config }
    }

    /// Standard rules, default configuration.
    pub fn standard() -> Self {
        Self::new(RuleSet::standard(), EngineConfig::default())
    }

    /// Standard rules with a host configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(RuleSet::standard(), config)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate the unification table from the catalogs and run every rule
    /// into a fresh registry.
    pub fn run(
        &self,
        materials: &MaterialCatalog,
        prefixes: &PrefixCatalog,
    ) -> Result<RulePass, RuleEngineFault> {
        let items = UnificationTable::generate(materials, prefixes);
        self.run_with(materials, prefixes, items)
    }

    /// Run against a resolver the host built or edited itself.
    pub fn run_with(
        &self,
        materials: &MaterialCatalog,
        prefixes: &PrefixCatalog,
        items: UnificationTable,
    ) -> Result<RulePass, RuleEngineFault> {
        let mut registry = RecipeMapRegistry::new();
        let skipped = self.run_into(materials, prefixes, &items, &mut registry)?;
        info!(
            prefixes = prefixes.len(),
            materials = materials.len(),
            recipes = registry.len(),
            resubmits = registry.resubmits(),
            skipped = skipped.len(),
            "rule pass complete"
        );
        Ok(RulePass {
            registry,
            items,
            skipped,
        })
    }

    /// Drive any sink. Returns the skipped invocations.
    pub fn run_into(
        &self,
        materials: &MaterialCatalog,
        prefixes: &PrefixCatalog,
        items: &UnificationTable,
        sink: &mut dyn RecipeSink,
    ) -> Result<Vec<SkippedRule>, RuleEngineFault> {
        let mut ctx = RuleContext::new(materials, prefixes, items, &self.config, sink);
        let mut skipped = Vec::new();

        for def in prefixes.iter() {
            let prefix = def.prefix;
            let rules = self.rules.rules_for(prefix);
            if rules.is_empty() {
                continue;
            }
            debug!(%prefix, rules = rules.len(), "processing prefix");

            for material in materials.iter() {
                if !items.contains(prefix, material.id) {
                    continue;
                }
                for rule in rules {
                    match (rule.apply)(&mut ctx, prefix, material) {
                        Ok(()) => {}
                        Err(RecipeError::InvalidRecipe { map, reason }) => {
                            warn!(
                                rule = rule.name,
                                %prefix,
                                material = %material.name,
                                %map,
                                %reason,
                                "invalid recipe skipped"
                            );
                            skipped.push(SkippedRule {
                                rule: rule.name,
                                prefix,
                                material: material.name.clone(),
                                map,
                                reason,
                            });
                        }
                        Err(source) => {
                            let fault = RuleEngineFault {
                                rule: rule.name,
                                prefix,
                                material: material.name.clone(),
                                source,
                            };
                            error!(%fault, "rule pass aborted");
                            return Err(fault);
                        }
                    }
                }
            }
        }
        Ok(skipped)
    }
}

/// Run the standard rule set with default configuration.
pub fn run_all_rules(
    materials: &MaterialCatalog,
    prefixes: &PrefixCatalog,
) -> Result<RulePass, RuleEngineFault> {
    RuleRunner::standard().run(materials, prefixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::MaterialId;
    use crate::material::{Kind, Material};
    use crate::recipe::RecipeDescriptor;
    use crate::registry::RegistryError;
    use crate::rules::Rule;
    use crate::test_utils::{standard_catalogs, standard_materials};

    fn broken(ctx: &mut RuleContext<'_>, prefix: OrePrefix, m: &Material) -> Result<(), RecipeError> {
        // Mandatory output that never resolves.
        let missing = ctx.get(OrePrefix::Plank, m.id);
        ctx.recipe(RecipeMap::Macerator)
            .input(prefix, m.id, 1)
            .output(missing)
            .submit()
    }

    fn dangling(_: &mut RuleContext<'_>, _: OrePrefix, _: &Material) -> Result<(), RecipeError> {
        Err(RecipeError::UnknownMaterial(MaterialId(9999)))
    }

    fn metal_only(_: &mut RuleContext<'_>, _: OrePrefix, m: &Material) -> Result<(), RecipeError> {
        m.metal()?;
        Ok(())
    }

    #[test]
    fn standard_pass_builds_a_graph() {
        let f = standard_catalogs();
        let pass = run_all_rules(&f.materials, &f.prefixes).unwrap();
        assert!(!pass.registry.is_empty());
        assert!(pass.skipped.is_empty(), "{:?}", pass.skipped);
    }

    #[test]
    fn invalid_recipe_is_skipped_and_pass_continues() {
        let f = standard_catalogs();
        let mut rules = RuleSet::new();
        rules.register(
            OrePrefix::Ingot,
            &[Rule::new("broken", broken), Rule::new("ingot", crate::rules::shaping::ingot)],
        );
        let pass = RuleRunner::new(rules, EngineConfig::default())
            .run(&f.materials, &f.prefixes)
            .unwrap();

        let metals = f
            .materials
            .iter()
            .filter(|m| f.items.contains(OrePrefix::Ingot, m.id))
            .count();
        assert_eq!(pass.skipped.len(), metals);
        assert!(pass.skipped.iter().all(|s| s.rule == "broken"));
        assert!(pass.registry.count(RecipeMap::FluidSolidifier) > 0);
    }

    #[test]
    fn fatal_error_names_the_culprit() {
        let f = standard_catalogs();
        let mut rules = RuleSet::new();
        rules.register(OrePrefix::Lens, &[Rule::new("dangling", dangling)]);
        let fault = RuleRunner::new(rules, EngineConfig::default())
            .run(&f.materials, &f.prefixes)
            .unwrap_err();
        assert_eq!(fault.rule, "dangling");
        assert_eq!(fault.prefix, OrePrefix::Lens);
        // Ruby comes before diamond in the catalog.
        assert_eq!(fault.material, "ruby");
    }

    #[test]
    fn wrong_kind_accessor_is_fatal() {
        let f = standard_catalogs();
        let mut rules = RuleSet::new();
        rules.register(OrePrefix::Gem, &[Rule::new("metal_only", metal_only)]);
        let fault = RuleRunner::new(rules, EngineConfig::default())
            .run(&f.materials, &f.prefixes)
            .unwrap_err();

        assert_eq!(fault.rule, "metal_only");
        assert_eq!(fault.prefix, OrePrefix::Gem);
        let RecipeError::TypeMismatch(mismatch) = &fault.source else {
            panic!("expected a type mismatch, got {:?}", fault.source);
        };
        assert_eq!(mismatch.material, fault.material);
        assert_eq!(mismatch.expected, Kind::Metal);
        assert_eq!(mismatch.actual, Kind::Gem);
    }

    #[test]
    fn unknown_pairs_are_never_visited() {
        let materials = standard_materials();
        let prefixes = PrefixCatalog::standard();
        let mut items = UnificationTable::generate(&materials, &prefixes);
        for m in materials.iter().filter(|m| m.name != "iron") {
            items.unregister(OrePrefix::Ingot, m.id);
        }

        let mut rules = RuleSet::new();
        rules.register(OrePrefix::Ingot, &[Rule::new("dangling", dangling)]);
        let fault = RuleRunner::new(rules, EngineConfig::default())
            .run_with(&materials, &prefixes, items)
            .unwrap_err();
        assert_eq!(fault.material, "iron");
    }

    struct Refusing;

    impl RecipeSink for Refusing {
        fn commit(&mut self, recipe: RecipeDescriptor) -> Result<(), RegistryError> {
            Err(RegistryError::Collision {
                map: recipe.map,
                key: "refused".to_string(),
            })
        }
    }

    #[test]
    fn sink_errors_are_fatal() {
        let f = standard_catalogs();
        let fault = RuleRunner::standard()
            .run_into(&f.materials, &f.prefixes, &f.items, &mut Refusing)
            .unwrap_err();
        assert!(matches!(fault.source, RecipeError::Registry(RegistryError::Collision { .. })));
    }

    #[test]
    fn passes_are_deterministic() {
        let f = standard_catalogs();
        let a = run_all_rules(&f.materials, &f.prefixes).unwrap();
        let b = run_all_rules(&f.materials, &f.prefixes).unwrap();
        let a: Vec<_> = a.registry.recipes().cloned().collect();
        let b: Vec<_> = b.registry.recipes().cloned().collect();
        assert_eq!(a, b);
    }
}
