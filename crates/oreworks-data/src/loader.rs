//! Resolution pipeline: reads data files, resolves material names, builds
//! the catalogs.
//!
//! A data directory holds up to three files, each in RON, TOML or JSON:
//!
//! - `materials` (required): the material catalog, in file order.
//! - `prefixes` (optional): the prefix catalog, in file order. Absent means
//!   every standard prefix.
//! - `config` (optional): [`EngineConfig`] overrides.

use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use oreworks_core::catalog::{CatalogError, MaterialCatalog, PrefixCatalog, PrefixDef};
use oreworks_core::config::EngineConfig;
use oreworks_core::id::MaterialId;
use oreworks_core::material::{
    DustProps, GemProps, Kind, MaterialKind, MaterialStack, MetalProps, SolidProps,
};
use oreworks_core::runner::RuleRunner;

use crate::schema::{ComponentData, MaterialData, PrefixData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// An attribute block that the material's kind does not carry.
    #[error("material '{material}' of kind {kind} cannot have a '{block}' block in {file}")]
    KindMismatch {
        file: PathBuf,
        material: String,
        kind: Kind,
        block: &'static str,
    },

    /// A prefix whose material amount is zero.
    #[error("prefix '{prefix}' has a zero material amount in {file}")]
    ZeroAmount { file: PathBuf, prefix: String },

    /// The resolved data was rejected by the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for `{base_name}.ron`, `.toml` or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. For TOML files, extracts the array at `toml_key`
/// from the top-level table; RON and JSON hold the list directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .remove(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Return a `DuplicateName` error if `name` is already in the map.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Catalog loading
// ===========================================================================

/// Everything a rule pass needs, loaded from one directory.
#[derive(Debug, Clone)]
pub struct CatalogData {
    pub materials: MaterialCatalog,
    pub prefixes: PrefixCatalog,
    pub config: EngineConfig,
}

impl CatalogData {
    /// A standard-rule runner using the loaded configuration.
    pub fn runner(&self) -> RuleRunner {
        RuleRunner::with_config(self.config.clone())
    }
}

/// Load `materials`, `prefixes` and `config` from a data directory.
pub fn load_catalogs(dir: &Path) -> Result<CatalogData, DataLoadError> {
    let materials_path = require_data_file(dir, "materials")?;
    let records: Vec<MaterialData> = deserialize_list(&materials_path, "materials")?;
    let materials = build_materials(&records, &materials_path)?;

    let prefixes = match find_data_file(dir, "prefixes")? {
        Some(path) => {
            let records: Vec<PrefixData> = deserialize_list(&path, "prefixes")?;
            build_prefixes(&records, &materials, &path)?
        }
        None => PrefixCatalog::standard(),
    };

    let config = match find_data_file(dir, "config")? {
        Some(path) => deserialize_file(&path)?,
        None => EngineConfig::default(),
    };

    info!(
        dir = %dir.display(),
        materials = materials.len(),
        prefixes = prefixes.len(),
        "catalogs loaded"
    );
    Ok(CatalogData {
        materials,
        prefixes,
        config,
    })
}

/// Two passes: register every name, then resolve references and fill in
/// each material's attributes.
pub fn build_materials(records: &[MaterialData], file: &Path) -> Result<MaterialCatalog, DataLoadError> {
    let mut builder = MaterialCatalog::builder();
    let mut ids: HashMap<String, MaterialId> = HashMap::with_capacity(records.len());

    for record in records {
        check_duplicate(&ids, &record.name, file)?;
        let id = builder.register(&record.name, record.mass, MaterialKind::Marker);
        ids.insert(record.name.clone(), id);
    }

    for record in records {
        let kind = resolve_kind(record, &ids, file)?;
        let components = record
            .components
            .iter()
            .map(|c| resolve_stack(c, &ids, file))
            .collect::<Result<Vec<_>, _>>()?;
        let flags: BTreeSet<_> = record.flags.iter().copied().collect();
        builder.mutate(&record.name, move |m| {
            m.kind = kind;
            m.flags = flags;
            m.components = components;
        })?;
        debug!(material = %record.name, kind = %record.kind, "material resolved");
    }

    Ok(builder.build()?)
}

fn resolve_stack(
    data: &ComponentData,
    ids: &HashMap<String, MaterialId>,
    file: &Path,
) -> Result<MaterialStack, DataLoadError> {
    Ok(MaterialStack {
        material: *resolve_name(ids, data.material(), file, "material")?,
        amount: data.amount(),
    })
}

fn resolve_opt(
    name: Option<&str>,
    ids: &HashMap<String, MaterialId>,
    file: &Path,
) -> Result<Option<MaterialId>, DataLoadError> {
    name.map(|n| resolve_name(ids, n, file, "material").copied())
        .transpose()
}

/// Assemble the kind payload, rejecting blocks the kind does not carry.
fn resolve_kind(
    record: &MaterialData,
    ids: &HashMap<String, MaterialId>,
    file: &Path,
) -> Result<MaterialKind, DataLoadError> {
    let allowed: &[&str] = match record.kind {
        Kind::Marker | Kind::Fluid => &[],
        Kind::Dust => &["dust"],
        Kind::Solid => &["dust", "solid"],
        Kind::Gem => &["dust", "solid", "gem"],
        Kind::Metal => &["dust", "solid", "metal"],
    };
    let present = [
        ("dust", record.dust.is_some()),
        ("solid", record.solid.is_some()),
        ("gem", record.gem.is_some()),
        ("metal", record.metal.is_some()),
    ];
    if let Some(&(block, _)) = present
        .iter()
        .find(|(block, set)| *set && !allowed.contains(block))
    {
        return Err(DataLoadError::KindMismatch {
            file: file.to_path_buf(),
            material: record.name.clone(),
            kind: record.kind,
            block,
        });
    }

    let dust = match &record.dust {
        Some(d) => DustProps {
            ore_byproducts: d
                .ore_byproducts
                .iter()
                .map(|n| resolve_name(ids, n, file, "material").copied())
                .collect::<Result<_, _>>()?,
            byproduct_multiplier: d.byproduct_multiplier,
            ore_multiplier: d.ore_multiplier,
            smelting_multiplier: d.smelting_multiplier,
            direct_smelting: resolve_opt(d.direct_smelting.as_deref(), ids, file)?,
            washed_in: resolve_opt(d.washed_in.as_deref(), ids, file)?,
            separated_onto: resolve_opt(d.separated_onto.as_deref(), ids, file)?,
        },
        None => DustProps::default(),
    };
    let solid = match &record.solid {
        Some(s) => SolidProps {
            handle_material: resolve_opt(s.handle_material.as_deref(), ids, file)?,
            macerate_into: resolve_opt(s.macerate_into.as_deref(), ids, file)?,
            tool_durability: s.tool_durability,
        },
        None => SolidProps::default(),
    };

    Ok(match record.kind {
        Kind::Marker => MaterialKind::Marker,
        Kind::Fluid => MaterialKind::Fluid,
        Kind::Dust => MaterialKind::Dust(dust),
        Kind::Solid => MaterialKind::Solid(dust, solid),
        Kind::Gem => {
            let gem = match record.gem.as_ref().and_then(|g| g.purity_tiers.clone()) {
                Some(purity_tiers) => GemProps { purity_tiers },
                None => GemProps::default(),
            };
            MaterialKind::Gem(dust, solid, gem)
        }
        Kind::Metal => {
            let metal = match &record.metal {
                Some(m) => MetalProps {
                    blast_furnace_temperature: m.blast_furnace_temperature,
                    smelt_into: resolve_opt(m.smelt_into.as_deref(), ids, file)?,
                    magnetic_material: resolve_opt(m.magnetic_material.as_deref(), ids, file)?,
                    cable_voltage: m.cable_voltage,
                },
                None => MetalProps::default(),
            };
            MaterialKind::Metal(dust, solid, metal)
        }
    })
}

/// Prefix definitions in file order, with standard values filled in.
pub fn build_prefixes(
    records: &[PrefixData],
    materials: &MaterialCatalog,
    file: &Path,
) -> Result<PrefixCatalog, DataLoadError> {
    let ids: HashMap<String, MaterialId> = materials.iter().map(|m| (m.name.clone(), m.id)).collect();
    let mut defs = Vec::with_capacity(records.len());

    for record in records {
        let mut def = PrefixDef::standard(record.name);
        if let Some(amount) = record.material_amount {
            if amount == 0 {
                return Err(DataLoadError::ZeroAmount {
                    file: file.to_path_buf(),
                    prefix: record.name.to_string(),
                });
            }
            def.material_amount = amount;
        }
        if let Some(secondary) = &record.secondary {
            def.secondary = Some(resolve_stack(secondary, &ids, file)?);
        }
        if let Some(generate) = &record.generate {
            def.generate = generate.clone();
        }
        defs.push(def);
    }

    Ok(PrefixCatalog::new(defs)?)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use oreworks_core::id::M;
    use oreworks_core::prefix::OrePrefix;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "oreworks_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const MATERIALS_JSON: &str = r#"[
        {"name": "stone", "mass": 20, "kind": "dust"},
        {"name": "gold", "mass": 196, "kind": "metal"},
        {"name": "copper", "mass": 63, "kind": "metal",
         "flags": ["GENERATE_PLATE", "GENERATE_ORE"],
         "dust": {"ore_byproducts": ["gold"]},
         "metal": {"cable_voltage": 32}}
    ]"#;

    // -----------------------------------------------------------------------
    // Format detection and discovery
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("materials.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("materials.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("materials.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("materials.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("materials")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("materials.ron"), "[]").unwrap();
        fs::write(dir.join("materials.json"), "[]").unwrap();

        let result = find_data_file(&dir, "materials");
        assert!(matches!(result, Err(DataLoadError::ConflictingFormats { .. })));

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_missing() {
        let dir = make_test_dir("find_missing");
        assert_eq!(find_data_file(&dir, "prefixes").unwrap(), None);
        assert!(matches!(
            require_data_file(&dir, "materials"),
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == "materials"
        ));
        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_missing_key() {
        let dir = make_test_dir("list_toml_missing");
        let path = dir.join("materials.toml");
        fs::write(&path, r#"foo = "bar""#).unwrap();

        let result: Result<Vec<MaterialData>, _> = deserialize_list(&path, "materials");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Catalog loading
    // -----------------------------------------------------------------------

    #[test]
    fn load_minimal_directory() {
        let dir = make_test_dir("load_minimal");
        fs::write(dir.join("materials.json"), MATERIALS_JSON).unwrap();

        let data = load_catalogs(&dir).unwrap();
        assert_eq!(data.materials.len(), 3);
        assert_eq!(data.prefixes.len(), OrePrefix::ALL.len());
        assert_eq!(data.config, EngineConfig::default());

        let copper = data.materials.by_name("copper").unwrap();
        assert_eq!(copper.kind(), Kind::Metal);
        let gold = data.materials.id("gold").unwrap();
        assert_eq!(copper.as_dust().unwrap().ore_byproducts, vec![gold]);
        assert_eq!(copper.as_metal().unwrap().cable_voltage, Some(32));

        cleanup(&dir);
    }

    #[test]
    fn load_prefixes_and_config() {
        let dir = make_test_dir("load_full");
        fs::write(dir.join("materials.json"), MATERIALS_JSON).unwrap();
        fs::write(
            dir.join("prefixes.ron"),
            r#"[
                (name: ingot),
                (name: block, material_amount: Some(32659200), secondary: Some(("stone", 3628800))),
            ]"#,
        )
        .unwrap();
        fs::write(
            dir.join("config.toml"),
            r#"
                furnace_temperature_limit = 1000
                crushing_blacklist = []

                [reserved]
                stone = "stone"
            "#,
        )
        .unwrap();

        let data = load_catalogs(&dir).unwrap();
        assert_eq!(data.prefixes.len(), 2);
        let block = data.prefixes.get(OrePrefix::Block).unwrap();
        assert_eq!(block.material_amount, 9 * M);
        assert_eq!(
            block.secondary.unwrap().material,
            data.materials.id("stone").unwrap()
        );
        assert_eq!(data.config.furnace_temperature_limit, 1000);
        assert!(data.config.crushing_blacklist.is_empty());
        assert_eq!(data.config.reserved.water, "water");
        assert_eq!(data.runner().config().furnace_temperature_limit, 1000);

        cleanup(&dir);
    }

    #[test]
    fn unresolved_byproduct_is_an_error() {
        let records: Vec<MaterialData> = serde_json::from_str(
            r#"[{"name": "copper", "mass": 63, "kind": "metal", "dust": {"ore_byproducts": ["gold"]}}]"#,
        )
        .unwrap();
        let result = build_materials(&records, Path::new("materials.json"));
        assert!(matches!(
            result,
            Err(DataLoadError::UnresolvedRef { ref name, expected_kind: "material", .. }) if name == "gold"
        ));
    }

    #[test]
    fn duplicate_material_is_an_error() {
        let records: Vec<MaterialData> = serde_json::from_str(
            r#"[{"name": "tin", "mass": 118, "kind": "metal"}, {"name": "tin", "mass": 1, "kind": "dust"}]"#,
        )
        .unwrap();
        let result = build_materials(&records, Path::new("materials.json"));
        assert!(matches!(
            result,
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "tin"
        ));
    }

    #[test]
    fn block_outside_kind_is_rejected() {
        let records: Vec<MaterialData> = serde_json::from_str(
            r#"[{"name": "water", "mass": 18, "kind": "fluid", "metal": {"cable_voltage": 8}}]"#,
        )
        .unwrap();
        let result = build_materials(&records, Path::new("materials.json"));
        assert!(matches!(
            result,
            Err(DataLoadError::KindMismatch { block: "metal", kind: Kind::Fluid, .. })
        ));
    }

    #[test]
    fn zero_prefix_amount_is_rejected() {
        let materials = build_materials(&[], Path::new("materials.json")).unwrap();
        let records: Vec<PrefixData> =
            serde_json::from_str(r#"[{"name": "nugget", "material_amount": 0}]"#).unwrap();
        let result = build_prefixes(&records, &materials, Path::new("prefixes.json"));
        assert!(matches!(result, Err(DataLoadError::ZeroAmount { .. })));
    }

    #[test]
    fn duplicate_prefix_is_rejected() {
        let materials = build_materials(&[], Path::new("materials.json")).unwrap();
        let records: Vec<PrefixData> =
            serde_json::from_str(r#"[{"name": "plate"}, {"name": "plate"}]"#).unwrap();
        let result = build_prefixes(&records, &materials, Path::new("prefixes.json"));
        assert!(matches!(
            result,
            Err(DataLoadError::Catalog(CatalogError::DuplicatePrefix(OrePrefix::Plate)))
        ));
    }

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "materials".to_string(),
            dir: PathBuf::from("/data"),
        };
        assert!(format!("{e}").contains("materials"));
        assert!(format!("{e}").contains("/data"));

        let e = DataLoadError::KindMismatch {
            file: PathBuf::from("materials.ron"),
            material: "water".to_string(),
            kind: Kind::Fluid,
            block: "metal",
        };
        let msg = format!("{e}");
        assert!(msg.contains("water"));
        assert!(msg.contains("fluid"));
        assert!(msg.contains("metal"));
    }
}
