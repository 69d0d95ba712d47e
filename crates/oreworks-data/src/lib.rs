//! Data-file loading for the Oreworks rule engine.
//!
//! Reads the material catalog, the prefix catalog and the engine
//! configuration from RON, TOML or JSON files, resolving material names to
//! ids along the way.

pub mod loader;
pub mod schema;

pub use loader::{CatalogData, DataLoadError, load_catalogs};
