//! The tool catalog.
//!
//! Tool definitions are loaded once, from the catalog embedded in the binary
//! or from a user-supplied YAML file, and never mutated afterwards.
//!
//! - [`definition`] - Definition types mirroring the catalog format
//! - [`package_manager`] - npm/pip install and query invocations
//! - [`loader`] - [`ToolCatalog`] loading, lookup and validation
//! - [`display`] - Pulling display fields out of a run's JSON output

pub mod definition;
pub mod display;
pub mod loader;
pub mod package_manager;

pub use definition::{
    CommandLine, DetectionProbe, DisplayField, InstallDescriptor, Prerequisite, PrerequisiteKind,
    ToolCategory, ToolDefinition,
};
pub use display::{extract_display_values, DisplayValue};
pub use loader::{CatalogDocument, CatalogSource, ToolCatalog};
pub use package_manager::{split_packages, PackageManager};
