// ABOUTME: Template registry module: resolved templates over catalog plus overrides
// ABOUTME: Exports the registry, its resolved views and the zip bundle codec

pub mod bundle;
pub mod error;
pub mod resolved;
pub mod template_registry;

pub use bundle::{BundleEntry, EntryData, MAX_ENTRY_BYTES};
pub use error::{BundleError, RegistryError, Result};
pub use resolved::{
    ExportedTemplate, ImportResult, InitializeOutcome, OverrideMap, ResolvedTemplate,
    TemplateTreeNode,
};
pub use template_registry::TemplateRegistry;
