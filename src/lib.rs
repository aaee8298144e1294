// ABOUTME: Main library module for apiforge
// ABOUTME: Exports the template catalog, registry, KVM generator, persistence and CLI

pub mod catalog;
pub mod cli;
pub mod kvm;
pub mod persistence;
pub mod registry;

// Re-export commonly used types
pub use catalog::{Catalog, CategoryDescriptor, TemplateDescriptor};
pub use cli::{App, Args, Config};
pub use kvm::{BackendInfoEntry, BackendInfoSet, Kvm, KvmEntry, KvmError};
pub use persistence::{JsonFileStore, MemoryStore, OverrideStore};
pub use registry::{
    ExportedTemplate, ImportResult, OverrideMap, RegistryError, ResolvedTemplate,
    TemplateRegistry, TemplateTreeNode,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
