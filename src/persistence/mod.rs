// ABOUTME: Persistence module for overrides and KVM artifacts
// ABOUTME: Exports the override store trait, its implementations and JSON file helpers

pub mod error;
pub mod json;
pub mod store;

pub use error::{PersistenceError, Result};
pub use json::{load_backend_info, load_kvms, save_backend_info, save_kvms, EnvironmentKvms};
pub use store::{JsonFileStore, MemoryStore, OverrideStore};
