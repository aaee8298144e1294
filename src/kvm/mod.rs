// ABOUTME: Backend-info KVM module
// ABOUTME: Exports KVM data structures, the entry collection and the generator functions

pub mod backend_info;
pub mod error;
pub mod generator;
pub mod model;

pub use backend_info::BackendInfoSet;
pub use error::KvmError;
pub use generator::{
    backend_info_kvm_name, create_backend_info_kvm, has_empty_values, merge_for_environments,
    merge_kvm_entries, next_kvm_index, update_backend_info_value, BACKEND_INFO_KVM,
    BACKEND_INFO_SUFFIX,
};
pub use model::{BackendInfoEntry, Kvm, KvmEntry};
