// ABOUTME: Backend-info KVM generation and merging
// ABOUTME: Pure functions that build, merge and edit per-environment backend-info KVMs

use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

use super::error::{KvmError, Result};
use super::model::{BackendInfoEntry, Kvm, KvmEntry};

pub const BACKEND_INFO_KVM: &str = "backend-info";
pub const BACKEND_INFO_SUFFIX: &str = ".backend-info";

/// `{proxy}.backend-info`, or `backend-info` when no proxy name is given.
pub fn backend_info_kvm_name(proxy_name: Option<&str>) -> String {
    match proxy_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(proxy) => format!("{}{}", proxy, BACKEND_INFO_SUFFIX),
        None => BACKEND_INFO_KVM.to_string(),
    }
}

/// Build the encrypted backend-info KVM for one environment.
///
/// Entries keep input order. A repeated variable name keeps its first value.
pub fn create_backend_info_kvm(
    proxy_name: Option<&str>,
    entries: &[BackendInfoEntry],
    environment: &str,
) -> Kvm {
    let mut kvm = Kvm::new(backend_info_kvm_name(proxy_name));
    kvm.encrypted = true;

    let mut seen = HashSet::new();
    for entry in entries {
        if seen.insert(entry.variable_name.as_str()) {
            kvm.entries.push(KvmEntry::new(
                entry.variable_name.clone(),
                entry.value_for(environment),
            ));
        }
    }

    kvm
}

/// Merge backend-info entries into an environment's KVM list.
///
/// The target KVM is the one named by convention, else the first whose name
/// ends in `.backend-info`. Existing entries win on a name clash and keep
/// their position; new ones are appended in input order. With no target a new
/// KVM is put at the front. An empty `entries` returns `existing` untouched.
pub fn merge_kvm_entries(
    existing: Vec<Kvm>,
    entries: &[BackendInfoEntry],
    environment: &str,
    proxy_name: Option<&str>,
) -> Vec<Kvm> {
    if entries.is_empty() {
        return existing;
    }

    let kvm_name = backend_info_kvm_name(proxy_name);
    let target = existing
        .iter()
        .position(|kvm| kvm.name == kvm_name)
        .or_else(|| {
            existing
                .iter()
                .position(|kvm| kvm.name.ends_with(BACKEND_INFO_SUFFIX))
        });

    let mut merged = existing;
    match target {
        Some(index) => {
            let kvm = &mut merged[index];
            if kvm.name != kvm_name {
                debug!(
                    "Merging backend info into '{}' (expected '{}')",
                    kvm.name, kvm_name
                );
            }
            kvm.encrypted = true;

            let mut added = 0;
            for entry in entries {
                if !kvm.contains(&entry.variable_name) {
                    kvm.entries.push(KvmEntry::new(
                        entry.variable_name.clone(),
                        entry.value_for(environment),
                    ));
                    added += 1;
                }
            }
            debug!(
                "Added {} of {} backend-info entries to '{}' for {}",
                added,
                entries.len(),
                kvm.name,
                environment
            );
        }
        None => {
            debug!("Creating KVM '{}' for {}", kvm_name, environment);
            merged.insert(0, create_backend_info_kvm(proxy_name, entries, environment));
        }
    }

    merged
}

/// Merge `entries` into the KVM list of each of `environments`.
///
/// Environments missing from `existing` start from an empty list.
pub fn merge_for_environments(
    mut existing: IndexMap<String, Vec<Kvm>>,
    entries: &[BackendInfoEntry],
    environments: &[String],
    proxy_name: Option<&str>,
) -> IndexMap<String, Vec<Kvm>> {
    for environment in environments {
        let slot = existing.entry(environment.clone()).or_default();
        let kvms = std::mem::take(slot);
        *slot = merge_kvm_entries(kvms, entries, environment, proxy_name);
    }
    existing
}

/// Next free index: one past the highest index in `entries`, or 1.
pub fn next_kvm_index(entries: &[BackendInfoEntry]) -> Result<u32> {
    next_index_after(entries.iter().map(|entry| entry.kvm_index).max().unwrap_or(0))
}

pub(crate) fn next_index_after(highest: u32) -> Result<u32> {
    highest
        .checked_add(1)
        .ok_or(KvmError::IndexExhausted { highest })
}

/// Set the value of one entry for `environment` and mark it as edited.
pub fn update_backend_info_value(
    entries: &[BackendInfoEntry],
    kvm_index: u32,
    environment: &str,
    value: &str,
) -> Vec<BackendInfoEntry> {
    entries
        .iter()
        .map(|entry| {
            if entry.kvm_index != kvm_index {
                return entry.clone();
            }
            let mut updated = entry.clone();
            updated
                .values
                .insert(environment.to_string(), value.to_string());
            updated.is_auto_detected = false;
            updated
        })
        .collect()
}

/// Whether any entry still lacks a value for `environment`
pub fn has_empty_values(entries: &[BackendInfoEntry], environment: &str) -> bool {
    entries
        .iter()
        .any(|entry| entry.value_for(environment).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u32, name: &str, dev: &str) -> BackendInfoEntry {
        BackendInfoEntry::new(index, name).with_value("dev", dev)
    }

    #[test]
    fn test_kvm_name_convention() {
        assert_eq!(backend_info_kvm_name(Some("orders")), "orders.backend-info");
        assert_eq!(backend_info_kvm_name(None), "backend-info");
        assert_eq!(backend_info_kvm_name(Some("  ")), "backend-info");
    }

    #[test]
    fn test_create_dedupes_variable_names() {
        let kvm = create_backend_info_kvm(
            None,
            &[entry(1, "host_0", "a"), entry(2, "host_0", "b")],
            "dev",
        );
        assert_eq!(kvm.entries, vec![KvmEntry::new("host_0", "a")]);
    }

    #[test]
    fn test_merge_prefers_exact_name_over_suffix() {
        let existing = vec![
            Kvm::new("old.backend-info"),
            Kvm::new("orders.backend-info"),
        ];

        let merged = merge_kvm_entries(existing, &[entry(1, "host_0", "a")], "dev", Some("orders"));
        assert!(merged[0].entries.is_empty());
        assert_eq!(merged[1].entries, vec![KvmEntry::new("host_0", "a")]);
    }

    #[test]
    fn test_merge_ignores_names_without_dot_suffix() {
        let existing = vec![Kvm::new("legacy.old-backend-info")];
        let merged = merge_kvm_entries(existing, &[entry(1, "host_0", "a")], "dev", Some("orders"));

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "orders.backend-info");
        assert!(merged[1].entries.is_empty());
    }

    #[test]
    fn test_merge_marks_target_encrypted() {
        let existing = vec![Kvm::new("orders.backend-info")];
        let merged = merge_kvm_entries(existing, &[entry(1, "host_0", "a")], "dev", Some("orders"));
        assert!(merged[0].encrypted);
    }

    #[test]
    fn test_update_unknown_index_is_noop() {
        let entries = vec![entry(1, "host_0", "a")];
        assert_eq!(update_backend_info_value(&entries, 9, "dev", "x"), entries);
    }

    #[test]
    fn test_next_index_overflow_is_reported() {
        let entries = vec![entry(u32::MAX, "host_0", "a")];
        assert_eq!(
            next_kvm_index(&entries),
            Err(KvmError::IndexExhausted { highest: u32::MAX })
        );
        assert_eq!(next_kvm_index(&[entry(u32::MAX - 1, "host_0", "a")]), Ok(u32::MAX));
    }

    #[test]
    fn test_missing_value_counts_as_empty() {
        let entries = vec![entry(1, "host_0", "a")];
        assert!(!has_empty_values(&entries, "dev"));
        assert!(has_empty_values(&entries, "prod"));
        assert!(!has_empty_values(&[], "prod"));
    }
}
