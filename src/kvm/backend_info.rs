// ABOUTME: Backend-info entry collection with a persistent index high-water mark
// ABOUTME: Allocates, edits and removes entries without ever handing out an index twice

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::Result;
use super::generator::next_index_after;
use super::model::BackendInfoEntry;

/// Backend-info entries plus the highest index ever allocated to them.
///
/// The high-water mark outlives removals, so an index freed by removing the
/// newest entry is still never allocated again. On disk this is
/// `{"highWater": n, "entries": [...]}`; a bare entry array is also accepted
/// and starts from its own highest index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "BackendInfoDocument")]
pub struct BackendInfoSet {
    high_water: u32,
    entries: Vec<BackendInfoEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BackendInfoDocument {
    Entries(Vec<BackendInfoEntry>),
    #[serde(rename_all = "camelCase")]
    Tracked {
        #[serde(default)]
        high_water: u32,
        entries: Vec<BackendInfoEntry>,
    },
}

impl From<BackendInfoDocument> for BackendInfoSet {
    fn from(document: BackendInfoDocument) -> Self {
        match document {
            BackendInfoDocument::Entries(entries) => Self::new(entries),
            BackendInfoDocument::Tracked {
                high_water,
                entries,
            } => Self::with_high_water(entries, high_water),
        }
    }
}

impl BackendInfoSet {
    pub fn new(entries: Vec<BackendInfoEntry>) -> Self {
        Self::with_high_water(entries, 0)
    }

    /// A recorded mark below the entries' own highest index is raised to it.
    pub fn with_high_water(entries: Vec<BackendInfoEntry>, high_water: u32) -> Self {
        let highest = entries.iter().map(|e| e.kvm_index).max().unwrap_or(0);
        Self {
            high_water: high_water.max(highest),
            entries,
        }
    }

    pub fn entries(&self) -> &[BackendInfoEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<BackendInfoEntry> {
        self.entries
    }

    /// Highest index ever allocated, 0 when none has been
    pub fn high_water(&self) -> u32 {
        self.high_water
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, kvm_index: u32) -> Option<&BackendInfoEntry> {
        self.entries.iter().find(|e| e.kvm_index == kvm_index)
    }

    /// Index the next `allocate` will hand out
    pub fn next_index(&self) -> Result<u32> {
        next_index_after(self.high_water)
    }

    /// Append a new entry under the next free index.
    pub fn allocate(&mut self, variable_name: impl Into<String>) -> Result<&BackendInfoEntry> {
        let kvm_index = self.next_index()?;
        self.high_water = kvm_index;
        self.entries.push(BackendInfoEntry::new(kvm_index, variable_name));

        let index = self.entries.len() - 1;
        debug!("Allocated backend-info index {}", kvm_index);
        Ok(&self.entries[index])
    }

    /// Drop the entry with `kvm_index`. Its index stays retired.
    pub fn remove(&mut self, kvm_index: u32) -> Option<BackendInfoEntry> {
        let position = self.entries.iter().position(|e| e.kvm_index == kvm_index)?;
        Some(self.entries.remove(position))
    }

    /// Set one entry's value for `environment`; false when no entry has `kvm_index`.
    pub fn set_value(&mut self, kvm_index: u32, environment: &str, value: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.kvm_index == kvm_index) {
            Some(entry) => {
                entry
                    .values
                    .insert(environment.to_string(), value.to_string());
                entry.is_auto_detected = false;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvm::error::KvmError;

    fn set_of(indexes: &[u32]) -> BackendInfoSet {
        BackendInfoSet::new(
            indexes
                .iter()
                .map(|i| BackendInfoEntry::new(*i, format!("host_{}", i)))
                .collect(),
        )
    }

    #[test]
    fn test_removed_newest_index_is_not_reused() {
        let mut set = set_of(&[1, 2, 3]);

        let removed = set.remove(3).unwrap();
        assert_eq!(removed.variable_name, "host_3");
        assert_eq!(set.next_index().unwrap(), 4);

        let allocated = set.allocate("path_0").unwrap();
        assert_eq!(allocated.kvm_index, 4);
        assert_eq!(set.high_water(), 4);
    }

    #[test]
    fn test_remove_everything_keeps_high_water() {
        let mut set = set_of(&[1, 2]);
        set.remove(2);
        set.remove(1);

        assert!(set.is_empty());
        assert_eq!(set.next_index().unwrap(), 3);
    }

    #[test]
    fn test_remove_unknown_index() {
        let mut set = set_of(&[1]);
        assert!(set.remove(9).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_allocate_from_empty_starts_at_one() {
        let mut set = BackendInfoSet::default();
        assert_eq!(set.allocate("host_0").unwrap().kvm_index, 1);
        assert_eq!(set.allocate("path_0").unwrap().kvm_index, 2);
    }

    #[test]
    fn test_allocate_after_exhaustion_fails_without_changes() {
        let mut set = set_of(&[u32::MAX]);
        let result = set.allocate("host_x").map(|e| e.kvm_index);

        assert_eq!(result, Err(KvmError::IndexExhausted { highest: u32::MAX }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_high_water_survives_serialization() {
        let mut set = set_of(&[1, 2]);
        set.remove(2);

        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"highWater\":2"));

        let loaded: BackendInfoSet = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.next_index().unwrap(), 3);
        assert_eq!(loaded, set);
    }

    #[test]
    fn test_bare_entry_array_is_accepted() {
        let loaded: BackendInfoSet =
            serde_json::from_str(r#"[{"kvmIndex": 4, "variableName": "host_0"}]"#).unwrap();
        assert_eq!(loaded.high_water(), 4);
        assert_eq!(loaded.entries()[0].variable_name, "host_0");
    }

    #[test]
    fn test_stale_high_water_is_raised() {
        let loaded: BackendInfoSet = serde_json::from_str(
            r#"{"highWater": 1, "entries": [{"kvmIndex": 5, "variableName": "host_0"}]}"#,
        )
        .unwrap();
        assert_eq!(loaded.next_index().unwrap(), 6);
    }

    #[test]
    fn test_set_value_marks_edited() {
        let mut set = set_of(&[1, 2]);
        assert!(set.set_value(2, "prod", "/v2"));
        assert!(!set.set_value(7, "prod", "/v2"));

        let entry = set.get(2).unwrap();
        assert_eq!(entry.value_for("prod"), "/v2");
        assert!(!entry.is_auto_detected);
        assert!(set.get(1).unwrap().is_auto_detected);
    }
}
