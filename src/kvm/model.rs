// ABOUTME: Data structures for key-value maps and backend-info entries
// ABOUTME: Mirrors the wire shapes exchanged with the variabilization and proxy generation steps

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvmEntry {
    pub name: String,
    pub value: String,
}

impl KvmEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named key-value map deployed to one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kvm {
    pub name: String,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub entries: Vec<KvmEntry>,
}

impl Kvm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encrypted: false,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, name: &str) -> Option<&KvmEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }
}

fn default_auto_detected() -> bool {
    true
}

fn positive_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match u32::deserialize(deserializer)? {
        0 => Err(serde::de::Error::custom("kvmIndex must be a positive integer")),
        index => Ok(index),
    }
}

/// One variabilized backend parameter with its value per environment.
///
/// `kvm_index` is allocated once and never renumbered; `variable_name` is the
/// key the entry is stored under in every environment's KVM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfoEntry {
    #[serde(deserialize_with = "positive_index")]
    pub kvm_index: u32,
    pub variable_name: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default = "default_auto_detected")]
    pub is_auto_detected: bool,
}

impl BackendInfoEntry {
    pub fn new(kvm_index: u32, variable_name: impl Into<String>) -> Self {
        Self {
            kvm_index,
            variable_name: variable_name.into(),
            values: BTreeMap::new(),
            is_auto_detected: true,
        }
    }

    pub fn with_value(mut self, environment: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(environment.into(), value.into());
        self
    }

    /// Value for `environment`; a missing value reads as empty
    pub fn value_for(&self, environment: &str) -> &str {
        self.values.get(environment).map(String::as_str).unwrap_or("")
    }
}
