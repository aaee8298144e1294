// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides catalogs, bundle builders, backend-info fixtures and temp environments

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use apiforge::{BackendInfoEntry, Catalog, CategoryDescriptor, TemplateDescriptor};

/// Small two-category catalog with predictable content
pub fn sample_catalog() -> Catalog {
    Catalog::new(
        vec![
            CategoryDescriptor::new("policies", "Policies"),
            CategoryDescriptor::new("scripts", "Scripts"),
        ],
        vec![
            TemplateDescriptor::new("policies", "verify-api-key.xml", "Verify key", "<VerifyAPIKey/>"),
            TemplateDescriptor::new("policies", "quota.xml", "Quota", "<Quota/>"),
            TemplateDescriptor::new("scripts", "set-target-url.js", "Target URL", "var url;"),
        ],
    )
    .expect("sample catalog is valid")
}

/// Builds zip archives entry by entry, including ones the registry must reject
pub struct BundleBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.entries.push((path.to_string(), content.as_bytes().to_vec()));
        self
    }

    pub fn with_bytes(mut self, path: &str, content: &[u8]) -> Self {
        self.entries.push((path.to_string(), content.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, content) in &self.entries {
            writer
                .start_file(path.as_str(), SimpleFileOptions::default())
                .expect("Failed to start zip entry");
            writer.write_all(content).expect("Failed to write zip entry");
        }
        writer.finish().expect("Failed to finish zip").into_inner()
    }
}

pub fn backend_entry(index: u32, name: &str, values: &[(&str, &str)]) -> BackendInfoEntry {
    values
        .iter()
        .fold(BackendInfoEntry::new(index, name), |entry, (env, value)| {
            entry.with_value(*env, *value)
        })
}

pub fn sample_entries() -> Vec<BackendInfoEntry> {
    vec![
        backend_entry(
            1,
            "host_0",
            &[("dev", "api-dev.example.com"), ("prod", "api.example.com")],
        ),
        backend_entry(2, "path_1", &[("dev", "/v1"), ("prod", "")]),
    ]
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub fn overrides_file(&self) -> PathBuf {
        self.file("overrides.json")
    }

    /// Write a config that keeps all state inside the temp directory
    pub fn write_config(&self, proxy_name: Option<&str>) -> PathBuf {
        let mut content = format!(
            "overrides_path: {}\nenvironments: [dev, prod]\nlogging:\n  level: warn\n  format: compact\n",
            self.overrides_file().display()
        );
        if let Some(proxy) = proxy_name {
            content.push_str(&format!("proxy_name: {}\n", proxy));
        }

        let path = self.file("apiforge.yaml");
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    pub fn write_entries(&self, name: &str, entries: &[BackendInfoEntry]) -> PathBuf {
        let path = self.file(name);
        let json = serde_json::to_string_pretty(entries).expect("Failed to serialize entries");
        std::fs::write(&path, json).expect("Failed to write entries");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_builder_produces_readable_archive() {
        let bytes = BundleBuilder::new()
            .with_file("policies/quota.xml", "<Quota/>")
            .build();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_backend_entry_fixture() {
        let entry = backend_entry(3, "host_2", &[("dev", "a")]);
        assert_eq!(entry.kvm_index, 3);
        assert_eq!(entry.value_for("dev"), "a");
        assert!(entry.is_auto_detected);
    }
}
