// ABOUTME: Template registry composing the catalog with user overrides
// ABOUTME: Resolves, updates, exports and imports templates and reports the override set

use tracing::{debug, info, warn};

use super::bundle::{self, BundleEntry, EntryData};
use super::error::{RegistryError, Result};
use super::resolved::{
    ExportedTemplate, ImportResult, InitializeOutcome, OverrideMap, ResolvedTemplate,
    TemplateTreeNode,
};
use crate::catalog::{Catalog, TemplateDescriptor};

/// Archive prefix written by macOS Finder; never holds templates.
const MACOS_METADATA_DIR: &str = "__MACOSX";

/// Resolved view over a [`Catalog`] and an override map.
///
/// The registry never touches durable storage. Callers hand in the persisted
/// overrides through [`TemplateRegistry::initialize`] and read them back with
/// [`TemplateRegistry::overrides`] after every mutating call.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    catalog: Catalog,
    overrides: OverrideMap,
    max_entry_bytes: u64,
}

impl TemplateRegistry {
    /// Create a registry with no overrides
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            overrides: OverrideMap::new(),
            max_entry_bytes: bundle::MAX_ENTRY_BYTES,
        }
    }

    /// Cap the uncompressed size of each imported bundle entry
    pub fn with_entry_limit(mut self, max_entry_bytes: u64) -> Self {
        self.max_entry_bytes = max_entry_bytes;
        self
    }

    /// Create a registry and load `overrides` in one step
    pub fn with_overrides(catalog: Catalog, overrides: OverrideMap) -> (Self, InitializeOutcome) {
        let mut registry = Self::new(catalog);
        let outcome = registry.initialize(overrides);
        (registry, outcome)
    }

    /// Replace all override state with `overrides`.
    ///
    /// Keys that do not name a catalog template are dropped and reported one
    /// by one; the remaining keys are still loaded.
    pub fn initialize(&mut self, overrides: OverrideMap) -> InitializeOutcome {
        let mut outcome = InitializeOutcome::default();
        let mut accepted = OverrideMap::new();

        for (id, content) in overrides {
            if self.catalog.contains(&id) {
                accepted.insert(id, content);
            } else {
                warn!("Dropping override for unknown template '{}'", id);
                outcome.rejected.push(RegistryError::InvalidOverrideKey { id });
            }
        }

        outcome.accepted = accepted.len();
        self.overrides = accepted;

        info!(
            "Template registry initialized: {} templates, {} overrides, {} rejected",
            self.catalog.len(),
            outcome.accepted,
            outcome.rejected.len()
        );

        outcome
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn template_count(&self) -> usize {
        self.catalog.len()
    }

    /// Category nodes in catalog order, each holding its templates in
    /// catalog order. Categories without templates are left out.
    pub fn template_tree(&self) -> Vec<TemplateTreeNode> {
        self.catalog
            .categories()
            .filter_map(|category| {
                let children: Vec<_> = self
                    .catalog
                    .templates_in(&category.id)
                    .map(|descriptor| TemplateTreeNode::Template(self.resolve(descriptor)))
                    .collect();

                if children.is_empty() {
                    None
                } else {
                    Some(TemplateTreeNode::Category {
                        id: category.id.clone(),
                        name: category.name.clone(),
                        children,
                    })
                }
            })
            .collect()
    }

    pub fn get_template(&self, id: &str) -> Result<ResolvedTemplate> {
        self.descriptor(id).map(|descriptor| self.resolve(descriptor))
    }

    /// Every template in catalog order
    pub fn templates(&self) -> Vec<ResolvedTemplate> {
        self.catalog
            .templates()
            .map(|descriptor| self.resolve(descriptor))
            .collect()
    }

    /// Set or replace the override for `id` and return the new override set.
    pub fn update_template(&mut self, id: &str, content: impl Into<String>) -> Result<&OverrideMap> {
        self.descriptor(id)?;

        let content = content.into();
        debug!("Updating template '{}' ({} bytes)", id, content.len());
        self.overrides.insert(id.to_string(), content);

        Ok(&self.overrides)
    }

    /// Drop the override for `id`. Returns whether one existed.
    pub fn reset_template(&mut self, id: &str) -> Result<bool> {
        self.descriptor(id)?;

        let removed = self.overrides.remove(id).is_some();
        if removed {
            debug!("Reset template '{}' to its default", id);
        }
        Ok(removed)
    }

    pub fn reset_all(&mut self) {
        info!("Clearing {} template overrides", self.overrides.len());
        self.overrides.clear();
    }

    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    pub fn is_overridden(&self, id: &str) -> bool {
        self.overrides.contains_key(id)
    }

    pub fn export_template(&self, id: &str) -> Result<ExportedTemplate> {
        let template = self.get_template(id)?;
        Ok(ExportedTemplate {
            filename: template.name,
            content: template.content,
        })
    }

    /// Zip every resolved template under `{category}/{name}`, in catalog order.
    pub fn export_all_as_zip(&self) -> Result<Vec<u8>> {
        let files = self
            .catalog
            .templates()
            .map(|descriptor| (descriptor.bundle_path(), self.content_of(descriptor)));

        let bytes = bundle::write_bundle(files)?;
        info!(
            "Exported {} templates into a {} byte bundle",
            self.catalog.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Apply every bundle entry that maps to a catalog template.
    ///
    /// An unreadable archive fails the whole call before anything changes.
    /// Entries that cannot be applied are reported in
    /// [`ImportResult::errors`] while the rest are still imported. Content
    /// equal to a template's default clears its override. Entries larger than
    /// the entry limit are reported without being decompressed in full.
    pub fn import_from_zip(&mut self, archive: &[u8]) -> Result<ImportResult> {
        let limit = self.max_entry_bytes;
        let entries = bundle::read_bundle(archive, limit).map_err(|e| {
            RegistryError::MalformedBundle {
                reason: e.to_string(),
            }
        })?;

        let known_extensions = self.catalog.known_extensions();
        let mut result = ImportResult::default();

        for BundleEntry { path, data } in entries {
            let Some(normalized) = normalize_entry_path(&path) else {
                warn!("Rejecting bundle entry with unsafe path '{}'", path);
                result
                    .errors
                    .push(RegistryError::PathTraversal { path }.to_string());
                continue;
            };

            if normalized.is_empty() || is_macos_metadata(&normalized) {
                continue;
            }

            let Some(descriptor) = self.catalog.find_by_bundle_path(&normalized) else {
                let looks_like_template = crate::catalog::descriptor::file_extension(&normalized)
                    .is_some_and(|ext| known_extensions.contains(&ext));

                if looks_like_template {
                    result
                        .errors
                        .push(RegistryError::UnmatchedBundleEntry { path }.to_string());
                } else {
                    debug!("Ignoring unrelated bundle entry '{}'", path);
                }
                continue;
            };

            let data = match data {
                EntryData::Complete(data) => data,
                EntryData::Oversized => {
                    warn!("Rejecting oversized bundle entry '{}'", path);
                    result
                        .errors
                        .push(RegistryError::OversizedEntry { path, limit }.to_string());
                    continue;
                }
            };

            let content = match String::from_utf8(data) {
                Ok(content) => content,
                Err(_) => {
                    result
                        .errors
                        .push(RegistryError::InvalidEntryEncoding { path }.to_string());
                    continue;
                }
            };

            let id = descriptor.id.clone();
            if content == descriptor.default_content {
                self.overrides.remove(&id);
            } else {
                self.overrides.insert(id, content);
            }
            result.imported += 1;
        }

        info!(
            "Imported {} templates from bundle ({} errors)",
            result.imported,
            result.errors.len()
        );

        Ok(result)
    }

    fn descriptor(&self, id: &str) -> Result<&TemplateDescriptor> {
        self.catalog
            .get(id)
            .ok_or_else(|| RegistryError::UnknownTemplateId { id: id.to_string() })
    }

    fn content_of<'a>(&'a self, descriptor: &'a TemplateDescriptor) -> &'a str {
        self.overrides
            .get(&descriptor.id)
            .map(String::as_str)
            .unwrap_or(&descriptor.default_content)
    }

    fn resolve(&self, descriptor: &TemplateDescriptor) -> ResolvedTemplate {
        let (content, is_overridden) = match self.overrides.get(&descriptor.id) {
            Some(content) => (content.clone(), true),
            None => (descriptor.default_content.clone(), false),
        };

        ResolvedTemplate {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            category: descriptor.category.clone(),
            content,
            is_overridden,
        }
    }
}

/// Canonical `a/b` form of an archive entry path, or `None` when the path is
/// absolute or climbs out of the archive root.
fn normalize_entry_path(path: &str) -> Option<String> {
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        return None;
    }

    let mut segments = Vec::new();
    for (index, segment) in path.split('/').enumerate() {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if index == 0 && s.ends_with(':') => return None,
            s => segments.push(s),
        }
    }

    Some(segments.join("/"))
}

/// Whether a normalized path lives under the `__MACOSX` directory itself
fn is_macos_metadata(normalized: &str) -> bool {
    normalized.split('/').next() == Some(MACOS_METADATA_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryDescriptor, TemplateDescriptor};

    fn registry() -> TemplateRegistry {
        let catalog = Catalog::new(
            vec![
                CategoryDescriptor::new("policies", "Policies"),
                CategoryDescriptor::new("scripts", "Scripts"),
                CategoryDescriptor::new("empty", "Empty"),
            ],
            vec![
                TemplateDescriptor::new("policies", "quota.xml", "Quota", "<Quota/>"),
                TemplateDescriptor::new("scripts", "hello.js", "Hello", "print('hi');"),
            ],
        )
        .unwrap();
        TemplateRegistry::new(catalog)
    }

    #[test]
    fn test_normalize_entry_path() {
        assert_eq!(normalize_entry_path("policies/quota.xml").as_deref(), Some("policies/quota.xml"));
        assert_eq!(normalize_entry_path("./policies//quota.xml").as_deref(), Some("policies/quota.xml"));
        assert_eq!(normalize_entry_path("policies\\quota.xml").as_deref(), Some("policies/quota.xml"));
        assert_eq!(normalize_entry_path("../policies/quota.xml"), None);
        assert_eq!(normalize_entry_path("policies/../../etc/passwd"), None);
        assert_eq!(normalize_entry_path("/etc/passwd"), None);
        assert_eq!(normalize_entry_path("C:/windows/win.ini"), None);
    }

    #[test]
    fn test_tree_skips_empty_categories() {
        let tree = registry().template_tree();
        let ids: Vec<_> = tree.iter().map(|node| node.id()).collect();
        assert_eq!(ids, vec!["policies", "scripts"]);
    }

    #[test]
    fn test_reset_template() {
        let mut registry = registry();
        registry.update_template("policies/quota", "<Quota count=\"5\"/>").unwrap();

        assert!(registry.reset_template("policies/quota").unwrap());
        assert!(!registry.reset_template("policies/quota").unwrap());
        assert_eq!(registry.get_template("policies/quota").unwrap().content, "<Quota/>");
        assert!(matches!(
            registry.reset_template("policies/missing"),
            Err(RegistryError::UnknownTemplateId { .. })
        ));
    }

    #[test]
    fn test_import_default_content_clears_override() {
        let mut registry = registry();
        registry.update_template("scripts/hello", "print('bye');").unwrap();

        let bundle =
            bundle::write_bundle(vec![("scripts/hello.js".to_string(), "print('hi');")]).unwrap();
        let result = registry.import_from_zip(&bundle).unwrap();

        assert_eq!(result.imported, 1);
        assert!(registry.overrides().is_empty());
    }

    #[test]
    fn test_import_ignores_unrelated_files() {
        let mut registry = registry();
        let bundle = bundle::write_bundle(vec![
            ("README.md".to_string(), "notes"),
            ("__MACOSX/policies/._quota.xml".to_string(), "junk"),
            ("policies/quota.xml".to_string(), "<Quota count=\"1\"/>"),
        ])
        .unwrap();

        let result = registry.import_from_zip(&bundle).unwrap();
        assert_eq!(result.imported, 1);
        assert!(result.is_clean());
    }

    #[test]
    fn test_macos_metadata_matches_whole_directory_name() {
        assert!(is_macos_metadata("__MACOSX/policies/._quota.xml"));
        assert!(is_macos_metadata("__MACOSX"));
        assert!(!is_macos_metadata("__MACOSXfoo/quota.xml"));
        assert!(!is_macos_metadata("policies/__MACOSX/quota.xml"));
    }

    #[test]
    fn test_import_reports_lookalike_metadata_dir() {
        let mut registry = registry();
        let bundle =
            bundle::write_bundle(vec![("__MACOSXfoo/quota.xml".to_string(), "<Quota/>")]).unwrap();

        let result = registry.import_from_zip(&bundle).unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.errors, vec!["__MACOSXfoo/quota.xml: unmatched"]);
    }

    #[test]
    fn test_import_reports_oversized_entry() {
        let mut registry = registry().with_entry_limit(16);
        let big = format!("<Quota>{}</Quota>", "x".repeat(4096));
        let bundle = bundle::write_bundle(vec![
            ("policies/quota.xml".to_string(), big.as_str()),
            ("scripts/hello.js".to_string(), "print('yo');"),
        ])
        .unwrap();

        let result = registry.import_from_zip(&bundle).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.errors, vec!["policies/quota.xml: larger than 16 bytes"]);
        assert!(!registry.is_overridden("policies/quota"));
        assert!(registry.is_overridden("scripts/hello"));
    }

    #[test]
    fn test_import_rejects_invalid_utf8() {
        let mut registry = registry();
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("policies/quota.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut writer, &[0xff, 0xfe, 0x00]).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let result = registry.import_from_zip(&bytes).unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.errors, vec!["policies/quota.xml: content is not valid UTF-8"]);
        assert!(registry.overrides().is_empty());
    }
}
