// ABOUTME: Immutable descriptors for catalog categories and built-in templates
// ABOUTME: Defines the identity, display name, grouping and default content of a template

use serde::{Deserialize, Serialize};

/// A grouping of templates shown as one branch of the template tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A built-in template. `id` is globally unique, `name` is the file name
/// used for export and as the last segment of the bundle path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub default_content: String,
}

impl TemplateDescriptor {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        default_content: impl Into<String>,
    ) -> Self {
        let category = category.into();
        let name = name.into();
        let id = format!("{}/{}", category, file_stem(&name));

        Self {
            id,
            name,
            description: description.into(),
            category,
            default_content: default_content.into(),
        }
    }

    /// Override the derived id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Path of this template inside an export bundle: `{category}/{name}`
    pub fn bundle_path(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    /// File extension of `name`, lowercased, without the dot
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.name)
    }
}

pub(crate) fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

pub(crate) fn file_extension(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_derived_from_category_and_stem() {
        let descriptor = TemplateDescriptor::new("policies", "verify-api-key.xml", "", "<x/>");
        assert_eq!(descriptor.id, "policies/verify-api-key");
        assert_eq!(descriptor.bundle_path(), "policies/verify-api-key.xml");
        assert_eq!(descriptor.extension().as_deref(), Some("xml"));
    }

    #[test]
    fn test_file_name_helpers() {
        assert_eq!(file_stem("deployment.yaml"), "deployment");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("Makefile"), "Makefile");
        assert_eq!(file_extension("Script.JS").as_deref(), Some("js"));
        assert_eq!(file_extension("Makefile"), None);
        assert_eq!(file_extension(".hidden"), None);
    }
}
