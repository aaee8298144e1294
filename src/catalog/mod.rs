// ABOUTME: Template catalog module: the immutable inventory of built-in templates
// ABOUTME: Validates inventories and answers lookups by id and by bundle path

mod builtin;
pub mod descriptor;
pub mod error;

pub use descriptor::{CategoryDescriptor, TemplateDescriptor};
pub use error::{CatalogError, Result};

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Immutable inventory of categories and templates, kept in declaration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: IndexMap<String, CategoryDescriptor>,
    templates: IndexMap<String, TemplateDescriptor>,
    bundle_paths: HashMap<String, String>,
}

impl Catalog {
    /// Build a catalog from an inventory, rejecting duplicate ids, unknown
    /// categories and names that cannot be used as bundle paths.
    pub fn new(
        categories: Vec<CategoryDescriptor>,
        templates: Vec<TemplateDescriptor>,
    ) -> Result<Self> {
        let mut seen_categories = HashSet::new();
        for category in &categories {
            validate_segment(&category.id, &category.id)?;
            if !seen_categories.insert(category.id.as_str()) {
                return Err(CatalogError::DuplicateCategory {
                    id: category.id.clone(),
                });
            }
        }

        let mut seen_ids = HashSet::new();
        let mut seen_paths: HashMap<String, &str> = HashMap::new();
        for template in &templates {
            if !seen_ids.insert(template.id.as_str()) {
                return Err(CatalogError::DuplicateTemplateId {
                    id: template.id.clone(),
                });
            }
            if !seen_categories.contains(template.category.as_str()) {
                return Err(CatalogError::UnknownCategory {
                    template: template.id.clone(),
                    category: template.category.clone(),
                });
            }
            validate_segment(&template.id, &template.name)?;

            let path = template.bundle_path();
            if let Some(first) = seen_paths.insert(path.clone(), template.id.as_str()) {
                return Err(CatalogError::DuplicateBundlePath {
                    path,
                    first: first.to_string(),
                    second: template.id.clone(),
                });
            }
        }

        Ok(Self::assemble(categories, templates))
    }

    /// The compiled-in inventory
    pub fn builtin() -> Self {
        Self::assemble(builtin::categories(), builtin::templates())
    }

    fn assemble(categories: Vec<CategoryDescriptor>, templates: Vec<TemplateDescriptor>) -> Self {
        let bundle_paths = templates
            .iter()
            .map(|t| (t.bundle_path(), t.id.clone()))
            .collect();

        Self {
            categories: categories.into_iter().map(|c| (c.id.clone(), c)).collect(),
            templates: templates.into_iter().map(|t| (t.id.clone(), t)).collect(),
            bundle_paths,
        }
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDescriptor> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Look up the template stored at `{category}/{name}` in a bundle
    pub fn find_by_bundle_path(&self, path: &str) -> Option<&TemplateDescriptor> {
        self.bundle_paths
            .get(path)
            .and_then(|id| self.templates.get(id))
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryDescriptor> {
        self.categories.values()
    }

    pub fn templates(&self) -> impl Iterator<Item = &TemplateDescriptor> {
        self.templates.values()
    }

    /// Templates of one category, in declaration order
    pub fn templates_in<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a TemplateDescriptor> + 'a {
        self.templates
            .values()
            .filter(move |t| t.category == category)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Lowercased file extensions used by at least one template
    pub fn known_extensions(&self) -> HashSet<String> {
        self.templates.values().filter_map(|t| t.extension()).collect()
    }
}

fn validate_segment(id: &str, name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative path segment")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CatalogError::InvalidName {
            id: id.to_string(),
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
