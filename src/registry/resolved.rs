// ABOUTME: Resolved views produced by the template registry
// ABOUTME: Defines resolved templates, the browse tree, export payloads and import results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Template id to override content. The only state the registry mutates.
pub type OverrideMap = BTreeMap<String, String>;

/// A catalog template merged with its override, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub content: String,
    pub is_overridden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateTreeNode {
    Category {
        id: String,
        name: String,
        children: Vec<TemplateTreeNode>,
    },
    Template(ResolvedTemplate),
}

impl TemplateTreeNode {
    pub fn id(&self) -> &str {
        match self {
            TemplateTreeNode::Category { id, .. } => id,
            TemplateTreeNode::Template(template) => &template.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TemplateTreeNode::Category { name, .. } => name,
            TemplateTreeNode::Template(template) => &template.name,
        }
    }

    pub fn children(&self) -> &[TemplateTreeNode] {
        match self {
            TemplateTreeNode::Category { children, .. } => children,
            TemplateTreeNode::Template(_) => &[],
        }
    }

    pub fn as_template(&self) -> Option<&ResolvedTemplate> {
        match self {
            TemplateTreeNode::Template(template) => Some(template),
            TemplateTreeNode::Category { .. } => None,
        }
    }

    /// Number of leaves below (or at) this node
    pub fn template_count(&self) -> usize {
        match self {
            TemplateTreeNode::Category { children, .. } => {
                children.iter().map(TemplateTreeNode::template_count).sum()
            }
            TemplateTreeNode::Template(_) => 1,
        }
    }
}

/// A single template ready to be written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTemplate {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<String>,
}

impl ImportResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of loading an override map into the registry
#[derive(Debug, Default)]
pub struct InitializeOutcome {
    pub accepted: usize,
    pub rejected: Vec<super::RegistryError>,
}

impl InitializeOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> TemplateTreeNode {
        TemplateTreeNode::Template(ResolvedTemplate {
            id: id.to_string(),
            name: format!("{}.xml", id),
            description: String::new(),
            category: "policies".to_string(),
            content: String::new(),
            is_overridden: false,
        })
    }

    #[test]
    fn test_template_count_recurses() {
        let tree = TemplateTreeNode::Category {
            id: "policies".to_string(),
            name: "Policies".to_string(),
            children: vec![leaf("a"), leaf("b")],
        };

        assert_eq!(tree.template_count(), 2);
        assert_eq!(tree.children()[1].id(), "b");
        assert!(tree.as_template().is_none());
    }

    #[test]
    fn test_tree_serializes_with_type_tag() {
        let json = serde_json::to_value(leaf("quota")).unwrap();
        assert_eq!(json["type"], "template");
        assert_eq!(json["isOverridden"], false);
        assert_eq!(json["name"], "quota.xml");
    }
}
