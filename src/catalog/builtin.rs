// ABOUTME: Compiled-in inventory of the default proxy configuration templates
// ABOUTME: Embeds template bodies from the templates/ directory at build time

use super::descriptor::{CategoryDescriptor, TemplateDescriptor};

struct BuiltinTemplate {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

macro_rules! builtin_template {
    ($category:literal, $name:literal, $description:literal) => {
        BuiltinTemplate {
            category: $category,
            name: $name,
            description: $description,
            content: include_str!(concat!("../../templates/", $category, "/", $name)),
        }
    };
}

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("policies", "Policies", "Policy definitions attached to proxy flows"),
    ("endpoints", "Endpoints", "Proxy, target and bundle descriptors"),
    ("descriptors", "Descriptors", "Deployment and product descriptors"),
    ("scripts", "Scripts", "JavaScript resources executed by policies"),
];

const TEMPLATES: &[BuiltinTemplate] = &[
    builtin_template!("policies", "verify-api-key.xml", "Validates the x-api-key header"),
    builtin_template!("policies", "spike-arrest.xml", "Smooths traffic spikes per client"),
    builtin_template!("policies", "quota.xml", "Enforces the product quota"),
    builtin_template!("policies", "oauth-v2-verify.xml", "Verifies an OAuth 2.0 access token"),
    builtin_template!("policies", "assign-message-cors.xml", "Adds CORS headers to responses"),
    builtin_template!("policies", "kvm-get-backend-info.xml", "Reads backend-info entries from the KVM"),
    builtin_template!("policies", "assign-target-url.xml", "Assigns target.url from backend info"),
    builtin_template!("policies", "raise-fault-not-found.xml", "Returns 404 for unmatched flows"),
    builtin_template!("endpoints", "proxy-endpoint.xml", "Default proxy endpoint with conditional flows"),
    builtin_template!("endpoints", "target-endpoint.xml", "Default target endpoint"),
    builtin_template!("endpoints", "apiproxy.xml", "Proxy bundle root descriptor"),
    builtin_template!("descriptors", "api-product.json", "API product bound to the proxy"),
    builtin_template!("descriptors", "kvm-definition.json", "Environment KVM definition"),
    builtin_template!("descriptors", "deployment.yaml", "Per-environment deployment descriptor"),
    builtin_template!("scripts", "set-target-url.js", "Builds the target URL from backend info"),
    builtin_template!("scripts", "mask-credentials.js", "Masks credentials before logging"),
];

pub(super) fn categories() -> Vec<CategoryDescriptor> {
    CATEGORIES
        .iter()
        .map(|(id, name, description)| CategoryDescriptor::new(*id, *name).with_description(*description))
        .collect()
}

pub(super) fn templates() -> Vec<TemplateDescriptor> {
    TEMPLATES
        .iter()
        .map(|t| TemplateDescriptor::new(t.category, t.name, t.description, t.content))
        .collect()
}
