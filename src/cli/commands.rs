// ABOUTME: Command implementations for the apiforge CLI
// ABOUTME: Bridges template and KVM subcommands to the registry, generator and persistence layers

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use super::args::ContentSource;
use super::config::Config;
use crate::catalog::Catalog;
use crate::kvm::{self, BackendInfoSet};
use crate::persistence::{self, JsonFileStore, OverrideStore};
use crate::registry::{TemplateRegistry, TemplateTreeNode};

/// Build a registry from the built-in catalog and the persisted overrides
pub async fn open_registry(config: &Config) -> Result<(TemplateRegistry, JsonFileStore)> {
    let store = JsonFileStore::new(config.overrides_path());
    let overrides = store
        .load()
        .await
        .with_context(|| format!("Failed to load overrides from {}", store.path().display()))?;

    let (registry, outcome) = TemplateRegistry::with_overrides(Catalog::builtin(), overrides);
    for rejected in &outcome.rejected {
        warn!("{}", rejected);
    }

    Ok((registry, store))
}

async fn persist(registry: &TemplateRegistry, store: &JsonFileStore) -> Result<()> {
    store
        .save(registry.overrides())
        .await
        .with_context(|| format!("Failed to save overrides to {}", store.path().display()))
}

/// Print the template tree
pub async fn template_tree(json: bool, config: &Config) -> Result<()> {
    let (registry, _) = open_registry(config).await?;
    let tree = registry.template_tree();

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    for category in &tree {
        println!("{} ({})", category.name(), category.template_count());
        for node in category.children() {
            if let TemplateTreeNode::Template(template) = node {
                let marker = if template.is_overridden { "*" } else { " " };
                println!("  {} {:<32} {}", marker, template.name, template.id);
            }
        }
    }

    Ok(())
}

pub async fn show_template(id: String, config: &Config) -> Result<()> {
    let (registry, _) = open_registry(config).await?;
    let template = registry.get_template(&id)?;
    print!("{}", template.content);
    Ok(())
}

pub async fn set_template(id: String, source: ContentSource, config: &Config) -> Result<()> {
    let content = match (source.file, source.content) {
        (Some(path), _) => fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(content)) => content,
        (None, None) => anyhow::bail!("Either --file or --content is required"),
    };

    let (mut registry, store) = open_registry(config).await?;
    registry.update_template(&id, content)?;
    persist(&registry, &store).await?;

    println!("✓ Updated {}", id);
    Ok(())
}

pub async fn reset_template(id: String, config: &Config) -> Result<()> {
    let (mut registry, store) = open_registry(config).await?;

    if registry.reset_template(&id)? {
        persist(&registry, &store).await?;
        println!("✓ Reset {} to its default", id);
    } else {
        println!("{} has no override", id);
    }
    Ok(())
}

pub async fn export_template(id: String, output_dir: PathBuf, config: &Config) -> Result<()> {
    let (registry, _) = open_registry(config).await?;
    let exported = registry.export_template(&id)?;

    fs::create_dir_all(&output_dir).await?;
    let path = output_dir.join(&exported.filename);
    fs::write(&path, exported.content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✓ Exported {} to {}", id, path.display());
    Ok(())
}

pub async fn export_all(bundle: PathBuf, config: &Config) -> Result<()> {
    let (registry, _) = open_registry(config).await?;
    let bytes = registry.export_all_as_zip()?;

    ensure_parent(&bundle).await?;
    fs::write(&bundle, bytes)
        .await
        .with_context(|| format!("Failed to write {}", bundle.display()))?;

    println!(
        "✓ Exported {} templates to {}",
        registry.template_count(),
        bundle.display()
    );
    Ok(())
}

pub async fn import_bundle(bundle: PathBuf, config: &Config) -> Result<()> {
    let bytes = fs::read(&bundle)
        .await
        .with_context(|| format!("Failed to read {}", bundle.display()))?;

    let (mut registry, store) = open_registry(config).await?;
    let result = registry.import_from_zip(&bytes)?;
    persist(&registry, &store).await?;

    println!("✓ Imported {} templates", result.imported);
    if !result.errors.is_empty() {
        println!("  {} entries could not be imported:", result.errors.len());
        for error in &result.errors {
            println!("    - {}", error);
        }
    }
    Ok(())
}

pub async fn kvm_create(
    entries_path: PathBuf,
    environment: String,
    proxy_name: Option<String>,
    config: &Config,
) -> Result<()> {
    let set = load_entries(&entries_path).await?;
    let proxy_name = proxy_name.as_deref().or(config.proxy_name());

    let kvm = kvm::create_backend_info_kvm(proxy_name, set.entries(), &environment);
    println!("{}", serde_json::to_string_pretty(&kvm)?);
    Ok(())
}

pub async fn kvm_merge(
    entries_path: PathBuf,
    kvms_path: PathBuf,
    envs: Vec<String>,
    proxy_name: Option<String>,
    config: &Config,
) -> Result<()> {
    let set = load_entries(&entries_path).await?;
    let entries = set.entries();
    let environments = if envs.is_empty() {
        config.environments.clone()
    } else {
        envs
    };
    let proxy_name = proxy_name.as_deref().or(config.proxy_name());

    let existing = persistence::load_kvms(&kvms_path).await?;
    let merged = kvm::merge_for_environments(existing, entries, &environments, proxy_name);
    persistence::save_kvms(&kvms_path, &merged).await?;

    info!(
        "Merged {} backend-info entries into {} environments",
        entries.len(),
        environments.len()
    );
    println!(
        "✓ Merged {} entries for {} into {}",
        entries.len(),
        environments.join(", "),
        kvms_path.display()
    );
    Ok(())
}

pub async fn kvm_next_index(entries_path: PathBuf) -> Result<()> {
    let set = load_entries(&entries_path).await?;
    println!("{}", set.next_index()?);
    Ok(())
}

pub async fn kvm_add(entries_path: PathBuf, name: String) -> Result<()> {
    let mut set = load_entries(&entries_path).await?;
    let index = set.allocate(name.as_str())?.kvm_index;
    persistence::save_backend_info(&entries_path, &set).await?;

    println!("✓ Added {} as entry {}", name, index);
    Ok(())
}

pub async fn kvm_remove(entries_path: PathBuf, index: u32) -> Result<()> {
    let mut set = load_entries(&entries_path).await?;
    let removed = set
        .remove(index)
        .with_context(|| format!("No backend-info entry with index {}", index))?;
    persistence::save_backend_info(&entries_path, &set).await?;

    println!("✓ Removed {} (entry {})", removed.variable_name, index);
    Ok(())
}

pub async fn kvm_set_value(
    entries_path: PathBuf,
    index: u32,
    environment: String,
    value: String,
) -> Result<()> {
    let mut set = load_entries(&entries_path).await?;
    if !set.set_value(index, &environment, &value) {
        anyhow::bail!("No backend-info entry with index {}", index);
    }
    persistence::save_backend_info(&entries_path, &set).await?;

    println!("✓ Set entry {} for {}", index, environment);
    Ok(())
}

pub async fn kvm_check(entries_path: PathBuf, environment: String) -> Result<()> {
    let set = load_entries(&entries_path).await?;
    let entries = set.entries();

    if kvm::has_empty_values(entries, &environment) {
        let missing: Vec<_> = entries
            .iter()
            .filter(|entry| entry.value_for(&environment).is_empty())
            .map(|entry| entry.variable_name.as_str())
            .collect();
        anyhow::bail!(
            "Missing values for {}: {}",
            environment,
            missing.join(", ")
        );
    }

    println!("✓ All {} entries have values for {}", entries.len(), environment);
    Ok(())
}

async fn load_entries(path: &Path) -> Result<BackendInfoSet> {
    persistence::load_backend_info(path)
        .await
        .with_context(|| format!("Failed to load backend-info entries from {}", path.display()))
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}
