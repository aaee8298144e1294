// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and the template and KVM subcommands

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apiforge")]
#[command(about = "Manage proxy configuration templates and backend-info KVMs")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse, edit and bundle configuration templates
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },

    /// Generate and edit backend-info KVMs
    Kvm {
        #[command(subcommand)]
        action: KvmCommands,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Print the template tree
    Tree {
        #[arg(long, help = "Print the tree as JSON")]
        json: bool,
    },

    /// Print the resolved content of a template
    Show {
        #[arg(help = "Template id, e.g. policies/verify-api-key")]
        id: String,
    },

    /// Override the content of a template
    Set {
        #[arg(help = "Template id")]
        id: String,

        #[command(flatten)]
        source: ContentSource,
    },

    /// Restore a template to its built-in default
    Reset {
        #[arg(help = "Template id")]
        id: String,
    },

    /// Write one resolved template to a file
    Export {
        #[arg(help = "Template id")]
        id: String,

        #[arg(short, long, help = "Output directory", default_value = ".")]
        output_dir: PathBuf,
    },

    /// Write every resolved template into a zip bundle
    ExportAll {
        #[arg(help = "Path of the bundle to create")]
        bundle: PathBuf,
    },

    /// Import overrides from a zip bundle
    Import {
        #[arg(help = "Path of the bundle to read")]
        bundle: PathBuf,
    },
}

#[derive(ClapArgs)]
#[group(required = true, multiple = false)]
pub struct ContentSource {
    #[arg(short, long, help = "Read the new content from a file")]
    pub file: Option<PathBuf>,

    #[arg(long, help = "New content given inline")]
    pub content: Option<String>,
}

#[derive(Subcommand)]
pub enum KvmCommands {
    /// Print the backend-info KVM for one environment
    Create {
        #[arg(help = "Backend-info entries JSON file")]
        entries: PathBuf,

        #[arg(short, long, help = "Environment name")]
        env: String,

        #[arg(long, help = "Proxy name used in the KVM name")]
        proxy_name: Option<String>,
    },

    /// Merge backend-info entries into a KVM collection file
    Merge {
        #[arg(help = "Backend-info entries JSON file")]
        entries: PathBuf,

        #[arg(long, help = "KVM collection JSON file, created if missing")]
        kvms: PathBuf,

        #[arg(short, long = "env", help = "Environment to merge (repeatable, defaults to configured environments)")]
        envs: Vec<String>,

        #[arg(long, help = "Proxy name used in the KVM name")]
        proxy_name: Option<String>,
    },

    /// Print the next free KVM index
    NextIndex {
        #[arg(help = "Backend-info entries JSON file")]
        entries: PathBuf,
    },

    /// Allocate a new entry under the next free index
    Add {
        #[arg(help = "Backend-info entries JSON file")]
        entries: PathBuf,

        #[arg(long, help = "Variable name of the new entry")]
        name: String,
    },

    /// Remove an entry; its index is never allocated again
    Remove {
        #[arg(help = "Backend-info entries JSON file")]
        entries: PathBuf,

        #[arg(long, help = "KVM index of the entry")]
        index: u32,
    },

    /// Set the value of one entry for an environment
    SetValue {
        #[arg(help = "Backend-info entries JSON file")]
        entries: PathBuf,

        #[arg(long, help = "KVM index of the entry")]
        index: u32,

        #[arg(short, long, help = "Environment name")]
        env: String,

        #[arg(long, help = "New value")]
        value: String,
    },

    /// Fail when any entry lacks a value for an environment
    Check {
        #[arg(help = "Backend-info entries JSON file")]
        entries: PathBuf,

        #[arg(short, long, help = "Environment name")]
        env: String,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
