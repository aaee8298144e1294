// ABOUTME: Main application orchestration for the apiforge CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config, KvmCommands, TemplateCommands};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        // Logs go to stderr so command output can be piped
        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting apiforge v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        let config = &self.config;
        match args.command {
            Commands::Templates { action } => match action {
                TemplateCommands::Tree { json } => commands::template_tree(json, config).await,
                TemplateCommands::Show { id } => commands::show_template(id, config).await,
                TemplateCommands::Set { id, source } => {
                    commands::set_template(id, source, config).await
                }
                TemplateCommands::Reset { id } => commands::reset_template(id, config).await,
                TemplateCommands::Export { id, output_dir } => {
                    commands::export_template(id, output_dir, config).await
                }
                TemplateCommands::ExportAll { bundle } => {
                    commands::export_all(bundle, config).await
                }
                TemplateCommands::Import { bundle } => {
                    commands::import_bundle(bundle, config).await
                }
            },

            Commands::Kvm { action } => match action {
                KvmCommands::Create {
                    entries,
                    env,
                    proxy_name,
                } => commands::kvm_create(entries, env, proxy_name, config).await,
                KvmCommands::Merge {
                    entries,
                    kvms,
                    envs,
                    proxy_name,
                } => commands::kvm_merge(entries, kvms, envs, proxy_name, config).await,
                KvmCommands::NextIndex { entries } => commands::kvm_next_index(entries).await,
                KvmCommands::Add { entries, name } => commands::kvm_add(entries, name).await,
                KvmCommands::Remove { entries, index } => {
                    commands::kvm_remove(entries, index).await
                }
                KvmCommands::SetValue {
                    entries,
                    index,
                    env,
                    value,
                } => commands::kvm_set_value(entries, index, env, value).await,
                KvmCommands::Check { entries, env } => commands::kvm_check(entries, env).await,
            },
        }
    }

    /// Create application from already parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}
