use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::generator::{generate_microservice, GenerateOptions};
use crate::publish::{Publisher, PublisherConfig, RestGithub};

/// Command-line interface for microgen
#[derive(Parser)]
#[command(name = "microgen")]
#[command(about = "Config-driven microservice scaffolding generator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new microservice project from a JSON config
    CreateMicroservice {
        /// Path to the JSON configuration file
        #[arg(long)]
        config: PathBuf,

        /// Output directory for the generated project
        #[arg(long)]
        output_dir: PathBuf,

        /// Skip the post-generation formatter pass
        #[arg(long, default_value_t = false)]
        skip_format: bool,

        /// Skip the configured post-create scripts
        #[arg(long, default_value_t = false)]
        skip_scripts: bool,
    },
    /// Publish a generated project to a new GitHub repository
    Publish {
        /// Base name for the repository (sanitized, suffixed for uniqueness)
        #[arg(long)]
        name: String,

        /// Repository description
        #[arg(long)]
        description: String,

        /// Path to the project tree to push
        #[arg(long)]
        path: PathBuf,

        /// Create the repository as public (private by default)
        #[arg(long, default_value_t = false)]
        public: bool,

        /// GitHub username to add as a pull-only collaborator
        #[arg(long)]
        collaborator: Option<String>,
    },
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::CreateMicroservice {
            config,
            output_dir,
            skip_format,
            skip_scripts,
        } => {
            if !config.exists() {
                anyhow::bail!("config file not found at {}", config.display());
            }
            let opts = GenerateOptions {
                skip_format: *skip_format,
                skip_scripts: *skip_scripts,
            };
            let report = generate_microservice(config, output_dir, &opts)?;
            for outcome in &report.scripts {
                let status = if outcome.success { "ok" } else { "failed" };
                println!("script '{}': {status}", outcome.script);
            }
            Ok(())
        }
        Commands::Publish {
            name,
            description,
            path,
            public,
            collaborator,
        } => {
            let env = |key: &str| {
                std::env::var(key).with_context(|| format!("missing environment variable {key}"))
            };
            let api = RestGithub::new(env("GITHUB_PAT")?);
            let publisher = Publisher::new(
                &api,
                PublisherConfig {
                    org: env("GITHUB_ORG_NAME")?,
                    token: env("GITHUB_PAT")?,
                    bot_name: env("GITHUB_BOT_ACCOUNT_USERNAME")?,
                    bot_email: env("GITHUB_BOT_EMAIL")?,
                },
            );
            let result =
                publisher.publish(name, description, path, !public, collaborator.as_deref())?;
            println!(
                "✅ Published {} → {} (branches: {}, {})",
                result.repo_name, result.repo_url, result.main_branch, result.dev_branch
            );
            Ok(())
        }
    }
}
