//! Implementation of the `tipsheet init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{initialize_database, verify_connection};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub directories_created: Vec<String>,
    pub database_initialized: bool,
    pub config_file: String,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {}", dir));
            }
        }
        if self.database_initialized {
            lines.push("\nDatabase ready; record a prediction with 'tipsheet add'.".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool, config: &Config) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        current_dir.join(&args.path)
    };

    let tipsheet_dir = target_path.join(".tipsheet");

    // Check if already initialized
    if tipsheet_dir.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path,
            directories_created: vec![],
            database_initialized: false,
            config_file: String::new(),
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    // If forcing, remove existing
    if args.force && tipsheet_dir.exists() {
        fs::remove_dir_all(&tipsheet_dir)
            .await
            .context("Failed to remove existing .tipsheet directory")?;
    }

    let mut directories_created = vec![];

    let dirs = [tipsheet_dir.clone(), tipsheet_dir.join("logs")];
    for dir in &dirs {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {:?}", dir))?;
            let relative = dir
                .strip_prefix(&target_path)
                .unwrap_or(dir)
                .to_string_lossy()
                .to_string();
            directories_created.push(relative);
        }
    }

    // Snapshot the effective config. Paths stay relative when
    // initializing the current directory so the file is portable.
    let mut effective = config.clone();
    if target_path != current_dir {
        effective.database.path = tipsheet_dir.join("tipsheet.db").display().to_string();
    }

    let config_file = tipsheet_dir.join("config.yaml");
    let rendered = serde_yaml::to_string(&effective).context("Failed to render config")?;
    fs::write(&config_file, rendered)
        .await
        .with_context(|| format!("Failed to write {:?}", config_file))?;

    // Initialize and verify the database
    let pool = initialize_database(&effective.database.database_url())
        .await
        .context("Failed to initialize database")?;
    verify_connection(&pool)
        .await
        .context("Database verification failed")?;

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Reinitialized tipsheet store.".to_string()
        } else {
            "Initialized tipsheet store.".to_string()
        },
        initialized_path: target_path,
        directories_created,
        database_initialized: true,
        config_file: config_file.display().to_string(),
    };

    output(&output_data, json_mode);
    Ok(())
}
