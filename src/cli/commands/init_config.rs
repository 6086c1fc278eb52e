use std::path::PathBuf;

use anyhow::Result;

use crate::cli::commands::Command;
use crate::config::{FixerConfig, CONFIG_FILE};

pub struct InitConfigCommand {
    pub path: PathBuf,
    pub force: bool,
}

impl InitConfigCommand {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(CONFIG_FILE),
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

impl Default for InitConfigCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for InitConfigCommand {
    async fn execute(&self) -> Result<bool> {
        if self.path.exists() && !self.force {
            println!(
                "❌ {} already exists (use --force to overwrite)",
                self.path.display()
            );
            return Ok(false);
        }

        FixerConfig::default().save_to_file(&self.path)?;
        println!("✅ Wrote default configuration to {}", self.path.display());
        println!("   💡 Set the access token with PBI_FIXER_ACCESS_TOKEN rather than in the file.");
        Ok(true)
    }
}
