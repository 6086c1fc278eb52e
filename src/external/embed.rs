//! Embed-save hook
//!
//! Saving an embedded report happens in the browser-side embed SDK, which this
//! crate cannot drive itself. The hook hands the embed URL and an edit token to
//! an external program that opens the report and saves it.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use super::command::{CommandExecutor, ProcessCommandExecutor};
use crate::config::EmbedConfig;
use crate::fabric::FabricError;

/// Environment variable carrying the embed token to the hook.
pub const EMBED_TOKEN_ENV: &str = "PBI_EMBED_TOKEN";

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedSaveRequest {
    pub embed_url: String,
    pub report_id: String,
    pub workspace_id: String,
    pub token: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmbedSaveTrigger: Send + Sync {
    async fn trigger_save(&self, request: &EmbedSaveRequest) -> Result<(), FabricError>;
}

/// Runs the configured `embed.save_command`.
pub struct CommandEmbedSaveTrigger {
    executor: Arc<dyn CommandExecutor>,
    program: String,
    args: Vec<String>,
}

impl CommandEmbedSaveTrigger {
    pub fn new(executor: Arc<dyn CommandExecutor>, program: String, args: Vec<String>) -> Self {
        Self {
            executor,
            program,
            args,
        }
    }
}

#[async_trait]
impl EmbedSaveTrigger for CommandEmbedSaveTrigger {
    async fn trigger_save(&self, request: &EmbedSaveRequest) -> Result<(), FabricError> {
        let mut args = self.args.clone();
        args.extend([
            request.embed_url.clone(),
            request.report_id.clone(),
            request.workspace_id.clone(),
        ]);
        let envs = [(EMBED_TOKEN_ENV.to_string(), request.token.clone())];

        debug!(program = %self.program, report_id = %request.report_id, "Running embed save hook");
        let output = self
            .executor
            .execute(&self.program, &args, &envs)
            .await
            .map_err(|e| FabricError::EmbedHook(e.to_string()))?;

        if output.success() {
            Ok(())
        } else {
            warn!(status = output.status_code, stderr = %output.stderr.trim(), "Embed save hook failed");
            let detail = if output.stderr.trim().is_empty() {
                output.stdout.trim().to_string()
            } else {
                output.stderr.trim().to_string()
            };
            Err(FabricError::EmbedHook(format!(
                "'{}' exited with status {}: {}",
                self.program, output.status_code, detail
            )))
        }
    }
}

/// Stand-in used when no `embed.save_command` is configured.
pub struct UnconfiguredEmbedSaveTrigger;

#[async_trait]
impl EmbedSaveTrigger for UnconfiguredEmbedSaveTrigger {
    async fn trigger_save(&self, _request: &EmbedSaveRequest) -> Result<(), FabricError> {
        Err(FabricError::EmbedHook(
            "no embed.save_command configured (set it in pbi-fixer.toml or PBI_FIXER_EMBED__SAVE_COMMAND)"
                .to_string(),
        ))
    }
}

pub fn embed_save_trigger_from_config(config: &EmbedConfig) -> Box<dyn EmbedSaveTrigger> {
    match config.save_command.as_deref().map(str::trim) {
        Some(program) if !program.is_empty() => Box::new(CommandEmbedSaveTrigger::new(
            Arc::new(ProcessCommandExecutor),
            program.to_string(),
            config.save_args.clone(),
        )),
        _ => Box::new(UnconfiguredEmbedSaveTrigger),
    }
}
