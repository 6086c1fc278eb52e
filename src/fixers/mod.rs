//! Fixers for reports and semantic models.
//!
//! Every fixer resolves its target, reads the current state, decides, mutates
//! unless running in scan-only mode, and verifies. Progress and results are
//! printed as status lines.

pub mod report;
pub mod semantic_model;

pub use report::{fix_upgrade_to_pbir, fix_upgrade_to_pbir_via_embed, UpgradeDecision};
pub use semantic_model::{fix_default_datasource_version, Reconciliation};

use std::time::Duration;

use crate::config::FixerConfig;
use crate::poll::PollConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct FixerSettings {
    /// Workspace used when a fixer gets none
    pub default_workspace: Option<String>,
    pub poll_time_limit: Duration,
    pub definition_poll_interval: Duration,
    pub embed_poll_interval: Duration,
}

impl Default for FixerSettings {
    fn default() -> Self {
        Self {
            default_workspace: None,
            poll_time_limit: Duration::from_secs(60),
            definition_poll_interval: Duration::from_secs(3),
            embed_poll_interval: Duration::from_secs(2),
        }
    }
}

impl FixerSettings {
    pub fn from_config(config: &FixerConfig) -> Self {
        Self {
            default_workspace: config.workspace.default.clone(),
            poll_time_limit: Duration::from_secs(config.polling.time_limit_seconds),
            definition_poll_interval: Duration::from_secs(config.polling.definition_interval_seconds),
            embed_poll_interval: Duration::from_secs(config.polling.embed_interval_seconds),
        }
    }

    pub fn with_default_workspace(mut self, workspace: &str) -> Self {
        self.default_workspace = Some(workspace.to_string());
        self
    }

    pub fn definition_poll(&self) -> PollConfig {
        PollConfig::new(self.poll_time_limit, self.definition_poll_interval)
    }

    pub fn embed_poll(&self) -> PollConfig {
        PollConfig::new(self.poll_time_limit, self.embed_poll_interval)
    }
}
