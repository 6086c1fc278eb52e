use anyhow::Result;

use crate::cli::commands::{with_fabric_client, Command};
use crate::cli::UpgradeVia;
use crate::config::FixerConfig;
use crate::external::embed_save_trigger_from_config;
use crate::fixers::{fix_upgrade_to_pbir, fix_upgrade_to_pbir_via_embed, FixerSettings};

pub struct UpgradeCommand {
    pub report: String,
    pub workspace: Option<String>,
    pub scan_only: bool,
    pub via: UpgradeVia,
    config: FixerConfig,
}

impl UpgradeCommand {
    pub fn new(report: String, workspace: Option<String>, config: FixerConfig) -> Self {
        Self {
            report,
            workspace,
            scan_only: false,
            via: UpgradeVia::Definition,
            config,
        }
    }

    pub fn with_scan_only(mut self, scan_only: bool) -> Self {
        self.scan_only = scan_only;
        self
    }

    pub fn with_via(mut self, via: UpgradeVia) -> Self {
        self.via = via;
        self
    }
}

impl Command for UpgradeCommand {
    async fn execute(&self) -> Result<bool> {
        let settings = FixerSettings::from_config(&self.config);
        let workspace = self.workspace.as_deref();

        with_fabric_client(&self.config, |client| async move {
            let upgraded = match self.via {
                UpgradeVia::Definition => {
                    fix_upgrade_to_pbir(&client, &settings, &self.report, workspace, self.scan_only).await
                }
                UpgradeVia::Embed => {
                    let trigger = embed_save_trigger_from_config(&self.config.embed);
                    fix_upgrade_to_pbir_via_embed(
                        &client,
                        trigger.as_ref(),
                        &settings,
                        &self.report,
                        workspace,
                        self.scan_only,
                    )
                    .await
                }
            };
            Ok(upgraded)
        })
        .await
    }
}
