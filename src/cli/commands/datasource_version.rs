use anyhow::Result;

use crate::cli::commands::{with_fabric_client, Command};
use crate::config::FixerConfig;
use crate::fixers::{fix_default_datasource_version, FixerSettings};

pub struct DatasourceVersionCommand {
    pub report: String,
    pub workspace: Option<String>,
    pub scan_only: bool,
    config: FixerConfig,
}

impl DatasourceVersionCommand {
    pub fn new(report: String, workspace: Option<String>, config: FixerConfig) -> Self {
        Self {
            report,
            workspace,
            scan_only: false,
            config,
        }
    }

    pub fn with_scan_only(mut self, scan_only: bool) -> Self {
        self.scan_only = scan_only;
        self
    }
}

impl Command for DatasourceVersionCommand {
    async fn execute(&self) -> Result<bool> {
        let settings = FixerSettings::from_config(&self.config);

        with_fabric_client(&self.config, |client| async move {
            fix_default_datasource_version(
                &client,
                &settings,
                &self.report,
                self.workspace.as_deref(),
                self.scan_only,
            )
            .await
        })
        .await
    }
}
