use anyhow::Result;
use clap::Parser;
use tracing::Instrument;

use pbi_fixer::cli::commands::datasource_version::DatasourceVersionCommand;
use pbi_fixer::cli::commands::init_config::InitConfigCommand;
use pbi_fixer::cli::commands::upgrade::UpgradeCommand;
use pbi_fixer::cli::commands::{show_how_to_use, Command};
use pbi_fixer::cli::{Cli, Commands};
use pbi_fixer::{api_metrics, config, create_fixer_span, generate_correlation_id, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Default behavior: no subcommand - explain what the fixers do
    let Some(command) = cli.command else {
        return tokio::runtime::Runtime::new()?.block_on(async { show_how_to_use().await });
    };

    let config = config()?;
    init_telemetry(&config.observability, cli.verbose)?;
    let correlation_id = generate_correlation_id();

    let outcome = match command {
        Commands::UpgradeToPbir {
            report,
            workspace,
            scan_only,
            via,
        } => {
            let span = create_fixer_span(
                "upgrade_to_pbir",
                &report,
                workspace.as_deref(),
                scan_only,
                &correlation_id,
            );
            let command = UpgradeCommand::new(report, workspace, config.clone())
                .with_scan_only(scan_only)
                .with_via(via);
            tokio::runtime::Runtime::new()?.block_on(command.execute().instrument(span))
        }
        Commands::DefaultDatasourceVersion {
            report,
            workspace,
            scan_only,
        } => {
            let span = create_fixer_span(
                "default_datasource_version",
                &report,
                workspace.as_deref(),
                scan_only,
                &correlation_id,
            );
            let command = DatasourceVersionCommand::new(report, workspace, config.clone())
                .with_scan_only(scan_only);
            tokio::runtime::Runtime::new()?.block_on(command.execute().instrument(span))
        }
        Commands::InitConfig { force } => {
            let command = InitConfigCommand::new().with_force(force);
            tokio::runtime::Runtime::new()?.block_on(command.execute())
        }
    };

    api_metrics().log_stats();

    if !outcome? {
        std::process::exit(1);
    }
    Ok(())
}
