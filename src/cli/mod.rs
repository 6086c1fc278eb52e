use clap::{Parser, Subcommand, ValueEnum};

pub mod commands;

#[derive(Parser)]
#[command(name = "pbi-fixer")]
#[command(about = "Fixers for Power BI and Fabric reports and semantic models")]
#[command(long_about = "pbi-fixer inspects Power BI items through the Fabric and Power BI REST APIs \
                       and repairs common problems. Every fixer supports --scan-only to report what \
                       it would change without touching anything.")]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true, help = "Show detailed log output on stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upgrade a report from the PBIRLegacy format to PBIR
    UpgradeToPbir {
        /// Report name or ID
        report: String,
        /// Workspace name or ID
        #[arg(long, short = 'w', help = "Workspace name or ID (falls back to the configured default)")]
        workspace: Option<String>,
        /// Only report what would be changed
        #[arg(long, help = "Check eligibility without modifying the report")]
        scan_only: bool,
        /// How the service is made to re-store the report
        #[arg(long, value_enum, default_value_t = UpgradeVia::Definition)]
        via: UpgradeVia,
    },
    /// Ensure the report's semantic model uses DefaultPowerBIDataSourceVersion = PowerBI_V3
    DefaultDatasourceVersion {
        /// Report name or ID
        report: String,
        /// Workspace name or ID
        #[arg(long, short = 'w', help = "Workspace name or ID (falls back to the configured default)")]
        workspace: Option<String>,
        /// Only report what would be changed
        #[arg(long, help = "Inspect the semantic model without modifying it")]
        scan_only: bool,
    },
    /// Write the default configuration to pbi-fixer.toml
    InitConfig {
        /// Overwrite an existing pbi-fixer.toml
        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UpgradeVia {
    /// getDefinition followed by updateDefinition
    Definition,
    /// Embed token plus the configured embed-save command
    Embed,
}
