// pbi-fixer library - Power BI / Fabric fixers
// This exposes the fixers and their API plumbing for testing and integration

pub mod cli;
pub mod config;
pub mod external;
pub mod fabric;
pub mod fixers;
pub mod icons;
pub mod observability;
pub mod poll;
pub mod telemetry;
pub mod tom;

// Re-export key types for easy access
pub use crate::config::{config, FixerConfig};
pub use external::{EmbedSaveRequest, EmbedSaveTrigger};
pub use fabric::{FabricClient, FabricError, FabricOps, Report, ReportFormat, Workspace};
pub use fixers::{
    fix_default_datasource_version, fix_upgrade_to_pbir, fix_upgrade_to_pbir_via_embed,
    FixerSettings, Reconciliation, UpgradeDecision,
};
pub use observability::{api_metrics, ApiMetrics, ApiStats};
pub use poll::{poll_until, PollConfig, PollOutcome, PollTick};
pub use telemetry::{create_fixer_span, generate_correlation_id, init_telemetry};
pub use tom::{with_semantic_model, DataSourceVersion, TabularModel};
