//! Ensure `DefaultPowerBIDataSourceVersion = PowerBI_V3` on the semantic model
//! behind a report.
//!
//! XMLA write operations on Fabric / Premium capacities fail with "The
//! operation is only supported on model with property
//! 'DefaultPowerBIDataSourceVersion' set to 'PowerBI_V3'" otherwise. Models
//! uploaded from .pbix files often lack the setting.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::fabric::{find_report, resolve_workspace, FabricError, FabricOps};
use crate::fixers::FixerSettings;
use crate::icons::{GREEN_DOT, IN_PROGRESS, RED_DOT, YELLOW_DOT};
use crate::tom::{with_semantic_model, DataSourceVersion, TabularModel};

pub const REQUIRED_DATA_SOURCE_VERSION: DataSourceVersion = DataSourceVersion::PowerBiV3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    AlreadySet,
    /// Scan-only: the property differs and would be written.
    WouldSet { current: DataSourceVersion },
    Set { previous: DataSourceVersion },
}

/// Compares the model property with `PowerBI_V3` and writes it when it differs,
/// unless `scan_only` is set.
pub fn reconcile_data_source_version(
    model: &mut TabularModel,
    scan_only: bool,
) -> Result<Reconciliation, FabricError> {
    let current = model.default_power_bi_data_source_version();
    if current == REQUIRED_DATA_SOURCE_VERSION {
        return Ok(Reconciliation::AlreadySet);
    }
    if scan_only {
        return Ok(Reconciliation::WouldSet { current });
    }

    model.set_default_power_bi_data_source_version(REQUIRED_DATA_SOURCE_VERSION)?;
    Ok(Reconciliation::Set { previous: current })
}

/// Returns false when the report or its semantic model cannot be found; API
/// and model-connection errors are returned as `Err`.
#[instrument(skip(ops, settings))]
pub async fn fix_default_datasource_version(
    ops: &dyn FabricOps,
    settings: &FixerSettings,
    report: &str,
    workspace: Option<&str>,
    scan_only: bool,
) -> Result<bool> {
    let workspace = resolve_workspace(ops, workspace, settings.default_workspace.as_deref()).await?;
    let reports = ops
        .list_reports(&workspace.id)
        .await
        .with_context(|| format!("Failed to list reports in the '{}' workspace", workspace.display_name))?;

    let Some(found) = find_report(&reports, report) else {
        println!(
            "{RED_DOT} Could not find report '{report}' in the '{}' workspace.",
            workspace.display_name
        );
        return Ok(false);
    };

    let Some(dataset_id) = found.dataset_id.as_deref() else {
        println!(
            "{RED_DOT} Report '{}' is not bound to a semantic model — nothing to check.",
            found.name
        );
        return Ok(false);
    };
    let dataset_workspace_id = found
        .dataset_workspace_id
        .as_deref()
        .unwrap_or(&workspace.id);

    let dataset = ops
        .get_dataset(dataset_workspace_id, dataset_id)
        .await
        .with_context(|| format!("Failed to look up semantic model {dataset_id}"))?;
    let dataset_name = dataset.name.as_str();

    let reconciliation = with_semantic_model(ops, dataset_workspace_id, &dataset.id, scan_only, |model| {
        let reconciliation = reconcile_data_source_version(model, scan_only);
        if let Ok(Reconciliation::Set { .. }) = reconciliation {
            println!(
                "{IN_PROGRESS} Setting DefaultPowerBIDataSourceVersion to '{REQUIRED_DATA_SOURCE_VERSION}' on '{dataset_name}'..."
            );
        }
        reconciliation
    })
    .await
    .with_context(|| format!("Failed to update semantic model '{dataset_name}'"))??;

    info!(dataset_id = %dataset.id, outcome = ?reconciliation, "Data source version reconciled");

    match reconciliation {
        Reconciliation::AlreadySet => println!(
            "{GREEN_DOT} DefaultPowerBIDataSourceVersion is already '{REQUIRED_DATA_SOURCE_VERSION}' on '{dataset_name}' — no action needed."
        ),
        Reconciliation::WouldSet { current } => println!(
            "{YELLOW_DOT} DefaultPowerBIDataSourceVersion is '{current}' on '{dataset_name}'. It would be set to '{REQUIRED_DATA_SOURCE_VERSION}'."
        ),
        Reconciliation::Set { .. } => println!(
            "{GREEN_DOT} DefaultPowerBIDataSourceVersion has been set to '{REQUIRED_DATA_SOURCE_VERSION}' on '{dataset_name}'."
        ),
    }

    Ok(true)
}
