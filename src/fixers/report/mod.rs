// Report format upgrade: PBIRLegacy -> PBIR

pub mod upgrade_to_pbir;
pub mod upgrade_via_embed;

pub use upgrade_to_pbir::fix_upgrade_to_pbir;
pub use upgrade_via_embed::fix_upgrade_to_pbir_via_embed;

use tracing::{info, warn};

use super::FixerSettings;
use crate::fabric::{find_report, resolve_workspace, FabricOps, Report, ReportFormat, Workspace};
use crate::icons::{GREEN_DOT, IN_PROGRESS, RED_DOT, WARNING, YELLOW_DOT};
use crate::poll::{poll_until, PollConfig, PollOutcome};

/// Where a report stands with respect to the PBIR upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeDecision {
    AlreadyUpgraded,
    Eligible,
    Unsupported(String),
}

impl UpgradeDecision {
    pub fn classify(format: Option<&ReportFormat>) -> Self {
        match format {
            Some(ReportFormat::Pbir) => UpgradeDecision::AlreadyUpgraded,
            Some(ReportFormat::PbirLegacy) => UpgradeDecision::Eligible,
            Some(ReportFormat::Other(other)) => UpgradeDecision::Unsupported(other.clone()),
            None => UpgradeDecision::Unsupported("unknown".to_string()),
        }
    }
}

pub(crate) struct UpgradeTarget {
    pub workspace: Workspace,
    pub report: Report,
}

pub(crate) enum Gate {
    /// Nothing to mutate; the fixer result is final.
    Finished(bool),
    Upgrade(UpgradeTarget),
}

/// Resolves the report and applies the format gate. Both upgrade variants go
/// through here, so scan and fix share one classification.
pub(crate) async fn gate_upgrade(
    ops: &dyn FabricOps,
    settings: &FixerSettings,
    report: &str,
    workspace: Option<&str>,
    scan_only: bool,
) -> Gate {
    let workspace = match resolve_workspace(ops, workspace, settings.default_workspace.as_deref()).await {
        Ok(workspace) => workspace,
        Err(e) => {
            println!("{RED_DOT} {e}");
            return Gate::Finished(false);
        }
    };

    let reports = match ops.list_reports(&workspace.id).await {
        Ok(reports) => reports,
        Err(e) => {
            println!(
                "{RED_DOT} Could not list reports in the '{}' workspace: {e}",
                workspace.display_name
            );
            return Gate::Finished(false);
        }
    };

    let Some(found) = find_report(&reports, report) else {
        println!(
            "{RED_DOT} Could not find report '{report}' in the '{}' workspace.",
            workspace.display_name
        );
        return Gate::Finished(false);
    };

    let decision = UpgradeDecision::classify(found.format.as_ref());
    info!(report_id = %found.id, decision = ?decision, "Classified report format");

    match decision {
        UpgradeDecision::AlreadyUpgraded => {
            println!(
                "{GREEN_DOT} Report '{}' is already in PBIR format — no upgrade needed.",
                found.name
            );
            Gate::Finished(true)
        }
        UpgradeDecision::Unsupported(format) => {
            println!(
                "{RED_DOT} Report '{}' is in '{format}' format. Only PBIRLegacy reports can be upgraded to PBIR.",
                found.name
            );
            Gate::Finished(false)
        }
        UpgradeDecision::Eligible if scan_only => {
            println!(
                "{YELLOW_DOT} Report '{}' is in PBIRLegacy format — eligible for upgrade to PBIR.",
                found.name
            );
            Gate::Finished(true)
        }
        UpgradeDecision::Eligible => Gate::Upgrade(UpgradeTarget {
            report: found.clone(),
            workspace,
        }),
    }
}

/// Polls the reports listing until `report_id` shows up as PBIR.
///
/// Returns false on timeout; the conversion may still be running server-side.
pub(crate) async fn verify_upgrade(
    ops: &dyn FabricOps,
    workspace: &Workspace,
    report_id: &str,
    poll: &PollConfig,
) -> bool {
    let limit = poll.time_limit.as_secs();

    let outcome = poll_until(
        poll,
        |tick| async move {
            println!(
                "{IN_PROGRESS} Poll #{} — {}s / {limit}s elapsed...",
                tick.attempt,
                tick.elapsed.as_secs()
            );
            ops.list_reports(&workspace.id).await
        },
        |reports| {
            reports
                .iter()
                .any(|r| r.id.eq_ignore_ascii_case(report_id) && r.format == Some(ReportFormat::Pbir))
        },
    )
    .await;

    match outcome {
        PollOutcome::Confirmed { value, elapsed, .. } => {
            let name = value
                .iter()
                .find(|r| r.id.eq_ignore_ascii_case(report_id))
                .map(|r| r.name.clone())
                .unwrap_or_else(|| report_id.to_string());
            info!(report_id, elapsed_secs = elapsed.as_secs(), "Upgrade verified");
            println!(
                "{GREEN_DOT} The '{name}' report in the '{}' workspace has been upgraded to PBIR format ({}s).",
                workspace.display_name,
                elapsed.as_secs()
            );
            true
        }
        PollOutcome::TimedOut { attempts, .. } => {
            warn!(report_id, attempts, "Upgrade not verified within the polling budget");
            println!(
                "{WARNING} The report in the '{}' workspace could not be verified as PBIR within {limit}s.  It may still be processing — please check the workspace manually.",
                workspace.display_name
            );
            false
        }
    }
}
