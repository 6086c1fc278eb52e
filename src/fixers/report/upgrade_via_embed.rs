//! Upgrade a report to PBIR by saving it through the embed SDK.
//!
//! An edit-capable embed token is generated and handed, with the report's embed
//! URL, to the embed-save hook. Saving the embedded report makes the service
//! re-store it in the workspace's current format.

use tracing::{info, instrument};

use super::{gate_upgrade, verify_upgrade, Gate};
use crate::external::{EmbedSaveRequest, EmbedSaveTrigger};
use crate::fabric::FabricOps;
use crate::fixers::FixerSettings;
use crate::icons::{IN_PROGRESS, RED_DOT};

#[instrument(skip(ops, trigger, settings))]
pub async fn fix_upgrade_to_pbir_via_embed(
    ops: &dyn FabricOps,
    trigger: &dyn EmbedSaveTrigger,
    settings: &FixerSettings,
    report: &str,
    workspace: Option<&str>,
    scan_only: bool,
) -> bool {
    let target = match gate_upgrade(ops, settings, report, workspace, scan_only).await {
        Gate::Finished(result) => return result,
        Gate::Upgrade(target) => target,
    };
    let name = &target.report.name;
    let workspace_id = &target.workspace.id;
    let report_id = &target.report.id;

    let Some(embed_url) = target.report.embed_url.clone() else {
        println!("{RED_DOT} Report '{name}' has no embed URL — cannot upgrade via embedded save.");
        return false;
    };

    println!("{IN_PROGRESS} Upgrading '{name}' from PBIRLegacy to PBIR via embedded save...");

    println!("{IN_PROGRESS} Generating embed token...");
    let token = match ops.generate_embed_token(workspace_id, report_id).await {
        Ok(token) => token,
        Err(e) => {
            println!("{RED_DOT} Failed to generate an embed token for '{name}': {e}");
            return false;
        }
    };

    println!(
        "{IN_PROGRESS} Triggering embedded save (token expires {})...",
        token.expiration.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let request = EmbedSaveRequest {
        embed_url,
        report_id: report_id.clone(),
        workspace_id: workspace_id.clone(),
        token: token.token,
    };
    if let Err(e) = trigger.trigger_save(&request).await {
        println!("{RED_DOT} Embedded save failed for '{name}': {e}");
        return false;
    }
    info!(report_id = %report_id, token_id = %token.token_id, "Embedded save triggered");

    println!("{IN_PROGRESS} Embedded save completed — checking format...");
    verify_upgrade(ops, &target.workspace, report_id, &settings.embed_poll()).await
}
