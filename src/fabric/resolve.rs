// Name-or-id resolution for workspaces and reports

use tracing::debug;

use super::client::FabricOps;
use super::errors::FabricError;
use super::types::{is_identifier, Report, Workspace};

/// Resolves `workspace` (or `default` when absent) to a workspace record.
///
/// A GUID is looked up directly; anything else is matched against display
/// names, exactly first and then case-insensitively.
pub async fn resolve_workspace(
    ops: &dyn FabricOps,
    workspace: Option<&str>,
    default: Option<&str>,
) -> Result<Workspace, FabricError> {
    let requested = workspace
        .or(default)
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .ok_or(FabricError::NoWorkspace)?;

    if is_identifier(requested) {
        debug!(workspace_id = requested, "Resolving workspace by id");
        return ops.get_workspace(requested).await.map_err(|e| {
            if e.is_not_found() {
                FabricError::WorkspaceNotFound(requested.to_string())
            } else {
                e
            }
        });
    }

    debug!(workspace_name = requested, "Resolving workspace by name");
    let workspaces = ops.list_workspaces().await?;
    let exact = workspaces.iter().find(|w| w.display_name == requested);
    let found = exact.or_else(|| {
        workspaces
            .iter()
            .find(|w| w.display_name.eq_ignore_ascii_case(requested))
    });

    found
        .cloned()
        .ok_or_else(|| FabricError::WorkspaceNotFound(requested.to_string()))
}

/// Finds a report in a listing by id (case-insensitive) or by exact name.
pub fn find_report<'a>(reports: &'a [Report], report: &str) -> Option<&'a Report> {
    let report = report.trim();
    if is_identifier(report) {
        reports.iter().find(|r| r.id.eq_ignore_ascii_case(report))
    } else {
        reports.iter().find(|r| r.name == report)
    }
}
