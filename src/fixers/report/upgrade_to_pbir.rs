//! Upgrade a report to PBIR through a definition round-trip.
//!
//! The report definition is fetched with `getDefinition` and pushed back
//! unchanged with `updateDefinition`. The service stores the pushed definition
//! in the workspace's current format, which converts a PBIRLegacy report when
//! the workspace has the enhanced report format enabled.

use tracing::{info, instrument};

use super::{gate_upgrade, verify_upgrade, Gate};
use crate::fabric::FabricOps;
use crate::fixers::FixerSettings;
use crate::icons::{IN_PROGRESS, RED_DOT};

/// Returns true if the report is (or was upgraded to) PBIR, or is eligible in
/// scan-only mode.
#[instrument(skip(ops, settings))]
pub async fn fix_upgrade_to_pbir(
    ops: &dyn FabricOps,
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

    println!("{IN_PROGRESS} Upgrading '{name}' from PBIRLegacy to PBIR...");

    println!("{IN_PROGRESS} Retrieving report definition...");
    let definition = match ops.get_report_definition(workspace_id, report_id).await {
        Ok(definition) => definition,
        Err(e) => {
            println!("{RED_DOT} Failed to get report definition for '{name}': {e}");
            return false;
        }
    };

    if definition.parts.is_empty() {
        println!("{RED_DOT} Report definition for '{name}' returned no parts — cannot upgrade.");
        return false;
    }

    println!(
        "{IN_PROGRESS} Retrieved {} definition part(s): {}",
        definition.parts.len(),
        definition.part_paths().join(", ")
    );

    println!("{IN_PROGRESS} Pushing definition back via updateDefinition...");
    if let Err(e) = ops
        .update_report_definition(workspace_id, report_id, &definition)
        .await
    {
        println!("{RED_DOT} updateDefinition failed for '{name}': {e}");
        return false;
    }
    info!(report_id = %report_id, parts = definition.parts.len(), "Definition pushed back");

    println!("{IN_PROGRESS} updateDefinition completed — checking format...");
    verify_upgrade(ops, &target.workspace, report_id, &settings.definition_poll()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::client::MockFabricOps;
    use crate::fabric::{DefinitionPart, FabricError, ItemDefinition, Workspace};
    use crate::fixers::report::test_support::*;
    use mockall::Sequence;

    fn definition() -> ItemDefinition {
        ItemDefinition {
            format: Some("PBIR-Legacy".to_string()),
            parts: vec![
                DefinitionPart {
                    path: "report.json".to_string(),
                    payload: "eyJjb25maWciOiJ7fSJ9".to_string(),
                    payload_type: "InlineBase64".to_string(),
                },
                DefinitionPart {
                    path: "definition.pbir".to_string(),
                    payload: "eyJ2ZXJzaW9uIjoiMS4wIn0=".to_string(),
                    payload_type: "InlineBase64".to_string(),
                },
            ],
        }
    }

    fn listing_only(format: Option<&'static str>) -> MockFabricOps {
        let mut ops = ops_with_workspace();
        ops.expect_list_reports()
            .times(1)
            .returning(move |_| Ok(vec![report(format)]));
        ops.expect_get_report_definition().never();
        ops.expect_update_report_definition().never();
        ops
    }

    #[tokio::test]
    async fn test_already_pbir_is_a_no_op_success() {
        for scan_only in [true, false] {
            let ops = listing_only(Some("PBIR"));
            let settings = FixerSettings::default();
            assert!(fix_upgrade_to_pbir(&ops, &settings, "Sales", Some(WS_ID), scan_only).await);
        }
    }

    #[tokio::test]
    async fn test_unsupported_formats_never_mutate() {
        for format in [Some("RDL"), Some("PBIX"), Some("Unknown"), None] {
            for scan_only in [true, false] {
                let ops = listing_only(format);
                let settings = FixerSettings::default();
                assert!(!fix_upgrade_to_pbir(&ops, &settings, REPORT_ID, Some(WS_ID), scan_only).await);
            }
        }
    }

    #[tokio::test]
    async fn test_scan_only_reports_eligibility_without_mutating() {
        let ops = listing_only(Some("PBIRLegacy"));
        let settings = FixerSettings::default();
        assert!(fix_upgrade_to_pbir(&ops, &settings, "Sales", Some(WS_ID), true).await);
    }

    #[tokio::test]
    async fn test_missing_report_stops_after_listing() {
        let mut ops = ops_with_workspace();
        ops.expect_list_reports()
            .times(1)
            .returning(|_| Ok(vec![report(Some("PBIRLegacy"))]));
        ops.expect_get_report_definition().never();
        ops.expect_update_report_definition().never();

        let settings = FixerSettings::default();
        assert!(!fix_upgrade_to_pbir(&ops, &settings, "Marketing", Some(WS_ID), false).await);
    }

    #[tokio::test]
    async fn test_unresolvable_workspace_fails_without_listing() {
        let mut ops = MockFabricOps::new();
        ops.expect_list_workspaces().times(1).returning(|| Ok(vec![]));
        ops.expect_list_reports().never();

        let settings = FixerSettings::default();
        assert!(!fix_upgrade_to_pbir(&ops, &settings, "Sales", Some("Nowhere"), false).await);
    }

    #[tokio::test]
    async fn test_default_workspace_is_used_when_none_given() {
        let mut ops = listing_only(Some("PBIR"));
        ops.expect_list_workspaces().never();

        let settings = FixerSettings::default().with_default_workspace(WS_ID);
        assert!(fix_upgrade_to_pbir(&ops, &settings, "Sales", None, false).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_report_round_trips_definition_then_verifies() {
        let mut ops = ops_with_workspace();
        let mut seq = Sequence::new();
        ops.expect_list_reports()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![report(Some("PBIRLegacy"))]));
        ops.expect_get_report_definition()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|ws, id| ws == WS_ID && id == REPORT_ID)
            .returning(|_, _| Ok(definition()));
        ops.expect_update_report_definition()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, _, pushed| *pushed == definition())
            .returning(|_, _, _| Ok(()));
        ops.expect_list_reports()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![report(Some("PBIRLegacy"))]));
        ops.expect_list_reports()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![report(Some("PBIR"))]));

        let settings = FixerSettings::default();
        assert!(fix_upgrade_to_pbir(&ops, &settings, "Sales", Some(WS_ID), false).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unverified_upgrade_returns_false_after_budget() {
        let mut ops = ops_with_workspace();
        ops.expect_get_report_definition()
            .times(1)
            .returning(|_, _| Ok(definition()));
        ops.expect_update_report_definition()
            .times(1)
            .returning(|_, _, _| Ok(()));
        // one gate read plus twenty polls at 3s over 60s
        ops.expect_list_reports()
            .times(21)
            .returning(|_| Ok(vec![report(Some("PBIRLegacy"))]));

        let settings = FixerSettings::default();
        let start = tokio::time::Instant::now();
        assert!(!fix_upgrade_to_pbir(&ops, &settings, "Sales", Some(WS_ID), false).await);
        assert_eq!(start.elapsed(), std::time::Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_empty_definition_is_not_pushed_back() {
        let mut ops = ops_with_workspace();
        ops.expect_list_reports()
            .times(1)
            .returning(|_| Ok(vec![report(Some("PBIRLegacy"))]));
        ops.expect_get_report_definition()
            .times(1)
            .returning(|_, _| Ok(ItemDefinition::default()));
        ops.expect_update_report_definition().never();

        let settings = FixerSettings::default();
        assert!(!fix_upgrade_to_pbir(&ops, &settings, "Sales", Some(WS_ID), false).await);
    }

    #[tokio::test]
    async fn test_api_errors_become_failures() {
        let mut ops = ops_with_workspace();
        ops.expect_list_reports()
            .times(1)
            .returning(|_| Ok(vec![report(Some("PBIRLegacy"))]));
        ops.expect_get_report_definition()
            .times(1)
            .returning(|_, _| Ok(definition()));
        ops.expect_update_report_definition().times(1).returning(|_, _, _| {
            Err(FabricError::Http {
                method: "POST".to_string(),
                url: "/updateDefinition".to_string(),
                status: 400,
                message: "InvalidDefinition".to_string(),
            })
        });

        let settings = FixerSettings::default();
        assert!(!fix_upgrade_to_pbir(&ops, &settings, "Sales", Some(WS_ID), false).await);

        let mut ops = MockFabricOps::new();
        ops.expect_get_workspace().returning(|id| {
            Ok(Workspace {
                id: id.to_string(),
                display_name: "Finance".to_string(),
            })
        });
        ops.expect_list_reports().times(1).returning(|_| {
            Err(FabricError::Http {
                method: "GET".to_string(),
                url: "/reports".to_string(),
                status: 401,
                message: "TokenExpired".to_string(),
            })
        });
        assert!(!fix_upgrade_to_pbir(&ops, &settings, "Sales", Some(WS_ID), false).await);
    }
}
