//! Scoped connection to a semantic model.
//!
//! The model is loaded from its TMSL definition (`model.bim`) and exposed as a
//! [`TabularModel`]. [`with_semantic_model`] hands the model to a closure and
//! releases the connection afterwards on every path: a writable connection
//! whose model changed pushes the definition back, a read-only one never does.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, info};

use super::DataSourceVersion;
use crate::fabric::{FabricError, FabricOps, ItemDefinition};

pub const MODEL_BIM_PATH: &str = "model.bim";
const DATA_SOURCE_VERSION_KEY: &str = "defaultPowerBIDataSourceVersion";

#[derive(Debug)]
pub struct TabularModel {
    definition: ItemDefinition,
    bim_index: usize,
    bim: Value,
    readonly: bool,
    modified: bool,
}

impl TabularModel {
    pub fn from_definition(definition: ItemDefinition, readonly: bool) -> Result<Self, FabricError> {
        let bim_index = definition
            .parts
            .iter()
            .position(|p| p.path == MODEL_BIM_PATH)
            .ok_or_else(|| {
                FabricError::InvalidPayload(format!(
                    "definition has no '{MODEL_BIM_PATH}' part (parts: {})",
                    definition.part_paths().join(", ")
                ))
            })?;

        let raw = STANDARD
            .decode(definition.parts[bim_index].payload.trim())
            .map_err(|e| FabricError::InvalidPayload(format!("{MODEL_BIM_PATH} is not base64: {e}")))?;
        let bim: Value = serde_json::from_slice(&raw)
            .map_err(|e| FabricError::InvalidPayload(format!("{MODEL_BIM_PATH} is not JSON: {e}")))?;

        if !bim.get("model").is_some_and(Value::is_object) {
            return Err(FabricError::InvalidPayload(format!(
                "{MODEL_BIM_PATH} has no 'model' object"
            )));
        }

        Ok(Self {
            definition,
            bim_index,
            bim,
            readonly,
            modified: false,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.bim.get("name").and_then(Value::as_str)
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// `DefaultPowerBIDataSourceVersion`; an absent property is the service
    /// default, `PowerBI_V1`.
    pub fn default_power_bi_data_source_version(&self) -> DataSourceVersion {
        self.bim["model"]
            .get(DATA_SOURCE_VERSION_KEY)
            .and_then(Value::as_str)
            .map(DataSourceVersion::from)
            .unwrap_or(DataSourceVersion::PowerBiV1)
    }

    pub fn set_default_power_bi_data_source_version(
        &mut self,
        version: DataSourceVersion,
    ) -> Result<(), FabricError> {
        if self.readonly {
            return Err(FabricError::ReadOnlyModel);
        }
        if self.default_power_bi_data_source_version() == version {
            return Ok(());
        }

        if let Some(model) = self.bim.get_mut("model").and_then(Value::as_object_mut) {
            model.insert(
                DATA_SOURCE_VERSION_KEY.to_string(),
                Value::String(version.tmsl_name().to_string()),
            );
            self.modified = true;
        }
        Ok(())
    }

    /// The definition with `model.bim` re-encoded from the current model.
    pub fn to_definition(&self) -> Result<ItemDefinition, FabricError> {
        let bytes = serde_json::to_vec_pretty(&self.bim)
            .map_err(|e| FabricError::InvalidPayload(e.to_string()))?;
        let mut definition = self.definition.clone();
        definition.parts[self.bim_index].payload = STANDARD.encode(bytes);
        Ok(definition)
    }
}

/// Opens the model behind `dataset_id`, runs `f` against it and releases the
/// connection, saving changes unless the connection is read-only.
pub async fn with_semantic_model<F, R>(
    ops: &dyn FabricOps,
    workspace_id: &str,
    dataset_id: &str,
    readonly: bool,
    f: F,
) -> Result<R, FabricError>
where
    F: FnOnce(&mut TabularModel) -> R,
{
    debug!(workspace_id, dataset_id, readonly, "Connecting to semantic model");
    let definition = ops
        .get_semantic_model_definition(workspace_id, dataset_id)
        .await?;
    let mut model = TabularModel::from_definition(definition, readonly)?;

    let result = f(&mut model);

    if model.is_modified() && !model.is_readonly() {
        info!(
            workspace_id,
            dataset_id,
            model = model.name().unwrap_or(dataset_id),
            "Saving semantic model changes"
        );
        let definition = model.to_definition()?;
        ops.update_semantic_model_definition(workspace_id, dataset_id, &definition)
            .await?;
    }
    debug!(workspace_id, dataset_id, "Semantic model connection released");

    Ok(result)
}
