// Tabular object model access over semantic model definitions

pub mod connection;

pub use connection::{with_semantic_model, TabularModel};

use std::fmt;

/// Values of the model's `DefaultPowerBIDataSourceVersion` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceVersion {
    PowerBiV1,
    PowerBiV2,
    PowerBiV3,
    Other(String),
}

impl DataSourceVersion {
    /// Name as it appears in TMSL (`model.bim`).
    pub fn tmsl_name(&self) -> &str {
        match self {
            DataSourceVersion::PowerBiV1 => "powerBI_V1",
            DataSourceVersion::PowerBiV2 => "powerBI_V2",
            DataSourceVersion::PowerBiV3 => "powerBI_V3",
            DataSourceVersion::Other(value) => value,
        }
    }
}

impl From<&str> for DataSourceVersion {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "powerbi_v1" => DataSourceVersion::PowerBiV1,
            "powerbi_v2" => DataSourceVersion::PowerBiV2,
            "powerbi_v3" => DataSourceVersion::PowerBiV3,
            _ => DataSourceVersion::Other(value.to_string()),
        }
    }
}

impl fmt::Display for DataSourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceVersion::PowerBiV1 => f.write_str("PowerBI_V1"),
            DataSourceVersion::PowerBiV2 => f.write_str("PowerBI_V2"),
            DataSourceVersion::PowerBiV3 => f.write_str("PowerBI_V3"),
            DataSourceVersion::Other(value) => f.write_str(value),
        }
    }
}
