use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format reported by the Power BI reports listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportFormat {
    Pbir,
    PbirLegacy,
    Other(String),
}

impl ReportFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ReportFormat::Pbir => "PBIR",
            ReportFormat::PbirLegacy => "PBIRLegacy",
            ReportFormat::Other(value) => value,
        }
    }
}

impl From<&str> for ReportFormat {
    fn from(value: &str) -> Self {
        match value {
            "PBIR" => ReportFormat::Pbir,
            "PBIRLegacy" => ReportFormat::PbirLegacy,
            other => ReportFormat::Other(other.to_string()),
        }
    }
}

impl From<String> for ReportFormat {
    fn from(value: String) -> Self {
        ReportFormat::from(value.as_str())
    }
}

impl From<ReportFormat> for String {
    fn from(value: ReportFormat) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `GET /v1.0/myorg/groups/{ws}/reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub format: Option<ReportFormat>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub dataset_workspace_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub name: String,
}

/// `{"value": [...]}` envelope shared by the list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionPart {
    pub path: String,
    pub payload: String,
    #[serde(default = "default_payload_type")]
    pub payload_type: String,
}

fn default_payload_type() -> String {
    "InlineBase64".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub parts: Vec<DefinitionPart>,
}

impl ItemDefinition {
    pub fn part_paths(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.path.as_str()).collect()
    }

    pub fn part(&self, path: &str) -> Option<&DefinitionPart> {
        self.parts.iter().find(|p| p.path == path)
    }
}

/// Body of `getDefinition` results and `updateDefinition` requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionEnvelope {
    #[serde(default)]
    pub definition: ItemDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedToken {
    pub token: String,
    pub token_id: String,
    pub expiration: chrono::DateTime<chrono::Utc>,
}

/// Status document of a Fabric long-running operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationState {
    pub status: String,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "Succeeded" | "Failed" | "Undefined")
    }

    pub fn succeeded(&self) -> bool {
        self.status == "Succeeded"
    }
}

/// True when `value` parses as a GUID, in which case it is treated as an id
/// rather than a display name.
pub fn is_identifier(value: &str) -> bool {
    uuid::Uuid::parse_str(value.trim()).is_ok()
}
