use thiserror::Error;

#[derive(Debug, Error)]
pub enum FabricError {
    #[error("No access token configured. Set PBI_FIXER_ACCESS_TOKEN or api.access_token in pbi-fixer.toml")]
    TokenNotFound,
    #[error("No workspace given and no default workspace configured (workspace.default / PBI_FIXER_DEFAULT_WORKSPACE)")]
    NoWorkspace,
    #[error("Workspace '{0}' could not be found")]
    WorkspaceNotFound(String),
    #[error("HTTP {status} from {method} {url}: {message}")]
    Http {
        method: String,
        url: String,
        status: u16,
        message: String,
    },
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Operation {operation_id} finished with status '{status}': {message}")]
    OperationFailed {
        operation_id: String,
        status: String,
        message: String,
    },
    #[error("Operation {operation_id} did not finish within {seconds}s")]
    OperationTimeout { operation_id: String, seconds: u64 },
    #[error("Invalid definition payload: {0}")]
    InvalidPayload(String),
    #[error("The model connection is read-only")]
    ReadOnlyModel,
    #[error("Embed save hook failed: {0}")]
    EmbedHook(String),
}

impl FabricError {
    /// Builds an `Http` error from a failed response body, pulling the message
    /// out of the Fabric (`{"message": ..}`) or Power BI (`{"error": {"message": ..}}`)
    /// error envelopes when present.
    pub fn from_response_body(method: &str, url: &str, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .or_else(|| value.get("error").and_then(|e| e.get("message")))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.chars().count() > 200 {
                    format!("{}...", trimmed.chars().take(200).collect::<String>())
                } else {
                    trimmed.to_string()
                }
            });

        FabricError::Http {
            method: method.to_string(),
            url: url.to_string(),
            status,
            message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FabricError::Http { status: 404, .. })
    }
}
