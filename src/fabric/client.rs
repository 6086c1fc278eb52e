use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(test)]
use mockall::automock;

use super::errors::FabricError;
use super::types::{
    Dataset, DefinitionEnvelope, EmbedToken, ItemDefinition, OperationState, Report, ValueList,
    Workspace,
};
use crate::config::FixerConfig;
use crate::observability::api_metrics;
use crate::poll::{poll_until, PollConfig, PollOutcome};

/// Remote operations the fixers depend on. Implemented by [`FabricClient`] and
/// mocked in tests to count mutating calls.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FabricOps: Send + Sync {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, FabricError>;
    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, FabricError>;
    async fn list_reports(&self, workspace_id: &str) -> Result<Vec<Report>, FabricError>;
    async fn get_dataset(&self, workspace_id: &str, dataset_id: &str) -> Result<Dataset, FabricError>;
    async fn get_report_definition(
        &self,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<ItemDefinition, FabricError>;
    async fn update_report_definition(
        &self,
        workspace_id: &str,
        report_id: &str,
        definition: &ItemDefinition,
    ) -> Result<(), FabricError>;
    async fn generate_embed_token(
        &self,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<EmbedToken, FabricError>;
    async fn get_semantic_model_definition(
        &self,
        workspace_id: &str,
        dataset_id: &str,
    ) -> Result<ItemDefinition, FabricError>;
    async fn update_semantic_model_definition(
        &self,
        workspace_id: &str,
        dataset_id: &str,
        definition: &ItemDefinition,
    ) -> Result<(), FabricError>;
}

/// HTTP client for the Power BI and Fabric REST APIs with bearer auth and a
/// client-side request rate limit.
#[derive(Debug)]
pub struct FabricClient {
    http: Client,
    powerbi_base_url: String,
    fabric_base_url: String,
    token: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    lro_poll: PollConfig,
}

impl FabricClient {
    pub fn new(
        token: String,
        powerbi_base_url: &str,
        fabric_base_url: &str,
        request_timeout: Duration,
        requests_per_second: u32,
        lro_poll: PollConfig,
    ) -> Result<Self, FabricError> {
        if token.trim().is_empty() {
            return Err(FabricError::TokenNotFound);
        }

        let http = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("pbi-fixer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FabricError::Transport {
                url: fabric_base_url.to_string(),
                source,
            })?;

        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            http,
            powerbi_base_url: powerbi_base_url.trim_end_matches('/').to_string(),
            fabric_base_url: fabric_base_url.trim_end_matches('/').to_string(),
            token,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            lro_poll,
        })
    }

    pub fn from_config(config: &FixerConfig) -> Result<Self, FabricError> {
        let token = config
            .api
            .access_token
            .clone()
            .ok_or(FabricError::TokenNotFound)?;

        Self::new(
            token,
            &config.api.powerbi_base_url,
            &config.api.fabric_base_url,
            Duration::from_secs(config.api.request_timeout_seconds),
            config.api.requests_per_second,
            PollConfig::new(
                Duration::from_secs(config.polling.time_limit_seconds),
                Duration::from_secs(config.polling.lro_interval_seconds),
            ),
        )
    }

    fn powerbi_url(&self, path: &str) -> String {
        format!("{}{}", self.powerbi_base_url, path)
    }

    fn fabric_url(&self, path: &str) -> String {
        format!("{}{}", self.fabric_base_url, path)
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response, FabricError> {
        self.rate_limiter.until_ready().await;
        api_metrics().record_request();

        debug!(method = %method, url = %url, "Sending API request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| {
            api_metrics().record_error();
            FabricError::Transport {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(method = %method, url = %url, status = status.as_u16(), "API request succeeded");
            return Ok(response);
        }

        api_metrics().record_error();
        if status == StatusCode::TOO_MANY_REQUESTS {
            api_metrics().record_throttled();
        }
        let text = response.text().await.unwrap_or_default();
        warn!(method = %method, url = %url, status = status.as_u16(), "API request failed");
        Err(FabricError::from_response_body(
            method.as_str(),
            url,
            status.as_u16(),
            &text,
        ))
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, FabricError> {
        response.json::<T>().await.map_err(|e| FabricError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FabricError> {
        let response = self.send(Method::GET, url, None).await?;
        Self::decode(url, response).await
    }

    /// POSTs to a Fabric endpoint that may answer `202 Accepted` and finish as
    /// a long-running operation. Returns the result body when `want_result` is
    /// set, following the operation to its `/result` document if needed.
    async fn post_lro(
        &self,
        url: &str,
        body: Option<&Value>,
        want_result: bool,
    ) -> Result<Option<Value>, FabricError> {
        let response = self.send(Method::POST, url, body).await?;

        if response.status() != StatusCode::ACCEPTED {
            if !want_result {
                return Ok(None);
            }
            let text = response.text().await.map_err(|source| FabricError::Transport {
                url: url.to_string(),
                source,
            })?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            return serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| FabricError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                });
        }

        let operation_id = operation_id(&response).ok_or_else(|| FabricError::Decode {
            url: url.to_string(),
            message: "202 Accepted without an operation id or Location header".to_string(),
        })?;
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        info!(operation_id = %operation_id, "Waiting for long-running operation");
        let state = self.wait_for_operation(&operation_id, retry_after).await?;

        if !state.succeeded() {
            let message = state
                .error
                .as_ref()
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("no error details returned")
                .to_string();
            return Err(FabricError::OperationFailed {
                operation_id,
                status: state.status,
                message,
            });
        }

        if !want_result {
            return Ok(None);
        }

        let result_url = self.fabric_url(&format!("/v1/operations/{operation_id}/result"));
        self.get_json::<Value>(&result_url).await.map(Some)
    }

    async fn wait_for_operation(
        &self,
        operation_id: &str,
        retry_after: Option<Duration>,
    ) -> Result<OperationState, FabricError> {
        let url = self.fabric_url(&format!("/v1/operations/{operation_id}"));
        let config = operation_poll(self.lro_poll, retry_after);

        let outcome = poll_until(
            &config,
            |tick| {
                let url = url.clone();
                async move {
                    debug!(attempt = tick.attempt, "Checking operation status");
                    self.get_json::<OperationState>(&url).await
                }
            },
            OperationState::is_terminal,
        )
        .await;

        match outcome {
            PollOutcome::Confirmed { value, .. } => Ok(value),
            PollOutcome::TimedOut { .. } => Err(FabricError::OperationTimeout {
                operation_id: operation_id.to_string(),
                seconds: config.time_limit.as_secs(),
            }),
        }
    }
}

/// Poll settings for one operation. `Retry-After` can stretch the interval but
/// never shrink it below the configured one.
fn operation_poll(base: PollConfig, retry_after: Option<Duration>) -> PollConfig {
    let mut config = base;
    if let Some(retry_after) = retry_after {
        config.interval = retry_after.max(base.interval).min(base.time_limit);
    }
    config
}

fn operation_id(response: &Response) -> Option<String> {
    let headers = response.headers();
    if let Some(id) = headers.get("x-ms-operation-id").and_then(|v| v.to_str().ok()) {
        return Some(id.to_string());
    }
    headers
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|location| {
            location
                .split('?')
                .next()
                .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        })
}

fn decode_definition(url: &str, value: Option<Value>) -> Result<ItemDefinition, FabricError> {
    let Some(value) = value else {
        return Ok(ItemDefinition::default());
    };
    serde_json::from_value::<DefinitionEnvelope>(value)
        .map(|envelope| envelope.definition)
        .map_err(|e| FabricError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
}

#[async_trait]
impl FabricOps for FabricClient {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, FabricError> {
        let url = self.fabric_url("/v1/workspaces");
        let list: ValueList<Workspace> = self.get_json(&url).await?;
        Ok(list.value)
    }

    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, FabricError> {
        let url = self.fabric_url(&format!("/v1/workspaces/{workspace_id}"));
        self.get_json(&url).await
    }

    async fn list_reports(&self, workspace_id: &str) -> Result<Vec<Report>, FabricError> {
        let url = self.powerbi_url(&format!("/v1.0/myorg/groups/{workspace_id}/reports"));
        let list: ValueList<Report> = self.get_json(&url).await?;
        Ok(list.value)
    }

    async fn get_dataset(&self, workspace_id: &str, dataset_id: &str) -> Result<Dataset, FabricError> {
        let url = self.powerbi_url(&format!(
            "/v1.0/myorg/groups/{workspace_id}/datasets/{dataset_id}"
        ));
        self.get_json(&url).await
    }

    async fn get_report_definition(
        &self,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<ItemDefinition, FabricError> {
        let url = self.fabric_url(&format!(
            "/v1/workspaces/{workspace_id}/reports/{report_id}/getDefinition"
        ));
        let result = self.post_lro(&url, None, true).await?;
        decode_definition(&url, result)
    }

    async fn update_report_definition(
        &self,
        workspace_id: &str,
        report_id: &str,
        definition: &ItemDefinition,
    ) -> Result<(), FabricError> {
        let url = self.fabric_url(&format!(
            "/v1/workspaces/{workspace_id}/reports/{report_id}/updateDefinition"
        ));
        let body = json!({ "definition": { "parts": definition.parts } });
        self.post_lro(&url, Some(&body), false).await?;
        Ok(())
    }

    async fn generate_embed_token(
        &self,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<EmbedToken, FabricError> {
        let url = self.powerbi_url(&format!(
            "/v1.0/myorg/groups/{workspace_id}/reports/{report_id}/GenerateToken"
        ));
        let body = json!({ "accessLevel": "Edit", "allowSaveAs": false });
        let response = self.send(Method::POST, &url, Some(&body)).await?;
        Self::decode(&url, response).await
    }

    async fn get_semantic_model_definition(
        &self,
        workspace_id: &str,
        dataset_id: &str,
    ) -> Result<ItemDefinition, FabricError> {
        let url = self.fabric_url(&format!(
            "/v1/workspaces/{workspace_id}/semanticModels/{dataset_id}/getDefinition?format=TMSL"
        ));
        let result = self.post_lro(&url, None, true).await?;
        decode_definition(&url, result)
    }

    async fn update_semantic_model_definition(
        &self,
        workspace_id: &str,
        dataset_id: &str,
        definition: &ItemDefinition,
    ) -> Result<(), FabricError> {
        let url = self.fabric_url(&format!(
            "/v1/workspaces/{workspace_id}/semanticModels/{dataset_id}/updateDefinition"
        ));
        let body = json!({ "definition": { "parts": definition.parts } });
        self.post_lro(&url, Some(&body), false).await?;
        Ok(())
    }
}
