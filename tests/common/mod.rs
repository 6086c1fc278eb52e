//! Fabric / Power BI API mocking infrastructure
//!
//! A wiremock server standing in for both REST surfaces, so the client and the
//! fixers run against deterministic HTTP responses.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbi_fixer::{FabricClient, PollConfig};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "mock-token";
pub const WS_ID: &str = "f089354e-8366-4e18-aea3-4cb4a3a50b48";
pub const REPORT_ID: &str = "5b218778-e7a5-4d73-8187-f10824047715";
pub const DATASET_ID: &str = "cfafbeb1-8037-4d0c-896e-a46fb27ff229";

/// Power BI and Fabric mock server for deterministic testing
pub struct FabricApiMock {
    pub server: MockServer,
    pub base_url: String,
}

impl FabricApiMock {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();

        Self { server, base_url }
    }

    /// Client pointed at the mock for both APIs, with fast LRO polling
    pub fn client(&self) -> FabricClient {
        FabricClient::new(
            TOKEN.to_string(),
            &self.base_url,
            &self.base_url,
            Duration::from_secs(10),
            1000,
            PollConfig::new(Duration::from_secs(5), Duration::from_millis(20)),
        )
        .unwrap()
    }

    pub async fn mock_workspace(&self, display_name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/workspaces/{WS_ID}")))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": WS_ID, "displayName": display_name, "type": "Workspace" })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_workspaces(&self, workspaces: Value) {
        Mock::given(method("GET"))
            .and(path("/v1/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": workspaces })))
            .mount(&self.server)
            .await;
    }

    /// Reports listing answering with `format` for the next `times` reads
    /// (every read when `None`). Earlier mounts take precedence.
    pub async fn mock_reports(&self, format: &str, times: Option<u64>) {
        let mock = Mock::given(method("GET"))
            .and(path(format!("/v1.0/myorg/groups/{WS_ID}/reports")))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "@odata.context": "http://wabi-west-europe-redirect.analysis.windows.net/v1.0/myorg/groups/reports",
                "value": [report_json(format)]
            })));
        let mock = match times {
            Some(times) => mock.up_to_n_times(times),
            None => mock,
        };
        mock.mount(&self.server).await;
    }

    pub async fn mock_dataset(&self, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/myorg/groups/{WS_ID}/datasets/{DATASET_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": DATASET_ID,
                "name": name,
                "configuredBy": "owner@contoso.com",
                "isRefreshable": true
            })))
            .mount(&self.server)
            .await;
    }

    /// getDefinition finishing synchronously with 200
    pub async fn mock_report_definition(&self, parts: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/v1/workspaces/{WS_ID}/reports/{REPORT_ID}/getDefinition")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "definition": { "parts": parts } })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// updateDefinition accepted as a long-running operation
    pub async fn mock_update_report_definition_lro(&self, operation_id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/v1/workspaces/{WS_ID}/reports/{REPORT_ID}/updateDefinition")))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("x-ms-operation-id", operation_id)
                    .insert_header(
                        "Location",
                        format!("{}/v1/operations/{operation_id}", self.base_url).as_str(),
                    ),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Operation status: `Running` for `running_reads` reads, then `final_status`
    pub async fn mock_operation(&self, operation_id: &str, running_reads: u64, final_status: &str) {
        if running_reads > 0 {
            Mock::given(method("GET"))
                .and(path(format!("/v1/operations/{operation_id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "status": "Running",
                    "percentComplete": 50
                })))
                .up_to_n_times(running_reads)
                .mount(&self.server)
                .await;
        }

        let mut body = json!({ "status": final_status, "percentComplete": 100 });
        if final_status == "Failed" {
            body["error"] = json!({ "errorCode": "InvalidDefinition", "message": "The definition is invalid" });
        }
        Mock::given(method("GET"))
            .and(path(format!("/v1/operations/{operation_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_operation_result(&self, operation_id: &str, result: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/operations/{operation_id}/result")))
            .respond_with(ResponseTemplate::new(200).set_body_json(result))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_embed_token(&self) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1.0/myorg/groups/{WS_ID}/reports/{REPORT_ID}/GenerateToken"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "H4sIAAAAAAAEAB2Wtw6E",
                "tokenId": "4b76f5ed-5a06-4150-8d1b-60f8e4c186f4",
                "expiration": "2026-10-18T13:00:00Z"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_semantic_model_definition(&self, model: Value) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1/workspaces/{WS_ID}/semanticModels/{DATASET_ID}/getDefinition"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "definition": { "parts": [bim_part(model), pbism_part()] }
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// updateDefinition on the semantic model, expected exactly `times` times
    pub async fn mock_update_semantic_model_definition(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1/workspaces/{WS_ID}/semanticModels/{DATASET_ID}/updateDefinition"
            )))
            .respond_with(ResponseTemplate::new(200))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Bodies of the requests the mock received on `request_path`
    pub async fn request_bodies(&self, request_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }
}

pub fn report_json(format: &str) -> Value {
    json!({
        "id": REPORT_ID,
        "reportType": "PowerBIReport",
        "name": "Sales",
        "format": format,
        "webUrl": format!("https://app.powerbi.com/groups/{WS_ID}/reports/{REPORT_ID}"),
        "embedUrl": format!("https://app.powerbi.com/reportEmbed?reportId={REPORT_ID}&groupId={WS_ID}"),
        "datasetId": DATASET_ID,
        "datasetWorkspaceId": WS_ID
    })
}

pub fn report_parts() -> Value {
    json!([
        { "path": "report.json", "payload": STANDARD.encode(r#"{"config":"{}"}"#), "payloadType": "InlineBase64" },
        { "path": "definition.pbir", "payload": STANDARD.encode(r#"{"version":"1.0"}"#), "payloadType": "InlineBase64" }
    ])
}

pub fn bim_part(model: Value) -> Value {
    let bim = json!({ "name": "Sales Model", "compatibilityLevel": 1567, "model": model });
    json!({ "path": "model.bim", "payload": STANDARD.encode(bim.to_string()), "payloadType": "InlineBase64" })
}

fn pbism_part() -> Value {
    json!({ "path": "definition.pbism", "payload": STANDARD.encode(r#"{"version":"4.0"}"#), "payloadType": "InlineBase64" })
}

/// Decoded `model.bim` from an updateDefinition request body
pub fn decode_bim(body: &Value) -> Value {
    let parts = body["definition"]["parts"].as_array().unwrap();
    let bim = parts.iter().find(|p| p["path"] == "model.bim").unwrap();
    let raw = STANDARD.decode(bim["payload"].as_str().unwrap()).unwrap();
    serde_json::from_slice(&raw).unwrap()
}
