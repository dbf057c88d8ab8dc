//! HTTP implementation of the audit provider
//!
//! This module handles every request sent to the provider, including:
//! - Building the HTTP client with timeouts and compression
//! - HTTP Basic authentication on each request
//! - Envelope and status-code checking
//! - Mapping of the three logical operations onto provider endpoints

use crate::config::ProviderConfig;
use crate::provider::wire::{ApiResponse, ApiTask, PagesResult, RawPage, ReadyEntry};
use crate::provider::{
    is_success_code, AuditProvider, JobSpec, PagesQuery, ProviderError, ReadyTask, SubmitAck,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

const TASK_POST_PATH: &str = "v3/on_page/task_post";
const TASKS_READY_PATH: &str = "v3/on_page/tasks_ready";
const PAGES_PATH: &str = "v3/on_page/pages";

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Builds an HTTP client for provider requests
///
/// # Arguments
///
/// * `config` - Provider connection settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ProviderConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("crawl-audit/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Audit provider reached over HTTPS with Basic credentials
#[derive(Debug, Clone)]
pub struct HttpAuditProvider {
    client: Client,
    base_url: String,
    login: String,
    password: String,
}

impl HttpAuditProvider {
    /// Creates a provider client from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a provider client around an existing HTTP client
    pub fn with_client(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login: config.login.clone(),
            password: config.password.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends an authenticated request and decodes the response envelope
    ///
    /// Fails on non-2xx HTTP statuses, undecodable bodies and envelope status
    /// codes outside the success range. Task-level codes are left to the caller.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ProviderError> {
        let response = request
            .basic_auth(&self.login, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        let body = response.bytes().await?;
        let envelope: ApiResponse<T> =
            serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        if !is_success_code(envelope.status_code) {
            return Err(ProviderError::Api {
                status_code: envelope.status_code,
                message: envelope.status_message,
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl AuditProvider for HttpAuditProvider {
    async fn submit_job(&self, job: &JobSpec) -> Result<SubmitAck, ProviderError> {
        tracing::debug!(target_url = %job.target, tag = %job.tag, "Posting crawl job");

        let request = self.client.post(self.endpoint(TASK_POST_PATH)).json(&[job]);
        let envelope: ApiResponse<Value> = self.send(request).await?;

        let task = first_task(envelope)?;
        Ok(SubmitAck {
            task_id: task.id,
            status_code: task.status_code,
            status_message: task.status_message,
        })
    }

    async fn list_ready_tasks(&self) -> Result<Vec<ReadyTask>, ProviderError> {
        let request = self.client.get(self.endpoint(TASKS_READY_PATH));
        let envelope: ApiResponse<ReadyEntry> = self.send(request).await?;

        let mut ready = Vec::new();
        for task in envelope.tasks {
            check_task(&task)?;
            for entry in task.result.unwrap_or_default() {
                if entry.id.is_empty() {
                    tracing::debug!(target_url = ?entry.target, "Skipping ready entry without an id");
                    continue;
                }
                ready.push(ReadyTask {
                    id: entry.id,
                    status_message: task.status_message.clone(),
                    result_count: entry.result_count.unwrap_or(0),
                });
            }
        }

        Ok(ready)
    }

    async fn get_job_pages(&self, query: &PagesQuery) -> Result<Vec<RawPage>, ProviderError> {
        let filters: Vec<Value> = query
            .filters
            .iter()
            .map(|f| json!([f.field, f.operator, f.value]))
            .collect();

        let body = json!([{
            "id": query.task_id,
            "limit": query.limit,
            "filters": filters,
            "order_by": query.order_by,
        }]);

        let request = self.client.post(self.endpoint(PAGES_PATH)).json(&body);
        let envelope: ApiResponse<PagesResult> = self.send(request).await?;

        let mut pages = Vec::new();
        for task in envelope.tasks {
            check_task(&task)?;
            for result in task.result.unwrap_or_default() {
                pages.extend(result.items);
            }
        }

        Ok(pages)
    }
}

fn first_task<T>(envelope: ApiResponse<T>) -> Result<ApiTask<T>, ProviderError> {
    envelope
        .tasks
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Decode("response contains no task".to_string()))
}

fn check_task<T>(task: &ApiTask<T>) -> Result<(), ProviderError> {
    if is_success_code(task.status_code) {
        Ok(())
    } else {
        Err(ProviderError::Api {
            status_code: task.status_code,
            message: task.status_message.clone(),
        })
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
