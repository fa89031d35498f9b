//! JSON-RPC client for the Odoo backend hosting the visit model

use crate::backend::{DashboardBackend, RemoteOperation};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use wfm_core::action::VISIT_MODEL;
use wfm_core::config::BackendConfig;
use wfm_core::{ActionRequest, ActivityEntry, Error, FilterKey, MetricsSnapshot, Result};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
    #[serde(default)]
    data: Option<RpcErrorData>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RpcError {
    fn describe(&self) -> String {
        match &self.data {
            Some(RpcErrorData {
                name: Some(name),
                message: Some(message),
            }) => format!("{name}: {message}"),
            Some(RpcErrorData {
                message: Some(message),
                ..
            }) => message.clone(),
            _ => self.message.clone(),
        }
    }
}

/// Odoo external JSON-RPC client for the visit model
///
/// Authenticates lazily on the first call and reuses the user id afterwards.
#[derive(Clone)]
pub struct OdooRpcClient {
    client: Client,
    endpoint: String,
    database: String,
    login: String,
    password: String,
    uid: std::sync::Arc<OnceCell<i64>>,
    next_id: std::sync::Arc<AtomicU64>,
}

impl std::fmt::Debug for OdooRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooRpcClient")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("login", &self.login)
            .field("uid", &self.uid.get())
            .finish_non_exhaustive()
    }
}

impl OdooRpcClient {
    /// Create a client from backend settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/jsonrpc", config.url.trim_end_matches('/')),
            database: config.database.clone(),
            login: config.login.clone(),
            password: config.password.clone(),
            uid: std::sync::Arc::new(OnceCell::new()),
            next_id: std::sync::Arc::new(AtomicU64::new(1)),
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Authenticated user id, logging in on first use
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the backend refuses the credentials.
    pub async fn uid(&self) -> Result<i64> {
        self.uid
            .get_or_try_init(|| async {
                let result = self
                    .post(
                        "authenticate",
                        "common",
                        "authenticate",
                        json!([self.database, self.login, self.password, {}]),
                    )
                    .await?;

                match result.as_i64() {
                    Some(uid) if uid > 0 => {
                        info!(uid, login = %self.login, database = %self.database, "Authenticated");
                        Ok(uid)
                    }
                    _ => Err(Error::Authentication(format!(
                        "backend refused login {:?} on database {:?}",
                        self.login, self.database
                    ))),
                }
            })
            .await
            .copied()
    }

    /// Call a method of the visit model with positional arguments
    ///
    /// # Errors
    ///
    /// Returns a remote error if the request fails or the backend reports a fault.
    #[instrument(skip_all, fields(operation = %operation))]
    pub async fn call(&self, operation: RemoteOperation, args: Value) -> Result<Value> {
        let uid = self.uid().await?;
        self.post(
            operation.method(),
            "object",
            "execute_kw",
            json!([
                self.database,
                uid,
                self.password,
                VISIT_MODEL,
                operation.method(),
                args
            ]),
        )
        .await
    }

    async fn post(
        &self,
        operation: &str,
        service: &str,
        method: &str,
        args: Value,
    ) -> Result<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: RpcParams {
                service,
                method,
                args,
            },
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::remote_call(operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote_call(operation, format!("HTTP {status}")));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(operation, e.to_string()))?;

        debug!(
            operation,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Backend call finished"
        );

        if let Some(error) = body.error {
            return Err(Error::remote_fault(operation, error.describe()));
        }
        body.result
            .ok_or_else(|| Error::invalid_response(operation, "response has neither result nor error"))
    }

    async fn metrics(&self, operation: RemoteOperation) -> Result<MetricsSnapshot> {
        let value = self.call(operation, json!([])).await?;
        MetricsSnapshot::from_json(&value).ok_or_else(|| {
            Error::invalid_response(operation.method(), format!("expected an object, got {value}"))
        })
    }
}

#[async_trait]
impl DashboardBackend for OdooRpcClient {
    async fn get_dashboard_data(&self) -> Result<MetricsSnapshot> {
        self.metrics(RemoteOperation::GetDashboardData).await
    }

    async fn get_admin_dashboard_data(&self) -> Result<MetricsSnapshot> {
        self.metrics(RemoteOperation::GetAdminDashboardData).await
    }

    async fn get_activity_feed(&self, limit: u32) -> Result<Vec<ActivityEntry>> {
        let operation = RemoteOperation::GetActivityFeed;
        let value = self.call(operation, json!([limit])).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::invalid_response(operation.method(), e.to_string()))
    }

    async fn get_visits_action(&self, filter: FilterKey) -> Result<ActionRequest> {
        let operation = RemoteOperation::GetVisitsAction;
        let value = self.call(operation, json!([filter.as_str()])).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::invalid_response(operation.method(), e.to_string()))
    }

    fn name(&self) -> &str {
        "odoo-jsonrpc"
    }
}
