//! Shared helpers for the dashboard integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use wfm_core::ActivityEntry;
use wfm_core::config::BackendConfig;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches a JSON-RPC call by service method, or by model method for `execute_kw`
pub struct RpcCall(pub &'static str);

impl Match for RpcCall {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = request.body_json::<Value>() else {
            return false;
        };
        let params = &body["params"];
        match params["method"].as_str() {
            Some("execute_kw") => params["args"][4].as_str() == Some(self.0),
            Some(other) => other == self.0,
            None => false,
        }
    }
}

/// Backend settings pointing at `server`
pub fn backend_config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        url: server.uri(),
        database: "wfm_test".to_string(),
        login: "coordinator@example.com".to_string(),
        password: "secret".to_string(),
        request_timeout_secs: Some(5),
    }
}

/// JSON-RPC success envelope
pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

/// JSON-RPC error envelope the way Odoo reports server exceptions
pub fn rpc_fault(name: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {
            "code": 200,
            "message": "Odoo Server Error",
            "data": {"name": name, "message": message},
        },
    }))
}

/// Answer `common.authenticate` with `uid`
pub async fn mount_login(server: &MockServer, uid: Value) {
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(RpcCall("authenticate"))
        .respond_with(rpc_result(uid))
        .mount(server)
        .await;
}

/// Answer `execute_kw` calls of `model_method`
pub async fn mount_method(server: &MockServer, model_method: &'static str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(RpcCall(model_method))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Activity entry with an Odoo timestamp and message
pub fn activity(id: i64, date: &str, message: &str) -> ActivityEntry {
    serde_json::from_value(json!({"id": id, "date": date, "message": message}))
        .unwrap_or_default()
}
