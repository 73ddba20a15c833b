//! Validated requests against the remote content generation endpoint.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::ConfigProperties;
use crate::error::ASError;
use crate::http::Request;
use crate::io::{HttpResponse, HttpRunner};
use crate::json_loads;
use crate::schema::Schema;
use crate::Result;

/// A single named remote generation operation bound to an output schema.
#[derive(Clone, Debug)]
pub struct Flow {
    name: &'static str,
    output: Schema,
}

impl Flow {
    pub fn new(name: &'static str, output: Schema) -> Self {
        Flow { name, output }
    }

    pub fn name(&self) -> &str {
        self.name
    }
}

/// Dispatches one outbound call per invocation and hands back a payload that
/// structurally matches the flow's output schema. Retries, if any, belong to
/// the caller.
#[derive(Clone)]
pub struct RemoteContentFetcher<R> {
    runner: Arc<R>,
    config: Arc<dyn ConfigProperties>,
}

impl<R: HttpRunner<Response = HttpResponse>> RemoteContentFetcher<R> {
    pub fn new(runner: Arc<R>, config: Arc<dyn ConfigProperties>) -> Self {
        RemoteContentFetcher { runner, config }
    }

    pub fn fetch<T: Serialize>(&self, flow: &Flow, inputs: &T) -> Result<Value> {
        let endpoint = self.config.generator_endpoint();
        let url = format!("{}/{}", endpoint.trim_end_matches('/'), flow.name);
        debug!("dispatching flow {} to {}", flow.name, url);
        let mut request: Request<&T> = Request::builder().url(url).body(inputs).build()?;
        request.set_header("Content-Type", "application/json");
        let response = self.runner.run(&mut request)?;
        if response.is_success() {
            let payload = json_loads(&response.body).map_err(|err| {
                ASError::SchemaViolation(format!(
                    "flow {} response is not valid JSON: {}",
                    flow.name, err
                ))
            })?;
            // The remote signals an explicit decline with an error field in an
            // otherwise success-shaped body.
            if let Some(message) = refusal_message(&payload) {
                return Err(ASError::RemoteRefusal(message).into());
            }
            flow.output.validate(&payload)?;
            return Ok(payload);
        }
        match response.status {
            400..=499 => Err(ASError::RemoteRefusal(format!(
                "flow {} declined with status {}: {}",
                flow.name, response.status, response.body
            ))
            .into()),
            _ => Err(ASError::NetworkError(format!(
                "flow {} endpoint returned status {}",
                flow.name, response.status
            ))
            .into()),
        }
    }
}

fn refusal_message(payload: &Value) -> Option<String> {
    payload.get("error").map(|error| {
        error
            .as_str()
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| error.to_string())
    })
}
