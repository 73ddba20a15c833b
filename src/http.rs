use crate::config::ConfigProperties;
use crate::error::ASError;
use crate::io::{HttpResponse, HttpRunner};
use crate::Result;
use serde::Serialize;
use std::collections::{hash_map, HashMap};
use std::time::Duration;
use ureq::Error;

#[derive(Clone, Debug, Default)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Headers(HashMap::new())
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(key)
    }

    pub fn iter(&self) -> hash_map::Iter<String, String> {
        self.0.iter()
    }
}

/// A single generation request. The remote interface is one JSON payload
/// posted to a flow endpoint, one structured response back.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Request<T> {
    #[builder(setter(into, strip_option), default)]
    body: Option<T>,
    #[builder(default)]
    headers: Headers,
    #[builder(setter(into))]
    url: String,
}

impl<T> Request<T> {
    pub fn builder() -> RequestBuilder<T> {
        RequestBuilder::default()
    }

    pub fn new(url: &str) -> Self {
        Request {
            body: None,
            headers: Headers::new(),
            url: url.to_string(),
        }
    }

    pub fn with_body(mut self, body: T) -> Self {
        self.body = Some(body);
        self
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.set(key.to_string(), value.to_string());
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Option<T> {
        &self.body
    }
}

pub struct Client<D> {
    config: D,
    agent: ureq::Agent,
}

impl<D: ConfigProperties> Client<D> {
    pub fn new(config: D) -> Self {
        let timeout = config.request_timeout();
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(*timeout))
            .build();
        Client { config, agent }
    }

    fn post<T: Serialize>(&self, request: &Request<T>) -> Result<HttpResponse> {
        let ureq_req = self.agent.post(request.url());
        let ureq_req = request
            .headers()
            .iter()
            .fold(ureq_req, |req, (key, value)| req.set(key, value));
        match ureq_req.send_json(serde_json::to_value(request.body())?) {
            Ok(response) => {
                let status = response.status().into();
                let body = response.into_string()?;
                let response = HttpResponse::builder().status(status).body(body).build()?;
                Ok(response)
            }
            Err(Error::Status(code, response)) => {
                // ureq returns an error on status codes >= 400. The fetcher
                // classifies those, so adapt them into a regular response.
                // https://docs.rs/ureq/latest/ureq/#error-handling
                let status = code.into();
                let body = response.into_string()?;
                let response = HttpResponse::builder().status(status).body(body).build()?;
                Ok(response)
            }
            Err(err) => Err(ASError::NetworkError(err.to_string()).into()),
        }
    }
}

impl<D: ConfigProperties> HttpRunner for Client<D> {
    type Response = HttpResponse;

    fn run<T: Serialize>(&self, cmd: &mut Request<T>) -> Result<Self::Response> {
        if !cmd.headers().0.contains_key("Authorization") {
            let token = format!("Bearer {}", self.config.api_token());
            cmd.set_header("Authorization", &token);
        }
        self.post(cmd)
    }
}
