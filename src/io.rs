use crate::http::Request;
use crate::Result;
use serde::Serialize;

/// A trait for clients talking to the remote generation endpoint. Implementors
/// accept a `Request` wrapping headers and a JSON payload. Clients can do real
/// HTTP calls against the remote server or mock the responses for testing
/// purposes.
pub trait HttpRunner {
    type Response;
    fn run<T: Serialize>(&self, cmd: &mut Request<T>) -> Result<Self::Response>;
}

/// Adapts lower level HTTP outputs to a common response. The status code is
/// kept verbatim so the fetcher can classify refusals and server errors.
#[derive(Clone, Debug, Builder)]
pub struct HttpResponse {
    #[builder(default)]
    pub status: i32,
    #[builder(default)]
    pub body: String,
}

impl HttpResponse {
    pub fn builder() -> HttpResponseBuilder {
        HttpResponseBuilder::default()
    }

    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}
