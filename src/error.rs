use std::fmt::Display;

use anyhow::{anyhow, Context, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ASError {
    /// Bad local input. Never dispatched to the remote endpoint and never
    /// absorbed by fallback policies - a caller bug.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Transport failure, timeout or a server-side error.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The remote response does not match the declared output shape.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
    /// The remote service explicitly declined to answer.
    #[error("Remote refusal: {0}")]
    RemoteRefusal(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Configuration not found")]
    ConfigurationNotFound,
    #[error("Time conversion error: {0}")]
    TimeConversionError(String),
    #[error("Cache location does not exist: {0}")]
    CacheLocationDoesNotExist(String),
    #[error("Cache location is not a directory: {0}")]
    CacheLocationIsNotADirectory(String),
    #[error("Cache location is not writeable: {0}")]
    CacheLocationIsNotWriteable(String),
    #[error("Cache location write test failed: {0}")]
    CacheLocationWriteTestFailed(String),
}

pub trait AddContext<T, E>: Context<T, E> {
    fn err_context<C: Display + Send + Sync + 'static>(self, msg: C) -> Result<T, anyhow::Error>
    where
        Self: Sized,
    {
        self.with_context(|| msg.to_string())
    }
}

impl<U, T, E> AddContext<T, E> for U where U: Context<T, E> {}

pub fn gen<T: AsRef<str>>(msg: T) -> anyhow::Error {
    anyhow!(msg.as_ref().to_string())
}
