use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PimError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} {status_text}: {}", api_message(.body.as_ref()))]
    Api {
        status: u16,
        status_text: String,
        body: Option<serde_json::Value>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error(transparent)]
    Shared(Arc<PimError>),
}

impl PimError {
    /// HTTP status of an API error, looking through shared failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            PimError::Api { status, .. } => Some(*status),
            PimError::Shared(inner) => inner.status(),
            _ => None,
        }
    }

    /// True for a backend 404 or a locally detected missing record.
    pub fn is_not_found(&self) -> bool {
        match self {
            PimError::NotFound(_) => true,
            PimError::Shared(inner) => inner.is_not_found(),
            other => other.status() == Some(404),
        }
    }

    /// Unwrap an error handed out by a shared fetch, keeping it shared
    /// when other callers still hold a reference.
    pub(crate) fn from_shared(err: Arc<PimError>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(PimError::Shared)
    }
}

fn api_message(body: Option<&serde_json::Value>) -> String {
    let Some(body) = body else {
        return "no response body".to_string();
    };
    ["message", "error", "detail"]
        .iter()
        .find_map(|k| body.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Per-field validation messages collected before a request is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for one field, empty if the field passed.
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, otherwise a `Validation` error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PimError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msgs)| format!("{}: {}", field, msgs.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub type Result<T> = std::result::Result<T, PimError>;
