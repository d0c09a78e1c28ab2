use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::errors::ClientError;

/// Request payload. Kept in a re-sendable form so a request can be reissued
/// unchanged after a credential refresh.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone)]
enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        bytes: Bytes,
    },
}

/// Multipart form description; a fresh `reqwest` form is built per attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.map(str::to_string),
            bytes: bytes.into(),
        });
        self
    }

    pub(crate) fn build(&self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let mut file = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        file = file.mime_str(mime)?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// Per-request extras: query string, headers, timeout override.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Flattens a serializable params struct into query pairs.
    /// `None` fields are skipped; lists repeat the key.
    pub fn query_params<T: Serialize>(mut self, params: &T) -> Result<Self, ClientError> {
        if let Value::Object(map) = serde_json::to_value(params)? {
            for (key, value) in map {
                match value {
                    Value::Null => {}
                    Value::Array(items) => {
                        for item in items {
                            self.query.push((key.clone(), scalar(item)));
                        }
                    }
                    other => self.query.push((key, scalar(other))),
                }
            }
        }
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn scalar(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
