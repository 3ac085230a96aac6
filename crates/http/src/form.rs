//! Submitted form bodies.
//!
//! A field may arrive absent, once, or many times depending on how the
//! client encoded it. [`FormFields`] keeps that distinction so callers can
//! normalize explicitly instead of guessing.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde_json::Value;

use crate::error::AppError;

/// A present form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    fn append(self, value: String) -> Self {
        match self {
            FieldValue::One(first) => FieldValue::Many(vec![first, value]),
            FieldValue::Many(mut values) => {
                values.push(value);
                FieldValue::Many(values)
            }
        }
    }

    /// The first submitted value.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::One(value) => Some(value),
            FieldValue::Many(values) => values.first().map(String::as_str),
        }
    }
}

/// Coerce an absent, single, or repeated field into a sequence.
pub fn coerce_to_seq(value: Option<&FieldValue>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(FieldValue::One(value)) => vec![value.clone()],
        Some(FieldValue::Many(values)) => values.clone(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: HashMap<String, FieldValue>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one submitted value; a trailing `[]` on the key is ignored.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let key = key.strip_suffix("[]").unwrap_or(key);
        let value = value.into();
        let merged = match self.fields.remove(key) {
            None => FieldValue::One(value),
            Some(existing) => existing.append(value),
        };
        self.fields.insert(key.to_string(), merged);
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// First value of `key`, or the empty string when absent.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(FieldValue::first).unwrap_or("")
    }

    pub fn seq(&self, key: &str) -> Vec<String> {
        coerce_to_seq(self.get(key))
    }

    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut fields = Self::new();
        for (key, value) in url::form_urlencoded::parse(body) {
            fields.push(&key, value.into_owned());
        }
        fields
    }

    /// Accept a flat JSON object whose values are scalars or arrays of scalars.
    pub fn from_json(body: &[u8]) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| AppError::bad_request(format!("malformed JSON body: {err}")))?;

        let Value::Object(object) = value else {
            return Err(AppError::bad_request("JSON body must be an object"));
        };

        let mut fields = Self::new();
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        fields.push(&key, scalar_text(&key, item)?);
                    }
                }
                other => fields.push(&key, scalar_text(&key, other)?),
            }
        }
        Ok(fields)
    }
}

fn scalar_text(key: &str, value: Value) -> Result<String, AppError> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(AppError::bad_request(format!(
            "field '{key}' must be a scalar or a list of scalars"
        ))),
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        if is_json {
            Self::from_json(&body)
        } else {
            Ok(Self::from_urlencoded(&body))
        }
    }
}
