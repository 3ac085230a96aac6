//! Render-or-redirect instructions produced by request handlers.
//!
//! Templates are rendered elsewhere; a handler only names a view and
//! supplies its context, or asks for a redirect.

use axum::{
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

/// A named view plus the context handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub name: &'static str,
    pub context: Value,
}

impl View {
    pub fn new(name: &'static str, context: Value) -> Self {
        Self { name, context }
    }

    pub fn title(&self) -> Option<&str> {
        self.context.get("title").and_then(Value::as_str)
    }

    /// Look up a top-level context entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Render(View),
    Redirect(String),
}

impl Outcome {
    pub fn render(name: &'static str, context: Value) -> Self {
        Outcome::Render(View::new(name, context))
    }

    pub fn redirect(url: impl Into<String>) -> Self {
        Outcome::Redirect(url.into())
    }

    pub fn view(&self) -> Option<&View> {
        match self {
            Outcome::Render(view) => Some(view),
            Outcome::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Outcome::Redirect(url) => Some(url),
            Outcome::Render(_) => None,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Render(view) => {
                tracing::debug!(view = view.name, "rendering view");
                Json(json!({ "view": view.name, "context": view.context })).into_response()
            }
            Outcome::Redirect(url) => Redirect::to(&url).into_response(),
        }
    }
}
