// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of template default messages.
//!
//! Messages use Jinja2 syntax and are rendered against the event payload:
//! `"User {{ username }} created"`. Payload keys are available at the top
//! level and the whole payload is also available as `payload`. Undefined
//! variables render as empty strings.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};
use tracing::warn;

/// Render `message` against `payload`.
///
/// Rendering never fails: on a template error the raw message is returned.
pub fn render_message(message: &str, payload: &Value) -> String {
    if !message.contains("{{") && !message.contains("{%") {
        return message.to_string();
    }

    match try_render(message, payload) {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!(error = %e, message, "failed to render event message");
            message.to_string()
        }
    }
}

fn try_render(message: &str, payload: &Value) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    let tmpl = env.template_from_str(message)?;

    let mut context = match payload {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    context
        .entry("payload")
        .or_insert_with(|| payload.clone());

    tmpl.render(&context)
}
