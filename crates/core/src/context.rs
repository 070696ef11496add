// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request context supplied by the transport layer.
//!
//! The pipeline never inspects transport objects. Callers build a
//! [`RequestContext`] from whatever framework they run on and hand it to
//! [`EventOptions::with_request`](crate::EventOptions::with_request).

use serde::{Deserialize, Serialize};

/// Identity and origin of the request an event is emitted for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub actor_id: Option<String>,
    pub source_ip: Option<String>,
    pub request_path: Option<String>,
    pub session_id: Option<String>,
    pub trace_id: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_source_ip(mut self, ip: impl Into<String>) -> Self {
        self.source_ip = Some(ip.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = Some(path.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_trace(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Routes served without authentication.
///
/// Actor extraction is skipped for these routes. An entry ending in `*`
/// matches every path with that prefix; anything else must match exactly.
/// Query strings are ignored when matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnonymousRoutes {
    routes: Vec<String>,
}

impl AnonymousRoutes {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        self.routes.iter().any(|route| match route.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => route == path,
        })
    }

    pub fn routes(&self) -> &[String] {
        &self.routes
    }
}
