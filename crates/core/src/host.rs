// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host identity captured once per process

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Hostname and process id stamped on every event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub hostname: String,
    pub process_id: u32,
}

impl HostInfo {
    pub fn new(hostname: impl Into<String>, process_id: u32) -> Self {
        Self {
            hostname: hostname.into(),
            process_id,
        }
    }

    /// Host info of the running process. Resolved on first use, then cached.
    pub fn current() -> &'static HostInfo {
        static CURRENT: OnceLock<HostInfo> = OnceLock::new();
        CURRENT.get_or_init(|| HostInfo {
            hostname: resolve_hostname(),
            process_id: std::process::id(),
        })
    }
}

fn resolve_hostname() -> String {
    let from_env = std::env::var("HOSTNAME")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());
    if let Some(hostname) = from_env {
        return hostname;
    }

    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
