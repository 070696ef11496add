// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide default pipeline
//!
//! Installed once at startup by the host application. Library code takes a
//! `&Pipeline` explicitly; only call sites without one should reach for
//! [`get`].

use crate::pipeline::Pipeline;
use std::sync::OnceLock;
use tracing::info;

static DEFAULT: OnceLock<Pipeline> = OnceLock::new();

/// Install the default pipeline. A second install hands the pipeline back.
pub fn install(pipeline: Pipeline) -> Result<(), Pipeline> {
    DEFAULT.set(pipeline)?;
    info!("default event pipeline installed");
    Ok(())
}

/// The default pipeline, if one was installed
pub fn get() -> Option<&'static Pipeline> {
    DEFAULT.get()
}
