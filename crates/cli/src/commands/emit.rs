// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Emit command: create one event and print everything published for it

use crate::output::print_event;
use anyhow::{Context, Result};
use clap::Args;
use herald_core::{
    EventCategory, EventFilter, EventOptions, EventReceiver, Pipeline, PipelineConfig, Severity,
};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Args)]
pub struct EmitArgs {
    /// Event name, e.g. user.created
    pub event: String,

    /// JSON payload
    #[arg(long, default_value = "{}")]
    pub payload: String,

    /// Template catalog (overrides config and HERALD_CATALOG)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Pipeline config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub correlation_id: Option<String>,

    #[arg(long)]
    pub actor: Option<String>,

    #[arg(long, value_parser = parse_category)]
    pub category: Option<EventCategory>,

    #[arg(long, value_parser = parse_severity)]
    pub severity: Option<Severity>,

    /// Extra tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Publish without schema validation
    #[arg(long)]
    pub no_validate: bool,
}

fn parse_category(s: &str) -> Result<EventCategory, String> {
    s.parse::<EventCategory>().map_err(|e| e.to_string())
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse::<Severity>().map_err(|e| e.to_string())
}

pub fn run(args: EmitArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    }
    .apply_env();
    if let Some(catalog) = &args.catalog {
        config.catalog = Some(catalog.clone());
    }
    if args.no_validate {
        config.validation = false;
    }

    let payload: Value = serde_json::from_str(&args.payload)
        .with_context(|| format!("invalid --payload JSON: {}", args.payload))?;

    let pipeline = Pipeline::from_config(&config)?;
    let (_, mut rx) = pipeline.bus().subscribe(EventFilter::all(), "cli");

    let options = options_from(&args);
    let outcome = if args.no_validate {
        pipeline
            .factory()
            .create(&args.event, payload, options)
            .map_err(anyhow::Error::from)
            .and_then(|event| {
                let id = event.id.clone();
                pipeline.bus().publish(event)?;
                Ok(id)
            })
    } else {
        pipeline
            .create_and_publish(&args.event, payload, options)
            .map_err(anyhow::Error::from)
    };

    // Bypass reports are published even when creation fails
    for event in drain(&mut rx) {
        print_event(&event)?;
    }

    let id = outcome?;
    tracing::debug!(event_id = %id, "emitted");
    Ok(())
}

fn options_from(args: &EmitArgs) -> EventOptions {
    let mut options = EventOptions::new();
    if let Some(id) = &args.correlation_id {
        options = options.with_correlation_id(id.as_str());
    }
    if let Some(actor) = &args.actor {
        options = options.with_actor(actor);
    }
    if let Some(category) = args.category {
        options = options.with_category(category);
    }
    if let Some(severity) = args.severity {
        options = options.with_severity(severity);
    }
    for tag in &args.tags {
        options = options.with_tag(tag);
    }
    options
}

fn drain(rx: &mut EventReceiver) -> Vec<std::sync::Arc<herald_core::Event>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
