// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog commands

use crate::output::{print_list, OutputFormat};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use herald_core::{Catalog, Template};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Parse a catalog file and report problems
    Check {
        /// Catalog TOML file
        file: PathBuf,
    },
    /// List templates in a catalog, builtins included
    List {
        /// Catalog TOML file
        file: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
struct TemplateInfo {
    name: String,
    version: String,
    category: String,
    severity: String,
    schema: bool,
}

impl From<&Template> for TemplateInfo {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            version: template.version.clone(),
            category: template.default_category().to_string(),
            severity: template.severity.to_string(),
            schema: template.has_schema(),
        }
    }
}

impl fmt::Display for TemplateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<40} {:<10} {:<12} {:<9}{}",
            self.name,
            self.version,
            self.category,
            self.severity,
            if self.schema { " schema" } else { "" }
        )
    }
}

pub fn run(args: CatalogArgs) -> Result<()> {
    match args.command {
        CatalogCommand::Check { file } => {
            let catalog = load(&file)?;
            println!("ok: {} templates", catalog.len());
        }
        CatalogCommand::List { file, format } => {
            let catalog = load(&file)?;
            let infos: Vec<TemplateInfo> = catalog
                .templates()
                .into_iter()
                .map(|t| TemplateInfo::from(&**t))
                .collect();
            print_list(&infos, format)?;
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<Catalog> {
    Catalog::load(path).with_context(|| format!("invalid catalog {}", path.display()))
}
