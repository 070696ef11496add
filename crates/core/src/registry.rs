// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared, hot-reloadable view of the template catalog.
//!
//! The registry holds an `Arc<Catalog>` snapshot in an [`ArcSwap`]. Lookups
//! take no lock and never wait on a reload; a reload swaps the whole
//! snapshot, so a reader sees either the old catalog or the new one, never a
//! mix.

use crate::catalog::{Catalog, CatalogError, Template};
use arc_swap::ArcSwap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct TemplateRegistry {
    snapshot: Arc<ArcSwap<Catalog>>,
}

impl TemplateRegistry {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(catalog)),
        }
    }

    /// Registry holding only the pipeline's own system templates
    pub fn with_builtins() -> Self {
        Self::new(Catalog::with_builtins())
    }

    /// Load the catalog file at `path`
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self::new(Catalog::load(path)?))
    }

    /// The current catalog. Later reloads do not affect the returned value.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.snapshot.load_full()
    }

    pub fn has(&self, name: &str) -> bool {
        self.snapshot.load().contains(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.snapshot.load().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    /// Replace the catalog
    pub fn reload(&self, catalog: Catalog) {
        let count = catalog.len();
        self.snapshot.store(Arc::new(catalog));
        info!(templates = count, "template catalog reloaded");
    }

    /// Load `path` and swap it in. On error the current catalog is kept.
    pub fn reload_from_file(&self, path: &Path) -> Result<usize, CatalogError> {
        let catalog = Catalog::load(path)?;
        let count = catalog.len();
        self.reload(catalog);
        Ok(count)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TEMPLATE_NOT_FOUND_EVENT;
    use std::io::Write;

    fn catalog_with(name: &str, version: &str) -> Catalog {
        Catalog::from_templates([Template::new(name, version)]).unwrap()
    }

    #[test]
    fn has_and_get() {
        let registry = TemplateRegistry::new(catalog_with("user.created", "1.0.0"));
        assert!(registry.has("user.created"));
        assert!(!registry.has("user.deleted"));
        assert_eq!(registry.get("user.created").unwrap().version, "1.0.0");
        assert!(registry.get("user.deleted").is_none());
    }

    #[test]
    fn default_has_builtins() {
        let registry = TemplateRegistry::default();
        assert!(registry.has(TEMPLATE_NOT_FOUND_EVENT));
    }

    #[test]
    fn reload_swaps_whole_catalog() {
        let registry = TemplateRegistry::new(catalog_with("user.created", "1.0.0"));
        let before = registry.snapshot();

        registry.reload(catalog_with("group.created", "1.0.0"));

        // The old snapshot is untouched
        assert!(before.contains("user.created"));
        assert!(!before.contains("group.created"));

        assert!(!registry.has("user.created"));
        assert!(registry.has("group.created"));
    }

    #[test]
    fn clones_share_snapshot() {
        let registry = TemplateRegistry::new(Catalog::new());
        let clone = registry.clone();
        registry.reload(catalog_with("user.created", "1.0.0"));
        assert!(clone.has("user.created"));
    }

    #[test]
    fn failed_reload_keeps_current_catalog() {
        let registry = TemplateRegistry::new(catalog_with("user.created", "1.0.0"));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[template]]\nname = \"x\"\nversion = \"bad\"\n")
            .unwrap();

        assert!(registry.reload_from_file(file.path()).is_err());
        assert!(registry.has("user.created"));
    }

    #[test]
    fn reload_from_file_returns_template_count() {
        let registry = TemplateRegistry::new(Catalog::new());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[template]]\nname = \"order.created\"\nversion = \"1.0.0\"\n")
            .unwrap();

        let count = registry.reload_from_file(file.path()).unwrap();
        assert_eq!(count, registry.len());
        assert!(registry.has("order.created"));
    }

    #[test]
    fn concurrent_readers_see_complete_catalogs() {
        let registry = TemplateRegistry::new(
            Catalog::from_templates([Template::new("a.one", "1.0.0"), Template::new("a.two", "1.0.0")])
                .unwrap(),
        );

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snapshot = registry.snapshot();
                        // Both templates of a generation are always visible together
                        let a = snapshot.contains("a.one") && snapshot.contains("a.two");
                        let b = snapshot.contains("b.one") && snapshot.contains("b.two");
                        assert!(a ^ b);
                    }
                })
            })
            .collect();

        for i in 0..100 {
            let prefix = if i % 2 == 0 { "b" } else { "a" };
            registry.reload(
                Catalog::from_templates([
                    Template::new(format!("{prefix}.one"), "1.0.0"),
                    Template::new(format!("{prefix}.two"), "1.0.0"),
                ])
                .unwrap(),
            );
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn held_snapshot_does_not_delay_lookups_or_reloads() {
        let registry = TemplateRegistry::new(catalog_with("user.created", "1.0.0"));
        let held = registry.snapshot();

        let writer = {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for i in 0..1000 {
                    registry.reload(catalog_with("user.created", &format!("1.0.{i}")));
                }
            })
        };

        let started = std::time::Instant::now();
        let mut lookups = 0;
        while !writer.is_finished() || lookups < 1000 {
            assert!(registry.get("user.created").is_some());
            lookups += 1;
        }
        writer.join().unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(held.get("user.created").unwrap().version, "1.0.0");
        assert_eq!(registry.get("user.created").unwrap().version, "1.0.999");
    }
}
