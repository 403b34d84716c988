//! Concurrent per-type cache of dispatch tables.
//!
//! Tables are immutable once built, so the cache hands out shared [`Arc`]s. Building happens
//! outside of any map lock; when two threads race on the same type, both build and the first
//! insert wins.

use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use rayon::prelude::*;

use crate::{
    analysis::vtable::{config::ResolverConfig, resolver::VTableResolver},
    metadata::{token::Token, typesystem::TypeModel},
    Error, Result,
};

/// Cache of built dispatch tables, keyed by type token
#[derive(Debug, Default)]
pub struct VTableCache {
    tables: DashMap<Token, Arc<VTableResolver>>,
    config: ResolverConfig,
}

impl VTableCache {
    /// Create an empty cache using the default [`ResolverConfig`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache building tables with `config`
    #[must_use]
    pub fn with_config(config: ResolverConfig) -> Self {
        VTableCache {
            tables: DashMap::new(),
            config,
        }
    }

    /// The configuration tables are built with
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the cached table of `ty`, building it on first use
    ///
    /// Failed builds are not cached.
    ///
    /// # Errors
    /// Any error of [`VTableResolver::build_with_config`]
    pub fn get_or_build<M: TypeModel + ?Sized>(
        &self,
        model: &M,
        ty: Token,
    ) -> Result<Arc<VTableResolver>> {
        if let Some(table) = self.get(ty) {
            return Ok(table);
        }

        let table = Arc::new(VTableResolver::build_with_config(model, ty, &self.config)?);
        debug!("built dispatch table for {} ({} slots)", ty, table.slot_count());

        Ok(self.tables.entry(ty).or_insert(table).value().clone())
    }

    /// Returns the cached table of `ty`, if any
    #[must_use]
    pub fn get(&self, ty: Token) -> Option<Arc<VTableResolver>> {
        self.tables.get(&ty).map(|entry| entry.value().clone())
    }

    /// Drops the cached table of `ty`; returns true if one was cached
    ///
    /// Call this after the hierarchy of `ty` changed. Tables of derived types embed the
    /// hierarchy too and need to be invalidated separately (or use [`VTableCache::clear`]).
    pub fn invalidate(&self, ty: Token) -> bool {
        self.tables.remove(&ty).is_some()
    }

    /// Drops all cached tables
    pub fn clear(&self) {
        self.tables.clear();
    }

    /// Number of cached tables
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no table is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Builds the tables of all `types` in parallel
    ///
    /// A type that fails does not stop the others; its error is returned together with its
    /// token, in the order of `types`.
    ///
    /// ## Arguments
    /// * 'model' - The type hierarchy to read, shared between worker threads
    /// * 'types' - The types to build
    pub fn build_all<M: TypeModel + Sync + ?Sized>(
        &self,
        model: &M,
        types: &[Token],
    ) -> Vec<(Token, Error)> {
        let failures: Vec<(Token, Error)> = types
            .par_iter()
            .filter_map(|&ty| self.get_or_build(model, ty).err().map(|error| (ty, error)))
            .collect();

        debug!(
            "built {} of {} dispatch tables",
            types.len() - failures.len(),
            types.len()
        );
        failures
    }
}
