//! Materializer plan cache.
//!
//! Plans are keyed by [`QueryIdentity`] and remember the fingerprint of the
//! result shape they were compiled for. A lookup whose cursor has a different
//! shape recompiles and replaces the plan. Every `collect_every` insertions a
//! collection pass drops plans that were never reused.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::identity::QueryIdentity;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::materialize::{Materializer, ParameterBinder, RowCursor, RowShape};

type Erased = Arc<dyn Any + Send + Sync>;

/// A compiled plan with usage metadata.
///
/// Parameter binders are attached in place, keyed by the parameter prefix
/// they were compiled for, so one SQL text bound under two dialects keeps two
/// binders.
pub struct CachedPlan {
    shape_hash: u64,
    materializer: Erased,
    binders: Mutex<HashMap<String, Erased>>,
    hit_count: AtomicU64,
}

impl CachedPlan {
    fn new<T: 'static>(shape_hash: u64, materializer: Materializer<T>) -> Self {
        Self {
            shape_hash,
            materializer: Arc::new(materializer),
            binders: Mutex::new(HashMap::new()),
            hit_count: AtomicU64::new(0),
        }
    }

    /// Fingerprint of the shape the plan was compiled for.
    pub fn shape_hash(&self) -> u64 {
        self.shape_hash
    }

    /// The materializer, if it produces `T`.
    pub fn materializer<T: 'static>(&self) -> Option<Materializer<T>> {
        self.materializer.downcast_ref::<Materializer<T>>().cloned()
    }

    /// The parameter binder attached for `P` under a parameter prefix.
    pub fn binder<P: 'static>(&self, prefix: &str) -> Option<Arc<ParameterBinder<P>>> {
        let erased = self.binders.lock().get(prefix).cloned()?;
        erased.downcast::<ParameterBinder<P>>().ok()
    }

    /// Increment the hit count and return the new value.
    pub fn record_hit(&self) -> u64 {
        self.hit_count.fetch_add(1, AtomicOrdering::Relaxed) + 1
    }

    /// Get the current hit count.
    pub fn hits(&self) -> u64 {
        self.hit_count.load(AtomicOrdering::Relaxed)
    }

    /// Attach a binder unless one is already stored for the prefix, and
    /// return the binder that ends up attached.
    fn attach_binder<P: 'static>(
        &self,
        prefix: &str,
        binder: Arc<ParameterBinder<P>>,
    ) -> Arc<ParameterBinder<P>> {
        let mut binders = self.binders.lock();
        let stored = binders
            .entry(prefix.to_string())
            .or_insert_with(|| Arc::clone(&binder) as Erased);
        Arc::clone(stored)
            .downcast::<ParameterBinder<P>>()
            .unwrap_or(binder)
    }

    fn inherit_binders(&self, stale: &CachedPlan) {
        let carried = stale.binders.lock().clone();
        self.binders.lock().extend(carried);
    }
}

impl std::fmt::Debug for CachedPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedPlan")
            .field("shape_hash", &self.shape_hash)
            .field("binders", &self.binders.lock().len())
            .field("hit_count", &self.hits())
            .finish()
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    recompiles: AtomicU64,
    collected: AtomicU64,
}

impl CacheStats {
    /// Lookups served by an existing plan.
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Lookups that found no plan.
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Plans replaced because the result shape changed.
    pub fn recompiles(&self) -> u64 {
        self.recompiles.load(AtomicOrdering::Relaxed)
    }

    /// Plans removed by collection passes.
    pub fn collected(&self) -> u64 {
        self.collected.load(AtomicOrdering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64 + self.recompiles() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

#[derive(Default)]
struct Plans {
    entries: HashMap<QueryIdentity, Arc<CachedPlan>>,
    insertions: usize,
}

/// Concurrent cache of compiled materializers.
///
/// The map sits behind one mutex that is held only for lookups, inserts and
/// collection passes. Compilation runs outside the lock; when two threads
/// compile the same identity the last write wins. Hit counts are atomic.
pub struct PlanCache {
    plans: Mutex<Plans>,
    config: CacheConfig,
    stats: CacheStats,
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::with_valid_config(CacheConfig::default())
    }
}

impl PlanCache {
    /// Create an empty cache.
    ///
    /// Fails when the configuration is invalid, such as a zero collection
    /// interval.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: CacheConfig) -> Self {
        Self {
            plans: Mutex::new(Plans::default()),
            config,
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the materializer for an identity and the cursor's current shape.
    ///
    /// An existing plan compiled for the same shape is returned as the same
    /// instance and its hit count grows by one. A plan for another shape is
    /// replaced by a fresh compilation whose hit count starts at zero.
    pub fn get_or_compile<T, F>(
        &self,
        identity: &QueryIdentity,
        cursor: &dyn RowCursor,
        compile: F,
    ) -> Result<Materializer<T>>
    where
        T: 'static,
        F: FnOnce(&RowShape) -> Result<Materializer<T>>,
    {
        let shape = RowShape::from_cursor(cursor)?;
        let shape_hash = shape.fingerprint();

        let existing = self.get(identity);
        if let Some(plan) = &existing {
            if plan.shape_hash == shape_hash {
                if let Some(materializer) = plan.materializer::<T>() {
                    plan.record_hit();
                    self.stats.hits.fetch_add(1, AtomicOrdering::Relaxed);
                    return Ok(materializer);
                }
            }
        }

        let materializer = compile(&shape)?;
        let fresh = CachedPlan::new(shape_hash, materializer.clone());

        match existing {
            Some(stale) => {
                debug!(
                    sql = %identity.sql(),
                    old_shape = stale.shape_hash,
                    new_shape = shape_hash,
                    "Result shape changed, recompiled materializer"
                );
                self.stats.recompiles.fetch_add(1, AtomicOrdering::Relaxed);
                fresh.inherit_binders(&stale);
                self.replace(identity, Arc::new(fresh));
            }
            None => {
                debug!(
                    sql = %identity.sql(),
                    target_type = identity.target().name(),
                    columns = shape.len(),
                    "Plan cache miss, compiled materializer"
                );
                self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);
                self.insert(identity, Arc::new(fresh));
            }
        }

        Ok(materializer)
    }

    /// Get the parameter binder for an identity and parameter prefix,
    /// compiling it on first use.
    ///
    /// The binder is attached to the identity's plan in place. Before any plan
    /// exists the binder is compiled without being stored.
    pub fn binder_or_compile<P, F>(
        &self,
        identity: &QueryIdentity,
        prefix: &str,
        compile: F,
    ) -> Arc<ParameterBinder<P>>
    where
        P: 'static,
        F: FnOnce() -> ParameterBinder<P>,
    {
        let existing = self.get(identity);
        if let Some(binder) = existing.as_ref().and_then(|p| p.binder::<P>(prefix)) {
            return binder;
        }

        let binder = Arc::new(compile());
        match existing {
            Some(plan) => plan.attach_binder(prefix, binder),
            None => binder,
        }
    }

    /// Look up a plan without counting a hit.
    pub fn get(&self, identity: &QueryIdentity) -> Option<Arc<CachedPlan>> {
        self.plans.lock().entries.get(identity).cloned()
    }

    /// Remove a plan.
    pub fn remove(&self, identity: &QueryIdentity) -> Option<Arc<CachedPlan>> {
        self.plans.lock().entries.remove(identity)
    }

    /// Get the current number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every plan and reset the insertion counter.
    pub fn clear(&self) {
        let mut plans = self.plans.lock();
        plans.entries.clear();
        plans.insertions = 0;
    }

    fn replace(&self, identity: &QueryIdentity, plan: Arc<CachedPlan>) {
        self.plans.lock().entries.insert(identity.clone(), plan);
    }

    /// Store a newly compiled plan, collecting first when this insertion
    /// reaches the configured interval.
    fn insert(&self, identity: &QueryIdentity, plan: Arc<CachedPlan>) {
        let mut plans = self.plans.lock();

        plans.insertions += 1;
        if plans.insertions >= self.config.collect_every {
            self.collect(&mut plans);
        }

        if plans.entries.insert(identity.clone(), plan).is_some() {
            warn!(
                sql = %identity.sql(),
                "Concurrent compilation raced, replaced cached plan"
            );
        }
    }

    fn collect(&self, plans: &mut Plans) {
        let before = plans.entries.len();
        let min_hits = self.config.min_hits;
        plans.entries.retain(|_, plan| plan.hits() > min_hits);
        let removed = before - plans.entries.len();
        plans.insertions = 0;

        self.stats
            .collected
            .fetch_add(removed as u64, AtomicOrdering::Relaxed);
        debug!(
            removed,
            remaining = plans.entries.len(),
            min_hits,
            "Plan cache collection pass"
        );
    }
}

impl std::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCache")
            .field("len", &self.len())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}
