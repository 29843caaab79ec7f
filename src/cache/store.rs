//! Compiled-template storage.

use std::{
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use dashmap::DashMap;
use metrics::{counter, gauge};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::application::render::CompiledTemplate;

use super::keys::CacheKey;

const CACHE_HIT_TOTAL: &str = "rendition_template_cache_hit_total";
const CACHE_MISS_TOTAL: &str = "rendition_template_cache_miss_total";
const COMPILE_ERROR_TOTAL: &str = "rendition_template_compile_error_total";
const CACHE_ENTRIES: &str = "rendition_template_cache_entries";

type Slot = Arc<OnceCell<CompiledTemplate>>;

/// Memoizes compiled templates by [`CacheKey`].
///
/// Entries live as long as the cache; there is no eviction. Concurrent misses
/// on one key share a single compilation, and a failed compilation leaves the
/// key empty so a later call compiles again.
#[derive(Default)]
pub struct TemplateCache {
    slots: DashMap<CacheKey, Slot>,
    entries: AtomicUsize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the template cached under `key`, compiling it with `compile` on
    /// a miss.
    pub async fn get_or_compile<F, Fut, E>(
        &self,
        key: CacheKey,
        compile: F,
    ) -> Result<CompiledTemplate, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CompiledTemplate, E>>,
        E: std::fmt::Display,
    {
        let slot = self.slot(&key);

        if let Some(found) = slot.get() {
            counter!(CACHE_HIT_TOTAL).increment(1);
            debug!(cache_key = %key, result = "hit", "compiled template lookup");
            return Ok(found.clone());
        }

        counter!(CACHE_MISS_TOTAL).increment(1);
        debug!(cache_key = %key, result = "miss", "compiled template lookup");

        let initialized = slot.get_or_try_init(|| async {
            let compiled = compile().await?;
            let entries = self.entries.fetch_add(1, Ordering::Relaxed) + 1;
            gauge!(CACHE_ENTRIES).set(entries as f64);
            Ok::<_, E>(compiled)
        });

        match initialized.await {
            Ok(compiled) => Ok(compiled.clone()),
            Err(err) => {
                counter!(COMPILE_ERROR_TOTAL).increment(1);
                warn!(
                    cache_key = %key,
                    error = %err,
                    "template compilation failed; nothing cached"
                );
                Err(err)
            }
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CompiledTemplate> {
        self.slots
            .get(key)
            .and_then(|slot| slot.value().get().cloned())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| slot.value().initialized())
    }

    /// Number of compiled templates held.
    pub fn len(&self) -> usize {
        self.entries.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        if let Some(existing) = self.slots.get(key) {
            return Arc::clone(existing.value());
        }
        Arc::clone(self.slots.entry(key.clone()).or_default().value())
    }
}

impl fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCache")
            .field("entries", &self.len())
            .finish()
    }
}
