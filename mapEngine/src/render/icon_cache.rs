use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;
use lru::LruCache;
use tracing::debug;
use crate::config::engine_config::IconConfig;
use crate::render::icon::{build_cluster_icon, build_marker_icon, IconDescriptor};
use crate::utils::logging::{self, OperationCategory};

/// Visual-equivalence key: records with the same key draw the same glyph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconKey(String);

impl IconKey {
    pub fn new(budget: f64, is_urgent: bool) -> Self {
        IconKey(format!("{}-{}", budget, is_urgent))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoized marker icons, owned by whoever renders the map.
///
/// Selected and normal icons live in separate LRU maps because they share a
/// key space but differ in size and anchor. Each map holds at most
/// `capacity` entries and evicts the least recently used one beyond that.
pub struct MarkerIconCache {
    config: IconConfig,
    normal: LruCache<IconKey, Rc<IconDescriptor>>,
    selected: LruCache<IconKey, Rc<IconDescriptor>>,
    clusters: LruCache<usize, Rc<IconDescriptor>>,
    stats: CacheStats,
}

impl MarkerIconCache {
    pub fn new(config: IconConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            normal: LruCache::new(capacity),
            selected: LruCache::new(capacity),
            clusters: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn get_marker_icon(&mut self, budget: f64, is_selected: bool, is_urgent: bool) -> Rc<IconDescriptor> {
        let key = IconKey::new(budget, is_urgent);
        let cache = if is_selected { &mut self.selected } else { &mut self.normal };

        if let Some(icon) = cache.get(&key) {
            self.stats.hits += 1;
            return Rc::clone(icon);
        }

        let _timing = logging::start_timing("build_marker_icon", OperationCategory::Icons);
        let icon = Rc::new(build_marker_icon(budget, is_selected, is_urgent, &self.config));
        cache.put(key.clone(), Rc::clone(&icon));
        self.stats.misses += 1;
        debug!(key = %key, selected = is_selected, "built marker icon");
        icon
    }

    pub fn get_cluster_icon(&mut self, count: usize) -> Rc<IconDescriptor> {
        if let Some(icon) = self.clusters.get(&count) {
            self.stats.hits += 1;
            return Rc::clone(icon);
        }
        let icon = Rc::new(build_cluster_icon(count));
        self.clusters.put(count, Rc::clone(&icon));
        self.stats.misses += 1;
        icon
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Entries as (normal, selected).
    pub fn len(&self) -> (usize, usize) {
        (self.normal.len(), self.selected.len())
    }

    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.selected.is_empty() && self.clusters.is_empty()
    }

    pub fn clear(&mut self) {
        self.normal.clear();
        self.selected.clear();
        self.clusters.clear();
    }
}

impl Default for MarkerIconCache {
    fn default() -> Self {
        Self::new(IconConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_return_same_object() {
        let mut cache = MarkerIconCache::default();
        let a = cache.get_marker_icon(50.0, false, false);
        let b = cache.get_marker_icon(50.0, false, false);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn selected_state_is_cached_separately() {
        let mut cache = MarkerIconCache::default();
        let normal = cache.get_marker_icon(50.0, false, false);
        let selected = cache.get_marker_icon(50.0, true, false);
        assert!(!Rc::ptr_eq(&normal, &selected));
        assert!(selected.selected && !normal.selected);
        assert_eq!(cache.len(), (1, 1));
    }

    #[test]
    fn urgency_is_part_of_the_key() {
        let mut cache = MarkerIconCache::default();
        let calm = cache.get_marker_icon(50.0, false, false);
        let urgent = cache.get_marker_icon(50.0, false, true);
        assert!(!Rc::ptr_eq(&calm, &urgent));
        assert_eq!(IconKey::new(50.0, true).as_str(), "50-true");
    }

    #[test]
    fn evicts_least_recently_used_beyond_capacity() {
        let mut cache = MarkerIconCache::new(IconConfig { cache_capacity: 2, ..IconConfig::default() });
        let first = cache.get_marker_icon(10.0, false, false);
        cache.get_marker_icon(20.0, false, false);
        cache.get_marker_icon(30.0, false, false);
        assert_eq!(cache.len(), (2, 0));

        let rebuilt = cache.get_marker_icon(10.0, false, false);
        assert!(!Rc::ptr_eq(&first, &rebuilt));
        assert_eq!(*first, *rebuilt);
    }

    #[test]
    fn zero_capacity_still_caches_one_entry() {
        let mut cache = MarkerIconCache::new(IconConfig { cache_capacity: 0, ..IconConfig::default() });
        let a = cache.get_marker_icon(5.0, false, false);
        let b = cache.get_marker_icon(5.0, false, false);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn cluster_icons_are_memoized_by_count() {
        let mut cache = MarkerIconCache::default();
        let a = cache.get_cluster_icon(4);
        let b = cache.get_cluster_icon(4);
        assert!(Rc::ptr_eq(&a, &b));
        cache.clear();
        assert!(cache.is_empty());
    }
}
