//! Color-profile catalog.
//!
//! Scans a flat directory of `<Brand><Model>-<Scene>.icm` files into a
//! brand → model → scene index and resolves lookups against it. A scan
//! builds a complete new index and swaps it in at once, so readers only
//! ever see a finished snapshot. Opened profiles are kept in a bounded
//! FIFO cache.

mod cache;
mod filename;

pub use cache::{ProfileCache, DEFAULT_CACHE_CAPACITY};
pub use filename::{
    is_profile_file, normalize_scene, parse_profile_name, ProfileKey,
    FILESYSTEM_BRAND, PROFILE_EXTENSIONS,
};

use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use walkdir::WalkDir;

use crate::color::{ColorManager, ProfileHandle};

/// Counts describing the current catalog snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Distinct brands
    pub brands: usize,
    /// Distinct (brand, model) pairs
    pub models: usize,
    /// Distinct scene names across all models
    pub scenes: usize,
    /// Indexed profile files
    pub profiles: usize,
    /// Files skipped because an earlier file already claimed their triple
    pub duplicates: usize,
    /// Profile files whose names did not parse or could not be read
    pub ignored: usize,
}

/// One complete scan of the profile directory.
#[derive(Debug, Default)]
struct CatalogIndex {
    brands: BTreeSet<String>,
    models: BTreeMap<String, BTreeSet<String>>,
    scenes: BTreeMap<(String, String), BTreeSet<String>>,
    files: HashMap<ProfileKey, PathBuf>,
    stems: HashMap<String, PathBuf>,
    duplicates: usize,
    ignored: usize,
}

impl CatalogIndex {
    fn build(directory: &Path) -> io::Result<Self> {
        let mut index = Self::default();

        if !directory.exists() {
            tracing::warn!("Profile directory does not exist: {:?}", directory);
            return Ok(index);
        }

        // Sorted so that duplicate triples resolve to the same file every scan
        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Skipping unreadable profile entry: {}", e);
                    index.ignored += 1;
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_profile_file(path) {
                continue;
            }

            match parse_profile_name(path) {
                Some(key) => index.insert(key, path.to_path_buf()),
                None => {
                    tracing::debug!("Ignoring unrecognized profile name: {:?}", path);
                    index.ignored += 1;
                }
            }
        }

        Ok(index)
    }

    fn insert(&mut self, key: ProfileKey, path: PathBuf) {
        match self.files.entry(key.clone()) {
            Entry::Occupied(existing) => {
                tracing::warn!(
                    "Duplicate profile for {} {} ({}): keeping {:?}, ignoring {:?}",
                    key.brand,
                    key.model,
                    key.scene,
                    existing.get(),
                    path
                );
                self.duplicates += 1;
                return;
            }
            Entry::Vacant(slot) => {
                slot.insert(path.clone());
            }
        }

        if let Some(stem) = path.file_stem() {
            self.stems
                .entry(stem.to_string_lossy().into_owned())
                .or_insert(path);
        }

        self.brands.insert(key.brand.clone());
        self.models
            .entry(key.brand.clone())
            .or_default()
            .insert(key.model.clone());
        self.scenes
            .entry((key.brand, key.model))
            .or_default()
            .insert(key.scene);
    }

    fn stats(&self) -> CatalogStats {
        let scene_names: BTreeSet<&String> = self.scenes.values().flatten().collect();
        CatalogStats {
            brands: self.brands.len(),
            models: self.models.values().map(BTreeSet::len).sum(),
            scenes: scene_names.len(),
            profiles: self.files.len(),
            duplicates: self.duplicates,
            ignored: self.ignored,
        }
    }
}

/// Index of the profile directory plus the cache of opened profiles.
pub struct ProfileCatalog {
    directory: PathBuf,
    color: Arc<dyn ColorManager>,
    snapshot: RwLock<Option<Arc<CatalogIndex>>>,
    scan_lock: Mutex<()>,
    cache: ProfileCache,
}

impl ProfileCatalog {
    /// Create a catalog over `directory`. Nothing is read until the first
    /// scan or lookup.
    pub fn new(directory: impl Into<PathBuf>, color: Arc<dyn ColorManager>) -> Self {
        Self {
            directory: directory.into(),
            color,
            snapshot: RwLock::new(None),
            scan_lock: Mutex::new(()),
            cache: ProfileCache::default(),
        }
    }

    /// Override the number of opened profiles kept in memory.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ProfileCache::new(capacity);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Rebuild the index from disk and swap it in.
    ///
    /// A missing directory yields an empty catalog. Opened profiles are
    /// dropped from the cache.
    pub fn scan(&self) -> io::Result<CatalogStats> {
        let _guard = self.scan_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let index = self.rebuild()?;
        Ok(index.stats())
    }

    /// Alias for [`scan`](Self::scan).
    pub fn refresh(&self) -> io::Result<CatalogStats> {
        self.scan()
    }

    /// Build and publish a new index. Caller holds `scan_lock`.
    fn rebuild(&self) -> io::Result<Arc<CatalogIndex>> {
        tracing::debug!("Scanning profile directory {:?}", self.directory);
        let index = Arc::new(CatalogIndex::build(&self.directory)?);
        let stats = index.stats();

        self.cache.clear();
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&index));

        tracing::info!(
            "Profile catalog: {} profiles, {} brands, {} models",
            stats.profiles,
            stats.brands,
            stats.models
        );
        Ok(index)
    }

    /// Current snapshot, scanning first if none exists yet.
    fn snapshot(&self) -> Arc<CatalogIndex> {
        if let Some(index) = self.published() {
            return index;
        }

        let _guard = self.scan_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another reader may have finished the scan while we waited
        if let Some(index) = self.published() {
            return index;
        }

        self.rebuild().unwrap_or_else(|e| {
            tracing::warn!("Failed to scan profile directory {:?}: {}", self.directory, e);
            let empty = Arc::new(CatalogIndex::default());
            *self
                .snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&empty));
            empty
        })
    }

    fn published(&self) -> Option<Arc<CatalogIndex>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    /// All brands with at least one profile, sorted.
    pub fn brands(&self) -> Vec<String> {
        self.snapshot().brands.iter().cloned().collect()
    }

    /// Models available for `brand`, sorted.
    pub fn models_for(&self, brand: &str) -> Vec<String> {
        self.snapshot()
            .models
            .get(brand)
            .map(|models| models.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Scenes available for `brand`/`model`, sorted.
    pub fn scenes_for(&self, brand: &str, model: &str) -> Vec<String> {
        self.snapshot()
            .scenes
            .get(&(brand.to_string(), model.to_string()))
            .map(|scenes| scenes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> CatalogStats {
        self.snapshot().stats()
    }

    /// Find the profile file for a camera and scene.
    ///
    /// Tries `<Brand><Model without spaces>-<Scene>`, then the model as
    /// given, then the lowercased model, and finally the parsed triple.
    pub fn resolve(&self, brand: &str, model: &str, scene: &str) -> Option<PathBuf> {
        let index = self.snapshot();
        let scene = normalize_scene(scene);
        let compact: String = model.chars().filter(|c| !c.is_whitespace()).collect();

        let candidates = [
            format!("{brand}{compact}-{scene}"),
            format!("{brand}{model}-{scene}"),
            format!("{brand}{}-{scene}", model.to_lowercase()),
        ];

        candidates
            .iter()
            .find_map(|stem| index.stems.get(stem))
            .or_else(|| index.files.get(&ProfileKey::new(brand, compact, scene)))
            .cloned()
    }

    /// Open a profile, going through the cache.
    ///
    /// Failures are logged and reported as `None`.
    pub fn load(&self, path: &Path) -> Option<ProfileHandle> {
        if let Some(handle) = self.cache.get(path) {
            return Some(handle);
        }

        match self.color.open_profile(path) {
            Ok(handle) => {
                if let Some(evicted) = self.cache.insert(path.to_path_buf(), handle.clone()) {
                    tracing::trace!("Evicted cached profile {:?}", evicted);
                }
                Some(handle)
            }
            Err(e) => {
                tracing::warn!("Failed to load color profile {:?}: {}", path, e);
                None
            }
        }
    }

    /// Number of opened profiles currently cached.
    pub fn cached_profiles(&self) -> usize {
        self.cache.len()
    }
}
