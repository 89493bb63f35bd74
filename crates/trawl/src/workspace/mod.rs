//! The collaborators a search runs against.
//!
//! A [`Workspace`] bundles the file index, the tree provider, the language
//! profile, the registry of named configurations, and the compiled pattern
//! cache.

mod index;
mod profile;
mod trees;

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use trawl_core::ConfigurationRegistry;

pub use index::{FileIndex, IndexedFile, WalkdirIndex};
pub use profile::{DefaultProfile, StructuralProfile};
pub use trees::{FsTreeProvider, TreeProvider};

use crate::compiler::PatternCache;

/// Everything a [`Matcher`](crate::Matcher) needs from its surroundings.
pub struct Workspace {
    index: Box<dyn FileIndex>,
    trees: Box<dyn TreeProvider>,
    profile: Box<dyn StructuralProfile>,
    registry: ConfigurationRegistry,
    cache: PatternCache,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("registry", &self.registry)
            .field("cached_patterns", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Creates a workspace from an index and a tree provider.
    #[must_use]
    pub fn new(index: impl FileIndex + 'static, trees: impl TreeProvider + 'static) -> Self {
        Self {
            index: Box::new(index),
            trees: Box::new(trees),
            profile: Box::new(DefaultProfile),
            registry: ConfigurationRegistry::new(),
            cache: PatternCache::default(),
        }
    }

    /// Creates a workspace over the files below `root`.
    #[must_use]
    pub fn for_directory(root: impl Into<PathBuf>) -> Self {
        Self::new(WalkdirIndex::new(root), FsTreeProvider)
    }

    /// Replaces the language profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl StructuralProfile + 'static) -> Self {
        self.profile = Box::new(profile);
        self
    }

    /// Replaces the configuration registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ConfigurationRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the pattern cache with one of the given capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache = PatternCache::new(capacity);
        self
    }

    /// Returns the file index.
    #[must_use]
    pub fn index(&self) -> &dyn FileIndex {
        self.index.as_ref()
    }

    /// Returns the tree provider.
    #[must_use]
    pub fn trees(&self) -> &dyn TreeProvider {
        self.trees.as_ref()
    }

    /// Returns the language profile.
    #[must_use]
    pub fn profile(&self) -> &dyn StructuralProfile {
        self.profile.as_ref()
    }

    /// Returns the registry of named configurations.
    #[must_use]
    pub const fn registry(&self) -> &ConfigurationRegistry {
        &self.registry
    }

    /// Returns the compiled pattern cache.
    #[must_use]
    pub const fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Announces the start of a bulk read.
    pub fn start_batch_processing(&self) {
        self.trees.start_batch_processing();
    }

    /// Announces the end of a bulk read.
    pub fn finish_batch_processing(&self) {
        self.trees.finish_batch_processing();
    }
}
