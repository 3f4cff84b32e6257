// Copyright (c) 2025 - Cowboy AI, Inc.
//! Build lookup

use std::collections::HashMap;

use crate::domain::{Build, BuildId};

/// Resolves builds referenced by devices
pub trait BuildCatalog {
    /// Look up a build; `None` when it does not exist
    fn build(&self, id: &BuildId) -> Option<Build>;
}

/// Build catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryBuildCatalog {
    builds: HashMap<BuildId, Build>,
}

impl InMemoryBuildCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a build
    pub fn insert(&mut self, build: Build) {
        self.builds.insert(build.id, build);
    }

    /// Register a version and return the new build id
    pub fn add_version(&mut self, version: impl Into<String>) -> BuildId {
        let build = Build::new(BuildId::new(), version);
        let id = build.id;
        self.insert(build);
        id
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }
}

impl FromIterator<Build> for InMemoryBuildCatalog {
    fn from_iter<T: IntoIterator<Item = Build>>(iter: T) -> Self {
        Self {
            builds: iter.into_iter().map(|build| (build.id, build)).collect(),
        }
    }
}

impl BuildCatalog for InMemoryBuildCatalog {
    fn build(&self, id: &BuildId) -> Option<Build> {
        self.builds.get(id).cloned()
    }
}

impl<C: BuildCatalog + ?Sized> BuildCatalog for &C {
    fn build(&self, id: &BuildId) -> Option<Build> {
        (**self).build(id)
    }
}
