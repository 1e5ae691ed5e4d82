//=========================================================================
// Resource Manager
//=========================================================================
//
// Registry of named assets. Lookups by string key return a handle that
// backends (audio, rendering) consume; the manager itself never decodes
// asset data.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use thiserror::Error;

//=== Resource Types ======================================================

/// Asset category. Each kind lives under its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Sound,
    Image,
}

impl ResourceKind {
    fn directory(self) -> &'static str {
        match self {
            Self::Sound => "sounds",
            Self::Image => "images",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sound => f.write_str("sound"),
            Self::Image => f.write_str("image"),
        }
    }
}

/// Resolved reference to a registered asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub key: String,
    pub path: PathBuf,
}

/// Assets a scene needs before it can run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preload {
    pub sounds: &'static [&'static str],
    pub images: &'static [&'static str],
}

impl Preload {
    pub const NONE: Self = Self {
        sounds: &[],
        images: &[],
    };

    fn entries(&self) -> impl Iterator<Item = (ResourceKind, &'static str)> + '_ {
        let sounds = self.sounds.iter().map(|key| (ResourceKind::Sound, *key));
        let images = self.images.iter().map(|key| (ResourceKind::Image, *key));
        sounds.chain(images)
    }
}

//=== ResourceError =======================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("{kind} resource `{key}` is not registered")]
    NotFound { kind: ResourceKind, key: String },
}

//=== ResourceManager =====================================================

/// Key → handle registry, shared through the root scope.
pub struct ResourceManager {
    root: PathBuf,
    entries: RefCell<HashMap<(ResourceKind, String), ResourceHandle>>,
}

impl ResourceManager {
    /// Creates an empty registry resolving paths under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Registers every key of a manifest.
    pub fn with_manifest(self, manifest: &Preload) -> Self {
        for (kind, key) in manifest.entries() {
            self.register(kind, key);
        }
        self
    }

    //--- Registration -----------------------------------------------------

    /// Registers `key`, returning its handle. Re-registering is a no-op.
    pub fn register(&self, kind: ResourceKind, key: &str) -> ResourceHandle {
        let mut entries = self.entries.borrow_mut();
        entries
            .entry((kind, key.to_owned()))
            .or_insert_with(|| {
                trace!("Registered {} `{}`", kind, key);
                ResourceHandle {
                    kind,
                    key: key.to_owned(),
                    path: self.root.join(kind.directory()).join(key),
                }
            })
            .clone()
    }

    //--- Lookup -----------------------------------------------------------

    /// Looks up a registered asset.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] if `key` was never registered.
    pub fn resource(&self, kind: ResourceKind, key: &str) -> Result<ResourceHandle, ResourceError> {
        self.entries
            .borrow()
            .get(&(kind, key.to_owned()))
            .cloned()
            .ok_or_else(|| ResourceError::NotFound { kind, key: key.to_owned() })
    }

    pub fn sound(&self, key: &str) -> Result<ResourceHandle, ResourceError> {
        self.resource(ResourceKind::Sound, key)
    }

    pub fn image(&self, key: &str) -> Result<ResourceHandle, ResourceError> {
        self.resource(ResourceKind::Image, key)
    }

    /// Resolves every asset a scene declared. Fails on the first missing one.
    pub fn preload(&self, preload: &Preload) -> Result<Vec<ResourceHandle>, ResourceError> {
        let handles = preload
            .entries()
            .map(|(kind, key)| self.resource(kind, key))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Preloaded {} resources", handles.len());
        Ok(handles)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
