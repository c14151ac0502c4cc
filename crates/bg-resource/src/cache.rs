//! Type-erased, weak-reference resource cache.
//!
//! Each registered [`ResourceLoader`] owns one slot. A slot maps resource ids
//! to weak handles: a `get` that finds a live handle returns it without I/O,
//! otherwise the resource is read from disk, handed to the loader and cached
//! weakly again. Once every strong handle is dropped the next `get` reloads.
//! File changes are never detected; a live handle may be stale.

use std::any::{Any, TypeId, type_name};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::config::AssetConfig;
use crate::error::{LoadError, ResourceError, ResourceResult};
use crate::{ComponentLoader, ConnectorLoader, id, scan};

/// Extension of every resource file.
pub const RESOURCE_EXTENSION: &str = "json";

/// Numeric identifier assigned to a resource type when its loader is first
/// registered. Assignment is monotonic per cache, starting at 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceTypeId(u32);

impl ResourceTypeId {
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Builds one resource type from its parsed file contents.
pub trait ResourceLoader: 'static {
    type Resource: 'static;

    /// Directory holding this type's files, relative to the cache root.
    fn dir(&self) -> &Path;

    /// Build a resource. `cache` may be used to resolve other registered
    /// resource types this one depends on.
    fn load(
        &self,
        id: &str,
        raw: &Value,
        cache: &ResourceCache,
    ) -> Result<Self::Resource, LoadError>;
}

/// Non-generic view of a loader stored in the registry.
trait ErasedLoader {
    fn type_name(&self) -> &'static str;
    fn dir(&self) -> &Path;
    fn load_erased(
        &self,
        id: &str,
        raw: &Value,
        cache: &ResourceCache,
    ) -> Result<Rc<dyn Any>, LoadError>;
}

struct Typed<L>(L);

impl<L: ResourceLoader> ErasedLoader for Typed<L> {
    fn type_name(&self) -> &'static str {
        short_type_name::<L::Resource>()
    }

    fn dir(&self) -> &Path {
        self.0.dir()
    }

    fn load_erased(
        &self,
        id: &str,
        raw: &Value,
        cache: &ResourceCache,
    ) -> Result<Rc<dyn Any>, LoadError> {
        let resource = self.0.load(id, raw, cache)?;
        Ok(Rc::new(resource))
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

struct Slot {
    loader: Box<dyn ErasedLoader>,
    live: RefCell<HashMap<String, Weak<dyn Any>>>,
    in_flight: RefCell<HashSet<String>>,
    loads: Cell<u64>,
}

impl Slot {
    fn new(loader: Box<dyn ErasedLoader>) -> Self {
        Self {
            loader,
            live: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashSet::new()),
            loads: Cell::new(0),
        }
    }

    fn live(&self, id: &str) -> Option<Rc<dyn Any>> {
        self.live.borrow().get(id).and_then(Weak::upgrade)
    }
}

/// Removes an id from a slot's in-flight set when the load finishes.
struct InFlight<'a> {
    slot: &'a Slot,
    id: &'a str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.slot.in_flight.borrow_mut().remove(self.id);
    }
}

/// Registry of resource loaders with a weak-reference cache per type.
///
/// Single-threaded: handles are `Rc`, and loaders may call back into the cache
/// through `&self` while a load is in progress.
pub struct ResourceCache {
    root: PathBuf,
    type_ids: HashMap<TypeId, ResourceTypeId>,
    slots: Vec<Slot>,
}

impl ResourceCache {
    /// Create an empty cache reading resource files below `root`. No I/O is performed.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            type_ids: HashMap::new(),
            slots: Vec::new(),
        }
    }

    /// Cache with the component and connector loaders registered, in that order.
    pub fn with_assets(config: &AssetConfig) -> Self {
        let mut cache = Self::new(&config.root);
        cache.register_loader(ComponentLoader::new(&config.components));
        cache.register_loader(ConnectorLoader::new(&config.connectors));
        cache
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Install the loader for `L::Resource`.
    ///
    /// A type keeps the id it was first given; registering again replaces
    /// the loader and forgets every cached handle of that type.
    pub fn register_loader<L: ResourceLoader>(&mut self, loader: L) -> ResourceTypeId {
        let key = TypeId::of::<L::Resource>();
        let slot = Slot::new(Box::new(Typed(loader)));
        match self.type_ids.get(&key) {
            Some(&type_id) => {
                warn!(
                    resource = slot.loader.type_name(),
                    "replacing previously registered resource loader"
                );
                self.slots[type_id.0 as usize] = slot;
                type_id
            }
            None => {
                let type_id = ResourceTypeId(self.slots.len() as u32);
                self.slots.push(slot);
                self.type_ids.insert(key, type_id);
                type_id
            }
        }
    }

    /// The id assigned to `T`, if a loader for it is registered.
    pub fn type_id<T: 'static>(&self) -> Option<ResourceTypeId> {
        self.type_ids.get(&TypeId::of::<T>()).copied()
    }

    fn slot<T: 'static>(&self) -> ResourceResult<&Slot> {
        self.type_id::<T>()
            .map(|type_id| &self.slots[type_id.0 as usize])
            .ok_or(ResourceError::UnregisteredType {
                type_name: short_type_name::<T>(),
            })
    }

    /// Get the live resource `id` of type `T`, loading it from disk if no
    /// strong handle to it exists.
    pub fn get<T: 'static>(&self, id: &str) -> ResourceResult<Rc<T>> {
        let slot = self.slot::<T>()?;
        let type_name = slot.loader.type_name();
        let wrap = |source| ResourceError::Load {
            type_name,
            id: id.to_string(),
            source,
        };

        let erased = match slot.live(id) {
            Some(hit) => {
                trace!(resource = type_name, id, "resource cache hit");
                hit
            }
            None => self.load_fresh(slot, id).map_err(wrap)?,
        };
        erased
            .downcast::<T>()
            .map_err(|_| wrap(LoadError::TypeMismatch))
    }

    /// Like [`get`](Self::get), but a resource that fails to load is logged
    /// and reported as `None`. An unregistered type is still an error.
    pub fn lookup<T: 'static>(&self, id: &str) -> ResourceResult<Option<Rc<T>>> {
        match self.get::<T>(id) {
            Ok(found) => Ok(Some(found)),
            Err(err @ ResourceError::UnregisteredType { .. }) => Err(err),
            Err(err) => {
                error!("{err}");
                Ok(None)
            }
        }
    }

    fn load_fresh(&self, slot: &Slot, id: &str) -> Result<Rc<dyn Any>, LoadError> {
        let relative = id::to_relative_path(id)?;
        if !slot.in_flight.borrow_mut().insert(id.to_string()) {
            return Err(LoadError::Invalid {
                what: format!("resource '{id}' depends on itself"),
            });
        }
        let _guard = InFlight { slot, id };

        let path = self.root.join(slot.loader.dir()).join(relative);
        debug!(
            resource = slot.loader.type_name(),
            id,
            path = %path.display(),
            "loading resource from disk"
        );
        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let raw: Value = serde_json::from_str(&text)?;
        let loaded = slot.loader.load_erased(id, &raw, self)?;

        slot.live
            .borrow_mut()
            .insert(id.to_string(), Rc::downgrade(&loaded));
        slot.loads.set(slot.loads.get() + 1);
        Ok(loaded)
    }

    /// Whether a live handle to `id` currently exists.
    pub fn is_cached<T: 'static>(&self, id: &str) -> bool {
        self.slot::<T>()
            .map(|slot| slot.live(id).is_some())
            .unwrap_or(false)
    }

    /// Number of times a `T` has been read from disk by this cache.
    pub fn load_count<T: 'static>(&self) -> u64 {
        self.slot::<T>().map(|slot| slot.loads.get()).unwrap_or(0)
    }

    /// Drop cache entries whose resources have been freed. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut removed = 0;
        for slot in &self.slots {
            let mut live = slot.live.borrow_mut();
            let before = live.len();
            live.retain(|_, weak| weak.strong_count() > 0);
            removed += before - live.len();
        }
        removed
    }

    /// Directory holding the files of resource type `T`.
    pub fn dir_of<T: 'static>(&self) -> ResourceResult<PathBuf> {
        let slot = self.slot::<T>()?;
        Ok(self.root.join(slot.loader.dir()))
    }

    /// Ids of every `T` resource file found on disk, sorted.
    ///
    /// Best effort: unreadable directories are logged and skipped, and the
    /// listing may be stale by the time it is used.
    pub fn available<T: 'static>(&self) -> ResourceResult<Vec<String>> {
        let dir = self.dir_of::<T>()?;
        Ok(scan::scan_ids(&dir))
    }
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<_> = self.slots.iter().map(|s| s.loader.type_name()).collect();
        f.debug_struct("ResourceCache")
            .field("root", &self.root)
            .field("types", &types)
            .finish()
    }
}
