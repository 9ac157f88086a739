//! Maps opaque integer handles to open stores.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use keyvalue::{Error, Result, Store};

use crate::ffi::opendata_kv_handle_t;

/// The registry behind every exported entry point.
pub(crate) static REGISTRY: LazyLock<HandleRegistry> = LazyLock::new(HandleRegistry::new);

struct Inner {
    stores: HashMap<opendata_kv_handle_t, Arc<dyn Store>>,
    next_id: opendata_kv_handle_t,
}

/// Handle table shared by all threads.
///
/// Handles start at 1, only ever increase, and are never handed out twice,
/// so a stale handle cannot alias a newer store. Lookups return a clone of the
/// store so engine calls run without holding the table lock.
pub struct HandleRegistry {
    inner: RwLock<Inner>,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                stores: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn register(&self, store: Arc<dyn Store>) -> Result<opendata_kv_handle_t> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Internal("handle registry lock poisoned".to_string()))?;
        let handle = inner.next_id;
        inner.next_id += 1;
        inner.stores.insert(handle, store);
        Ok(handle)
    }

    pub fn lookup(&self, handle: opendata_kv_handle_t) -> Result<Arc<dyn Store>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Internal("handle registry lock poisoned".to_string()))?;
        inner
            .stores
            .get(&handle)
            .cloned()
            .ok_or(Error::InvalidHandle(handle))
    }

    /// Forgets `handle`. Only called once the store closed successfully.
    pub fn release(&self, handle: opendata_kv_handle_t) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Internal("handle registry lock poisoned".to_string()))?;
        inner
            .stores
            .remove(&handle)
            .map(|_| ())
            .ok_or(Error::InvalidHandle(handle))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.stores.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().stores.len())
    }
}
