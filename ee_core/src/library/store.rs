//! Library Store
//!
//! Holds the active [`LibrarySnapshot`] behind an `Arc` so calculations can
//! run concurrently with operator edits. A caller grabs the current snapshot
//! once per call; a replacement swaps the whole `Arc` and never mutates the
//! tables an in-flight call is reading.

use std::sync::{Arc, RwLock};

use crate::errors::CalcResult;

use super::LibrarySnapshot;

/// Shared holder of the active library snapshot.
#[derive(Debug)]
pub struct LibraryStore {
    current: RwLock<Arc<LibrarySnapshot>>,
}

impl Default for LibraryStore {
    fn default() -> Self {
        LibraryStore {
            current: RwLock::new(Arc::new(LibrarySnapshot::default())),
        }
    }
}

impl LibraryStore {
    /// Create a store with a validated initial snapshot
    pub fn new(snapshot: LibrarySnapshot) -> CalcResult<Self> {
        snapshot.validate()?;
        Ok(LibraryStore {
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// The snapshot to use for one calculation call
    pub fn snapshot(&self) -> Arc<LibrarySnapshot> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Validate and install a replacement snapshot, returning the previous one.
    ///
    /// An invalid snapshot is rejected and the active one stays in place.
    pub fn replace(&self, next: LibrarySnapshot) -> CalcResult<Arc<LibrarySnapshot>> {
        if let Err(err) = next.validate() {
            tracing::warn!(error = %err, "library replacement rejected");
            return Err(err);
        }
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = std::mem::replace(&mut *guard, Arc::new(next));
        tracing::info!("library snapshot replaced");
        Ok(previous)
    }

    /// Restore the built-in default tables
    pub fn reset(&self) -> Arc<LibrarySnapshot> {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::info!("library snapshot reset to defaults");
        std::mem::replace(&mut *guard, Arc::new(LibrarySnapshot::default()))
    }
}
