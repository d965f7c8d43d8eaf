//! Process-scoped registry of lowered classes.
//!
//! The registry is the shared class namespace of one lowering run. It serves
//! three roles:
//!
//! - **Primary store**: all [`IrClass`] instances live here, keyed by a
//!   registry-assigned [`ClassId`] in a lock-free skip list, with a concurrent
//!   fullname index on top.
//! - **Resolver capability**: hierarchy linking resolves referenced type names
//!   through [`ClassResolver`]; the registry's own implementation hands out
//!   placeholder class shells for not-yet-lowered types
//!   ([`IrRegistry::class_ref`]), so cross references never block on lowering
//!   order.
//! - **Synthesis lock home**: the mutex serializing by-reference wrapper
//!   creation lives here, tying the wrapper singleton's lifecycle to the run
//!   rather than to process statics.
//!
//! # Thread Safety
//!
//! Distinct types are lowered concurrently; all registry operations are safe
//! under that regime. Lookups are lock-free; the only critical sections are
//! the check-then-create paths for placeholders and the wrapper class.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};
use std::fmt;

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::descriptor::TypeKind;
use crate::ir::{IrClass, IrClassRc};
use crate::Result;

/// Registry-assigned identifier of a lowered class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u32);

impl ClassId {
    /// Create an id from a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        ClassId(value)
    }

    /// Raw value of the id.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{0:04}", self.0)
    }
}

/// Capability to resolve a type name to its (possibly not-yet-lowered) class.
///
/// Hierarchy linking calls this for every superclass, interface and outer
/// class reference. Implementations may trigger recursive lowering; a failure
/// is fatal to the type whose hierarchy referenced the name.
pub trait ClassResolver: Send + Sync {
    /// Resolve `fullname` to a class reference, creating one if necessary.
    ///
    /// # Errors
    /// Returns an error if the name cannot be resolved to a class; the caller
    /// treats this as fatal for the type currently being lowered.
    fn resolve(&self, fullname: &str, kind: TypeKind) -> Result<IrClassRc>;
}

/// The shared class namespace of one lowering run.
pub struct IrRegistry {
    /// Primary store, ordered by id
    classes: SkipMap<u32, IrClassRc>,
    /// Fullname -> id index
    fullname_index: DashMap<String, u32>,
    /// Id generation
    next_id: AtomicU32,
    /// Guards placeholder check-then-create
    create_lock: Mutex<()>,
    /// Guards by-reference wrapper check-then-create; see `lowering::byref`
    pub(crate) wrapper_lock: Mutex<()>,
}

impl IrRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        IrRegistry {
            classes: SkipMap::new(),
            fullname_index: DashMap::new(),
            next_id: AtomicU32::new(1),
            create_lock: Mutex::new(()),
            wrapper_lock: Mutex::new(()),
        }
    }

    /// Look up a class by id.
    #[must_use]
    pub fn get(&self, id: ClassId) -> Option<IrClassRc> {
        self.classes.get(&id.value()).map(|entry| entry.value().clone())
    }

    /// Look up a class by fully qualified name.
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<IrClassRc> {
        let id = *self.fullname_index.get(fullname)?;
        self.classes.get(&id).map(|entry| entry.value().clone())
    }

    /// Get the class registered under `fullname`, or create an empty shell.
    ///
    /// This is the registry's engine behind [`ClassResolver`]: referenced
    /// types that have not been lowered yet are represented by placeholder
    /// shells that later lowering fills in. The creation path runs under a
    /// mutex so concurrent first use from different threads yields exactly one
    /// registered class per name.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the creation lock is poisoned.
    pub fn class_ref(&self, fullname: &str, kind: TypeKind) -> Result<IrClassRc> {
        if let Some(existing) = self.get_by_fullname(fullname) {
            return Ok(existing);
        }

        let _guard = self.create_lock.lock()?;
        // Double-check: another thread may have created it while we waited.
        if let Some(existing) = self.get_by_fullname(fullname) {
            return Ok(existing);
        }

        let (namespace, name) = split_fullname(fullname);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let class: IrClassRc = Arc::new(IrClass::new(ClassId::new(id), namespace, name, kind));
        self.classes.insert(id, class.clone());
        self.fullname_index.insert(fullname.to_string(), id);
        Ok(class)
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no classes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Snapshot of all registered classes, ordered by id.
    #[must_use]
    pub fn classes(&self) -> Vec<IrClassRc> {
        self.classes.iter().map(|entry| entry.value().clone()).collect()
    }
}

impl fmt::Debug for IrRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrRegistry")
            .field("classes", &self.classes.len())
            .finish_non_exhaustive()
    }
}

impl Default for IrRegistry {
    fn default() -> Self {
        IrRegistry::new()
    }
}

impl ClassResolver for IrRegistry {
    fn resolve(&self, fullname: &str, kind: TypeKind) -> Result<IrClassRc> {
        self.class_ref(fullname, kind)
    }
}

/// Split a fully qualified name into namespace and simple name.
fn split_fullname(fullname: &str) -> (&str, &str) {
    match fullname.rfind('.') {
        Some(index) => (&fullname[..index], &fullname[index + 1..]),
        None => ("", fullname),
    }
}
