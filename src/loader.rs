//! Batch lowering driver.
//!
//! [`Loader`] owns an [`IrRegistry`] and runs the per-type pipeline over whole
//! descriptor batches, in parallel. The registry itself serves as the
//! [`ClassResolver`]: references resolve to registered classes or freshly
//! created placeholders, and the returned [`Dependencies`] tell the caller
//! which of those placeholders still await a descriptor of their own.
//!
//! Parallelism is safe because every mutation point in the class model is an
//! atomic get-or-add: two threads lowering descriptors that reference the same
//! type converge on the same placeholder, and synthesized members are created
//! exactly once.

use rayon::prelude::*;

use crate::descriptor::TypeDescriptor;
use crate::lowering::{byref, Dependencies, Lowered, LoweringOptions, TypeLowering};
use crate::registry::IrRegistry;
use crate::Result;

/// Drives lowering of descriptor batches into a shared registry.
#[derive(Debug, Default)]
pub struct Loader {
    registry: IrRegistry,
    options: LoweringOptions,
}

impl Loader {
    /// Create a loader with default options and an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Loader::default()
    }

    /// Create a loader with explicit options.
    #[must_use]
    pub fn with_options(options: LoweringOptions) -> Self {
        Loader {
            registry: IrRegistry::new(),
            options,
        }
    }

    /// The registry all lowered classes live in.
    #[must_use]
    pub fn registry(&self) -> &IrRegistry {
        &self.registry
    }

    /// Consume the loader, keeping the populated registry.
    #[must_use]
    pub fn into_registry(self) -> IrRegistry {
        self.registry
    }

    /// Lower a single descriptor.
    ///
    /// # Errors
    /// Returns the first fatal lowering error (malformed descriptor or
    /// unresolvable hierarchy reference).
    pub fn lower(&self, descriptor: &TypeDescriptor) -> Result<Lowered> {
        self.prepare(std::slice::from_ref(descriptor))?;
        TypeLowering::new(descriptor).run(&self.registry, &self.registry, &self.options)
    }

    /// Lower a batch of descriptors in parallel.
    ///
    /// Results come back in input order. A fatal error for any descriptor
    /// fails the whole batch; the registry may then hold partially populated
    /// classes and should be discarded.
    ///
    /// # Errors
    /// Returns the first fatal lowering error encountered.
    pub fn lower_all(&self, descriptors: &[TypeDescriptor]) -> Result<Vec<Lowered>> {
        self.prepare(descriptors)?;
        descriptors
            .par_iter()
            .map(|descriptor| {
                TypeLowering::new(descriptor).run(&self.registry, &self.registry, &self.options)
            })
            .collect()
    }

    /// Names referenced by `results` that have no descriptor in `results`.
    ///
    /// These are the placeholder classes the caller still has to feed back in
    /// as descriptors (or accept as opaque externals).
    #[must_use]
    pub fn unresolved(results: &[Lowered]) -> Dependencies {
        let lowered: std::collections::HashSet<String> = results
            .iter()
            .map(|result| result.class.fullname())
            .collect();
        let mut pending = Dependencies::default();
        for result in results {
            for name in &result.dependencies.hierarchy {
                if !lowered.contains(name) {
                    pending.hierarchy.insert(name.clone());
                }
            }
            for name in &result.dependencies.signatures {
                if !lowered.contains(name) {
                    pending.signatures.insert(name.clone());
                }
            }
        }
        pending
    }

    /// Pre-create shared synthetic infrastructure the batch will need.
    fn prepare(&self, descriptors: &[TypeDescriptor]) -> Result<()> {
        let needs_wrapper = descriptors.iter().any(|descriptor| {
            descriptor
                .methods
                .iter()
                .flat_map(|method| &method.parameters)
                .any(byref::needs_wrapper)
        });
        if needs_wrapper {
            byref::get_or_create_wrapper(&self.registry)?;
        }
        Ok(())
    }
}
