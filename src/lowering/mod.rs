//! Lowering of foreign type descriptors into IR classes.
//!
//! [`TypeLowering`] orchestrates the per-type pipeline: modifiers and
//! hierarchy linking, member lowering, struct deep-copy synthesis for value
//! types, and attribute lowering. One invocation lowers exactly one
//! descriptor; distinct descriptors may be lowered concurrently (see the
//! [`crate::loader`] driver).
//!
//! # Outputs
//!
//! Each run produces a [`Lowered`] result: the populated class, the
//! [`Dependencies`] set the external resolution driver uses to schedule
//! further lowering, and any [`Diagnostic`]s recorded for recoverable
//! attribute conversion failures.
//!
//! # Error taxonomy
//!
//! - Fatal: malformed descriptor, unresolved hierarchy reference - returned
//!   as [`crate::Error`], aborting the affected type.
//! - Policy skip: duplicate member signatures and disabled unsafe methods are
//!   silently dropped.
//! - Recoverable: a single unconvertible attribute argument drops that
//!   attribute and records a diagnostic; lowering continues.

pub mod attributes;
pub mod byref;
pub mod members;
pub mod resolver;
pub mod structcopy;

use std::collections::HashSet;
use std::fmt;

use crate::descriptor::TypeDescriptor;
use crate::ir::IrClassRc;
use crate::registry::{ClassResolver, IrRegistry};
use crate::{Error, Result};

/// Configuration for a lowering run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoweringOptions {
    /// Lower all methods, including unsafe ones and the foreign
    /// runtime-internal string copy helper that are skipped by default.
    pub resolve_all_methods: bool,
}

/// The set of types one lowering referenced, for scheduling further lowering.
///
/// Write-only from this core's perspective: lowering inserts names, the
/// external resolution driver consumes them.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    /// Types referenced through superclass, interface and outer-class links
    pub hierarchy: HashSet<String>,
    /// Types referenced through attributes and member signatures
    pub signatures: HashSet<String>,
}

impl Dependencies {
    /// Returns `true` if nothing was referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hierarchy.is_empty() && self.signatures.is_empty()
    }
}

/// A recoverable problem recorded during lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Fullname of the class being lowered
    pub class: String,
    /// Fullname of the attribute type whose conversion failed
    pub attribute: String,
    /// Human readable description of the failure
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{0}: attribute {1} dropped: {2}",
            self.class, self.attribute, self.message
        )
    }
}

/// The result of lowering one type descriptor.
#[derive(Debug)]
pub struct Lowered {
    /// The populated IR class
    pub class: IrClassRc,
    /// Types this lowering referenced
    pub dependencies: Dependencies,
    /// Recoverable problems recorded along the way
    pub diagnostics: Vec<Diagnostic>,
}

/// Lowers one foreign type descriptor into an IR class.
pub struct TypeLowering<'a> {
    descriptor: &'a TypeDescriptor,
    /// Fields whose declared type is itself a value type needing deep copy;
    /// built during field lowering, consumed by copy synthesis, then discarded
    struct_fields: HashSet<String>,
}

impl<'a> TypeLowering<'a> {
    /// Create a lowering for the given descriptor.
    #[must_use]
    pub fn new(descriptor: &'a TypeDescriptor) -> Self {
        TypeLowering {
            descriptor,
            struct_fields: HashSet::new(),
        }
    }

    /// Run the lowering pipeline.
    ///
    /// The produced class is registered in (or reuses a placeholder from)
    /// `registry`; hierarchy references resolve through `resolver`.
    ///
    /// # Errors
    /// Returns an error for a malformed descriptor or when a hierarchy
    /// reference cannot be resolved; the class may be partially populated in
    /// that case and must not be used.
    pub fn run(
        mut self,
        registry: &IrRegistry,
        resolver: &dyn ClassResolver,
        options: &LoweringOptions,
    ) -> Result<Lowered> {
        if self.descriptor.name.is_empty() {
            return Err(Error::MalformedDescriptor(
                "type descriptor has an empty name".to_string(),
            ));
        }

        let class = registry.class_ref(&self.descriptor.fullname(), self.descriptor.kind)?;
        class.set_kind(self.descriptor.kind);

        let mut dependencies = Dependencies::default();
        let mut diagnostics = Vec::new();

        resolver::apply_modifiers(self.descriptor, &class);
        resolver::link_hierarchy(self.descriptor, &class, &mut dependencies, resolver)?;
        resolver::link_outer_class(self.descriptor, &class, &mut dependencies, resolver)?;

        members::lower_fields(self.descriptor, &class, &mut self.struct_fields);
        members::lower_methods(self.descriptor, &class, options);
        if class.is_struct() {
            structcopy::synthesize(&class, &self.struct_fields, resolver)?;
        }
        members::lower_properties(self.descriptor, &class);
        members::lower_events(self.descriptor, &class);

        attributes::lower_attributes(self.descriptor, &class, &mut dependencies, &mut diagnostics);

        Ok(Lowered {
            class,
            dependencies,
            diagnostics,
        })
    }
}
