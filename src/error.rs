use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers the failure modes of lowering foreign type descriptors into the IR.
/// Fatal/structural failures abort lowering of the affected type; policy skips and
/// recoverable attribute failures never surface through this type (see the crate-level
/// error taxonomy documentation).
#[derive(Error, Debug)]
pub enum Error {
    /// The type descriptor passed in was structurally unusable.
    ///
    /// This error occurs when a descriptor is missing information no lowering
    /// can proceed without, such as an empty type name.
    #[error("Malformed type descriptor - {0}")]
    MalformedDescriptor(String),

    /// Failed to find a class in the IR registry.
    ///
    /// The associated value is the fully qualified name that was requested.
    #[error("Failed to find class in registry - {0}")]
    ClassNotFound(String),

    /// Failed to insert a new class into the IR registry.
    ///
    /// This error occurs when registering a class under a fully qualified name
    /// that is already taken by a different class.
    #[error("Failed to insert class into registry - {0}")]
    ClassInsert(String),

    /// A hierarchy reference could not be resolved.
    ///
    /// Superclass, interface and outer-class links are mandatory; a class is not
    /// usable without its hierarchy, so resolution failures are fatal to the
    /// lowering of the referencing type.
    #[error("Unresolved hierarchy reference '{reference}' while lowering '{class}'")]
    UnresolvedHierarchy {
        /// The class being lowered when resolution failed
        class: String,
        /// The referenced type name that could not be resolved
        reference: String,
    },

    /// A synthesized member references a field or method that does not exist.
    ///
    /// Raised by synthesis helpers (struct copy, by-ref wrapper emission) when
    /// the structural preconditions they rely on do not hold.
    #[error("Missing synthetic member '{member}' on class '{class}'")]
    MissingMember {
        /// The class the member was expected on
        class: String,
        /// The member name that was not found
        member: String,
    },

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically when a
    /// mutex guarding a check-then-create critical section is poisoned.
    #[error("Failed to lock target")]
    LockError,

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::LockError
    }
}
