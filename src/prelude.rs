//! # cilbridge Prelude
//!
//! Convenient single import for the types most callers need: the descriptor
//! surface, the lowered class model, and the lowering entry points.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilbridge operations
pub use crate::Error;

/// The result type used throughout cilbridge
pub use crate::Result;

// ================================================================================================
// Entry Points
// ================================================================================================

/// Batch lowering driver
pub use crate::loader::Loader;

/// Per-type lowering pipeline and its outputs
pub use crate::lowering::{Dependencies, Diagnostic, Lowered, LoweringOptions, TypeLowering};

/// The shared class namespace and resolution capability
pub use crate::registry::{ClassId, ClassResolver, IrRegistry};

// ================================================================================================
// Descriptor Surface
// ================================================================================================

/// Foreign type descriptors consumed by lowering
pub use crate::descriptor::{
    AttributeArgument, AttributeDescriptor, AttributeValue, EventDescriptor, FieldDescriptor,
    MethodDescriptor, ParameterDescriptor, PropertyDescriptor, TypeDescriptor, TypeHandle,
    TypeKind, Visibility,
};

// ================================================================================================
// Lowered Class Model
// ================================================================================================

/// Classes, members and their modifier flags
pub use crate::ir::{
    IrClass, IrClassRc, IrClassRef, IrField, IrFieldRc, IrMethod, IrMethodRc, MemberModifiers,
    MethodSignature, TypeModifiers,
};

/// The lowered type shape
pub use crate::ir::{IrType, PrimitiveKind, SYSTEM_OBJECT};

/// Method bodies and expressions
pub use crate::ir::{
    BinaryExpr, BinaryOp, Expr, FieldRef, LocalId, MethodBody, MethodRef, Place, Stmt, Value,
};

/// Annotations and marker tags
pub use crate::ir::{
    AnnotationElement, AnnotationTag, ElementValue, Tag, DECIMAL_CONSTANT_ATTRIBUTE,
    OBSOLETE_ATTRIBUTE,
};

// ================================================================================================
// Synthesis Constants
// ================================================================================================

/// Names of synthesized members and classes
pub use crate::lowering::byref::{WRAPPER_CLASS_NAME, WRAPPER_FIELD_NAME};
pub use crate::lowering::structcopy::{CONSTRUCTOR_NAME, COPY_METHOD_NAME};
