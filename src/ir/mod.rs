//! The uniform intermediate representation produced by lowering.
//!
//! # Key Components
//!
//! - [`IrClass`]: The lowered counterpart of one foreign type, owning its
//!   member and tag lists
//! - [`IrType`] / [`PrimitiveKind`]: Lowered type references and the closed
//!   primitive set
//! - [`MethodBody`] / [`Stmt`]: Flat statement bodies for synthesized members
//! - [`BinaryExpr`]: The shared checked/unchecked binary arithmetic shape
//! - [`Tag`]: Annotations and well-known markers
//!
//! Classes use shared ownership (`Arc`) with weak hierarchy links; member
//! lists are append-only concurrent vectors so lowered classes can be read
//! while other types are still being lowered on other threads.

pub mod body;
pub mod class;
pub mod expr;
pub mod tags;
pub mod types;

pub use body::{FieldRef, LocalId, LocalVar, MethodBody, MethodRef, Place, Stmt, Value};
pub use class::{
    IrClass, IrClassRc, IrClassRef, IrField, IrFieldRc, IrMethod, IrMethodRc, MemberModifiers,
    MethodSignature, TypeModifiers,
};
pub use expr::{BinaryExpr, BinaryOp, Expr};
pub use tags::{
    AnnotationElement, AnnotationTag, ElementValue, Tag, DECIMAL_CONSTANT_ATTRIBUTE,
    OBSOLETE_ATTRIBUTE,
};
pub use types::{IrType, PrimitiveKind, SYSTEM_OBJECT};
