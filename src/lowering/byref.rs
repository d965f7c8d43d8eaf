//! By-reference parameter emulation through wrapper objects.
//!
//! The foreign call convention allows parameters to be passed by reference
//! (`in` / `out` / `ref`); the IR's call convention does not. The bridge is a
//! synthetic wrapper class with a single mutable field of the universal
//! object type: the caller boxes the argument into a fresh wrapper before the
//! call and reads the field back afterwards, observing any mutation the
//! callee performed.
//!
//! The foreign runtime does not support co- or contravariant parameter or
//! return types, so substituting wrapper parameters into virtual method
//! signatures cannot break overriding.
//!
//! Exactly one wrapper class exists per lowering run, registered under the
//! fixed name [`WRAPPER_CLASS_NAME`]. Creation is guarded by a single
//! critical section in the registry, so concurrent calls to
//! [`get_or_create_wrapper`] yield one identity and only ever return the
//! fully constructed class. Code that bypasses it and looks the name up in
//! the registry directly can race with construction and see the bare shell;
//! all wrapper access goes through this module.

use crate::descriptor::{ParameterDescriptor, TypeKind};
use crate::ir::{
    Expr, FieldRef, IrClassRc, IrField, IrFieldRc, IrMethod, IrType, MemberModifiers, MethodBody,
    MethodRef, Place, Stmt, TypeModifiers, Value,
};
use crate::lowering::structcopy::CONSTRUCTOR_NAME;
use crate::registry::IrRegistry;
use crate::{Error, Result};

/// Fixed name of the synthetic wrapper class.
pub const WRAPPER_CLASS_NAME: &str = "ByReferenceWrappers.Wrapper";
/// Name of the wrapper's single value field.
pub const WRAPPER_FIELD_NAME: &str = "r";

/// Returns the singleton wrapper class, creating it on first use.
///
/// Check-then-create runs under the registry's wrapper lock; every call after
/// creation returns the identical instance.
///
/// # Errors
/// Returns [`Error::LockError`] if the wrapper lock is poisoned.
pub fn get_or_create_wrapper(registry: &IrRegistry) -> Result<IrClassRc> {
    let _guard = registry.wrapper_lock.lock()?;
    if let Some(existing) = registry.get_by_fullname(WRAPPER_CLASS_NAME) {
        return Ok(existing);
    }

    let class = registry.class_ref(WRAPPER_CLASS_NAME, TypeKind::Class)?;
    class.set_modifiers(TypeModifiers::PUBLIC | TypeModifiers::FINAL);
    class.add_field(IrField::new(
        WRAPPER_FIELD_NAME,
        IrType::object(),
        MemberModifiers::PUBLIC,
    ));

    // .ctor(value) { this.r = value; }
    let (ctor, _) = class.get_or_add_method(IrMethod::new(
        CONSTRUCTOR_NAME,
        vec![IrType::object()],
        IrType::Void,
        MemberModifiers::PUBLIC,
    ));
    let mut body = MethodBody::new();
    let value = body.add_local("value", IrType::object());
    body.push(Stmt::Assign {
        target: Place::Field {
            object: Value::This,
            field: FieldRef::new(WRAPPER_CLASS_NAME, WRAPPER_FIELD_NAME),
        },
        value: Expr::Use(Value::Local(value)),
    });
    body.push(Stmt::ReturnVoid);
    ctor.set_body(body);

    Ok(class)
}

/// Returns `true` iff the parameter is passed by reference and needs wrapping.
#[must_use]
pub fn needs_wrapper(parameter: &ParameterDescriptor) -> bool {
    parameter.is_in || parameter.is_out || parameter.is_ref
}

/// Returns the wrapper's value field.
///
/// # Errors
/// Returns [`Error::MissingMember`] if `wrapper` is not a constructed wrapper
/// class.
pub fn wrapper_field(wrapper: &IrClassRc) -> Result<IrFieldRc> {
    wrapper
        .field_by_name(WRAPPER_FIELD_NAME)
        .ok_or_else(|| Error::MissingMember {
            class: wrapper.fullname(),
            member: WRAPPER_FIELD_NAME.to_string(),
        })
}

/// Emit wrapping of `argument` at the call site.
///
/// Appends allocation of a fresh wrapper and a constructor call boxing
/// `argument` into it, and returns the wrapper local to pass to the callee in
/// place of `argument`.
pub fn insert_wrap(body: &mut MethodBody, wrapper: &IrClassRc, argument: Value) -> Value {
    let fullname = wrapper.fullname();
    let wrap = body.add_local("wrap", IrType::Object(fullname.clone()));
    body.push(Stmt::Assign {
        target: Place::Local(wrap),
        value: Expr::New(fullname.clone()),
    });
    body.push(Stmt::InvokeSpecial {
        receiver: Value::Local(wrap),
        method: MethodRef::new(fullname, CONSTRUCTOR_NAME),
        args: vec![argument],
    });
    Value::Local(wrap)
}

/// Build the unwrap statement to place immediately after the call.
///
/// Reads the wrapper's field out of `wrapped` into `target`, reflecting any
/// mutation the callee performed on the boxed value.
#[must_use]
pub fn insert_unwrap(wrapper: &IrClassRc, wrapped: Value, target: Place) -> Stmt {
    Stmt::Assign {
        target,
        value: Expr::InstanceField {
            object: wrapped,
            field: FieldRef::new(wrapper.fullname(), WRAPPER_FIELD_NAME),
        },
    }
}

/// Build the write-back statement used inside a callee.
///
/// A callee that receives a wrapper parameter writes its updated value back
/// into the wrapper's field before returning.
#[must_use]
pub fn insert_update(wrapper: &IrClassRc, wrapped: Value, unwrapped: Value) -> Stmt {
    Stmt::Assign {
        target: Place::Field {
            object: wrapped,
            field: FieldRef::new(wrapper.fullname(), WRAPPER_FIELD_NAME),
        },
        value: Expr::Use(unwrapped),
    }
}
