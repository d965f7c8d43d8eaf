//! Struct deep-copy synthesis.
//!
//! The IR has no value-type copy semantics: assigning a struct must copy it,
//! and the IR can only share references. For every lowered value type this
//! pass synthesizes a parameterless, polymorphically callable copy method
//! with the fixed name [`COPY_METHOD_NAME`] returning a fresh instance.
//!
//! Copying is deep only along the value-type field graph: fields recorded in
//! the struct-field marker set are copied by recursively invoking the field
//! type's own copy method; all other fields (primitives and reference types)
//! are copied by direct assignment, so reference fields alias the original.
//!
//! The synthesizer is idempotent: declarations go through the class's atomic
//! get-or-add index and the body slot is set-once, so repeated invocation -
//! including concurrent invocation for the same class - yields exactly one
//! copy method and one empty constructor.
//!
//! Recursion over the value-type field graph terminates because the foreign
//! type system forbids a struct containing itself by value; this is assumed,
//! not checked. Only the declaration of a nested field type's copy method is
//! created here - its body is built when that type is lowered.

use std::collections::HashSet;

use crate::descriptor::TypeKind;
use crate::ir::{
    Expr, FieldRef, IrClassRc, IrMethod, IrMethodRc, IrType, MemberModifiers, MethodBody,
    MethodRef, Place, Stmt, Value,
};
use crate::registry::ClassResolver;
use crate::{Error, Result};

/// Fixed name of the synthesized deep-copy method, scoped per class.
pub const COPY_METHOD_NAME: &str = "CreateDeepStructCopy";
/// Fixed name of constructors in the lowered namespace.
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// Get or declare the copy method on a class, without a body.
pub fn copy_method(class: &IrClassRc) -> IrMethodRc {
    let declaration = IrMethod::new(
        COPY_METHOD_NAME,
        vec![],
        IrType::Object(class.fullname()),
        MemberModifiers::PUBLIC | MemberModifiers::VIRTUAL,
    );
    let (method, _) = class.get_or_add_method(declaration);
    method
}

/// Get or create the empty constructor used to allocate copies.
///
/// Foreign structs cannot declare parameterless constructors in user code, so
/// one usually has to be synthesized; an existing declaration is reused.
pub fn empty_constructor(class: &IrClassRc) -> IrMethodRc {
    let declaration = IrMethod::new(
        CONSTRUCTOR_NAME,
        vec![],
        IrType::Void,
        MemberModifiers::PUBLIC,
    );
    let (ctor, created) = class.get_or_add_method(declaration);
    if created {
        let mut body = MethodBody::new();
        body.push(Stmt::ReturnVoid);
        ctor.set_body(body);
    }
    ctor
}

/// Synthesize the deep-copy method body for a value-type class.
///
/// `struct_fields` is the marker set built during field lowering: signatures
/// of fields whose declared type is itself a non-primitive value type.
/// Marked fields recurse through `resolver` to obtain the field type's copy
/// method declaration.
///
/// Idempotent: if the copy method already has a body, it is returned as-is.
///
/// # Errors
/// Returns an error if a marked field's type is not an object type or cannot
/// be resolved.
pub fn synthesize(
    class: &IrClassRc,
    struct_fields: &HashSet<String>,
    resolver: &dyn ClassResolver,
) -> Result<IrMethodRc> {
    let method = copy_method(class);
    if method.body().is_some() {
        return Ok(method);
    }
    let fullname = class.fullname();
    empty_constructor(class);

    let mut body = MethodBody::new();
    let copy = body.add_local("copy", IrType::Object(fullname.clone()));
    // In the foreign runtime everything is assignable to the universal object
    // type, so one transfer local suffices for all fields.
    let tmp = body.add_local("tmp", IrType::object());

    body.push(Stmt::Assign {
        target: Place::Local(copy),
        value: Expr::New(fullname.clone()),
    });
    body.push(Stmt::InvokeSpecial {
        receiver: Value::Local(copy),
        method: MethodRef::new(fullname.clone(), CONSTRUCTOR_NAME),
        args: vec![],
    });

    for field in class.fields() {
        if field.is_static() {
            continue;
        }
        let field_ref = FieldRef::new(fullname.clone(), field.name.clone());
        if struct_fields.contains(&field.signature()) {
            let field_type = field.ty.object_name().ok_or_else(|| {
                Error::Error(format!(
                    "marked struct field '{0}' on '{fullname}' has non-object type {1}",
                    field.name, field.ty
                ))
            })?;
            let field_class = resolver.resolve(field_type, TypeKind::Struct)?;
            let nested_copy = copy_method(&field_class);

            let instance = body.add_local("instance", field.ty.clone());
            body.push(Stmt::Assign {
                target: Place::Local(instance),
                value: Expr::InstanceField {
                    object: Value::This,
                    field: field_ref.clone(),
                },
            });
            body.push(Stmt::Assign {
                target: Place::Local(tmp),
                value: Expr::InvokeSpecial {
                    receiver: Value::Local(instance),
                    method: MethodRef::new(field_class.fullname(), nested_copy.name.clone()),
                    args: vec![],
                },
            });
        } else {
            body.push(Stmt::Assign {
                target: Place::Local(tmp),
                value: Expr::InstanceField {
                    object: Value::This,
                    field: field_ref.clone(),
                },
            });
        }
        body.push(Stmt::Assign {
            target: Place::Field {
                object: Value::Local(copy),
                field: field_ref,
            },
            value: Expr::Use(Value::Local(tmp)),
        });
    }

    body.push(Stmt::Return(Value::Local(copy)));
    // A concurrent synthesis may have won the race; the first body stands.
    method.set_body(body);
    Ok(method)
}
