//! Lowering of fields, methods, properties and events.
//!
//! All member lowering applies a first-wins deduplication policy against the
//! class's member indexes: a member whose lowered name and signature already
//! exist is dropped, never overwritten. Foreign numeric-type aliasing (`int`
//! vs `uint` in generic instantiations) makes such collisions legitimate, and
//! conflating the colliding members to a single IR member is intentional.
//!
//! Collision scope differs by member group, mirroring the original frontend:
//! a field collision drops only that field; a method collision stops
//! registration of the remaining methods in the descriptor pass; a property
//! or event accessor collision stops the remaining accessors of that one
//! descriptor.

use std::collections::HashSet;

use crate::descriptor::{
    EventDescriptor, MethodDescriptor, PropertyDescriptor, TypeDescriptor, TypeKind, Visibility,
};
use crate::ir::{IrClassRc, IrField, IrMethod, IrType, MemberModifiers};
use crate::lowering::LoweringOptions;

/// Name of the foreign runtime-internal string copy helper that is skipped by
/// default; its body is not translatable.
const INTERNAL_COPY_METHOD: &str = "InternalCopy";
/// Declaring class of [`INTERNAL_COPY_METHOD`].
const INTERNAL_COPY_CLASS: &str = "System.String";

fn visibility_flags(visibility: Visibility) -> MemberModifiers {
    match visibility {
        Visibility::Public => MemberModifiers::PUBLIC,
        Visibility::Private => MemberModifiers::PRIVATE,
        Visibility::Protected => MemberModifiers::PROTECTED,
        Visibility::Internal => MemberModifiers::INTERNAL,
    }
}

/// Lower field descriptors onto the class, first-wins.
///
/// Fields whose declared kind is a value type and whose lowered type is not a
/// primitive are recorded in `struct_fields` (by field signature); struct
/// copy synthesis consumes that set afterwards.
pub(crate) fn lower_fields(
    descriptor: &TypeDescriptor,
    class: &IrClassRc,
    struct_fields: &mut HashSet<String>,
) {
    for field in &descriptor.fields {
        let ty = IrType::from_handle(&field.ty);
        let mut flags = visibility_flags(field.visibility);
        if field.is_static {
            flags |= MemberModifiers::STATIC;
        }

        let lowered = IrField::new(field.name.clone(), ty.clone(), flags);
        let signature = lowered.signature();
        let (_, created) = class.add_field(lowered);
        if !created {
            continue;
        }
        if field.ty.kind == TypeKind::Struct && !ty.is_primitive() {
            struct_fields.insert(signature);
        }
    }
}

/// Returns `true` if the method is excluded by the skip policy.
fn skipped_by_policy(
    descriptor: &TypeDescriptor,
    method: &MethodDescriptor,
    options: &LoweringOptions,
) -> bool {
    if options.resolve_all_methods {
        return false;
    }
    method.is_unsafe
        || (method.name == INTERNAL_COPY_METHOD && descriptor.fullname() == INTERNAL_COPY_CLASS)
}

fn lower_method(method: &MethodDescriptor) -> IrMethod {
    let parameters = method
        .parameters
        .iter()
        .map(|param| IrType::from_handle(&param.ty))
        .collect();
    let return_type = if method.return_type.fullname == "System.Void" {
        IrType::Void
    } else {
        IrType::from_handle(&method.return_type)
    };

    let mut flags = visibility_flags(method.visibility);
    if method.is_static {
        flags |= MemberModifiers::STATIC;
    }
    if method.is_abstract {
        flags |= MemberModifiers::ABSTRACT;
    }
    if method.is_virtual {
        flags |= MemberModifiers::VIRTUAL;
    }

    IrMethod::new(method.name.clone(), parameters, return_type, flags)
}

/// Lower method descriptors onto the class.
///
/// A signature collision drops the colliding method and ends registration of
/// the remaining methods for this pass.
pub(crate) fn lower_methods(
    descriptor: &TypeDescriptor,
    class: &IrClassRc,
    options: &LoweringOptions,
) {
    for method in &descriptor.methods {
        if skipped_by_policy(descriptor, method, options) {
            continue;
        }

        let lowered = lower_method(method);
        if class.declares_method(&lowered.signature()) {
            return;
        }
        class.add_method(lowered);
    }
}

fn accessor(name: String, parameters: Vec<IrType>, return_type: IrType, is_static: bool) -> IrMethod {
    let mut flags = MemberModifiers::PUBLIC;
    if is_static {
        flags |= MemberModifiers::STATIC;
    } else {
        flags |= MemberModifiers::VIRTUAL;
    }
    IrMethod::new(name, parameters, return_type, flags)
}

/// Lower property descriptors to accessor methods (`get_X` / `set_X`).
///
/// An accessor collision stops the remaining accessors of that property.
pub(crate) fn lower_properties(descriptor: &TypeDescriptor, class: &IrClassRc) {
    for property in &descriptor.properties {
        let ty = IrType::from_handle(&property.ty);
        if property.can_get {
            let getter = accessor(
                format!("get_{0}", property.name),
                vec![],
                ty.clone(),
                property.is_static,
            );
            if class.declares_method(&getter.signature()) {
                continue;
            }
            class.add_method(getter);
        }
        if property.can_set {
            let setter = accessor(
                format!("set_{0}", property.name),
                vec![ty.clone()],
                IrType::Void,
                property.is_static,
            );
            if class.declares_method(&setter.signature()) {
                continue;
            }
            class.add_method(setter);
        }
    }
}

fn lower_event(event: &EventDescriptor, class: &IrClassRc) {
    let handler = IrType::from_handle(&event.handler_type);
    if event.can_add {
        let add = accessor(
            format!("add_{0}", event.name),
            vec![handler.clone()],
            IrType::Void,
            false,
        );
        if class.declares_method(&add.signature()) {
            return;
        }
        class.add_method(add);
    }
    if event.can_invoke {
        let raise = accessor(format!("raise_{0}", event.name), vec![], IrType::Void, false);
        if class.declares_method(&raise.signature()) {
            return;
        }
        class.add_method(raise);
    }
    if event.can_remove {
        let remove = accessor(
            format!("remove_{0}", event.name),
            vec![handler],
            IrType::Void,
            false,
        );
        if class.declares_method(&remove.signature()) {
            return;
        }
        class.add_method(remove);
    }
}

/// Lower event descriptors to accessor methods (`add_X` / `raise_X` / `remove_X`).
///
/// An accessor collision stops the remaining accessors of that event.
pub(crate) fn lower_events(descriptor: &TypeDescriptor, class: &IrClassRc) {
    for event in &descriptor.events {
        lower_event(event, class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, ParameterDescriptor, TypeHandle};
    use crate::registry::IrRegistry;

    fn handle(fullname: &str, kind: TypeKind) -> TypeHandle {
        TypeHandle::new(fullname, kind)
    }

    fn int_handle() -> TypeHandle {
        handle("System.Int32", TypeKind::Struct)
    }

    fn uint_handle() -> TypeHandle {
        handle("System.UInt32", TypeKind::Struct)
    }

    fn void_handle() -> TypeHandle {
        handle("System.Void", TypeKind::Struct)
    }

    fn field(name: &str, ty: TypeHandle) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            ty,
            is_static: false,
            visibility: Visibility::Public,
        }
    }

    fn method(name: &str, parameters: Vec<ParameterDescriptor>) -> MethodDescriptor {
        MethodDescriptor {
            name: name.to_string(),
            parameters,
            return_type: void_handle(),
            is_static: false,
            is_abstract: false,
            is_virtual: false,
            is_unsafe: false,
            visibility: Visibility::Public,
        }
    }

    fn class_for(descriptor: &TypeDescriptor, registry: &IrRegistry) -> IrClassRc {
        registry
            .class_ref(&descriptor.fullname(), descriptor.kind)
            .unwrap()
    }

    #[test]
    fn test_field_dedup_first_wins() {
        // Aliased numeric types lower to the same field signature.
        let registry = IrRegistry::new();
        let desc = TypeDescriptor {
            namespace: "Test".to_string(),
            name: "Aliased".to_string(),
            fields: vec![field("x", int_handle()), field("x", int_handle())],
            ..TypeDescriptor::default()
        };
        let class = class_for(&desc, &registry);

        let mut struct_fields = HashSet::new();
        lower_fields(&desc, &class, &mut struct_fields);
        assert_eq!(class.fields().len(), 1);
    }

    #[test]
    fn test_struct_field_marking() {
        let registry = IrRegistry::new();
        let desc = TypeDescriptor {
            namespace: "Test".to_string(),
            name: "Outer".to_string(),
            kind: TypeKind::Struct,
            fields: vec![
                // Primitive value type: no marker.
                field("count", int_handle()),
                // Non-primitive value type: marked for deep copy.
                field("point", handle("Test.Point", TypeKind::Struct)),
                // Reference type: no marker.
                field("label", handle("System.String", TypeKind::Class)),
            ],
            ..TypeDescriptor::default()
        };
        let class = class_for(&desc, &registry);

        let mut struct_fields = HashSet::new();
        lower_fields(&desc, &class, &mut struct_fields);
        assert_eq!(struct_fields.len(), 1);
        assert!(struct_fields.contains("point:Test.Point"));
    }

    #[test]
    fn test_method_collision_stops_registration() {
        let registry = IrRegistry::new();
        let desc = TypeDescriptor {
            namespace: "Test".to_string(),
            name: "Numeric".to_string(),
            methods: vec![
                method("Frob", vec![ParameterDescriptor::by_value("v", int_handle())]),
                // uint parameter lowers to a distinct signature, registered fine
                method("Frob", vec![ParameterDescriptor::by_value("v", uint_handle())]),
                // exact duplicate: dropped, and the rest of the pass ends
                method("Frob", vec![ParameterDescriptor::by_value("v", int_handle())]),
                method("NeverReached", vec![]),
            ],
            ..TypeDescriptor::default()
        };
        let class = class_for(&desc, &registry);

        lower_methods(&desc, &class, &LoweringOptions::default());
        assert_eq!(class.methods().len(), 2);
        assert!(class.method_by_name("NeverReached").is_none());
    }

    #[test]
    fn test_unsafe_method_policy() {
        let registry = IrRegistry::new();
        let mut unsafe_method = method("Dangerous", vec![]);
        unsafe_method.is_unsafe = true;
        let desc = TypeDescriptor {
            namespace: "Test".to_string(),
            name: "Mixed".to_string(),
            methods: vec![unsafe_method, method("Safe", vec![])],
            ..TypeDescriptor::default()
        };

        let class = class_for(&desc, &registry);
        lower_methods(&desc, &class, &LoweringOptions::default());
        assert!(class.method_by_name("Dangerous").is_none());
        assert!(class.method_by_name("Safe").is_some());

        // With the flag set, unsafe methods lower as well.
        let registry = IrRegistry::new();
        let class = class_for(&desc, &registry);
        lower_methods(
            &desc,
            &class,
            &LoweringOptions {
                resolve_all_methods: true,
            },
        );
        assert!(class.method_by_name("Dangerous").is_some());
    }

    #[test]
    fn test_internal_copy_skipped_on_system_string() {
        let registry = IrRegistry::new();
        let desc = TypeDescriptor {
            namespace: "System".to_string(),
            name: "String".to_string(),
            methods: vec![method(INTERNAL_COPY_METHOD, vec![])],
            ..TypeDescriptor::default()
        };
        let class = class_for(&desc, &registry);
        lower_methods(&desc, &class, &LoweringOptions::default());
        assert!(class.methods().is_empty());

        // Same method name on another class is not special.
        let desc = TypeDescriptor {
            namespace: "Test".to_string(),
            name: "Copier".to_string(),
            methods: vec![method(INTERNAL_COPY_METHOD, vec![])],
            ..TypeDescriptor::default()
        };
        let class = class_for(&desc, &registry);
        lower_methods(&desc, &class, &LoweringOptions::default());
        assert_eq!(class.methods().len(), 1);
    }

    #[test]
    fn test_property_accessors() {
        let registry = IrRegistry::new();
        let desc = TypeDescriptor {
            namespace: "Test".to_string(),
            name: "WithProps".to_string(),
            properties: vec![PropertyDescriptor {
                name: "Length".to_string(),
                ty: int_handle(),
                is_static: false,
                can_get: true,
                can_set: true,
            }],
            ..TypeDescriptor::default()
        };
        let class = class_for(&desc, &registry);
        lower_properties(&desc, &class);

        let getter = class.method_by_name("get_Length").unwrap();
        assert!(getter.parameters.is_empty());
        assert_eq!(getter.return_type.fullname(), "System.Int32");
        let setter = class.method_by_name("set_Length").unwrap();
        assert_eq!(setter.parameters.len(), 1);
        assert_eq!(setter.return_type, IrType::Void);
    }

    #[test]
    fn test_event_accessors() {
        let registry = IrRegistry::new();
        let desc = TypeDescriptor {
            namespace: "Test".to_string(),
            name: "WithEvents".to_string(),
            events: vec![EventDescriptor {
                name: "Changed".to_string(),
                handler_type: handle("System.EventHandler", TypeKind::Delegate),
                can_add: true,
                can_remove: true,
                can_invoke: false,
            }],
            ..TypeDescriptor::default()
        };
        let class = class_for(&desc, &registry);
        lower_events(&desc, &class);

        assert!(class.method_by_name("add_Changed").is_some());
        assert!(class.method_by_name("remove_Changed").is_some());
        assert!(class.method_by_name("raise_Changed").is_none());
    }
}
