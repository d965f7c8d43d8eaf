//! Modifier mapping and hierarchy linking.
//!
//! Links a class to its superclass (exactly one, only base types of kind
//! class), its implemented interfaces (deduplicated by lowered fullname) and
//! its declaring outer class. Every link resolves the referenced name through
//! the [`ClassResolver`] capability - which may trigger recursive lowering -
//! and records it in the [`Dependencies`] set. Resolution failures are fatal:
//! no class is usable without its hierarchy.

use crate::descriptor::{TypeDescriptor, TypeKind, Visibility};
use crate::ir::{IrClassRc, TypeModifiers};
use crate::lowering::Dependencies;
use crate::registry::ClassResolver;
use crate::{Error, Result};

/// Map descriptor modifiers onto lowered modifier flags.
pub(crate) fn apply_modifiers(descriptor: &TypeDescriptor, class: &IrClassRc) {
    let mut flags = match descriptor.visibility {
        Visibility::Public => TypeModifiers::PUBLIC,
        Visibility::Private => TypeModifiers::PRIVATE,
        Visibility::Protected => TypeModifiers::PROTECTED,
        Visibility::Internal => TypeModifiers::INTERNAL,
    };
    if descriptor.is_abstract {
        flags |= TypeModifiers::ABSTRACT;
    }
    if descriptor.is_sealed {
        flags |= TypeModifiers::FINAL;
    }
    if descriptor.is_static {
        // Static foreign types are encoded abstract+sealed; keep both views.
        flags |= TypeModifiers::STATIC | TypeModifiers::ABSTRACT | TypeModifiers::FINAL;
    }
    match descriptor.kind {
        TypeKind::Interface => flags |= TypeModifiers::INTERFACE | TypeModifiers::ABSTRACT,
        TypeKind::Struct | TypeKind::Enum => flags |= TypeModifiers::VALUE_TYPE,
        TypeKind::Class | TypeKind::Delegate => {}
    }
    class.set_modifiers(flags);
}

/// Link superclass and interfaces, recording each referenced type.
pub(crate) fn link_hierarchy(
    descriptor: &TypeDescriptor,
    class: &IrClassRc,
    dependencies: &mut Dependencies,
    resolver: &dyn ClassResolver,
) -> Result<()> {
    for base in &descriptor.base_types {
        match base.kind {
            TypeKind::Class => {
                let superclass = resolve_link(class, resolver, &base.fullname, base.kind)?;
                class.set_base(&superclass);
                dependencies.hierarchy.insert(base.fullname.clone());
            }
            TypeKind::Interface => {
                let interface = resolve_link(class, resolver, &base.fullname, base.kind)?;
                // Generic instantiations can report the same interface twice.
                if class.add_interface(&interface) {
                    dependencies.hierarchy.insert(base.fullname.clone());
                }
            }
            TypeKind::Struct | TypeKind::Enum | TypeKind::Delegate => {}
        }
    }
    Ok(())
}

/// Link the declaring outer class for nested types.
pub(crate) fn link_outer_class(
    descriptor: &TypeDescriptor,
    class: &IrClassRc,
    dependencies: &mut Dependencies,
    resolver: &dyn ClassResolver,
) -> Result<()> {
    let Some(outer_name) = descriptor
        .declaring_outer_class
        .as_deref()
        .filter(|name| !name.is_empty())
    else {
        return Ok(());
    };

    let outer = resolve_link(class, resolver, outer_name, TypeKind::Class)?;
    class.set_outer(&outer);
    dependencies.hierarchy.insert(outer_name.to_string());
    Ok(())
}

fn resolve_link(
    class: &IrClassRc,
    resolver: &dyn ClassResolver,
    fullname: &str,
    kind: TypeKind,
) -> Result<IrClassRc> {
    resolver
        .resolve(fullname, kind)
        .map_err(|_| Error::UnresolvedHierarchy {
            class: class.fullname(),
            reference: fullname.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeHandle;
    use crate::registry::IrRegistry;

    fn descriptor(name: &str) -> TypeDescriptor {
        TypeDescriptor {
            namespace: "Test".to_string(),
            name: name.to_string(),
            ..TypeDescriptor::default()
        }
    }

    #[test]
    fn test_superclass_and_interface_links() {
        let registry = IrRegistry::new();
        let mut desc = descriptor("Derived");
        desc.base_types = vec![
            TypeHandle::new("Test.Base", TypeKind::Class),
            TypeHandle::new("Test.IFirst", TypeKind::Interface),
            TypeHandle::new("Test.ISecond", TypeKind::Interface),
        ];

        let class = registry.class_ref("Test.Derived", TypeKind::Class).unwrap();
        let mut deps = Dependencies::default();
        link_hierarchy(&desc, &class, &mut deps, &registry).unwrap();

        assert_eq!(class.base().unwrap().fullname(), "Test.Base");
        assert_eq!(class.interfaces().len(), 2);
        assert!(deps.hierarchy.contains("Test.Base"));
        assert!(deps.hierarchy.contains("Test.IFirst"));
        assert!(deps.hierarchy.contains("Test.ISecond"));
    }

    #[test]
    fn test_duplicate_interface_skipped() {
        let registry = IrRegistry::new();
        let mut desc = descriptor("Generic");
        desc.base_types = vec![
            TypeHandle::new("Test.IThing", TypeKind::Interface),
            TypeHandle::new("Test.IThing", TypeKind::Interface),
        ];

        let class = registry.class_ref("Test.Generic", TypeKind::Class).unwrap();
        let mut deps = Dependencies::default();
        link_hierarchy(&desc, &class, &mut deps, &registry).unwrap();

        assert_eq!(class.interfaces().len(), 1);
        assert_eq!(deps.hierarchy.len(), 1);
    }

    #[test]
    fn test_outer_class_link() {
        let registry = IrRegistry::new();
        let mut desc = descriptor("Inner");
        desc.declaring_outer_class = Some("Test.Outer".to_string());

        let class = registry.class_ref("Test.Inner", TypeKind::Class).unwrap();
        let mut deps = Dependencies::default();
        link_outer_class(&desc, &class, &mut deps, &registry).unwrap();

        assert_eq!(class.outer().unwrap().fullname(), "Test.Outer");
        assert!(deps.hierarchy.contains("Test.Outer"));
    }

    #[test]
    fn test_resolution_failure_is_fatal() {
        struct FailingResolver;
        impl ClassResolver for FailingResolver {
            fn resolve(&self, fullname: &str, _: TypeKind) -> Result<IrClassRc> {
                Err(Error::ClassNotFound(fullname.to_string()))
            }
        }

        let registry = IrRegistry::new();
        let mut desc = descriptor("Orphan");
        desc.base_types = vec![TypeHandle::new("Missing.Base", TypeKind::Class)];

        let class = registry.class_ref("Test.Orphan", TypeKind::Class).unwrap();
        let mut deps = Dependencies::default();
        let err = link_hierarchy(&desc, &class, &mut deps, &FailingResolver).unwrap_err();
        assert!(matches!(err, Error::UnresolvedHierarchy { .. }));
    }

    #[test]
    fn test_static_type_modifiers() {
        let registry = IrRegistry::new();
        let mut desc = descriptor("Util");
        desc.is_static = true;

        let class = registry.class_ref("Test.Util", TypeKind::Class).unwrap();
        apply_modifiers(&desc, &class);
        let flags = class.modifiers();
        assert!(flags.contains(TypeModifiers::STATIC));
        assert!(flags.contains(TypeModifiers::ABSTRACT));
        assert!(flags.contains(TypeModifiers::FINAL));
    }
}
